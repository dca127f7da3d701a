//! hashstruct: one chained hash engine behind map, set, cache, and
//! weak-reference views.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: write the hash table once and let every collection flavour be a
//!   thin view over it, so lookup, insertion, and growth behave identically
//!   everywhere.
//! - Layers:
//!   - HashStrategy: key → `u64` hash → bucket index. Pluggable per engine.
//!   - Engine<K, V, S>: bucket heads over a `SlotMap` node arena; chains are
//!     linked by generational node ids. Owns growth and the debug-only
//!     exclusive-section check.
//!   - Views: MapView, SetView, CacheView wrap one Engine each; WeakMapView
//!     stores `RefHandle`s and purges expired nodes as it walks buckets.
//!   - Builder: validated sizing, strategy, and weak flags → a view.
//!
//! Constraints
//! - Single-threaded: engines are `!Send`/`!Sync`. The builder's concurrency
//!   flag is reserved and has no effect.
//! - Each view owns exactly one engine and never hands it out.
//! - Absence is `None`. Only configuration can fail, and it fails at build time.
//!
//! Growth
//! - When the entry count reaches the resize threshold the bucket array
//!   doubles and every node is relinked by its cached hash before `put`
//!   returns. The threshold doubles with it.
//! - `K: Hash` is never invoked after insertion; the hash cached in each node
//!   drives rehashing.
//! - Chain order within a bucket is not preserved across a resize. Iteration
//!   walks buckets in index order, then each chain head to tail.
//!
//! Weak entries
//! - Weak handles are `std::rc::Weak`. A referent dies exactly when its last
//!   `Rc` is dropped, so expiry is deterministic rather than tied to a
//!   collector cycle. The map notices only when an operation visits the
//!   bucket (or on `purge`), never through a callback.
//!
//! Notes and non-goals
//! - No weak sets; `build_set` ignores weak flags.
//! - No concurrent variant.

pub mod builder;
pub mod cache;
pub mod config;
pub mod engine;
mod engine_proptest;
pub mod error;
mod guard;
pub mod handle;
pub mod map;
pub mod set;
pub mod strategy;
pub mod weak_map;

// Public surface
pub use builder::{Builder, BuiltMap};
pub use cache::{Cache, CacheView};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{Error, Result};
pub use handle::RefHandle;
pub use map::MapView;
pub use set::{Present, SetView};
pub use strategy::{BuildHasherStrategy, DefaultStrategy, FibonacciStrategy, HashStrategy};
pub use weak_map::{WeakMapView, WeakMode};
