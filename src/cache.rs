//! Lookup/insert-only view and the `Cache` capability.

use crate::engine::Engine;
use crate::strategy::{DefaultStrategy, HashStrategy};
use core::borrow::Borrow;
use core::hash::Hash;

/// The narrowest capability over an engine: look a key up, or insert and get
/// the stored value back for chaining.
///
/// Every view that stores plain keys implements this, and all of them must
/// agree with [`CacheView`].
pub trait Cache<K, V> {
    fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq;

    /// Insert or replace `key`, returning a reference to the value now stored.
    fn insert(&mut self, key: K, value: V) -> &V;
}

/// A fixed-size cache front-end: 16 buckets, default resize threshold, and no
/// removal or sizing surface.
pub struct CacheView<K, V, S = DefaultStrategy> {
    engine: Engine<K, V, S>,
}

impl<K, V> CacheView<K, V> {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }
}

impl<K, V> Default for CacheView<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: HashStrategy> CacheView<K, V, S> {
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            engine: Engine::with_strategy(strategy),
        }
    }
}

impl<K, V, S> Cache<K, V> for CacheView<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy,
{
    fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get(key)
    }

    fn insert(&mut self, key: K, value: V) -> &V {
        insert_and_borrow(&mut self.engine, key, value)
    }
}

/// Shared by every `Cache` impl: put, then hand back the stored value.
pub(crate) fn insert_and_borrow<K, V, S>(engine: &mut Engine<K, V, S>, key: K, value: V) -> &V
where
    K: Eq + Hash,
    S: HashStrategy,
{
    let (id, _) = engine.put_entry(key, value);
    engine
        .entry_at(id)
        .map(|(_, v)| v)
        .expect("node must exist immediately after put")
}
