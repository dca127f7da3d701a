//! Pluggable key-to-bucket policies.
//!
//! A strategy is split into two steps. `hash` runs user `Hash` code once per
//! operation; `spread` maps the resulting `u64` onto a bucket range. The engine
//! caches the hash in every node and only calls `spread` when it relinks nodes
//! during a resize, so `K: Hash` is never invoked after insertion.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Maps keys to bucket indices.
///
/// Implementations must be deterministic: equal keys produce equal hashes for
/// the lifetime of the strategy instance, and `spread` must return a value in
/// `[0, capacity)` for every `capacity > 0`.
pub trait HashStrategy {
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash;

    /// Reduce a hash to a bucket index in `[0, capacity)`.
    #[inline]
    fn spread(&self, hash: u64, capacity: usize) -> usize {
        (hash % capacity as u64) as usize
    }

    /// Bucket index of `key` in a table of `capacity` buckets.
    #[inline]
    fn index<Q>(&self, key: &Q, capacity: usize) -> usize
    where
        Q: ?Sized + Hash,
    {
        self.spread(self.hash(key), capacity)
    }
}

/// Hashes with any `BuildHasher` and reduces by modulo.
#[derive(Copy, Clone, Debug, Default)]
pub struct BuildHasherStrategy<S = DefaultHashBuilder> {
    hasher: S,
}

impl<S> BuildHasherStrategy<S> {
    pub fn new(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<S: BuildHasher> HashStrategy for BuildHasherStrategy<S> {
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(key)
    }
}

/// The strategy every view uses unless told otherwise.
pub type DefaultStrategy = BuildHasherStrategy<DefaultHashBuilder>;

/// Fibonacci hashing: scrambles the hash with the golden-ratio multiplier and
/// maps the high bits onto the bucket range with a multiply-shift.
///
/// Useful when the underlying hasher has weak low bits, which plain modulo
/// reduction would expose.
#[derive(Copy, Clone, Debug, Default)]
pub struct FibonacciStrategy<S = DefaultHashBuilder> {
    hasher: S,
}

const GOLDEN_RATIO_64: u64 = 0x9E37_79B9_7F4A_7C15;

impl<S> FibonacciStrategy<S> {
    pub fn new(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<S: BuildHasher> HashStrategy for FibonacciStrategy<S> {
    #[inline]
    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(key)
    }

    #[inline]
    fn spread(&self, hash: u64, capacity: usize) -> usize {
        let mixed = hash.wrapping_mul(GOLDEN_RATIO_64);
        ((mixed as u128 * capacity as u128) >> 64) as usize
    }
}
