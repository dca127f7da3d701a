//! MapView: associative map with strongly held keys and values.

use crate::cache::{insert_and_borrow, Cache};
use crate::config::EngineConfig;
use crate::engine::{Engine, Iter, Keys, Values};
use crate::error::Result;
use crate::strategy::{DefaultStrategy, HashStrategy};
use core::borrow::Borrow;
use core::hash::Hash;

/// A map over one owned [`Engine`].
pub struct MapView<K, V, S = DefaultStrategy> {
    engine: Engine<K, V, S>,
}

impl<K, V> MapView<K, V> {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }
}

impl<K, V> Default for MapView<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: HashStrategy> MapView<K, V, S> {
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            engine: Engine::with_strategy(strategy),
        }
    }

    pub fn with_config(strategy: S, config: EngineConfig) -> Result<Self> {
        Engine::with_config(strategy, config).map(|engine| Self { engine })
    }

    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    pub fn resize_threshold(&self) -> usize {
        self.engine.resize_threshold()
    }

    /// Entries in bucket order. Do not rely on insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.engine.iter()
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        self.engine.keys()
    }

    pub fn values(&self) -> Values<'_, K, V> {
        self.engine.values()
    }

    pub fn clear(&mut self) {
        self.engine.clear()
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.engine.retain(f)
    }
}

impl<K, V, S> MapView<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy,
{
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get_mut(key)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.contains_key(key)
    }

    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.engine.put(key, value)
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.remove(key)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.remove_entry(key)
    }
}

impl<K, V, S> Cache<K, V> for MapView<K, V, S>
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

impl<K, V, S> Extend<(K, V)> for MapView<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for MapView<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_strategy(S::default());
        map.extend(iter);
        map
    }
}

impl<'a, K, V, S: HashStrategy> IntoIterator for &'a MapView<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> core::fmt::Debug for MapView<K, V, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    S: HashStrategy,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.engine, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn last_write_wins_and_size_counts_distinct_keys() {
        let mut m: MapView<&'static str, i32> = MapView::new();
        m.put("a", 1);
        m.put("b", 2);
        m.put("a", 3);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get("a"), Some(&3));
        assert!(m.contains_key("b"));
        assert!(!m.contains_key("c"));
    }

    #[test]
    fn collect_and_iterate() {
        let m: MapView<u32, u32> = (0..50).map(|i| (i, i * i)).collect();
        assert_eq!(m.len(), 50);
        let sorted: BTreeMap<u32, u32> = m.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(sorted.get(&7), Some(&49));
        assert_eq!((&m).into_iter().count(), 50);
        assert_eq!(m.values().copied().sum::<u32>(), (0..50).map(|i| i * i).sum());
    }

    #[test]
    fn debug_lists_entries() {
        let mut m: MapView<&'static str, i32> = MapView::new();
        m.put("only", 1);
        assert_eq!(format!("{:?}", m), r#"{"only": 1}"#);
    }

    /// `Cache::insert` on a map has the same effect as `put`.
    #[test]
    fn cache_capability_matches_put() {
        let mut m: MapView<String, i32> = MapView::new();
        assert_eq!(*Cache::insert(&mut m, "k".to_string(), 5), 5);
        assert_eq!(m.lookup("k"), Some(&5));
        assert_eq!(m.put("k".to_string(), 6), Some(5));
        assert_eq!(m.lookup("k"), Some(&6));
    }
}
