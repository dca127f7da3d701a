//! WeakMapView: a map whose keys, values, or both are held weakly.
//!
//! Entries whose weak referent has been dropped become logically absent at
//! once. Nothing is reclaimed in the background: a dead node is unlinked when
//! an operation walks its bucket, or by an explicit [`WeakMapView::purge`].
//! This is what gives the view its cache-eviction behaviour.

use crate::config::EngineConfig;
use crate::engine::{self, Engine, NodeId};
use crate::error::Result;
use crate::handle::RefHandle;
use crate::strategy::{DefaultStrategy, HashStrategy};
use core::borrow::Borrow;
use core::hash::Hash;
use std::rc::Rc;

/// Which side of an entry is held weakly.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WeakMode {
    Keys,
    Values,
    Both,
}

impl WeakMode {
    /// Resolve builder flags; `None` when neither side is weak.
    pub fn from_flags(weak_keys: bool, weak_values: bool) -> Option<Self> {
        match (weak_keys, weak_values) {
            (true, true) => Some(WeakMode::Both),
            (true, false) => Some(WeakMode::Keys),
            (false, true) => Some(WeakMode::Values),
            (false, false) => None,
        }
    }

    pub fn weak_keys(self) -> bool {
        matches!(self, WeakMode::Keys | WeakMode::Both)
    }

    pub fn weak_values(self) -> bool {
        matches!(self, WeakMode::Values | WeakMode::Both)
    }
}

fn is_stale<K, V>(key: &RefHandle<K>, value: &RefHandle<V>) -> bool {
    !key.is_live() || !value.is_live()
}

pub struct WeakMapView<K, V, S = DefaultStrategy> {
    mode: WeakMode,
    engine: Engine<RefHandle<K>, RefHandle<V>, S>,
}

impl<K, V> WeakMapView<K, V> {
    pub fn new(mode: WeakMode) -> Self {
        Self {
            mode,
            engine: Engine::new(),
        }
    }
}

impl<K, V, S: HashStrategy> WeakMapView<K, V, S> {
    pub fn with_strategy(mode: WeakMode, strategy: S) -> Self {
        Self {
            mode,
            engine: Engine::with_strategy(strategy),
        }
    }

    pub fn with_config(mode: WeakMode, strategy: S, config: EngineConfig) -> Result<Self> {
        Engine::with_config(strategy, config).map(|engine| Self { mode, engine })
    }

    pub fn mode(&self) -> WeakMode {
        self.mode
    }

    /// Number of stored nodes, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.engine.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engine.is_empty()
    }

    /// Number of entries whose referents are all still live. Computed by a
    /// full scan; no counter tracks it.
    pub fn live_len(&self) -> usize {
        self.engine.iter().filter(|&(k, v)| !is_stale(k, v)).count()
    }

    pub fn capacity(&self) -> usize {
        self.engine.capacity()
    }

    pub fn resize_threshold(&self) -> usize {
        self.engine.resize_threshold()
    }

    /// Unlink every expired node. Returns how many were removed.
    pub fn purge(&mut self) -> usize {
        let before = self.engine.len();
        self.engine.retain(|k, v| !is_stale(k, v));
        let purged = before - self.engine.len();
        tracing::trace!(purged, remaining = self.engine.len(), "[weak]: full purge");
        purged
    }

    /// Live entries as strong references. Expired nodes are skipped, not purged.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.engine.iter(),
        }
    }
}

impl<K, V, S> WeakMapView<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy,
{
    /// Store `value` under `key`, holding each weakly as the mode says.
    ///
    /// Replacing an existing key refreshes both handles. Returns the previous
    /// value if it was still live.
    pub fn put(&mut self, key: Rc<K>, value: Rc<V>) -> Option<Rc<V>> {
        let hash = self.engine.hash_of(&*key);
        self.engine.purge_bucket(hash, is_stale);

        let weak_keys = self.mode.weak_keys();
        let weak_values = self.mode.weak_values();
        let found = self.engine.find_raw(hash, |k| k.matches::<K>(&key));
        match found.and_then(|id| self.engine.entry_at_mut(id)) {
            Some((k, v)) => {
                *k = RefHandle::new(key, weak_keys);
                let old = core::mem::replace(v, RefHandle::new(value, weak_values));
                old.get()
            }
            None => {
                self.engine.insert_unique(
                    hash,
                    RefHandle::new(key, weak_keys),
                    RefHandle::new(value, weak_values),
                );
                None
            }
        }
    }

    /// The value under `key`, or `None` if absent or expired. Expired nodes in
    /// the visited bucket are purged.
    pub fn get<Q>(&mut self, key: &Q) -> Option<Rc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.locate_live(key)?;
        self.engine.entry_at(id).and_then(|(_, v)| v.get())
    }

    pub fn contains_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate_live(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<Rc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.locate_live(key)?;
        self.engine.remove_node(id).and_then(|(_, v)| v.get())
    }

    fn locate_live<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.engine.hash_of(key);
        self.engine.purge_bucket(hash, is_stale);
        self.engine.find_raw(hash, |k| k.matches(key))
    }
}

impl<K, V, S> core::fmt::Debug for WeakMapView<K, V, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    S: HashStrategy,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the live entries of a [`WeakMapView`].
pub struct Iter<'a, K, V> {
    inner: engine::Iter<'a, RefHandle<K>, RefHandle<V>>,
}

impl<K, V> Iterator for Iter<'_, K, V> {
    type Item = (Rc<K>, Rc<V>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (k, v) = self.inner.next()?;
            if let (Some(k), Some(v)) = (k.get(), v.get()) {
                return Some((k, v));
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rc(s: &str) -> Rc<String> {
        Rc::new(s.to_string())
    }

    #[test]
    fn mode_flags() {
        assert_eq!(WeakMode::from_flags(true, true), Some(WeakMode::Both));
        assert_eq!(WeakMode::from_flags(true, false), Some(WeakMode::Keys));
        assert_eq!(WeakMode::from_flags(false, true), Some(WeakMode::Values));
        assert_eq!(WeakMode::from_flags(false, false), None);
        assert!(WeakMode::Both.weak_keys() && WeakMode::Both.weak_values());
        assert!(!WeakMode::Values.weak_keys());
        assert!(!WeakMode::Keys.weak_values());
    }

    /// Weak keys: dropping the last outside key reference makes the entry
    /// absent, and the visiting lookup unlinks it.
    #[test]
    fn weak_key_expires_on_lookup() {
        let mut m: WeakMapView<String, u32> = WeakMapView::new(WeakMode::Keys);
        let key = rc("k");
        m.put(Rc::clone(&key), Rc::new(1));
        assert_eq!(m.get("k").map(|v| *v), Some(1));

        drop(key);
        assert_eq!(m.len(), 1, "not purged until visited");
        assert_eq!(m.live_len(), 0);
        assert_eq!(m.get("k"), None);
        assert_eq!(m.len(), 0);
    }

    /// Weak values: the entry disappears with its value even though the key is
    /// held strongly.
    #[test]
    fn weak_value_expires() {
        let mut m: WeakMapView<String, String> = WeakMapView::new(WeakMode::Values);
        let value = rc("payload");
        m.put(rc("k"), Rc::clone(&value));
        assert!(m.contains_key("k"));
        drop(value);
        assert!(!m.contains_key("k"));
        assert!(m.is_empty());
    }

    #[test]
    fn both_mode_expires_on_either_side() {
        let mut m: WeakMapView<String, String> = WeakMapView::new(WeakMode::Both);
        let (k1, v1) = (rc("a"), rc("1"));
        let (k2, v2) = (rc("b"), rc("2"));
        m.put(Rc::clone(&k1), Rc::clone(&v1));
        m.put(Rc::clone(&k2), Rc::clone(&v2));

        drop(v1);
        drop(k2);
        assert_eq!(m.get("a"), None);
        assert_eq!(m.get("b"), None);
        assert!(m.is_empty());
        drop((k1, v2));
    }

    /// Replacing a key refreshes the stored key handle, so the entry follows
    /// the newest key reference rather than the first one.
    #[test]
    fn put_refreshes_key_handle() {
        let mut m: WeakMapView<String, u32> = WeakMapView::new(WeakMode::Keys);
        let first = rc("k");
        let second = rc("k");
        assert_eq!(m.put(Rc::clone(&first), Rc::new(1)), None);
        assert_eq!(m.put(Rc::clone(&second), Rc::new(2)).map(|v| *v), Some(1));
        assert_eq!(m.len(), 1);

        drop(first);
        assert_eq!(m.get("k").map(|v| *v), Some(2));
        drop(second);
        assert_eq!(m.get("k"), None);
    }

    #[test]
    fn purge_sweeps_all_buckets() {
        let mut m: WeakMapView<u32, u32> = WeakMapView::new(WeakMode::Values);
        let held: Vec<Rc<u32>> = (0..10).map(Rc::new).collect();
        for (i, v) in held.iter().enumerate() {
            m.put(Rc::new(i as u32), Rc::clone(v));
        }
        let transient: Vec<Rc<u32>> = (10..20).map(Rc::new).collect();
        for v in &transient {
            m.put(Rc::new(**v), Rc::clone(v));
        }
        assert_eq!(m.len(), 20);
        drop(transient);

        assert_eq!(m.live_len(), 10);
        assert_eq!(m.iter().count(), 10);
        assert_eq!(m.purge(), 10);
        assert_eq!(m.len(), 10);
        assert_eq!(m.purge(), 0);
    }

    #[test]
    fn remove_returns_live_value() {
        let mut m: WeakMapView<String, u32> = WeakMapView::new(WeakMode::Keys);
        let key = rc("k");
        m.put(Rc::clone(&key), Rc::new(9));
        assert_eq!(m.remove("k").map(|v| *v), Some(9));
        assert_eq!(m.remove("k"), None);
        assert!(m.is_empty());
    }

    #[test]
    fn debug_shows_only_live_entries() {
        let mut m: WeakMapView<&'static str, u32> = WeakMapView::new(WeakMode::Values);
        let v = Rc::new(1);
        m.put(Rc::new("live"), Rc::clone(&v));
        m.put(Rc::new("dead"), Rc::new(2));
        assert_eq!(format!("{:?}", m), r#"{"live": 1}"#);
    }
}
