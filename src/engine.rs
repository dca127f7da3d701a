//! Engine: chained hash table over a node arena.
//!
//! Nodes live in a `SlotMap` and chains are linked by generational `NodeId`s,
//! so resizing relinks nodes in place instead of moving them. The bucket array
//! holds one chain head per index.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::guard::ExclusiveSection;
use crate::strategy::{DefaultStrategy, HashStrategy};
use core::borrow::Borrow;
use core::hash::Hash;
use core::iter::FusedIterator;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable identity of a node across resizes.
    pub(crate) struct NodeId;
}

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    hash: u64,
    next: Option<NodeId>,
}

/// Unguarded table state. Every `Engine` entry point opens an exclusive
/// section and then delegates here.
struct Table<K, V, S> {
    strategy: S,
    buckets: Vec<Option<NodeId>>,
    nodes: SlotMap<NodeId, Node<K, V>>,
    resize_threshold: usize,
}

impl<K, V, S: HashStrategy> Table<K, V, S> {
    fn new(strategy: S, config: EngineConfig) -> Self {
        Self {
            strategy,
            buckets: vec![None; config.initial_capacity],
            nodes: SlotMap::with_key(),
            resize_threshold: config.resize_threshold,
        }
    }

    #[inline]
    fn bucket_of(&self, hash: u64) -> usize {
        let b = self.strategy.spread(hash, self.buckets.len());
        debug_assert!(b < self.buckets.len(), "strategy spread out of range");
        b
    }

    fn locate(&self, hash: u64, mut eq: impl FnMut(&K) -> bool) -> Option<NodeId> {
        let mut cur = self.buckets[self.bucket_of(hash)];
        while let Some(id) = cur {
            let node = &self.nodes[id];
            if node.hash == hash && eq(&node.key) {
                return Some(id);
            }
            cur = node.next;
        }
        None
    }

    /// Append a node at the tail of its chain, growing afterwards if the
    /// threshold is reached. Callers guarantee the key is not yet present.
    fn link_new(&mut self, hash: u64, key: K, value: V) -> NodeId {
        let b = self.bucket_of(hash);
        let id = self.nodes.insert(Node {
            key,
            value,
            hash,
            next: None,
        });

        match self.buckets[b] {
            None => self.buckets[b] = Some(id),
            Some(head) => {
                let mut tail = head;
                while let Some(next) = self.nodes[tail].next {
                    tail = next;
                }
                self.nodes[tail].next = Some(id);
            }
        }

        if self.nodes.len() >= self.resize_threshold {
            self.grow();
        }
        id
    }

    fn unlink(&mut self, id: NodeId) -> Option<Node<K, V>> {
        let (hash, next) = {
            let node = self.nodes.get(id)?;
            (node.hash, node.next)
        };
        let b = self.bucket_of(hash);

        if self.buckets[b] == Some(id) {
            self.buckets[b] = next;
        } else {
            let mut cur = self.buckets[b];
            while let Some(c) = cur {
                let node = &mut self.nodes[c];
                if node.next == Some(id) {
                    node.next = next;
                    break;
                }
                cur = node.next;
            }
        }
        self.nodes.remove(id)
    }

    /// Unlink every node of bucket `b` for which `keep` returns false.
    fn sweep_bucket(&mut self, b: usize, keep: &mut impl FnMut(&K, &mut V) -> bool) -> usize {
        let mut removed = 0;
        let mut prev: Option<NodeId> = None;
        let mut cur = self.buckets[b];
        while let Some(id) = cur {
            let (next, kept) = {
                let Node {
                    key, value, next, ..
                } = &mut self.nodes[id];
                (*next, keep(key, value))
            };
            if kept {
                prev = Some(id);
            } else {
                match prev {
                    None => self.buckets[b] = next,
                    Some(p) => self.nodes[p].next = next,
                }
                self.nodes.remove(id);
                removed += 1;
            }
            cur = next;
        }
        removed
    }

    fn grow(&mut self) {
        let old_capacity = self.buckets.len();
        let new_capacity = old_capacity
            .checked_mul(2)
            .expect("bucket capacity overflow");
        let mut buckets: Vec<Option<NodeId>> = vec![None; new_capacity];

        for head in core::mem::take(&mut self.buckets) {
            let mut cur = head;
            while let Some(id) = cur {
                let node = &mut self.nodes[id];
                cur = node.next;
                let b = self.strategy.spread(node.hash, new_capacity);
                node.next = buckets[b];
                buckets[b] = Some(id);
            }
        }

        self.buckets = buckets;
        self.resize_threshold = self.resize_threshold.saturating_mul(2);
        tracing::debug!(
            old_capacity,
            new_capacity,
            resize_threshold = self.resize_threshold,
            len = self.nodes.len(),
            "[engine]: resized bucket array"
        );
    }
}

/// The hash engine shared by every view.
///
/// `Engine` is single-threaded (`!Send`/`!Sync`) and not reentrant: user
/// `Hash`/`Eq` code must not call back into the engine it is stored in.
/// Debug builds panic when that happens.
pub struct Engine<K, V, S = DefaultStrategy> {
    table: Table<K, V, S>,
    section: ExclusiveSection,
}

impl<K, V> Engine<K, V> {
    /// An engine with the default strategy, 16 buckets and a resize threshold of 14.
    pub fn new() -> Self {
        Self::with_strategy(DefaultStrategy::default())
    }
}

impl<K, V> Default for Engine<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S: HashStrategy> Engine<K, V, S> {
    pub fn with_strategy(strategy: S) -> Self {
        Self {
            table: Table::new(strategy, EngineConfig::default()),
            section: ExclusiveSection::new(),
        }
    }

    /// Build an engine from an explicit configuration, rejecting invalid sizes.
    pub fn with_config(strategy: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: Table::new(strategy, config),
            section: ExclusiveSection::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.table.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.nodes.is_empty()
    }

    /// Current number of buckets.
    pub fn capacity(&self) -> usize {
        self.table.buckets.len()
    }

    /// Entry count at which the next resize happens.
    pub fn resize_threshold(&self) -> usize {
        self.table.resize_threshold
    }

    pub fn strategy(&self) -> &S {
        &self.table.strategy
    }

    /// Visit entries bucket by bucket, each chain head to tail.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.table.buckets.iter(),
            nodes: &self.table.nodes,
            cur: None,
            remaining: self.table.nodes.len(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Drop every entry. The bucket array keeps its current size.
    pub fn clear(&mut self) {
        let _g = self.section.enter("clear");
        self.table.buckets.iter_mut().for_each(|b| *b = None);
        self.table.nodes.clear();
    }

    /// Keep only the entries for which `f` returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let _g = self.section.enter("retain");
        for b in 0..self.table.buckets.len() {
            self.table.sweep_bucket(b, &mut f);
        }
    }

    // Hash-level operations. The weak map drives these directly since its
    // stored keys are handles rather than `K`.

    pub(crate) fn hash_of<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        let _g = self.section.enter("hash");
        self.table.strategy.hash(q)
    }

    pub(crate) fn find_raw(&self, hash: u64, eq: impl FnMut(&K) -> bool) -> Option<NodeId> {
        let _g = self.section.enter("find");
        self.table.locate(hash, eq)
    }

    pub(crate) fn entry_at(&self, id: NodeId) -> Option<(&K, &V)> {
        self.table.nodes.get(id).map(|n| (&n.key, &n.value))
    }

    pub(crate) fn entry_at_mut(&mut self, id: NodeId) -> Option<(&mut K, &mut V)> {
        self.table
            .nodes
            .get_mut(id)
            .map(|n| (&mut n.key, &mut n.value))
    }

    /// Link a node whose key the caller has checked is absent.
    pub(crate) fn insert_unique(&mut self, hash: u64, key: K, value: V) -> NodeId {
        let _g = self.section.enter("insert");
        self.table.link_new(hash, key, value)
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<(K, V)> {
        let _g = self.section.enter("remove");
        self.table.unlink(id).map(|n| (n.key, n.value))
    }

    /// Unlink the nodes in `hash`'s bucket that `stale` reports as dead.
    pub(crate) fn purge_bucket(&mut self, hash: u64, mut stale: impl FnMut(&K, &V) -> bool) -> usize {
        let _g = self.section.enter("purge");
        let b = self.table.bucket_of(hash);
        let purged = self
            .table
            .sweep_bucket(b, &mut |k: &K, v: &mut V| !stale(k, v));
        if purged > 0 {
            tracing::trace!(bucket = b, purged, "[engine]: purged stale nodes");
        }
        purged
    }
}

impl<K, V, S> Engine<K, V, S>
where
    K: Eq + Hash,
    S: HashStrategy,
{
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.section.enter("get");
        let hash = self.table.strategy.hash(q);
        let id = self.table.locate(hash, |k| k.borrow() == q)?;
        Some(&self.table.nodes[id].value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.section.enter("get_mut");
        let hash = self.table.strategy.hash(q);
        let id = self.table.locate(hash, |k| k.borrow() == q)?;
        Some(&mut self.table.nodes[id].value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.section.enter("contains_key");
        let hash = self.table.strategy.hash(q);
        self.table.locate(hash, |k| k.borrow() == q).is_some()
    }

    /// Insert or replace. Returns the previous value for an existing key.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.put_entry(key, value).1
    }

    /// Like `put`, but also reports the node now holding `key`.
    pub(crate) fn put_entry(&mut self, key: K, value: V) -> (NodeId, Option<V>) {
        let _g = self.section.enter("put");
        let hash = self.table.strategy.hash(&key);
        if let Some(id) = self.table.locate(hash, |k| *k == key) {
            let old = core::mem::replace(&mut self.table.nodes[id].value, value);
            return (id, Some(old));
        }
        (self.table.link_new(hash, key, value), None)
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.section.enter("remove");
        let hash = self.table.strategy.hash(q);
        let id = self.table.locate(hash, |k| k.borrow() == q)?;
        self.table.unlink(id).map(|n| (n.key, n.value))
    }
}

#[cfg(test)]
impl<K, V, S: HashStrategy> Engine<K, V, S> {
    /// Walk every chain and check placement, uniqueness of nodes, and the count.
    pub(crate) fn check_invariants(&self) {
        let t = &self.table;
        let mut seen = std::collections::HashSet::new();
        for (b, head) in t.buckets.iter().enumerate() {
            let mut cur = *head;
            while let Some(id) = cur {
                assert!(seen.insert(id), "node linked twice");
                let node = &t.nodes[id];
                assert_eq!(t.strategy.spread(node.hash, t.buckets.len()), b);
                cur = node.next;
            }
        }
        assert_eq!(seen.len(), t.nodes.len(), "unreachable nodes in arena");
    }
}

impl<K, V, S> core::fmt::Debug for Engine<K, V, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    S: HashStrategy,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(&K, &V)` in bucket order.
pub struct Iter<'a, K, V> {
    buckets: core::slice::Iter<'a, Option<NodeId>>,
    nodes: &'a SlotMap<NodeId, Node<K, V>>,
    cur: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(id) = self.cur {
                let node = &self.nodes[id];
                self.cur = node.next;
                self.remaining -= 1;
                return Some((&node.key, &node.value));
            }
            self.cur = *self.buckets.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
