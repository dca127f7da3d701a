//! SetView: elements stored as engine keys paired with a presence sentinel.

use crate::config::EngineConfig;
use crate::engine::{Engine, Keys};
use crate::error::Result;
use crate::strategy::{DefaultStrategy, HashStrategy};
use core::borrow::Borrow;
use core::hash::Hash;

/// Value stored next to every set element.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Present;

pub struct SetView<E, S = DefaultStrategy> {
    engine: Engine<E, Present, S>,
}

impl<E> SetView<E> {
    pub fn new() -> Self {
        Self {
            engine: Engine::new(),
        }
    }
}

impl<E> Default for SetView<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, S: HashStrategy> SetView<E, S> {
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

    /// Elements in bucket order.
    pub fn iter(&self) -> Keys<'_, E, Present> {
        self.engine.keys()
    }

    pub fn clear(&mut self) {
        self.engine.clear()
    }

    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&E) -> bool,
    {
        self.engine.retain(|e, _| f(e))
    }
}

impl<E, S> SetView<E, S>
where
    E: Eq + Hash,
    S: HashStrategy,
{
    /// Add `element`. Returns false, leaving the size unchanged, when it was
    /// already present.
    pub fn add(&mut self, element: E) -> bool {
        self.engine.put(element, Present).is_none()
    }

    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.get(element).is_some()
    }

    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        E: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.engine.remove(element).is_some()
    }
}

impl<E, S> Extend<E> for SetView<E, S>
where
    E: Eq + Hash,
    S: HashStrategy,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for e in iter {
            self.add(e);
        }
    }
}

impl<E, S> FromIterator<E> for SetView<E, S>
where
    E: Eq + Hash,
    S: HashStrategy + Default,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::with_strategy(S::default());
        set.extend(iter);
        set
    }
}

impl<'a, E, S: HashStrategy> IntoIterator for &'a SetView<E, S> {
    type Item = &'a E;
    type IntoIter = Keys<'a, E, Present>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: core::fmt::Debug, S: HashStrategy> core::fmt::Debug for SetView<E, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
