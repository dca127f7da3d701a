//! Fluent configuration for maps and sets.

use crate::config::{EngineConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_RESIZE_THRESHOLD};
use crate::error::Result;
use crate::map::MapView;
use crate::set::SetView;
use crate::strategy::{DefaultStrategy, HashStrategy};
use crate::weak_map::{WeakMapView, WeakMode};

/// Collects a hash strategy, sizing, and reference-strength flags, then builds
/// views from that snapshot.
///
/// ```
/// use hashstruct::Builder;
///
/// let mut map = Builder::new()
///     .initial_capacity(4)
///     .resize_threshold(2)
///     .build_map::<&str, i32>()
///     .unwrap()
///     .into_strong()
///     .unwrap();
/// map.put("a", 1);
/// assert_eq!(map.get("a"), Some(&1));
/// ```
#[derive(Clone, Debug)]
pub struct Builder<S = DefaultStrategy> {
    strategy: S,
    initial_capacity: usize,
    resize_threshold: usize,
    weak_keys: bool,
    weak_values: bool,
    concurrent: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            strategy: DefaultStrategy::default(),
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            resize_threshold: DEFAULT_RESIZE_THRESHOLD,
            weak_keys: false,
            weak_values: false,
            concurrent: false,
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Builder<S> {
    /// Swap in a different hash strategy.
    pub fn hash<T: HashStrategy>(self, strategy: T) -> Builder<T> {
        Builder {
            strategy,
            initial_capacity: self.initial_capacity,
            resize_threshold: self.resize_threshold,
            weak_keys: self.weak_keys,
            weak_values: self.weak_values,
            concurrent: self.concurrent,
        }
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Entry count at which the bucket array first doubles. The threshold
    /// doubles on each resize.
    pub fn resize_threshold(mut self, threshold: usize) -> Self {
        self.resize_threshold = threshold;
        self
    }

    pub fn weak_keys(mut self) -> Self {
        self.weak_keys = true;
        self
    }

    pub fn weak_values(mut self) -> Self {
        self.weak_values = true;
        self
    }

    /// Reserved. The flag is recorded but no synchronized variant exists:
    /// every built view is single-threaded regardless of this setting.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        if concurrent {
            tracing::debug!("[builder]: concurrency flag is reserved and has no effect");
        }
        self.concurrent = concurrent;
        self
    }

    pub fn is_concurrent(&self) -> bool {
        self.concurrent
    }

    pub fn config(&self) -> EngineConfig {
        EngineConfig::new(self.initial_capacity, self.resize_threshold)
    }

    pub fn weak_mode(&self) -> Option<WeakMode> {
        WeakMode::from_flags(self.weak_keys, self.weak_values)
    }
}

impl<S: HashStrategy + Clone> Builder<S> {
    /// Build a map. Weak flags select a [`WeakMapView`]: both flags give
    /// `Both`, otherwise whichever one is set. With neither flag a strong
    /// [`MapView`] is built. Strategy and sizing apply in every case.
    pub fn build_map<K, V>(&self) -> Result<BuiltMap<K, V, S>> {
        let config = self.config();
        let built = match self.weak_mode() {
            Some(mode) => {
                WeakMapView::with_config(mode, self.strategy.clone(), config).map(BuiltMap::Weak)
            }
            None => MapView::with_config(self.strategy.clone(), config).map(BuiltMap::Strong),
        };
        if let Err(e) = &built {
            tracing::debug!(error = %e, "[builder]: rejected map configuration");
        }
        built
    }

    /// Build a set. Sets are always strong; weak flags are ignored.
    pub fn build_set<E>(&self) -> Result<SetView<E, S>> {
        if self.weak_keys || self.weak_values {
            tracing::debug!("[builder]: weak flags ignored for sets");
        }
        SetView::with_config(self.strategy.clone(), self.config())
    }
}

/// The view produced by [`Builder::build_map`].
pub enum BuiltMap<K, V, S = DefaultStrategy> {
    Strong(MapView<K, V, S>),
    Weak(WeakMapView<K, V, S>),
}

impl<K, V, S> BuiltMap<K, V, S> {
    pub fn is_weak(&self) -> bool {
        matches!(self, BuiltMap::Weak(_))
    }

    pub fn into_strong(self) -> Option<MapView<K, V, S>> {
        match self {
            BuiltMap::Strong(m) => Some(m),
            BuiltMap::Weak(_) => None,
        }
    }

    pub fn into_weak(self) -> Option<WeakMapView<K, V, S>> {
        match self {
            BuiltMap::Weak(m) => Some(m),
            BuiltMap::Strong(_) => None,
        }
    }
}
