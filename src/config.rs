//! Sizing configuration shared by the builder and the engine.

use crate::error::{Error, Result};

/// Bucket count used when nothing else is configured.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Entry count that triggers the first resize by default.
pub const DEFAULT_RESIZE_THRESHOLD: usize = 14;

/// Initial bucket capacity and resize threshold for one engine.
///
/// The threshold is the entry count at which the bucket array doubles. It
/// doubles along with the capacity on every resize.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    pub initial_capacity: usize,
    pub resize_threshold: usize,
}

impl EngineConfig {
    pub const fn new(initial_capacity: usize, resize_threshold: usize) -> Self {
        Self {
            initial_capacity,
            resize_threshold,
        }
    }

    /// Reject sizes that would leave the engine unusable or resizing on the
    /// first insert.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        if self.resize_threshold == 0 {
            return Err(Error::ZeroResizeThreshold);
        }
        if self.resize_threshold >= self.initial_capacity {
            return Err(Error::ResizeThresholdTooLarge {
                threshold: self.resize_threshold,
                capacity: self.initial_capacity,
            });
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INITIAL_CAPACITY, DEFAULT_RESIZE_THRESHOLD)
    }
}
