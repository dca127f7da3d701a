//! Error type for rejected configurations.

/// Configuration error raised eagerly when a view is built.
///
/// Lookups never fail: a missing key is `None`, not an error.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The initial bucket capacity was zero.
    #[error("config error: initial capacity must be positive")]
    ZeroCapacity,
    /// The resize threshold was zero.
    #[error("config error: resize threshold must be positive")]
    ZeroResizeThreshold,
    /// The resize threshold would trigger growth before the table is full.
    #[error("config error: resize threshold ({threshold}) must be below initial capacity ({capacity})")]
    ResizeThresholdTooLarge {
        /// Configured threshold.
        threshold: usize,
        /// Configured initial capacity.
        capacity: usize,
    },
}

/// Result alias for builder and constructor operations.
pub type Result<T> = std::result::Result<T, Error>;
