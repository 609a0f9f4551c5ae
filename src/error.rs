use crate::ObserverId;

/// Errors reported to callers. Broken internal invariants are not represented
/// here; they panic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A cache was asked to hold zero items.
    #[error("cache capacity must be greater than zero")]
    ZeroCapacity,
    /// The handle passed to unregister was never issued by this cache, or was
    /// already unregistered.
    #[error("no eviction observer registered as {0}")]
    ObserverNotFound(ObserverId),
}

/// A specialized [`Result`](std::result::Result) for cache operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
