use std::num::NonZeroUsize;

use crate::{Error, Result};

/// Construction parameters for [`LfuCache`](crate::LfuCache) and
/// [`SyncLfuCache`](crate::SyncLfuCache).
///
/// ```
/// # use lfucache::{Config, LfuCache};
/// let config = Config::new(128).with_eviction_buffer(Some(16));
/// let cache = LfuCache::<u32, String>::with_config(config).unwrap();
/// assert_eq!(cache.capacity().get(), 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    /// Maximum number of items held. Must be non-zero.
    pub capacity: usize,
    /// Channel size for subscriptions made with
    /// [`evictions`](crate::LfuCache::evictions). `None` is unbounded and never
    /// blocks. `Some(0)` hands each value over only once the observer receives
    /// it. Any other size blocks once that many values are waiting.
    pub eviction_buffer: Option<usize>,
}

impl Config {
    /// A config with the given capacity and unbounded eviction channels.
    #[inline]
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            eviction_buffer: None,
        }
    }

    /// Sets the channel size used for new eviction subscriptions.
    #[inline]
    #[must_use]
    pub const fn with_eviction_buffer(mut self, eviction_buffer: Option<usize>) -> Self {
        self.eviction_buffer = eviction_buffer;
        self
    }

    /// Checks the config, returning the capacity if it is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if the capacity is zero.
    pub fn validate(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(Error::ZeroCapacity)
    }
}

#[cfg(test)]
mod config {
    use super::Config;
    use crate::Error;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(Config::new(0).validate(), Err(Error::ZeroCapacity));
    }

    #[test]
    fn builder_sets_buffer() {
        let config = Config::new(3).with_eviction_buffer(Some(0));
        assert_eq!(config.eviction_buffer, Some(0));
        assert_eq!(config.validate().map(|c| c.get()), Ok(3));
    }
}
