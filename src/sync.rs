use std::hash::Hash;
use std::num::NonZeroUsize;

use crossbeam_channel::Sender;
use parking_lot::Mutex;

use crate::{Config, Evictions, LfuCache, ObserverId, Result, Statistics};

/// An [`LfuCache`] that can be shared between threads.
///
/// Every method takes one lock for its whole duration, so operations apply in
/// a single total order. Eviction observers are fed while that lock is held:
/// an observer with a full bounded buffer blocks every caller until it
/// receives.
///
/// ```
/// # use lfucache::SyncLfuCache;
/// # use std::thread;
/// let cache = SyncLfuCache::new(64).unwrap();
///
/// thread::scope(|s| {
///     for t in 0..4 {
///         let cache = &cache;
///         s.spawn(move || {
///             for i in 0..16 {
///                 cache.insert(t * 16 + i, i);
///             }
///         });
///     }
/// });
///
/// assert_eq!(cache.len(), 64);
/// ```
pub struct SyncLfuCache<Key: Hash + Eq, Value> {
    inner: Mutex<LfuCache<Key, Value>>,
}

impl<Key: Hash + Eq, Value> std::fmt::Debug for SyncLfuCache<Key, Value> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncLfuCache")
            .field("inner", &*self.inner.lock())
            .finish()
    }
}

impl<Key: Hash + Eq, Value> From<LfuCache<Key, Value>> for SyncLfuCache<Key, Value> {
    fn from(cache: LfuCache<Key, Value>) -> Self {
        Self {
            inner: Mutex::new(cache),
        }
    }
}

impl<Key: Hash + Eq, Value> SyncLfuCache<Key, Value> {
    /// See [`LfuCache::new`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        LfuCache::new(capacity).map(Self::from)
    }

    /// See [`LfuCache::with_config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if the
    /// configured capacity is zero.
    pub fn with_config(config: Config) -> Result<Self> {
        LfuCache::with_config(config).map(Self::from)
    }

    /// Unwraps the single-threaded cache.
    pub fn into_inner(self) -> LfuCache<Key, Value> {
        self.inner.into_inner()
    }

    /// Returns the maximum number of items the cache holds.
    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.lock().capacity()
    }

    /// Returns the current number of items in the cache.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Returns if the cache contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns if the key is present. This does not count as an access.
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// See [`LfuCache::remove`].
    pub fn remove(&self, key: &Key) -> Option<Value> {
        self.inner.lock().remove(key)
    }

    /// Returns how often the key was accessed since it was inserted.
    #[must_use]
    pub fn frequency(&self, key: &Key) -> Option<usize> {
        self.inner.lock().frequency(key)
    }

    /// See [`LfuCache::statistics`].
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.inner.lock().statistics()
    }

    /// See [`LfuCache::evictions`].
    pub fn evictions(&self) -> Evictions<Value> {
        self.inner.lock().evictions()
    }

    /// See [`LfuCache::register_evictions`].
    pub fn register_evictions(&self, sender: Sender<Value>) -> ObserverId {
        self.inner.lock().register_evictions(sender)
    }

    /// See [`LfuCache::unregister_evictions`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverNotFound`](crate::Error::ObserverNotFound) if
    /// the observer is not registered.
    pub fn unregister_evictions(&self, id: ObserverId) -> Result<()> {
        self.inner.lock().unregister_evictions(id)
    }

    /// See [`LfuCache::check_invariants`].
    pub fn check_invariants(&self) {
        self.inner.lock().check_invariants();
    }

    /// Runs `f` with the cache locked, for sequences of operations that must
    /// not interleave with other callers.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LfuCache<Key, Value>) -> R) -> R {
        f(&mut *self.inner.lock())
    }
}

impl<Key: Hash + Eq, Value: Clone> SyncLfuCache<Key, Value> {
    /// See [`LfuCache::insert`].
    pub fn insert(&self, key: Key, value: Value) -> Option<Value> {
        self.inner.lock().insert(key, value)
    }

    /// Returns a copy of the value and increments its access count.
    pub fn get(&self, key: &Key) -> Option<Value> {
        self.inner.lock().get(key).cloned()
    }

    /// Returns a copy of the value without touching its access count.
    #[must_use]
    pub fn peek(&self, key: &Key) -> Option<Value> {
        self.inner.lock().peek(key).cloned()
    }

    /// See [`LfuCache::resize`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`](crate::Error::ZeroCapacity) if
    /// `capacity` is zero.
    pub fn resize(&self, capacity: usize) -> Result<()> {
        self.inner.lock().resize(capacity)
    }

    /// See [`LfuCache::evict_if`].
    pub fn evict_if<F>(&self, predicate: F) -> usize
    where
        F: FnMut(&Value) -> bool,
    {
        self.inner.lock().evict_if(predicate)
    }

    /// See [`LfuCache::pop_lfu`].
    pub fn pop_lfu(&self) -> Option<Value> {
        self.inner.lock().pop_lfu()
    }
}

#[cfg(test)]
mod sync {
    use std::thread;

    use super::SyncLfuCache;

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncLfuCache<String, Vec<u8>>>();
    }

    #[test]
    fn concurrent_get_or_insert() {
        const KEYS: u32 = 200;
        let cache = SyncLfuCache::new(50).unwrap();

        thread::scope(|s| {
            for t in 0..4_u32 {
                let cache = &cache;
                s.spawn(move || {
                    for j in 0..2_000_u32 {
                        let key = (j * 7 + t * 13) % KEYS;
                        match cache.get(&key) {
                            Some(value) => assert_eq!(value, key),
                            None => {
                                cache.insert(key, key);
                            }
                        }
                    }
                });
            }
        });

        assert!(cache.len() <= 50);
        cache.check_invariants();
        let stats = cache.statistics();
        assert_eq!(stats.hits + stats.misses, 8_000);
    }

    #[test]
    fn evictions_are_delivered_across_threads() {
        let cache = SyncLfuCache::new(2).unwrap();
        let evictions = cache.evictions();

        thread::scope(|s| {
            let receiver = s.spawn(|| evictions.iter().take(8).count());
            for i in 0..10 {
                cache.insert(i, i);
            }
            assert_eq!(receiver.join().unwrap(), 8);
        });
        assert_eq!(cache.statistics().evictions, 8);
    }

    #[test]
    fn with_lock_batches() {
        let cache = SyncLfuCache::new(4).unwrap();
        cache.insert("a", 1);
        let hits = cache.with_lock(|inner| {
            inner.get(&"a");
            inner.get(&"a");
            inner.frequency(&"a")
        });
        assert_eq!(hits, Some(2));
        assert_eq!(cache.peek(&"a"), Some(1));
        assert_eq!(cache.into_inner().len(), 1);
    }
}
