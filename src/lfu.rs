use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crossbeam_channel::Sender;
use tracing::{debug, error, trace};

use crate::evictions::{Evictions, ObserverId, Observers};
use crate::frequency_list::{EntrySlot, Frequencies, FrequencyList, WithFrequency};
use crate::stats::{Counters, Statistics};
use crate::{Config, Error, LfuCacheIter, Result};

/// Why an entry left the cache. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reason {
    Capacity,
    Replaced,
    Resize,
    Predicate,
    Manual,
}

/// A bounded cache that evicts the least frequently used item.
///
/// Inserting, reading and removing a known key are constant time. Among items
/// with the same access count, the one that reached that count first is
/// evicted first.
///
/// Every value the cache evicts, whether to make room, because its key was
/// inserted again, because the cache shrank or because it matched
/// [`Self::evict_if`], is sent to every registered eviction observer. Values
/// taken out with [`Self::remove`] are not.
pub struct LfuCache<Key: Hash + Eq, Value> {
    lookup: HashMap<Arc<Key>, EntrySlot<Key, Value>>,
    freq_list: FrequencyList<Key, Value>,
    capacity: NonZeroUsize,
    counters: Counters,
    observers: Observers<Value>,
}

impl<Key: Hash + Eq, Value> Debug for LfuCache<Key, Value> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("counters", &self.counters)
            .field("observers", &self.observers.len())
            .field("freq_list", &self.freq_list)
            .finish()
    }
}

impl<Key: Hash + Eq, Value> LfuCache<Key, Value> {
    /// Creates a cache holding at most `capacity` items, with unbounded
    /// eviction subscriptions.
    ///
    /// ```
    /// # use lfucache::LfuCache;
    /// let mut cache = LfuCache::new(2).unwrap();
    ///
    /// cache.insert("foo", 3);
    /// cache.insert("bar", 4);
    /// cache.get(&"foo");
    ///
    /// // "bar" has been used the least, so it makes room for "baz".
    /// assert_eq!(cache.insert("baz", 5), Some(4));
    /// assert!(!cache.contains_key(&"bar"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero.
    #[inline]
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_config(Config::new(capacity))
    }

    /// Creates a cache from a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if the configured capacity is zero.
    pub fn with_config(config: Config) -> Result<Self> {
        let capacity = config.validate()?;
        debug!(
            capacity = capacity.get(),
            eviction_buffer = ?config.eviction_buffer,
            "created lfu cache"
        );
        Ok(Self {
            lookup: HashMap::with_capacity(capacity.get()),
            freq_list: FrequencyList::with_capacity(capacity.get()),
            capacity,
            counters: Counters::default(),
            observers: Observers::new(config.eviction_buffer),
        })
    }

    /// Returns the maximum number of items the cache holds.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    /// Returns the current number of items in the cache. This is a constant
    /// time operation.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.freq_list.len()
    }

    /// Returns if the cache contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns if the key is present. This does not count as an access.
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &Key) -> bool {
        self.lookup.contains_key(key)
    }

    /// Gets a value and increments its access count, if it exists. Counts a
    /// hit or a miss.
    pub fn get(&mut self, key: &Key) -> Option<&Value> {
        let slot = self.promote(key)?;
        Some(&self.freq_list.entry(slot).value)
    }

    /// Gets a mutable value and increments its access count, if it exists.
    /// Counts a hit or a miss.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Value> {
        let slot = self.promote(key)?;
        Some(&mut self.freq_list.entry_mut(slot).value)
    }

    fn promote(&mut self, key: &Key) -> Option<EntrySlot<Key, Value>> {
        let Some(&slot) = self.lookup.get(key) else {
            self.counters.misses += 1;
            return None;
        };
        self.counters.hits += 1;
        let frequency = self.freq_list.update(slot);
        trace!(frequency, "promoted entry");
        self.checked();
        Some(slot)
    }

    /// Gets a value without touching its access count or the statistics.
    #[inline]
    #[must_use]
    pub fn peek(&self, key: &Key) -> Option<&Value> {
        let slot = self.lookup.get(key)?;
        Some(&self.freq_list.entry(*slot).value)
    }

    /// Returns how often the key was accessed since it was inserted.
    #[inline]
    #[must_use]
    pub fn frequency(&self, key: &Key) -> Option<usize> {
        let slot = self.lookup.get(key)?;
        Some(self.freq_list.frequency(*slot))
    }

    /// Peeks at the value that would be evicted next, if there is one.
    #[inline]
    #[must_use]
    pub fn peek_lfu(&self) -> Option<&Value> {
        let slot = self.freq_list.lfu()?;
        Some(&self.freq_list.entry(slot).value)
    }

    /// Removes a value from the cache by key, if it exists. This is not an
    /// eviction: observers are not notified.
    pub fn remove(&mut self, key: &Key) -> Option<Value> {
        let slot = self.lookup.remove(key)?;
        let WithFrequency(frequency, entry) = self.freq_list.remove(slot);
        self.counters.deletes += 1;
        trace!(frequency, "removed entry");
        self.checked();
        Some(entry.value)
    }

    /// Returns the frequencies that this cache has, lowest first. The zero
    /// frequency is always present. This is linear in the number of distinct
    /// frequencies.
    #[inline]
    pub fn frequencies(&self) -> Frequencies<'_, Key, Value> {
        self.freq_list.frequencies()
    }

    /// Returns the counters along with a view of the current structure.
    /// Linear in the number of frequencies plus the number of never accessed
    /// items.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        self.counters
            .snapshot(self.freq_list.head_len(), self.freq_list.node_count())
    }

    /// Returns an iterator over the keys of the LFU cache in any order.
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &Key> + FusedIterator + '_ {
        self.lookup.keys().map(|key| &**key)
    }

    /// Returns an iterator over the values of the LFU cache in any order. Note
    /// that this does **not** increment the count for any of the values.
    #[inline]
    pub fn peek_values(&self) -> impl Iterator<Item = &Value> + FusedIterator + '_ {
        self.lookup
            .values()
            .map(move |slot| &self.freq_list.entry(*slot).value)
    }

    /// Returns an iterator over the keys and values of the LFU cache in any
    /// order. Note that this does **not** increment the count for any of the
    /// values.
    #[inline]
    pub fn peek_iter(&self) -> impl Iterator<Item = (&Key, &Value)> + FusedIterator + '_ {
        self.lookup
            .iter()
            .map(move |(key, slot)| (&**key, &self.freq_list.entry(*slot).value))
    }

    /// Subscribes to evicted values, using the channel size from the
    /// [`Config`] the cache was built with.
    ///
    /// ```
    /// # use lfucache::LfuCache;
    /// let mut cache = LfuCache::new(1).unwrap();
    /// let evictions = cache.evictions();
    ///
    /// cache.insert(1, "one");
    /// cache.insert(2, "two");
    /// assert_eq!(evictions.try_recv(), Ok("one"));
    ///
    /// cache.unregister_evictions(evictions.id()).unwrap();
    /// ```
    pub fn evictions(&mut self) -> Evictions<Value> {
        self.observers.subscribe()
    }

    /// Registers a caller-made channel as an eviction observer.
    pub fn register_evictions(&mut self, sender: Sender<Value>) -> ObserverId {
        self.observers.register(sender)
    }

    /// Stops sending evicted values to an observer. Its channel is dropped,
    /// so its receiver disconnects once drained.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObserverNotFound`] if the observer is not registered.
    pub fn unregister_evictions(&mut self, id: ObserverId) -> Result<()> {
        if self.observers.unregister(id) {
            Ok(())
        } else {
            Err(Error::ObserverNotFound(id))
        }
    }

    /// Returns the number of registered eviction observers.
    #[inline]
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Walks the whole cache and panics if its structure is inconsistent.
    /// Linear in the number of items. Runs after every mutating operation when
    /// the `checked` feature is enabled.
    ///
    /// # Panics
    ///
    /// Panics if an invariant is broken, which is always a bug in this crate.
    pub fn check_invariants(&self) {
        if self.lookup.len() != self.freq_list.len() {
            self.bug(&format!(
                "lookup has {} keys but {} items are stored",
                self.lookup.len(),
                self.freq_list.len()
            ));
        }
        if self.len() > self.capacity.get() {
            self.bug("length exceeds capacity");
        }
        if let Err(msg) = self.freq_list.audit() {
            self.bug(&msg);
        }
        for (key, slot) in &self.lookup {
            if !Arc::ptr_eq(key, &self.freq_list.entry(*slot).key) {
                self.bug("lookup points at an entry for another key");
            }
        }
    }

    #[inline]
    #[allow(clippy::unused_self)]
    fn checked(&self) {
        #[cfg(feature = "checked")]
        self.check_invariants();
    }

    #[cold]
    fn bug(&self, msg: &str) -> ! {
        error!(freq_list = ?self.freq_list, "{msg}");
        panic!("bug: {msg}");
    }

    /// Takes the least frequently used item out without counting it as an
    /// eviction.
    pub(crate) fn detach_lfu(&mut self) -> Option<(Key, Value)> {
        let slot = self.freq_list.lfu()?;
        let WithFrequency(_, entry) = self.freq_list.remove(slot);
        self.lookup.remove(&*entry.key);
        let Some(key) = Arc::into_inner(entry.key) else {
            self.bug("key still shared after removal");
        };
        Some((key, entry.value))
    }
}

impl<Key: Hash + Eq, Value: Clone> LfuCache<Key, Value> {
    /// Inserts a value under the provided key, with an access count of zero.
    ///
    /// An existing value under the same key is evicted first rather than
    /// overwritten. Otherwise, if the cache is full, the least frequently used
    /// value is evicted. Either way the evicted value is returned and sent to
    /// every eviction observer.
    pub fn insert(&mut self, key: Key, value: Value) -> Option<Value> {
        let mut evicted = self
            .lookup
            .get(&key)
            .copied()
            .map(|slot| self.evict(slot, Reason::Replaced));

        // Never true if we had to evict an old value.
        if self.len() >= self.capacity.get() {
            evicted = Some(self.evict_lfu(Reason::Capacity));
        }

        let key = Arc::new(key);
        let slot = self.freq_list.insert(Arc::clone(&key), value);
        self.lookup.insert(key, slot);
        self.counters.inserts += 1;
        self.checked();

        evicted
    }

    /// Sets a new capacity. If the cache holds more items than that, the least
    /// frequently used ones are evicted until it fits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ZeroCapacity`] if `capacity` is zero; the cache is left
    /// untouched.
    pub fn resize(&mut self, capacity: usize) -> Result<()> {
        let capacity = NonZeroUsize::new(capacity).ok_or(Error::ZeroCapacity)?;
        self.capacity = capacity;

        let mut evicted = 0_usize;
        while self.len() > capacity.get() {
            self.evict_lfu(Reason::Resize);
            evicted += 1;
        }
        debug!(capacity = capacity.get(), evicted, "resized lfu cache");
        self.checked();

        Ok(())
    }

    /// Evicts every item whose value matches the predicate, returning how many
    /// were evicted. The order the predicate sees values in is unspecified.
    pub fn evict_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&Value) -> bool,
    {
        // Collected up front: evicting rewires the lists we'd be walking.
        let matches: Vec<_> = self
            .freq_list
            .entries()
            .filter(|(_, entry)| predicate(&entry.value))
            .map(|(slot, _)| slot)
            .collect();

        for &slot in &matches {
            self.evict(slot, Reason::Predicate);
        }
        debug!(evicted = matches.len(), "evicted matching entries");
        self.checked();

        matches.len()
    }

    /// Evicts the least frequently used value and returns it. If the cache is
    /// empty, then this returns None. Ties go to the value that reached its
    /// access count first.
    pub fn pop_lfu(&mut self) -> Option<Value> {
        if self.is_empty() {
            return None;
        }
        let value = self.evict_lfu(Reason::Manual);
        self.checked();
        Some(value)
    }

    fn evict_lfu(&mut self, reason: Reason) -> Value {
        let Some(slot) = self.freq_list.lfu() else {
            self.bug("no evictable entry in a non-empty cache");
        };
        self.evict(slot, reason)
    }

    fn evict(&mut self, slot: EntrySlot<Key, Value>, reason: Reason) -> Value {
        let WithFrequency(frequency, entry) = self.freq_list.remove(slot);
        self.lookup.remove(&*entry.key);
        self.counters.evictions += 1;
        trace!(?reason, frequency, "evicting entry");
        self.observers.notify(&entry.value);
        entry.value
    }
}

impl<Key: Hash + Eq, Value: Clone> Extend<(Key, Value)> for LfuCache<Key, Value> {
    /// Inserts the items from the iterator into the cache. Note that this may
    /// evict items if the number of elements in the iterator plus the number of
    /// current items in the cache exceeds the capacity of the cache.
    fn extend<T: IntoIterator<Item = (Key, Value)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<Key: Hash + Eq, Value> IntoIterator for LfuCache<Key, Value> {
    type Item = (Key, Value);

    type IntoIter = LfuCacheIter<Key, Value>;

    /// Consumes the cache, yielding items in the order they would have been
    /// evicted. Observers are not notified.
    fn into_iter(self) -> Self::IntoIter {
        LfuCacheIter(self)
    }
}



#[cfg(test)]
mod pop {
    use super::LfuCache;

    #[test]
    fn pop() {
        let mut cache = LfuCache::new(100).unwrap();
        for i in 0..100 {
            cache.insert(i, i + 100);
        }

        for i in 0..100 {
            assert_eq!(cache.lookup.len(), 100 - i);
            assert_eq!(cache.pop_lfu(), Some(i + 100));
        }
        assert_eq!(cache.statistics().evictions, 100);
    }

    #[test]
    fn pop_empty() {
        let mut cache = LfuCache::<i32, i32>::new(1).unwrap();
        assert_eq!(None, cache.pop_lfu());
        assert_eq!(None, cache.peek_lfu());
    }
}

#[cfg(test)]
mod remove {
    use super::LfuCache;

    #[test]
    fn remove_to_empty() {
        let mut cache = LfuCache::new(10).unwrap();
        cache.insert(1, 2);
        assert_eq!(cache.remove(&1), Some(2));
        assert!(cache.is_empty());
        assert_eq!(cache.freq_list.node_count(), 1);
    }

    #[test]
    fn remove_empty() {
        let mut cache = LfuCache::<usize, usize>::new(10).unwrap();
        assert!(cache.remove(&1).is_none());
        assert_eq!(cache.statistics().deletes, 0);
    }

    #[test]
    fn remove_to_nonempty() {
        let mut cache = LfuCache::new(10).unwrap();
        cache.insert(1, 2);
        cache.insert(3, 4);

        assert_eq!(cache.remove(&1), Some(2));
        assert!(!cache.is_empty());
        assert_eq!(cache.remove(&3), Some(4));

        assert!(cache.is_empty());
        assert_eq!(cache.freq_list.node_count(), 1);
        assert_eq!(cache.statistics().deletes, 2);
    }

    #[test]
    fn remove_keeps_others() {
        let mut cache = LfuCache::new(3).unwrap();
        cache.insert("test1", 42);
        cache.get(&"test1");
        cache.get(&"test1");
        cache.insert("test2", 43);
        cache.insert("test3", 44);
        cache.get(&"test3");

        cache.remove(&"test1");

        assert!(cache.get(&"test1").is_none());
        assert_eq!(cache.get(&"test2"), Some(&43));
        assert_eq!(cache.get(&"test3"), Some(&44));
    }

    #[test]
    fn remove_does_not_notify() {
        let mut cache = LfuCache::new(3).unwrap();
        let evictions = cache.evictions();
        cache.insert(1, 1);
        cache.remove(&1);
        assert!(evictions.try_recv().is_err());
        assert_eq!(cache.statistics().evictions, 0);
    }
}

#[cfg(test)]
mod resize {
    use super::LfuCache;
    use crate::Error;

    #[test]
    fn shrink_evicts_least_used() {
        let mut cache = LfuCache::new(10).unwrap();
        let evictions = cache.evictions();

        cache.insert("test1", 42);
        cache.get(&"test1");
        cache.get(&"test1");
        cache.insert("test2", 43);
        cache.insert("test3", 44);
        cache.get(&"test3");
        cache.insert("test4", 45);

        assert_eq!(cache.capacity().get(), 10);
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.statistics().evictions, 0);

        cache.resize(2).unwrap();

        assert_eq!(cache.capacity().get(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.statistics().evictions, 2);
        assert_eq!(evictions.try_iter().collect::<Vec<_>>(), vec![43, 45]);

        assert!(cache.get(&"test2").is_none());
        assert!(cache.get(&"test4").is_none());
        assert_eq!(cache.get(&"test1"), Some(&42));
        assert_eq!(cache.get(&"test3"), Some(&44));
    }

    #[test]
    fn grow_is_a_noop() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.resize(5).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.statistics().evictions, 0);
        cache.insert(3, 3);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn zero_is_rejected() {
        let mut cache = LfuCache::new(2).unwrap();
        cache.insert(1, 1);
        assert_eq!(cache.resize(0), Err(Error::ZeroCapacity));
        assert_eq!(cache.capacity().get(), 2);
        assert_eq!(cache.len(), 1);
    }
}


#[cfg(test)]
mod evictions {
    use std::thread;

    use super::LfuCache;
    use crate::{Config, Error};

    #[test]
    fn observer_sees_capacity_eviction() {
        let mut cache = LfuCache::new(3).unwrap();
        let evictions = cache.evictions();

        cache.insert("test1", 42);
        cache.get(&"test1");
        cache.get(&"test1");
        cache.insert("test2", 43);
        cache.insert("test3", 44);
        cache.get(&"test3");

        cache.get(&"test1");
        cache.get(&"test2");
        cache.get(&"test3");
        assert!(evictions.try_recv().is_err());

        cache.insert("test4", 45);
        assert_eq!(evictions.try_recv(), Ok(43));

        cache.unregister_evictions(evictions.id()).unwrap();
        cache.insert("test5", 45);
        assert!(evictions.recv().is_err());
        assert_eq!(cache.statistics().evictions, 2);
    }

    #[test]
    fn every_observer_gets_every_value() {
        let mut cache = LfuCache::new(1).unwrap();
        let a = cache.evictions();
        let b = cache.evictions();
        let (tx, rx) = crossbeam_channel::unbounded();
        cache.register_evictions(tx);
        assert_eq!(cache.observer_count(), 3);

        for i in 0..5 {
            cache.insert(i, i);
        }

        let expected = vec![0, 1, 2, 3];
        assert_eq!(a.try_iter().collect::<Vec<_>>(), expected);
        assert_eq!(b.try_iter().collect::<Vec<_>>(), expected);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn unregister_unknown() {
        let mut cache = LfuCache::<i32, i32>::new(1).unwrap();
        let evictions = cache.evictions();
        let id = evictions.id();
        cache.unregister_evictions(id).unwrap();
        assert_eq!(
            cache.unregister_evictions(id),
            Err(Error::ObserverNotFound(id))
        );
    }

    #[test]
    fn dropped_observer_is_pruned() {
        let mut cache = LfuCache::new(1).unwrap();
        drop(cache.evictions());
        cache.insert(1, 1);
        cache.insert(2, 2);
        assert_eq!(cache.observer_count(), 0);
    }

    #[test]
    fn rendezvous_delivery() {
        let config = Config::new(1).with_eviction_buffer(Some(0));
        let mut cache = LfuCache::with_config(config).unwrap();
        let evictions = cache.evictions();

        thread::scope(|s| {
            let receiver = s.spawn(|| evictions.iter().take(3).collect::<Vec<_>>());
            for i in 0..4 {
                cache.insert(i, i);
            }
            assert_eq!(receiver.join().unwrap(), vec![0, 1, 2]);
        });
    }
}
