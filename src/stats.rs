/// A snapshot of cache activity. The counters only ever grow; `len_freq0` and
/// `freq_list_len` describe the structure at the time of the snapshot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Statistics {
    /// Successful inserts, including ones that replaced an existing key.
    pub inserts: u64,
    /// Lookups that found their key.
    pub hits: u64,
    /// Lookups that did not find their key.
    pub misses: u64,
    /// Items removed by the cache rather than by an explicit remove.
    pub evictions: u64,
    /// Items removed by an explicit remove.
    pub deletes: u64,
    /// Items that have not been accessed since they were inserted.
    pub len_freq0: usize,
    /// Frequency nodes currently allocated, including the zero node.
    pub freq_list_len: usize,
}

impl Statistics {
    /// The share of lookups that were hits, or `None` before any lookup.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_ratio(&self) -> Option<f64> {
        let lookups = self.hits + self.misses;
        (lookups > 0).then(|| self.hits as f64 / lookups as f64)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Counters {
    pub(crate) inserts: u64,
    pub(crate) hits: u64,
    pub(crate) misses: u64,
    pub(crate) evictions: u64,
    pub(crate) deletes: u64,
}

impl Counters {
    pub(crate) const fn snapshot(&self, len_freq0: usize, freq_list_len: usize) -> Statistics {
        Statistics {
            inserts: self.inserts,
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            deletes: self.deletes,
            len_freq0,
            freq_list_len,
        }
    }
}
