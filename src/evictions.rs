use std::fmt::{Display, Formatter};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvError, RecvTimeoutError, Sender, TryRecvError};
use tracing::{debug, warn};

/// Handle for an eviction observer, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

impl Display for ObserverId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "observer #{}", self.0)
    }
}

/// A subscription to evicted values, created by
/// [`LfuCache::evictions`](crate::LfuCache::evictions).
///
/// Every value the cache evicts is sent here until the subscription is
/// unregistered or dropped. Values removed with `remove` are never sent.
///
/// Sends happen inside the evicting call. With a bounded buffer, a full
/// subscription stalls that call (and, for
/// [`SyncLfuCache`](crate::SyncLfuCache), every other caller) until it is
/// drained, so keep receiving or unregister first.
#[derive(Debug)]
pub struct Evictions<Value> {
    id: ObserverId,
    receiver: Receiver<Value>,
}

impl<Value> Evictions<Value> {
    pub(crate) const fn new(id: ObserverId, receiver: Receiver<Value>) -> Self {
        Self { id, receiver }
    }

    /// The handle to pass to `unregister_evictions`.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> ObserverId {
        self.id
    }

    /// Blocks until an evicted value arrives.
    ///
    /// # Errors
    ///
    /// Fails once the cache has unregistered this observer (or was dropped)
    /// and every pending value has been received.
    #[inline]
    pub fn recv(&self) -> Result<Value, RecvError> {
        self.receiver.recv()
    }

    /// Returns a pending evicted value without blocking.
    ///
    /// # Errors
    ///
    /// Fails if nothing is pending or the observer is disconnected.
    #[inline]
    pub fn try_recv(&self) -> Result<Value, TryRecvError> {
        self.receiver.try_recv()
    }

    /// Waits up to `timeout` for an evicted value.
    ///
    /// # Errors
    ///
    /// Fails on timeout or once the observer is disconnected.
    #[inline]
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Value, RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// A blocking iterator that ends when the observer is disconnected.
    #[inline]
    pub fn iter(&self) -> crossbeam_channel::Iter<'_, Value> {
        self.receiver.iter()
    }

    /// An iterator over the values pending right now.
    #[inline]
    pub fn try_iter(&self) -> crossbeam_channel::TryIter<'_, Value> {
        self.receiver.try_iter()
    }

    /// The underlying receiver, for use with `crossbeam_channel::select!`.
    #[inline]
    #[must_use]
    pub const fn receiver(&self) -> &Receiver<Value> {
        &self.receiver
    }
}

/// The set of observers a cache delivers evicted values to.
#[derive(Debug)]
pub(crate) struct Observers<Value> {
    next_id: u64,
    buffer: Option<usize>,
    senders: Vec<(ObserverId, Sender<Value>)>,
}

impl<Value> Observers<Value> {
    pub(crate) const fn new(buffer: Option<usize>) -> Self {
        Self {
            next_id: 0,
            buffer,
            senders: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    pub(crate) fn register(&mut self, sender: Sender<Value>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.senders.push((id, sender));
        debug!(%id, observers = self.senders.len(), "registered eviction observer");
        id
    }

    pub(crate) fn subscribe(&mut self) -> Evictions<Value> {
        let (sender, receiver) = match self.buffer {
            Some(size) => crossbeam_channel::bounded(size),
            None => crossbeam_channel::unbounded(),
        };
        Evictions::new(self.register(sender), receiver)
    }

    pub(crate) fn unregister(&mut self, id: ObserverId) -> bool {
        let Some(position) = self.senders.iter().position(|(cur, _)| *cur == id) else {
            return false;
        };
        self.senders.remove(position);
        debug!(%id, observers = self.senders.len(), "unregistered eviction observer");
        true
    }

    /// Sends a copy of the value to every observer, in registration order.
    /// Observers whose receiver is gone are dropped.
    pub(crate) fn notify(&mut self, value: &Value)
    where
        Value: Clone,
    {
        self.senders.retain(|(id, sender)| {
            if sender.send(value.clone()).is_ok() {
                return true;
            }
            warn!(%id, "eviction observer disconnected, unregistering");
            false
        });
    }
}
