use super::{EntrySlot, NodeSlot};

/// One usage level of the frequency list. Entries sharing this usage count are
/// kept in a doubly linked list, oldest at `head`.
pub(crate) struct Node<Key, Value> {
    pub(crate) next: Option<NodeSlot<Key, Value>>,
    pub(crate) prev: Option<NodeSlot<Key, Value>>,
    pub(crate) head: Option<EntrySlot<Key, Value>>,
    pub(crate) tail: Option<EntrySlot<Key, Value>>,
    pub(crate) frequency: usize,
}

impl<Key, Value> Node<Key, Value> {
    pub(crate) const fn new(
        frequency: usize,
        prev: Option<NodeSlot<Key, Value>>,
        next: Option<NodeSlot<Key, Value>>,
    ) -> Self {
        Self {
            next,
            prev,
            head: None,
            tail: None,
            frequency,
        }
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

/// A value paired with the frequency it had when it left the list.
#[derive(Default, PartialEq, Eq, Ord, PartialOrd, Debug)]
pub(crate) struct WithFrequency<T>(pub usize, pub T);
