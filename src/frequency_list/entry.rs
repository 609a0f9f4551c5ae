use std::sync::Arc;

use super::{EntrySlot, NodeSlot};

pub(crate) struct Entry<Key, Value> {
    /// We still need to keep a linked list implementation for O(1)
    /// in-the-middle removal.
    pub(crate) next: Option<EntrySlot<Key, Value>>,
    pub(crate) prev: Option<EntrySlot<Key, Value>>,
    /// Instead of searching for the frequency node, we keep the slot of the
    /// owning node. This is what makes promotion an O(1) operation.
    pub(crate) owner: NodeSlot<Key, Value>,
    /// Shared with the lookup table so that evicting from the frequency list
    /// can also clear the lookup entry.
    pub(crate) key: Arc<Key>,
    pub(crate) value: Value,
}

impl<Key, Value> Entry<Key, Value> {
    #[must_use]
    pub(crate) fn new(owner: NodeSlot<Key, Value>, key: Arc<Key>, value: Value) -> Self {
        Self {
            next: None,
            prev: None,
            owner,
            key,
            value,
        }
    }
}
