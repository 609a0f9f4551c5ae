use std::iter::FusedIterator;

use super::{FrequencyList, NodeSlot};

/// An iterator over the frequencies present in the cache, lowest first. The
/// zero frequency node is always yielded.
#[derive(Debug)]
pub struct Frequencies<'a, Key, Value> {
    list: &'a FrequencyList<Key, Value>,
    cursor: Option<NodeSlot<Key, Value>>,
    remaining: usize,
}

impl<'a, Key, Value> Frequencies<'a, Key, Value> {
    pub(super) const fn new(
        list: &'a FrequencyList<Key, Value>,
        cursor: Option<NodeSlot<Key, Value>>,
        remaining: usize,
    ) -> Self {
        Self {
            list,
            cursor,
            remaining,
        }
    }
}

impl<Key, Value> Iterator for Frequencies<'_, Key, Value> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.cursor?);
        self.cursor = node.next;
        self.remaining -= 1;
        Some(node.frequency)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<Key, Value> FusedIterator for Frequencies<'_, Key, Value> {}

impl<Key, Value> ExactSizeIterator for Frequencies<'_, Key, Value> {}
