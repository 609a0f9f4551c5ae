use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use super::{Arena, Entry, EntrySlot, Frequencies, Node, NodeSlot, WithFrequency};

/// The two level list: a chain of frequency nodes ordered by strictly
/// increasing usage, each holding the entries at that usage in the order they
/// arrived there.
///
/// The head node has frequency zero and is never removed. Every other node is
/// removed as soon as its last entry leaves it.
pub(crate) struct FrequencyList<Key, Value> {
    nodes: Arena<Node<Key, Value>>,
    entries: Arena<Entry<Key, Value>>,
    head: NodeSlot<Key, Value>,
}

impl<Key, Value> Debug for FrequencyList<Key, Value> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("FrequencyList");
        dbg.field("len", &self.entries.len());

        let mut node = Some(self.head);
        while let Some(cur) = node {
            let cur_node = &self.nodes[cur];
            dbg.field(
                &format!("node freq {} num elements", cur_node.frequency),
                &self.node_len(cur),
            );
            node = cur_node.next;
        }

        dbg.finish()
    }
}

impl<Key, Value> FrequencyList<Key, Value> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Arena::new();
        let head = nodes.insert(Node::new(0, None, None));
        Self {
            nodes,
            entries: Arena::with_capacity(capacity),
            head,
        }
    }

    /// Number of entries across every node.
    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of nodes in the chain, including the head node.
    #[inline]
    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of entries that have never been promoted. Linear in that count.
    pub(crate) fn head_len(&self) -> usize {
        self.node_len(self.head)
    }

    fn node_len(&self, node: NodeSlot<Key, Value>) -> usize {
        let mut count = 0;
        let mut cur = self.nodes[node].head;
        while let Some(entry) = cur {
            count += 1;
            cur = self.entries[entry].next;
        }
        count
    }

    #[inline]
    pub(crate) fn entry(&self, slot: EntrySlot<Key, Value>) -> &Entry<Key, Value> {
        &self.entries[slot]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, slot: EntrySlot<Key, Value>) -> &mut Entry<Key, Value> {
        &mut self.entries[slot]
    }

    /// The usage count of the entry, read from its owning node.
    #[inline]
    pub(crate) fn frequency(&self, slot: EntrySlot<Key, Value>) -> usize {
        self.nodes[self.entries[slot].owner].frequency
    }

    pub(crate) fn frequencies(&self) -> Frequencies<'_, Key, Value> {
        Frequencies::new(self, Some(self.head), self.nodes.len())
    }

    pub(crate) fn node(&self, slot: NodeSlot<Key, Value>) -> &Node<Key, Value> {
        &self.nodes[slot]
    }

    /// Every live entry, in no particular order.
    pub(crate) fn entries(
        &self,
    ) -> impl Iterator<Item = (EntrySlot<Key, Value>, &Entry<Key, Value>)> + '_ {
        self.entries.iter()
    }

    /// Adds a new entry with frequency zero behind every other entry of the
    /// head node.
    pub(crate) fn insert(&mut self, key: Arc<Key>, value: Value) -> EntrySlot<Key, Value> {
        let slot = self.entries.insert(Entry::new(self.head, key, value));
        self.push_back(self.head, slot);
        slot
    }

    /// Moves the entry to the node one frequency higher, creating that node if
    /// it doesn't exist yet. Returns the new frequency.
    pub(crate) fn update(&mut self, slot: EntrySlot<Key, Value>) -> usize {
        let owner = self.entries[slot].owner;
        let next_frequency = self.nodes[owner].frequency + 1;

        // The target has to exist before the owner can be released, otherwise
        // we'd lose our place in the chain.
        let target = match self.nodes[owner].next {
            Some(next) if self.nodes[next].frequency == next_frequency => next,
            _ => self.create_increment(owner),
        };

        self.unlink(slot);
        self.release_if_empty(owner);
        self.push_back(target, slot);

        next_frequency
    }

    /// Removes the entry, returning it along with the frequency it had.
    pub(crate) fn remove(&mut self, slot: EntrySlot<Key, Value>) -> WithFrequency<Entry<Key, Value>> {
        let owner = self.entries[slot].owner;
        let frequency = self.nodes[owner].frequency;

        self.unlink(slot);
        self.release_if_empty(owner);

        match self.entries.remove(slot) {
            Some(entry) => WithFrequency(frequency, entry),
            None => panic!("bug: removed entry {slot:?} twice"),
        }
    }

    /// The oldest entry of the lowest non-empty node. Linear in the number of
    /// distinct frequencies, but only the head node can ever be skipped.
    pub(crate) fn lfu(&self) -> Option<EntrySlot<Key, Value>> {
        let mut node = Some(self.head);
        while let Some(cur) = node {
            let cur_node = &self.nodes[cur];
            if let Some(entry) = cur_node.head {
                return Some(entry);
            }
            node = cur_node.next;
        }
        None
    }

    fn create_increment(&mut self, node: NodeSlot<Key, Value>) -> NodeSlot<Key, Value> {
        // There are four links to fix:
        // ┌─────┐ (1) ┌─────┐ (2) ┌──────┐
        // │     ├────►│     ├────►│      │
        // │ cur │     │ new │     │ next │
        // │     │◄────┤     │◄────┤      │
        // └─────┘ (3) └─────┘ (4) └──────┘
        let Node {
            frequency, next, ..
        } = self.nodes[node];
        let new_node = self
            .nodes
            .insert(Node::new(frequency + 1, Some(node), next)); // Fixes (2), (3)

        if let Some(next) = next {
            self.nodes[next].prev = Some(new_node); // Fixes (4)
        }
        self.nodes[node].next = Some(new_node); // Fixes (1)

        new_node
    }

    /// Drops the node from the chain if nothing is left in it. The head node
    /// always stays.
    fn release_if_empty(&mut self, node: NodeSlot<Key, Value>) {
        if node == self.head || !self.nodes[node].is_empty() {
            return;
        }

        let Some(removed) = self.nodes.remove(node) else {
            panic!("bug: released node {node:?} twice");
        };

        // Only the head node lacks a previous node.
        if let Some(prev) = removed.prev {
            self.nodes[prev].next = removed.next;
        }
        if let Some(next) = removed.next {
            self.nodes[next].prev = removed.prev;
        }
    }

    /// Takes the entry out of its owner's list. The entry keeps its owner so
    /// callers can still find the node it came from.
    fn unlink(&mut self, slot: EntrySlot<Key, Value>) {
        let Entry {
            owner, prev, next, ..
        } = self.entries[slot];

        match prev {
            Some(prev) => self.entries[prev].next = next,
            None => self.nodes[owner].head = next,
        }
        match next {
            Some(next) => self.entries[next].prev = prev,
            None => self.nodes[owner].tail = prev,
        }

        let entry = &mut self.entries[slot];
        entry.prev = None;
        entry.next = None;
    }

    fn push_back(&mut self, node: NodeSlot<Key, Value>, slot: EntrySlot<Key, Value>) {
        let tail = self.nodes[node].tail;

        let entry = &mut self.entries[slot];
        entry.owner = node;
        entry.prev = tail;
        entry.next = None;

        match tail {
            Some(tail) => self.entries[tail].next = Some(slot),
            None => self.nodes[node].head = Some(slot),
        }
        self.nodes[node].tail = Some(slot);
    }

    /// Walks the whole structure and reports the first broken link found.
    pub(crate) fn audit(&self) -> Result<(), String> {
        let mut entry_count = 0;
        let mut node_count = 0;
        let mut prev_node = None;
        let mut node = Some(self.head);

        while let Some(cur) = node {
            let Some(cur_node) = self.nodes.get(cur) else {
                return Err(format!("dangling node {cur:?}"));
            };
            node_count += 1;

            if cur_node.prev != prev_node {
                return Err(format!("incorrect prev pointer on node {cur:?}"));
            }
            if let Some(prev) = prev_node {
                if self.nodes[prev].frequency >= cur_node.frequency {
                    return Err(format!(
                        "node frequency {} does not follow {}",
                        cur_node.frequency, self.nodes[prev].frequency
                    ));
                }
            } else if cur_node.frequency != 0 {
                return Err("head node frequency is not zero".to_string());
            }
            if cur != self.head && cur_node.is_empty() {
                return Err(format!("empty non-head node, frequency {}", cur_node.frequency));
            }

            let mut prev_entry = None;
            let mut entry = cur_node.head;
            while let Some(slot) = entry {
                let Some(cur_entry) = self.entries.get(slot) else {
                    return Err(format!("dangling entry {slot:?}"));
                };
                if cur_entry.owner != cur {
                    return Err(format!("incorrect owner on entry {slot:?}"));
                }
                if cur_entry.prev != prev_entry {
                    return Err(format!("incorrect prev pointer on entry {slot:?}"));
                }
                entry_count += 1;
                prev_entry = Some(slot);
                entry = cur_entry.next;
            }
            if cur_node.tail != prev_entry {
                return Err(format!(
                    "tail not pointing to last entry, frequency {}",
                    cur_node.frequency
                ));
            }

            prev_node = Some(cur);
            node = cur_node.next;
        }

        if node_count != self.nodes.len() {
            return Err(format!(
                "{} nodes allocated but {node_count} reachable",
                self.nodes.len()
            ));
        }
        if entry_count != self.entries.len() {
            return Err(format!(
                "{} entries allocated but {entry_count} reachable",
                self.entries.len()
            ));
        }

        Ok(())
    }
}
