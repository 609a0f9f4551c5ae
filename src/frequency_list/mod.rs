pub(crate) use arena::{Arena, Slot};
pub(crate) use entry::Entry;
pub(crate) use freq_list::FrequencyList;
pub use frequencies::Frequencies;
pub(crate) use node::{Node, WithFrequency};

mod arena;
mod entry;
mod freq_list;
mod frequencies;
mod node;

pub(crate) type NodeSlot<Key, Value> = Slot<Node<Key, Value>>;
pub(crate) type EntrySlot<Key, Value> = Slot<Entry<Key, Value>>;
