use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;

/// A stable index into an [`Arena`]. Slots are reused after removal, so a
/// `Slot` is only meaningful while the value it was issued for is alive.
pub(crate) struct Slot<T>(usize, PhantomData<fn() -> T>);

impl<T> Slot<T> {
    const fn new(index: usize) -> Self {
        Self(index, PhantomData)
    }

    #[cfg(test)]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

// Manual impls: derives would put bounds on T.
impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Slot<T> {}

impl<T> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for Slot<T> {}

impl<T> Debug for Slot<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Slot({})", self.0)
    }
}

/// Vector backed storage with a free list.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> Slot<T> {
        let index = if let Some(index) = self.free.pop() {
            self.slots[index] = Some(value);
            index
        } else {
            self.slots.push(Some(value));
            self.slots.len() - 1
        };
        self.len += 1;
        Slot::new(index)
    }

    pub(crate) fn remove(&mut self, slot: Slot<T>) -> Option<T> {
        let value = self.slots.get_mut(slot.0)?.take()?;
        self.free.push(slot.0);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, slot: Slot<T>) -> Option<&T> {
        self.slots.get(slot.0).and_then(Option::as_ref)
    }

    pub(crate) fn get_mut(&mut self, slot: Slot<T>) -> Option<&mut T> {
        self.slots.get_mut(slot.0).and_then(Option::as_mut)
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Slot<T>, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, value)| value.as_ref().map(|value| (Slot::new(index), value)))
    }
}

impl<T> std::ops::Index<Slot<T>> for Arena<T> {
    type Output = T;

    fn index(&self, slot: Slot<T>) -> &T {
        match self.get(slot) {
            Some(value) => value,
            None => panic!("bug: dangling {slot:?}"),
        }
    }
}

impl<T> std::ops::IndexMut<Slot<T>> for Arena<T> {
    fn index_mut(&mut self, slot: Slot<T>) -> &mut T {
        match self.get_mut(slot) {
            Some(value) => value,
            None => panic!("bug: dangling {slot:?}"),
        }
    }
}

#[cfg(test)]
mod arena {
    use super::Arena;

    #[test]
    fn insert_and_get() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        assert_eq!(arena.get(a), Some(&1));
        assert_eq!(arena[b], 2);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn removed_slots_are_reused() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        arena.insert("b");
        assert_eq!(arena.remove(a), Some("a"));
        assert!(arena.get(a).is_none());
        assert_eq!(arena.remove(a), None);

        let c = arena.insert("c");
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn iter_skips_holes() {
        let mut arena = Arena::with_capacity(4);
        let slots: Vec<_> = (0..4).map(|i| arena.insert(i)).collect();
        arena.remove(slots[1]);
        arena.remove(slots[2]);
        let values: Vec<_> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![0, 3]);
    }

    #[test]
    #[should_panic(expected = "bug: dangling")]
    fn indexing_a_removed_slot_panics() {
        let mut arena = Arena::new();
        let a = arena.insert(1);
        arena.remove(a);
        let _value: i32 = arena[a];
    }
}
