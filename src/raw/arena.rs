use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes. Released slots are recycled by later allocations.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live elements.
    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(h) = self.free.pop() {
            self.slots[h.to_index()] = Some(element);
            h
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Borrows two distinct live elements mutably at once.
    pub(crate) fn get2_mut(&mut self, first: Handle, second: Handle) -> (&mut T, &mut T) {
        let (a, b) = (first.to_index(), second.to_index());
        assert!(a != b, "`Arena::get2_mut()` - handles must be distinct!");
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(high);
        let low_ref = head[low].as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!");
        let high_ref = tail[0].as_mut().expect("`Arena::get2_mut()` - `handle` is invalid!");
        if a < b { (low_ref, high_ref) } else { (high_ref, low_ref) }
    }

    /// Removes the element and releases its slot. The handle must not be used afterwards.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }
}
