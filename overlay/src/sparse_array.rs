//! Index-addressed storage with slot recycling.
//!
//! [`SparseArray<T>`] hands out plain `u32` slot indices that stay valid until
//! the element is removed. Removal never moves other elements, so every other
//! index keeps addressing the same value. Freed slots go onto a LIFO free
//! list and are reused by later [`add`](SparseArray::add) calls.

/// A vector of optional slots with a free list of recyclable indices.
///
/// - `add`: O(1) amortized, reuses the most recently freed slot first
/// - `insert_at`: O(1) amortized when growing or refilling the most recently
///   freed slot, otherwise linear in the number of free slots
/// - `remove_at` / `is_valid` / `get`: O(1)
///
/// The free list holds exactly the indices of the free slots below
/// [`max_index`](Self::max_index), each once.
#[derive(Debug, Clone)]
pub struct SparseArray<T> {
    /// Slot storage. `None` means the slot is free.
    slots: Vec<Option<T>>,
    /// Free slot indices (LIFO stack).
    free_list: Vec<u32>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> SparseArray<T> {
    /// Creates a new empty sparse array.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Creates an empty sparse array with room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in the first reusable slot and returns its index.
    pub fn add(&mut self, value: T) -> u32 {
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = Some(value);
            self.len += 1;
            return index;
        }

        let index = self.slots.len() as u32;
        self.slots.push(Some(value));
        self.len += 1;
        index
    }

    /// Stores `value` at an explicit slot index, growing the array if needed.
    ///
    /// Slots skipped over while growing become free and can be handed out by
    /// later [`add`](Self::add) calls. Returns the value back if the slot is
    /// already occupied.
    pub fn insert_at(&mut self, index: u32, value: T) -> Result<(), T> {
        let idx = index as usize;
        if idx >= self.slots.len() {
            let old_len = self.slots.len() as u32;
            self.slots.resize_with(idx + 1, || None);
            // Highest gap index ends on top so adds fill gaps front to back.
            self.free_list.extend((old_len..index).rev());
        } else if self.slots[idx].is_some() {
            return Err(value);
        } else if let Some(pos) = self.free_list.iter().rposition(|&free| free == index) {
            self.free_list.remove(pos);
        }

        self.slots[idx] = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the value at `index`, freeing the slot.
    ///
    /// Returns `None` if the slot was not occupied.
    pub fn remove_at(&mut self, index: u32) -> Option<T> {
        let value = self.slots.get_mut(index as usize)?.take()?;
        self.free_list.push(index);
        self.len -= 1;
        Some(value)
    }

    /// Returns whether `index` addresses an occupied slot.
    pub fn is_valid(&self, index: u32) -> bool {
        matches!(self.slots.get(index as usize), Some(Some(_)))
    }

    /// Returns a reference to the value at `index`.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.slots.get(index as usize)?.as_ref()
    }

    /// Returns a mutable reference to the value at `index`.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.slots.get_mut(index as usize)?.as_mut()
    }

    /// Returns the number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots ever allocated (the high-water mark).
    ///
    /// Freed slots still count until [`clear`](Self::clear) is called.
    pub fn max_index(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Removes every element and resets the high-water mark.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.len = 0;
    }

    /// Iterates over `(index, &value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|v| (i as u32, v)))
    }

    /// Iterates over `(index, &mut value)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|v| (i as u32, v)))
    }

    /// Iterates over occupied values in slot order.
    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl<T> Default for SparseArray<T> {
    fn default() -> Self {
        Self::new()
    }
}
