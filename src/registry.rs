//! # Task Registry
//!
//! Bounded task table: a fixed array of `N` slots, a live count and a
//! persistent dispatch cursor. Live records always occupy `slots[..len]`
//! in insertion order; removal shifts the tail down by one.
//!
//! The cursor names the next record the dispatcher visits. It survives
//! across dispatcher cycles and is retargeted on removal so that it never
//! skips or revisits a record:
//!
//! ```text
//!   remove(i), i <  cursor  →  cursor - 1  (same record, shifted down)
//!   remove(i), i == cursor  →  cursor      (now names the successor)
//!   remove(i), i >  cursor  →  cursor
//!   cursor == len           →  0           (wrap)
//! ```
//!
//! The registry itself is not synchronized; the scheduler wraps it in a
//! critical-section mutex.

use crate::error::Error;
use crate::task::{TaskFn, TaskId, TaskRecord};

pub struct Registry<const N: usize> {
    slots: [Option<TaskRecord>; N],
    len: usize,
    cursor: usize,
    next_id: u64,
}

impl<const N: usize> Registry<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            len: 0,
            cursor: 0,
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of the record the dispatcher visits next.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Drop every record. Ids keep counting so stale handles stay stale.
    pub fn clear(&mut self) {
        self.slots = [None; N];
        self.len = 0;
        self.cursor = 0;
    }

    /// Hand out an id not held by any live record. The counter never
    /// restarts, so an id is not handed out twice before it wraps.
    pub fn allocate_id(&mut self) -> TaskId {
        loop {
            let candidate = TaskId::new(self.next_id);
            self.next_id = self.next_id.wrapping_add(1);
            if self.position(candidate).is_none() {
                return candidate;
            }
        }
    }

    /// Append a record. On `RegistryFull` nothing is modified.
    pub fn push(&mut self, record: TaskRecord) -> Result<(), Error> {
        if self.is_full() {
            return Err(Error::RegistryFull);
        }
        self.slots[self.len] = Some(record);
        self.len += 1;
        Ok(())
    }

    /// Remove a record, compacting the table and retargeting the cursor.
    pub fn remove(&mut self, id: TaskId) -> Result<TaskRecord, Error> {
        let index = self.position(id).ok_or(Error::TaskNotFound)?;
        let removed = self.slots[index].take().ok_or(Error::TaskNotFound)?;

        for i in index..self.len - 1 {
            self.slots[i] = self.slots[i + 1].take();
        }
        self.len -= 1;

        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.len {
            self.cursor = 0;
        }
        Ok(removed)
    }

    pub fn position(&self, id: TaskId) -> Option<usize> {
        self.iter().position(|record| record.id == id)
    }

    pub fn get(&self, id: TaskId) -> Option<&TaskRecord> {
        self.iter().find(|record| record.id == id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut TaskRecord> {
        self.slots[..self.len]
            .iter_mut()
            .filter_map(Option::as_mut)
            .find(|record| record.id == id)
    }

    /// First record (in table order) running `callback`.
    pub fn find_callback(&self, callback: TaskFn) -> Option<&TaskRecord> {
        self.iter().find(|record| record.runs_callback(callback))
    }

    /// Record under the cursor, if the table is not empty.
    pub fn current_mut(&mut self) -> Option<&mut TaskRecord> {
        if self.cursor >= self.len {
            self.cursor = 0;
        }
        self.slots.get_mut(self.cursor).and_then(Option::as_mut)
    }

    /// Move the cursor to the next record, wrapping at the end.
    pub fn advance_cursor(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.len {
            self.cursor = 0;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskRecord> {
        self.slots[..self.len].iter().filter_map(Option::as_ref)
    }
}

impl<const N: usize> Default for Registry<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    fn a() {}
    fn b() {}

    fn fill<const N: usize>(registry: &mut Registry<N>, count: usize) -> [TaskId; 8] {
        let mut ids = [TaskId::new(u64::MAX); 8];
        for slot in ids.iter_mut().take(count) {
            let id = registry.allocate_id();
            registry
                .push(TaskRecord::new(id, a, 10, TaskStatus::Scheduled, 0))
                .unwrap();
            *slot = id;
        }
        ids
    }

    #[test]
    fn test_push_until_full() {
        let mut registry: Registry<3> = Registry::new();
        fill(&mut registry, 3);
        assert!(registry.is_full());

        let before: [u64; 3] = core::array::from_fn(|i| registry.slots[i].unwrap().id.raw());
        let id = registry.allocate_id();
        let result = registry.push(TaskRecord::new(id, b, 10, TaskStatus::Scheduled, 0));
        assert_eq!(result, Err(Error::RegistryFull));
        assert_eq!(registry.len(), 3);
        let after: [u64; 3] = core::array::from_fn(|i| registry.slots[i].unwrap().id.raw());
        assert_eq!(before, after);
    }

    #[test]
    fn test_remove_compacts_in_order() {
        let mut registry: Registry<4> = Registry::new();
        let ids = fill(&mut registry, 4);

        registry.remove(ids[1]).unwrap();
        assert_eq!(registry.len(), 3);
        let order: [TaskId; 3] = core::array::from_fn(|i| registry.slots[i].unwrap().id);
        assert_eq!(order, [ids[0], ids[2], ids[3]]);
        assert!(registry.slots[3].is_none());

        assert_eq!(registry.remove(ids[1]).unwrap_err(), Error::TaskNotFound);
    }

    #[test]
    fn test_cursor_follows_removed_record() {
        let mut registry: Registry<4> = Registry::new();
        let ids = fill(&mut registry, 4);

        registry.advance_cursor();
        registry.advance_cursor();
        assert_eq!(registry.cursor(), 2);

        // Removing the record under the cursor leaves it on the successor
        registry.remove(ids[2]).unwrap();
        assert_eq!(registry.current_mut().unwrap().id, ids[3]);

        // Removing an earlier record keeps the cursor on the same record
        registry.remove(ids[0]).unwrap();
        assert_eq!(registry.current_mut().unwrap().id, ids[3]);

        // Removing the last record under the cursor wraps to the front
        registry.remove(ids[3]).unwrap();
        assert_eq!(registry.cursor(), 0);
        assert_eq!(registry.current_mut().unwrap().id, ids[1]);
    }

    #[test]
    fn test_cursor_wraps() {
        let mut registry: Registry<2> = Registry::new();
        let ids = fill(&mut registry, 2);
        registry.advance_cursor();
        registry.advance_cursor();
        assert_eq!(registry.current_mut().unwrap().id, ids[0]);
    }

    #[test]
    fn test_empty_registry_has_no_current() {
        let mut registry: Registry<2> = Registry::new();
        assert!(registry.current_mut().is_none());
        registry.advance_cursor();
        assert_eq!(registry.cursor(), 0);
    }

    #[test]
    fn test_ids_unique_and_lookup_by_callback() {
        let mut registry: Registry<4> = Registry::new();
        let first = registry.allocate_id();
        registry.push(TaskRecord::new(first, a, 10, TaskStatus::Scheduled, 0)).unwrap();
        let second = registry.allocate_id();
        registry.push(TaskRecord::new(second, b, 10, TaskStatus::Scheduled, 0)).unwrap();
        let third = registry.allocate_id();
        registry.push(TaskRecord::new(third, a, 10, TaskStatus::Scheduled, 0)).unwrap();

        assert_ne!(first, second);
        assert_ne!(first, third);
        assert_eq!(registry.find_callback(a).unwrap().id, first);
        assert_eq!(registry.find_callback(b).unwrap().id, second);

        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.find_callback(a).is_none());
        assert_ne!(registry.allocate_id(), first);
    }

    #[test]
    fn test_allocate_skips_live_ids_after_wrap() {
        let mut registry: Registry<4> = Registry::new();
        registry.next_id = u64::MAX;
        let last = registry.allocate_id();
        registry.push(TaskRecord::new(last, a, 10, TaskStatus::Scheduled, 0)).unwrap();
        let zero = registry.allocate_id();
        registry.push(TaskRecord::new(zero, b, 10, TaskStatus::Scheduled, 0)).unwrap();
        assert_eq!(last.raw(), u64::MAX);
        assert_eq!(zero.raw(), 0);

        registry.next_id = u64::MAX;
        let next = registry.allocate_id();
        assert_eq!(next.raw(), 1);
    }
}
