//! Generational object arena
//!
//! All objects of a runtime live here and are addressed by [`ObjectId`].
//! Freed slots are reused with a bumped generation, so handles held across a
//! collection are detected as dangling instead of aliasing a new object.

use crate::object::ObjectData;
use crate::value::ObjectId;
use crate::{MopError, MopResult};

struct Entry {
    generation: u32,
    data: Option<ObjectData>,
}

/// Object arena
pub struct Heap {
    entries: Vec<Entry>,
    free: Vec<u32>,
    live: usize,
}

impl Heap {
    /// Create an arena with room for `capacity` objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store an object and return its handle
    pub fn allocate(&mut self, data: ObjectData) -> ObjectId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.data = Some(data);
            return ObjectId::new(index, entry.generation);
        }
        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            data: Some(data),
        });
        ObjectId::new(index, 0)
    }

    /// Look up an object
    pub fn get(&self, id: ObjectId) -> MopResult<&ObjectData> {
        self.try_get(id).ok_or(MopError::DanglingObject(id))
    }

    /// Look up an object mutably
    pub fn get_mut(&mut self, id: ObjectId) -> MopResult<&mut ObjectData> {
        self.try_get_mut(id).ok_or(MopError::DanglingObject(id))
    }

    /// Look up an object, `None` if dangling
    pub fn try_get(&self, id: ObjectId) -> Option<&ObjectData> {
        self.entries
            .get(id.index() as usize)
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.data.as_ref())
    }

    /// Look up an object mutably, `None` if dangling
    pub fn try_get_mut(&mut self, id: ObjectId) -> Option<&mut ObjectData> {
        self.entries
            .get_mut(id.index() as usize)
            .filter(|e| e.generation == id.generation())
            .and_then(|e| e.data.as_mut())
    }

    /// Check if a handle refers to a live object
    pub fn contains(&self, id: ObjectId) -> bool {
        self.try_get(id).is_some()
    }

    /// Free an object, invalidating its handle
    pub fn free(&mut self, id: ObjectId) -> Option<ObjectData> {
        let entry = self
            .entries
            .get_mut(id.index() as usize)
            .filter(|e| e.generation == id.generation())?;
        let data = entry.data.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index());
        self.live -= 1;
        Some(data)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no objects are live
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live objects
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ObjectData)> {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry
                .data
                .as_ref()
                .map(|data| (ObjectId::new(index as u32, entry.generation), data))
        })
    }

    /// Handles of all live objects
    pub fn ids(&self) -> Vec<ObjectId> {
        self.iter().map(|(id, _)| id).collect()
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl std::fmt::Debug for Heap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap")
            .field("live", &self.live)
            .field("slots", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> ObjectData {
        ObjectData::new(ObjectId::PLACEHOLDER)
    }

    #[test]
    fn test_allocate_and_get() {
        let mut heap = Heap::default();
        let a = heap.allocate(data());
        let b = heap.allocate(data());
        assert_ne!(a, b);
        assert_eq!(heap.len(), 2);
        assert!(heap.get(a).is_ok());
    }

    #[test]
    fn test_free_invalidates_handle() {
        let mut heap = Heap::default();
        let a = heap.allocate(data());
        assert!(heap.free(a).is_some());
        assert!(!heap.contains(a));
        assert_eq!(heap.get(a).unwrap_err(), MopError::DanglingObject(a));
        assert!(heap.free(a).is_none());
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut heap = Heap::default();
        let a = heap.allocate(data());
        heap.free(a);
        let b = heap.allocate(data());
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(!heap.contains(a));
        assert!(heap.contains(b));
    }

    #[test]
    fn test_iter_skips_freed() {
        let mut heap = Heap::default();
        let a = heap.allocate(data());
        let b = heap.allocate(data());
        heap.free(a);
        assert_eq!(heap.ids(), vec![b]);
        assert!(!heap.is_empty());
    }
}
