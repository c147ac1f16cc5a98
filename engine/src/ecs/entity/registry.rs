use std::collections::BTreeSet;

use log::trace;

use crate::ecs::{
    entity::{Allocator, Id},
    error::Result,
    mask::Mask,
};

/// The collection of all live entities in a world.
///
/// A live entity has a capability mask. Entities stay live while they wait for destruction;
/// they only leave the registry when the world flushes them.
#[derive(Debug)]
pub struct Registry {
    /// Issues and recycles ids.
    allocator: Allocator,

    /// Capability mask per id, `None` when the id is not live.
    masks: Vec<Option<Mask>>,

    /// Ids waiting for the next flush, in ascending order.
    pending: BTreeSet<Id>,

    /// Capacity of every mask this registry hands out.
    mask_capacity: usize,
}

impl Registry {
    /// Construct an empty registry.
    pub fn new(max_entities: usize, mask_capacity: usize) -> Self {
        Self {
            allocator: Allocator::new(max_entities),
            masks: Vec::new(),
            pending: BTreeSet::new(),
            mask_capacity,
        }
    }

    /// Issue an id with an empty mask.
    pub fn create(&mut self) -> Result<Id> {
        let id = self.allocator.alloc()?;
        let index = id.index();
        if index >= self.masks.len() {
            self.masks.resize(index + 1, None);
        }
        self.masks[index] = Some(Mask::with_capacity(self.mask_capacity));
        trace!("issued entity id {}", id.value());
        Ok(id)
    }

    /// Mark a live id for destruction. Returns `false` if it was already pending.
    pub fn mark_pending(&mut self, id: Id) -> bool {
        self.pending.insert(id)
    }

    /// Whether the id is waiting for the next flush.
    #[inline]
    pub fn is_pending(&self, id: Id) -> bool {
        self.pending.contains(&id)
    }

    /// Take every pending id, in ascending order, leaving the pending set empty.
    pub fn take_pending(&mut self) -> Vec<Id> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    /// Number of ids waiting for the next flush.
    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drop the mask of a live id and return the id to the allocator.
    /// Returns `false` if the id was not live.
    pub fn release(&mut self, id: Id) -> bool {
        match self.masks.get_mut(id.index()).and_then(Option::take) {
            Some(_) => {
                self.pending.remove(&id);
                self.allocator.free(id);
                true
            }
            None => false,
        }
    }

    /// Whether the id is live.
    #[inline]
    pub fn is_live(&self, id: Id) -> bool {
        self.mask(id).is_some()
    }

    /// The mask of a live id.
    #[inline]
    pub fn mask(&self, id: Id) -> Option<&Mask> {
        self.masks.get(id.index()).and_then(Option::as_ref)
    }

    /// The mutable mask of a live id.
    #[inline]
    pub fn mask_mut(&mut self, id: Id) -> Option<&mut Mask> {
        self.masks.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Iterate live ids and their masks in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &Mask)> + '_ {
        self.masks
            .iter()
            .enumerate()
            .filter_map(|(index, mask)| mask.as_ref().map(|mask| (Id(index as u32), mask)))
    }

    /// Number of live entities, pending ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.allocator.in_use()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of live entities.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.allocator.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component;

    #[test]
    fn create_issues_live_ids_with_empty_masks() {
        // Given
        let mut registry = Registry::new(10, 64);

        // When
        let id = registry.create().unwrap();

        // Then
        assert!(registry.is_live(id));
        assert!(registry.mask(id).unwrap().is_empty());
        assert_eq!(registry.mask(id).unwrap().capacity(), 64);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn release_recycles_and_resets_the_mask() {
        // Given
        let mut registry = Registry::new(10, 64);
        let id = registry.create().unwrap();
        registry
            .mask_mut(id)
            .unwrap()
            .insert(component::Id::new(4));

        // When
        assert!(registry.release(id));

        // Then
        assert!(!registry.is_live(id));
        assert!(registry.mask(id).is_none());
        assert!(!registry.release(id));

        // When - the id is reissued
        let again = registry.create().unwrap();

        // Then - with a fresh mask
        assert_eq!(again, id);
        assert!(registry.mask(again).unwrap().is_empty());
    }

    #[test]
    fn pending_is_a_set() {
        // Given
        let mut registry = Registry::new(10, 64);
        let a = registry.create().unwrap();
        let b = registry.create().unwrap();

        // When
        assert!(registry.mark_pending(b));
        assert!(registry.mark_pending(a));
        assert!(!registry.mark_pending(b));

        // Then - drained in ascending order
        assert_eq!(registry.pending_len(), 2);
        assert!(registry.is_pending(a));
        assert_eq!(registry.take_pending(), vec![a, b]);
        assert_eq!(registry.pending_len(), 0);

        // Then - marking does not end liveness
        assert!(registry.is_live(a));
    }

    #[test]
    fn iter_skips_released_ids() {
        // Given
        let mut registry = Registry::new(10, 64);
        let ids: Vec<_> = (0..4).map(|_| registry.create().unwrap()).collect();

        // When
        registry.release(ids[1]);

        // Then
        let live: Vec<_> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(live, vec![ids[0], ids[2], ids[3]]);
        assert_eq!(registry.len(), 3);
    }
}
