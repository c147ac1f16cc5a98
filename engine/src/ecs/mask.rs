//! Capability masks.
//!
//! A [`Mask`] is a fixed-capacity bitset of component identifiers. Entities carry one
//! describing what they have attached, and systems carry one describing what they require.
//! An entity is routed to a system when its mask [`contains`](Mask::contains) the system's.

use std::fmt;

use fixedbitset::FixedBitSet;

use crate::ecs::component;

/// A fixed-capacity set of component identifiers.
///
/// The capacity is fixed at construction and matches the component identifier capacity of
/// the [`TypeRegistry`](crate::ecs::world::TypeRegistry) the owning world uses. Identifiers
/// at or beyond the capacity can never be issued, so the bitset never needs to grow.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask {
    bits: FixedBitSet,
}

impl Mask {
    /// Create an empty mask able to hold identifiers `0..capacity`.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// The number of identifiers this mask can hold.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Set the bit for a component.
    ///
    /// # Panics
    /// If the identifier is outside the mask capacity. Registries never issue such ids.
    #[inline]
    pub fn insert(&mut self, id: component::Id) {
        self.bits.insert(id.index());
    }

    /// Clear the bit for a component. Out of range identifiers are ignored.
    #[inline]
    pub fn remove(&mut self, id: component::Id) {
        if id.index() < self.bits.len() {
            self.bits.set(id.index(), false);
        }
    }

    /// Test the bit for a component.
    #[inline]
    pub fn has(&self, id: component::Id) -> bool {
        self.bits.contains(id.index())
    }

    /// Whether every component in `required` is also in this mask.
    ///
    /// This is the routing test `(entity & required) == required`.
    #[inline]
    pub fn contains(&self, required: &Mask) -> bool {
        self.bits.is_superset(&required.bits)
    }

    /// Clear every bit.
    #[inline]
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Number of components in the mask.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Iterate the component identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = component::Id> + '_ {
        self.bits.ones().map(component::Id::from)
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.bits.ones()).finish()
    }
}
