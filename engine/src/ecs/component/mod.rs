//! Components and their per-entity storage.
//!
//! Components are the data attached to entities. Each entity owns at most one instance of
//! each component type, and the [`Store`] owns that instance on the entity's behalf until it
//! is detached or the entity is flushed.
//!
//! ## Lifecycle hooks
//!
//! [`Component::initialize`] runs right after an instance is attached, before any system is
//! told about the entity's new capabilities. [`Component::finalize`] runs before an instance
//! leaves the store: on detach, on replacement by a re-attach of the same type and for every
//! remaining component when the entity is flushed.
//!
//! ## Usage
//!
//! ```ignore
//! use ember_engine::Component;
//!
//! #[derive(Component)]
//! struct Transform { x: f32, y: f32 }
//!
//! struct Audio { handle: u32 }
//!
//! impl ember_engine::ecs::Component for Audio {
//!     fn finalize(&mut self) {
//!         release_voice(self.handle);
//!     }
//! }
//! ```

mod store;

pub use store::Store;

/// A component identifier, dense and permanent for the lifetime of its type registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new component Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this component if it were to live in indexable storage (e.g. a mask)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for Id {
    #[inline]
    fn from(value: usize) -> Self {
        Self::new(value as u32)
    }
}

/// A trait representing a component in the ECS.
///
/// Both hooks default to doing nothing, which is what `#[derive(Component)]` gives you.
pub trait Component: 'static {
    /// Called once the component has been attached to an entity.
    fn initialize(&mut self) {}

    /// Called just before the component is removed from its entity, for any reason.
    fn finalize(&mut self) {}
}
