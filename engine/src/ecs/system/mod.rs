//! Systems: logic that runs over every entity with a given set of components.
//!
//! # Overview
//!
//! A [`System`] declares the components it needs once, through [`System::require`], when it
//! is registered with a [`World`]. From then on the world keeps the system's subscriber set
//! equal to the live entities whose capability mask contains that requirement. Every
//! attach, detach, create and flush re-evaluates it synchronously. The system hears about
//! each change through [`System::on_entity_added`] and [`System::on_entity_removed`].
//!
//! ```rust,ignore
//! use ember_engine::ecs::{Component, Entity, Result, System};
//! use ember_engine::ecs::system::{Frame, Require};
//!
//! struct Movement;
//!
//! impl System for Movement {
//!     fn require(&self, require: &mut Require<'_>) -> Result<()> {
//!         require.component::<Transform>()?.component::<Velocity>()?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, frame: &mut Frame<'_>) {
//!         for &entity in &frame.entities {
//!             let velocity = *frame.world.get::<Velocity>(entity).unwrap().unwrap();
//!             let transform = frame.world.get_mut::<Transform>(entity).unwrap().unwrap();
//!             transform.x += velocity.dx * frame.delta;
//!         }
//!     }
//! }
//!
//! world.register_system(Movement)?;
//! ```
//!
//! # Dispatch
//!
//! [`World::update_all`], [`World::fixed_update_all`] and [`World::render_all`] visit the
//! active systems in registration order. While a system runs it is checked out of the
//! registry, so it may freely create, destroy, attach and detach through [`Frame::world`].
//! Subscription changes that concern the running system still apply to its subscriber set
//! at once. Its hooks for them are queued and delivered, in order, as soon as it returns.

mod registry;

use std::any::Any;

use crate::ecs::{
    component::Component,
    entity::Entity,
    error::Result,
    mask::Mask,
    world::{TypeRegistry, View, World},
};

pub(crate) use registry::Registry;

/// A system identifier, dense and permanent for the lifetime of its type registry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Construct a new system Id from a raw u32 value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this system if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Downcasting support for boxed systems. Implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of logic that processes every entity satisfying its component requirement.
///
/// Only [`require`](System::require) must be implemented; every other hook defaults to
/// doing nothing.
pub trait System: AsAny {
    /// Declare the components an entity needs to be routed to this system.
    ///
    /// Called exactly once, at registration, before the initialize hook and before the
    /// first scan of existing entities.
    fn require(&self, require: &mut Require<'_>) -> Result<()>;

    /// Called once after registration, before any entity is routed to the system.
    fn initialize(&mut self) {}

    /// Called once per frame while the system is active.
    fn update(&mut self, _frame: &mut Frame<'_>) {}

    /// Called once per fixed time step while the system is active.
    fn fixed_update(&mut self, _frame: &mut Frame<'_>) {}

    /// Called once per frame, after every update, while the system is active.
    fn render(&mut self, _frame: &mut Frame<'_>) {}

    /// Called when an entity starts satisfying the requirement.
    fn on_entity_added(&mut self, _entity: Entity, _view: &View<'_>) {}

    /// Called when an entity stops satisfying the requirement or is flushed. The entity's
    /// components are still readable through the view.
    fn on_entity_removed(&mut self, _entity: Entity, _view: &View<'_>) {}
}

/// Builder for a system's required capability mask.
pub struct Require<'a> {
    types: &'a TypeRegistry,
    mask: Mask,
}

impl<'a> Require<'a> {
    pub(crate) fn new(types: &'a TypeRegistry) -> Self {
        Self {
            types,
            mask: Mask::with_capacity(types.max_component_types()),
        }
    }

    /// Require component type `C`, registering it if this is its first use.
    ///
    /// Fails with [`Error::TypeCapacity`](crate::ecs::Error::TypeCapacity) when `C` would
    /// not fit in a mask.
    pub fn component<C: Component>(&mut self) -> Result<&mut Self> {
        let id = self.types.register_component::<C>()?;
        self.mask.insert(id);
        Ok(self)
    }

    /// The mask declared so far.
    #[inline]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub(crate) fn into_mask(self) -> Mask {
        self.mask
    }
}

/// What a system sees while it is dispatched.
pub struct Frame<'w> {
    /// Seconds covered by this call. Render frames carry zero.
    pub delta: f32,

    /// The system's subscribers, in ascending order, as of the start of the call.
    pub entities: Vec<Entity>,

    /// The world the system is registered in.
    pub world: &'w mut World,
}
