//! The World is the central container for all entities, components, and systems in the ECS.
//!
//! A `World` is an explicit context object: nothing in the ECS is global, and any number of
//! independent worlds can exist side by side. Identifiers of component and system types may
//! still be shared between worlds by handing them the same [`TypeRegistry`].
//!
//! # Architecture
//!
//! The World coordinates several subsystems:
//! - **Type Registry**: Issues component and system type identifiers
//! - **Entity Registry**: Issues and recycles entity ids, holds capability masks and the
//!   pending-destruction set
//! - **Component Store**: Owns every component instance on behalf of its entity
//! - **System Registry**: Owns systems, their requirements and their subscriber sets
//!
//! # Frame Contract
//!
//! Destruction is deferred. [`World::destroy`] only marks an entity; the entity keeps its
//! components and subscriptions until [`World::flush`] tears it down. A frame is therefore
//! flush, then [`World::update_all`], then [`World::render_all`], which is what
//! [`World::frame`] and the [`Runner`](crate::core::Runner) do.
//!
//! # Example
//!
//! ```ignore
//! use ember_engine::ecs::world::{Id, World};
//!
//! let mut world = World::new(Id::new(0));
//! world.register_system(RenderSystem::default())?;
//!
//! let hero = world.create()?;
//! world.attach(hero, Transform::default())?;
//! world.attach(hero, MeshRenderer::new(mesh))?;
//!
//! world.frame(1.0 / 60.0);
//!
//! world.destroy(hero)?;
//! world.flush();
//! ```
mod type_registry;
mod view;

use std::{any::type_name, collections::BTreeSet, marker::PhantomData, sync::Arc};

use log::{debug, info, trace};

use crate::{
    config::WorldConfig,
    ecs::{
        component::{self, Component},
        entity::{self, Entity},
        error::{Error, Result},
        mask::Mask,
        system::{self, Frame, Require, System},
    },
};

pub use type_registry::{TypeInfo, TypeKind, TypeRegistry};
pub use view::View;

/// A world identifier. This is a unique identifier for a world in the ECS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Create a new world identifier.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Id(id)
    }

    /// Get the raw identifier value.
    #[inline]
    pub const fn id(&self) -> u32 {
        self.0
    }
}

/// The World is the central container for all entities, components, and systems.
pub struct World {
    /// The world's unique identifier.
    id: Id,

    /// Component and system type identifiers, possibly shared with other worlds.
    types: Arc<TypeRegistry>,

    /// Live entities, their masks and the pending-destruction set.
    entities: entity::Registry,

    /// Every component instance in the world.
    components: component::Store,

    /// Registered systems and their subscriptions.
    systems: system::Registry,

    /// Marker to make World !Send. World must stay on the thread that drives its frames.
    _not_send: PhantomData<*mut ()>,
}

impl World {
    /// Create a world with the default limits and its own type registry.
    pub fn new(id: Id) -> Self {
        Self::with_config(id, &WorldConfig::default())
    }

    /// Create a world with explicit limits and its own type registry.
    pub fn with_config(id: Id, config: &WorldConfig) -> Self {
        let types = TypeRegistry::new(config.max_component_types, config.max_system_types);
        Self::with_types(id, config, Arc::new(types))
    }

    /// Create a world that shares a type registry with other worlds.
    ///
    /// Mask capacity follows the shared registry, so `config.max_component_types` and
    /// `config.max_system_types` are not consulted.
    pub fn with_types(id: Id, config: &WorldConfig, types: Arc<TypeRegistry>) -> Self {
        Self {
            id,
            entities: entity::Registry::new(config.max_entities, types.max_component_types()),
            components: component::Store::new(),
            systems: system::Registry::new(),
            types,
            _not_send: PhantomData,
        }
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The type registry this world issues identifiers from.
    #[inline]
    pub fn types(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    /// Read-only access to entities and components.
    #[inline]
    pub fn view(&self) -> View<'_> {
        View::new(self.id, &self.entities, &self.components, &self.types)
    }

    // ==================== Entities ====================

    /// Create an entity with no components.
    ///
    /// Reuses the oldest flushed id before issuing a new one. Fails with
    /// [`Error::EntityCapacity`] once the configured maximum of live entities is reached.
    pub fn create(&mut self) -> Result<Entity> {
        let id = self.entities.create()?;
        // A reissued id starts with no components.
        self.components.clear(id);

        let entity = Entity::new(id, self.id);
        debug!("created entity {}", entity);

        // Systems without requirements take every entity.
        let (systems, view) = self.split();
        systems.refresh(entity, &view);
        Ok(entity)
    }

    /// Request destruction of an entity at the next [`flush`](Self::flush).
    ///
    /// The entity stays fully usable until then. Destroying an entity that is already
    /// pending is a no-op.
    pub fn destroy(&mut self, entity: Entity) -> Result<()> {
        let id = self.resolve(entity)?;
        if self.entities.mark_pending(id) {
            debug!("entity {} pending destruction", entity);
        } else {
            trace!("entity {} already pending destruction", entity);
        }
        Ok(())
    }

    /// Tear down every entity pending destruction and return how many were flushed.
    ///
    /// For each entity, in ascending id order: every subscribed system is told the entity
    /// was removed, then every component is finalized and dropped, then the id returns to
    /// the pool.
    pub fn flush(&mut self) -> usize {
        let pending = self.entities.take_pending();
        for &id in &pending {
            let entity = Entity::new(id, self.id);

            let (systems, view) = self.split();
            systems.evict(entity, &view);

            let removed = self.components.clear(id);
            self.entities.release(id);
            debug!("flushed entity {} ({} components)", entity, removed);
        }
        pending.len()
    }

    /// Whether the entity belongs to this world and has not been flushed.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.view().is_alive(entity)
    }

    /// Whether the entity is waiting for the next flush.
    pub fn is_pending(&self, entity: Entity) -> bool {
        entity.world() == self.id && self.entities.is_pending(entity.id())
    }

    /// Number of entities waiting for the next flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.entities.pending_len()
    }

    /// Number of live entities, pending ones included.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Maximum number of live entities, pending ones included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// The capability mask of a live entity.
    pub fn mask_of(&self, entity: Entity) -> Result<&Mask> {
        self.view().mask_of(entity)
    }

    /// Get a handle bound to one live entity.
    pub fn entity_mut(&mut self, entity: Entity) -> Result<entity::RefMut<'_>> {
        self.resolve(entity)?;
        Ok(entity::RefMut::new(entity, self))
    }

    // ==================== Components ====================

    /// Attach a component to a live entity and return it for further setup.
    ///
    /// The component's initialize hook runs, then every system's subscription for the
    /// entity is re-evaluated. If the entity already has a `C`, the old instance is
    /// finalized and replaced.
    pub fn attach<C: Component>(&mut self, entity: Entity, component: C) -> Result<&mut C> {
        let id = self.resolve(entity)?;
        let component_id = self.types.register_component::<C>()?;

        if self.components.insert(id, component_id, component) {
            debug!(
                "replaced {} on entity {}",
                type_name::<C>(),
                entity
            );
        } else {
            trace!("attached {} to entity {}", type_name::<C>(), entity);
        }
        self.entities
            .mask_mut(id)
            .expect("resolved entity has a mask")
            .insert(component_id);

        let (systems, view) = self.split();
        systems.refresh(entity, &view);

        Ok(self
            .components
            .get_mut::<C>(id, component_id)
            .expect("component was attached above"))
    }

    /// Detach the `C` component from a live entity.
    ///
    /// Returns `false`, changing nothing, if the entity has no `C`. Otherwise the component
    /// is finalized and dropped and every system's subscription is re-evaluated.
    pub fn detach<C: Component>(&mut self, entity: Entity) -> Result<bool> {
        let id = self.resolve(entity)?;
        let Some(component_id) = self.types.component::<C>() else {
            return Ok(false);
        };
        if !self.components.remove(id, component_id) {
            return Ok(false);
        }
        trace!("detached {} from entity {}", type_name::<C>(), entity);
        self.entities
            .mask_mut(id)
            .expect("resolved entity has a mask")
            .remove(component_id);

        let (systems, view) = self.split();
        systems.refresh(entity, &view);
        Ok(true)
    }

    /// Whether a live entity has a `C` component.
    #[inline]
    pub fn has<C: Component>(&self, entity: Entity) -> Result<bool> {
        self.view().has::<C>(entity)
    }

    /// Get the `C` component of a live entity, or `None` if it has none.
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> Result<Option<&C>> {
        self.view().get::<C>(entity)
    }

    /// Get the `C` component of a live entity mutably, or `None` if it has none.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> Result<Option<&mut C>> {
        let id = self.resolve(entity)?;
        Ok(self
            .types
            .component::<C>()
            .and_then(|component| self.components.get_mut::<C>(id, component)))
    }

    // ==================== Systems ====================

    /// Register a system and return it for further setup.
    ///
    /// The system declares its requirement, its initialize hook runs, and then every live
    /// entity that already satisfies the requirement is subscribed. Registering a second
    /// system of the same type fails with [`Error::DuplicateSystem`].
    pub fn register_system<S: System>(&mut self, mut system: S) -> Result<&mut S> {
        let id = self.types.register_system::<S>()?;
        if self.systems.contains(id) {
            return Err(Error::DuplicateSystem(type_name::<S>()));
        }

        let mut require = Require::new(&self.types);
        system.require(&mut require)?;
        let required = require.into_mask();

        system.initialize();
        info!(
            "registered system {} requiring {:?}",
            type_name::<S>(),
            required
        );
        let slot = self
            .systems
            .insert(id, type_name::<S>(), required, Box::new(system));

        let (systems, view) = self.split();
        systems.scan(slot, &view);

        Ok(self
            .systems
            .get_mut::<S>(id)
            .expect("system was registered above"))
    }

    /// Get a registered system. `None` while the system itself is being dispatched.
    pub fn system<S: System>(&self) -> Option<&S> {
        self.systems.get::<S>(self.types.system::<S>()?)
    }

    /// Get a registered system mutably. `None` while the system itself is being dispatched.
    pub fn system_mut<S: System>(&mut self) -> Option<&mut S> {
        let id = self.types.system::<S>()?;
        self.systems.get_mut::<S>(id)
    }

    /// The entities currently routed to a registered system.
    pub fn subscribers<S: System>(&self) -> Option<&BTreeSet<Entity>> {
        self.systems.subscribers(self.types.system::<S>()?)
    }

    /// The required mask of a registered system.
    pub fn required<S: System>(&self) -> Option<&Mask> {
        self.systems.required(self.types.system::<S>()?)
    }

    /// Enable or disable dispatch of a system. Returns `false` if it is not registered.
    ///
    /// Inactive systems keep their subscriptions and hooks; they are only skipped by
    /// update, fixed update and render.
    pub fn set_system_active<S: System>(&mut self, active: bool) -> bool {
        match self.types.system::<S>() {
            Some(id) => self.systems.set_active(id, active),
            None => false,
        }
    }

    /// Whether a registered system is dispatched.
    pub fn is_system_active<S: System>(&self) -> Option<bool> {
        self.systems.is_active(self.types.system::<S>()?)
    }

    /// Number of registered systems.
    #[inline]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // ==================== Dispatch ====================

    /// Run one frame: flush pending destructions, update every active system, then render.
    pub fn frame(&mut self, delta: f32) {
        self.flush();
        self.update_all(delta);
        self.render_all();
    }

    /// Call [`System::update`] on every active system in registration order.
    pub fn update_all(&mut self, delta: f32) {
        self.dispatch(delta, |system, frame| system.update(frame));
    }

    /// Call [`System::fixed_update`] on every active system in registration order.
    pub fn fixed_update_all(&mut self, step: f32) {
        self.dispatch(step, |system, frame| system.fixed_update(frame));
    }

    /// Call [`System::render`] on every active system in registration order.
    pub fn render_all(&mut self) {
        self.dispatch(0.0, |system, frame| system.render(frame));
    }

    /// Check each active system out in turn and run it against the world.
    ///
    /// Systems registered during the pass are first dispatched on the next pass.
    fn dispatch(&mut self, delta: f32, run: impl Fn(&mut dyn System, &mut Frame<'_>)) {
        let count = self.systems.len();
        for slot in 0..count {
            let Some(mut system) = self.systems.checkout(slot) else {
                continue;
            };
            let mut frame = Frame {
                delta,
                entities: self.systems.snapshot(slot),
                world: &mut *self,
            };
            run(&mut *system, &mut frame);

            let (systems, view) = self.split();
            systems.checkin(slot, system, &view);
        }
    }

    // ==================== Internals ====================

    /// Map a handle to its live id in this world.
    #[inline]
    fn resolve(&self, entity: Entity) -> Result<entity::Id> {
        self.view().resolve(entity)
    }

    /// Borrow the system registry mutably alongside a view of everything else.
    #[inline]
    fn split(&mut self) -> (&mut system::Registry, View<'_>) {
        (
            &mut self.systems,
            View::new(self.id, &self.entities, &self.components, &self.types),
        )
    }
}
