use crate::ecs::{
    component::{self, Component},
    entity::{self, Entity},
    error::{Error, Result},
    mask::Mask,
    world::{Id, TypeRegistry},
};

/// Read-only access to the entities and components of a world.
///
/// System hooks receive a view because they run while the world is in the middle of a
/// structural change and cannot be handed the world itself.
#[derive(Clone, Copy)]
pub struct View<'w> {
    world: Id,
    entities: &'w entity::Registry,
    components: &'w component::Store,
    types: &'w TypeRegistry,
}

impl<'w> View<'w> {
    pub(crate) const fn new(
        world: Id,
        entities: &'w entity::Registry,
        components: &'w component::Store,
        types: &'w TypeRegistry,
    ) -> Self {
        Self {
            world,
            entities,
            components,
            types,
        }
    }

    /// The id of the world being viewed.
    #[inline]
    pub fn world(&self) -> Id {
        self.world
    }

    /// Whether the entity belongs to this world and has not been flushed.
    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.resolve(entity).is_ok()
    }

    /// The capability mask of a live entity.
    pub fn mask_of(&self, entity: Entity) -> Result<&'w Mask> {
        let id = self.resolve(entity)?;
        let entities: &'w entity::Registry = self.entities;
        entities.mask(id).ok_or(Error::UnknownEntity(entity))
    }

    /// Whether a live entity has a component of type `C`.
    pub fn has<C: Component>(&self, entity: Entity) -> Result<bool> {
        let mask = self.mask_of(entity)?;
        Ok(self.types.component::<C>().is_some_and(|id| mask.has(id)))
    }

    /// Get the `C` component of a live entity, or `None` if it has none.
    pub fn get<C: Component>(&self, entity: Entity) -> Result<Option<&'w C>> {
        let id = self.resolve(entity)?;
        let components: &'w component::Store = self.components;
        Ok(self
            .types
            .component::<C>()
            .and_then(|component| components.get::<C>(id, component)))
    }

    /// Iterate the live entities and their masks in ascending id order.
    pub fn entities(&self) -> impl Iterator<Item = (Entity, &'w Mask)> + 'w {
        let world = self.world;
        let entities: &'w entity::Registry = self.entities;
        entities
            .iter()
            .map(move |(id, mask)| (Entity::new(id, world), mask))
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Map a handle to its live id in this world.
    pub(crate) fn resolve(&self, entity: Entity) -> Result<entity::Id> {
        if entity.world() == self.world && self.entities.is_live(entity.id()) {
            Ok(entity.id())
        } else {
            Err(Error::UnknownEntity(entity))
        }
    }
}
