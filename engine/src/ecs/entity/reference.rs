use crate::ecs::{
    component::Component,
    entity::Entity,
    error::Result,
    mask::Mask,
    world::World,
};

/// A mutable handle bound to one entity of a world.
///
/// Every call forwards to the world with the bound entity, so the usual rules apply: an
/// entity flushed through another path makes the calls fail with
/// [`Error::UnknownEntity`](crate::ecs::Error::UnknownEntity).
///
/// ```rust,ignore
/// let hero = world.create()?;
/// let mut hero_ref = world.entity_mut(hero)?;
/// hero_ref.attach(Transform::default())?;
/// hero_ref.attach(HeroComponent::new("Ilyra"))?.level = 3;
/// ```
pub struct RefMut<'w> {
    /// The entity this reference points to.
    entity: Entity,
    /// The world that owns the entity.
    world: &'w mut World,
}

impl<'w> RefMut<'w> {
    #[inline]
    pub(crate) fn new(entity: Entity, world: &'w mut World) -> Self {
        Self { entity, world }
    }

    /// Get the entity this reference points to.
    #[inline]
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Attach a component, see [`World::attach`].
    pub fn attach<C: Component>(&mut self, component: C) -> Result<&mut C> {
        self.world.attach(self.entity, component)
    }

    /// Detach a component, see [`World::detach`].
    pub fn detach<C: Component>(&mut self) -> Result<bool> {
        self.world.detach::<C>(self.entity)
    }

    pub fn has<C: Component>(&self) -> Result<bool> {
        self.world.has::<C>(self.entity)
    }

    pub fn get<C: Component>(&self) -> Result<Option<&C>> {
        self.world.get::<C>(self.entity)
    }

    pub fn get_mut<C: Component>(&mut self) -> Result<Option<&mut C>> {
        self.world.get_mut::<C>(self.entity)
    }

    /// The entity's capability mask.
    pub fn mask(&self) -> Result<&Mask> {
        self.world.mask_of(self.entity)
    }

    /// Request destruction at the next flush, see [`World::destroy`].
    pub fn destroy(&mut self) -> Result<()> {
        self.world.destroy(self.entity)
    }
}
