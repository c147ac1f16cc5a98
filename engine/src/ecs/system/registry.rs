//! Storage and routing state for the systems of one world.
//!
//! The [`Registry`] keeps systems in registration order, which is also their dispatch order.
//! For each system it owns the required mask and the subscriber set, so subscriptions stay
//! correct even while the system itself is checked out for dispatch.

use std::collections::{BTreeSet, HashMap};

use log::trace;

use crate::ecs::{
    entity::Entity,
    mask::Mask,
    system::{Id, System},
    world::View,
};

/// A subscription change waiting to be reported to a checked-out system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Added(Entity),
    Removed(Entity),
}

struct Slot {
    name: &'static str,
    required: Mask,
    subscribers: BTreeSet<Entity>,
    active: bool,
    /// `None` while the system is checked out for dispatch.
    system: Option<Box<dyn System>>,
    deferred: Vec<Change>,
}

impl Slot {
    /// Report a change to the system now, or queue it until the system is checked back in.
    fn notify(&mut self, change: Change, view: &View<'_>) {
        trace!("system '{}': {:?}", self.name, change);
        match self.system.as_deref_mut() {
            Some(system) => match change {
                Change::Added(entity) => system.on_entity_added(entity, view),
                Change::Removed(entity) => system.on_entity_removed(entity, view),
            },
            None => self.deferred.push(change),
        }
    }
}

/// A registry for storing systems and their subscriptions.
#[derive(Default)]
pub struct Registry {
    /// All registered systems, in registration order.
    slots: Vec<Slot>,

    /// Map from system id to slot index.
    index: HashMap<Id, usize>,
}

impl Registry {
    /// Create a new, empty system registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a system with this id is registered.
    #[inline]
    pub fn contains(&self, id: Id) -> bool {
        self.index.contains_key(&id)
    }

    /// Store a system at the end of the dispatch order and return its slot index.
    ///
    /// The caller is expected to [`scan`](Self::scan) existing entities afterwards.
    pub fn insert(
        &mut self,
        id: Id,
        name: &'static str,
        required: Mask,
        system: Box<dyn System>,
    ) -> usize {
        let slot = self.slots.len();
        self.slots.push(Slot {
            name,
            required,
            subscribers: BTreeSet::new(),
            active: true,
            system: Some(system),
            deferred: Vec::new(),
        });
        self.index.insert(id, slot);
        slot
    }

    /// Subscribe every live entity that already satisfies the system at `slot`.
    pub fn scan(&mut self, slot: usize, view: &View<'_>) {
        let slot = &mut self.slots[slot];
        for (entity, mask) in view.entities() {
            if mask.contains(&slot.required) && slot.subscribers.insert(entity) {
                slot.notify(Change::Added(entity), view);
            }
        }
    }

    /// Bring every system's subscription for `entity` in line with its current mask.
    pub fn refresh(&mut self, entity: Entity, view: &View<'_>) {
        let Ok(mask) = view.mask_of(entity) else {
            return;
        };
        for slot in &mut self.slots {
            let satisfied = mask.contains(&slot.required);
            let subscribed = slot.subscribers.contains(&entity);
            if satisfied && !subscribed {
                slot.subscribers.insert(entity);
                slot.notify(Change::Added(entity), view);
            } else if !satisfied && subscribed {
                slot.subscribers.remove(&entity);
                slot.notify(Change::Removed(entity), view);
            }
        }
    }

    /// Unsubscribe a destroyed entity from every system, reporting before removing.
    pub fn evict(&mut self, entity: Entity, view: &View<'_>) {
        for slot in &mut self.slots {
            if slot.subscribers.contains(&entity) {
                slot.notify(Change::Removed(entity), view);
                slot.subscribers.remove(&entity);
            }
        }
    }

    /// Take an active system out of its slot for dispatch.
    ///
    /// Returns `None` for inactive systems and for systems already checked out.
    pub fn checkout(&mut self, slot: usize) -> Option<Box<dyn System>> {
        let slot = self.slots.get_mut(slot)?;
        if !slot.active {
            return None;
        }
        slot.system.take()
    }

    /// Return a system to its slot and deliver the hooks queued while it was out.
    pub fn checkin(&mut self, slot: usize, mut system: Box<dyn System>, view: &View<'_>) {
        let slot = &mut self.slots[slot];
        for change in slot.deferred.drain(..) {
            match change {
                Change::Added(entity) => system.on_entity_added(entity, view),
                Change::Removed(entity) => system.on_entity_removed(entity, view),
            }
        }
        slot.system = Some(system);
    }

    /// The subscribers of the system at `slot`, in ascending order.
    pub fn snapshot(&self, slot: usize) -> Vec<Entity> {
        self.slots
            .get(slot)
            .map(|slot| slot.subscribers.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Get a registered system by id. `None` if absent, of another type or checked out.
    pub fn get<S: System>(&self, id: Id) -> Option<&S> {
        let slot = &self.slots[*self.index.get(&id)?];
        let system: &dyn System = slot.system.as_deref()?;
        system.as_any().downcast_ref::<S>()
    }

    /// Get a registered system mutably by id. `None` if absent, of another type or checked
    /// out.
    pub fn get_mut<S: System>(&mut self, id: Id) -> Option<&mut S> {
        let slot = *self.index.get(&id)?;
        let system: &mut dyn System = self.slots[slot].system.as_deref_mut()?;
        system.as_any_mut().downcast_mut::<S>()
    }

    /// The subscriber set of a registered system.
    pub fn subscribers(&self, id: Id) -> Option<&BTreeSet<Entity>> {
        let slot = *self.index.get(&id)?;
        Some(&self.slots[slot].subscribers)
    }

    /// The required mask of a registered system.
    pub fn required(&self, id: Id) -> Option<&Mask> {
        let slot = *self.index.get(&id)?;
        Some(&self.slots[slot].required)
    }

    /// Enable or disable dispatch of a system. Returns `false` if it is not registered.
    pub fn set_active(&mut self, id: Id, active: bool) -> bool {
        match self.index.get(&id) {
            Some(&slot) => {
                self.slots[slot].active = active;
                true
            }
            None => false,
        }
    }

    /// Whether a registered system is dispatched.
    pub fn is_active(&self, id: Id) -> Option<bool> {
        self.index.get(&id).map(|&slot| self.slots[slot].active)
    }

    /// Number of registered systems.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }
}
