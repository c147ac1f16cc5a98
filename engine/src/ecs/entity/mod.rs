//! Entity handles and identifier allocation.
//!
//! # Architecture
//!
//! - **[`Entity`]**: A copyable handle made of an [`Id`] and the [`world::Id`] of the world
//!   that issued it. It carries no data; whether it is alive is a property of the world.
//!
//! - **[`Allocator`]**: Issues entity ids. Freed ids go to a first-in first-out dead pool and
//!   are reissued before the counter grows, which keeps the id space compact for the
//!   id-indexed storage behind it. The allocator enforces the world's entity capacity.
//!
//! - **[`Registry`]**: Tracks which ids are live, the capability [`Mask`](crate::ecs::Mask)
//!   of each live entity and the set of entities waiting for the next flush.
//!
//! - **[`RefMut`]**: A handle bound to one entity of a world, for attaching and querying
//!   without repeating the entity on every call.
//!
//! Ids are reused without a generation counter, so a handle kept past its entity's flush
//! will address whichever entity is issued that id next. Handles should not outlive the
//! frame in which their entity is destroyed.

mod reference;
mod registry;

use std::fmt;

use crossbeam::queue::SegQueue;

use crate::ecs::{
    error::{Error, Result},
    world,
};

pub use reference::RefMut;
pub use registry::Registry;

/// An entity identifier, unique among the live entities of one world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id(u32);

impl Id {
    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Get the raw identifier value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl From<u32> for Id {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// An entity in a world.
///
/// Equality is identifier equality within the same world. Field order makes handles of one
/// world sort by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity {
    /// The identifier of the entity within its world.
    id: Id,

    /// The world that issued this entity.
    world: world::Id,
}

impl Entity {
    /// Construct an entity handle. Only worlds issue handles to callers.
    #[inline]
    pub(crate) const fn new(id: Id, world: world::Id) -> Self {
        Self { id, world }
    }

    /// Get the id of this entity.
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Get the world this entity belongs to.
    #[inline]
    pub fn world(&self) -> world::Id {
        self.world
    }

    /// Get the index of this entity if it were to live in indexable storage (e.g. Vec)
    #[inline]
    pub fn index(&self) -> usize {
        self.id.index()
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id.0, self.world.id())
    }
}

/// An allocator for entity ids.
///
/// Allocates unique ids up to a fixed capacity and recycles freed ids in the order they
/// were freed.
#[derive(Debug)]
pub struct Allocator {
    /// Ids available for reuse.
    dead_pool: SegQueue<Id>,

    /// Next fresh id to allocate.
    next_id: u32,

    /// Maximum number of ids that may be in use at once.
    capacity: usize,
}

impl Allocator {
    /// Construct a new allocator starting from id 0.
    #[inline]
    pub const fn new(capacity: usize) -> Self {
        Self {
            dead_pool: SegQueue::new(),
            next_id: 0,
            capacity,
        }
    }

    /// Allocate an id, reusing the oldest freed id when there is one.
    ///
    /// Fails with [`Error::EntityCapacity`] when every id below the capacity is in use.
    pub fn alloc(&mut self) -> Result<Id> {
        // Try to reuse from dead pool first
        if let Some(id) = self.dead_pool.pop() {
            return Ok(id);
        }

        if self.next_id as usize >= self.capacity {
            return Err(Error::EntityCapacity {
                capacity: self.capacity,
            });
        }

        let id = Id(self.next_id);
        self.next_id += 1;
        Ok(id)
    }

    /// Return an id to the pool for reuse.
    pub fn free(&mut self, id: Id) {
        self.dead_pool.push(id);
    }

    /// Number of ids currently issued and not freed.
    #[inline]
    pub fn in_use(&self) -> usize {
        self.next_id as usize - self.dead_pool.len()
    }

    /// Maximum number of ids that may be in use at once.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
