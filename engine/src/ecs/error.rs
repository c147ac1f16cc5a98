//! Errors surfaced by structural ECS operations.
//!
//! Only structural problems are errors. A component that is not attached is reported as
//! `None`/`false`, and destroying an entity that is already pending destruction is a no-op.

use thiserror::Error;

use crate::ecs::{entity::Entity, world::TypeKind};

/// Convenience result type for ECS operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A structural error raised by the world or one of its registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The entity was never created in this world, or it has been flushed and its identifier
    /// not yet reissued.
    #[error("unknown entity {0}")]
    UnknownEntity(Entity),

    /// Every entity identifier up to the configured maximum is in use.
    #[error("entity capacity of {capacity} exhausted")]
    EntityCapacity {
        /// The configured maximum number of live entities.
        capacity: usize,
    },

    /// More distinct types of one kind were requested than the registry can identify.
    #[error("cannot register {kind} type '{name}': capacity of {capacity} {kind} types exhausted")]
    TypeCapacity {
        /// Which identifier space overflowed.
        kind: TypeKind,
        /// The Rust type name that failed to register.
        name: &'static str,
        /// The configured capacity of that identifier space.
        capacity: usize,
    },

    /// A system of this type is already registered in the world.
    #[error("system '{0}' is already registered")]
    DuplicateSystem(&'static str),
}
