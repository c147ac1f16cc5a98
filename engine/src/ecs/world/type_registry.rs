//! Identifier registry for component and system types.
//!
//! [`TypeRegistry`] hands out a dense, permanent integer for every distinct Rust type the
//! first time it is used as a component or as a system. Components and systems draw from
//! two independent counters: component ids index capability masks, system ids key the
//! system registry, and the two spaces never need to agree.
//!
//! # Capacity
//!
//! Each space has a fixed capacity. Component ids must fit in a [`Mask`](crate::ecs::Mask),
//! so asking for one more distinct component type than the mask can hold is an explicit
//! [`Error::TypeCapacity`] rather than a silently truncated bit.
//!
//! # Thread Safety
//!
//! Lookups are lock-free reads through `DashMap`. Registration only locks a single map
//! shard and the info vector. Several worlds, possibly on different threads, can share one
//! registry through an `Arc` so that they all agree on identifiers.
//!
//! ```rust,ignore
//! let registry = TypeRegistry::new(64, 64);
//!
//! let transform = registry.register_component::<Transform>()?;
//! assert_eq!(registry.register_component::<Transform>()?, transform);
//! ```

use std::{
    any::{TypeId as StdTypeId, type_name},
    fmt,
    sync::{
        RwLock,
        atomic::{AtomicU32, Ordering},
    },
};

use dashmap::DashMap;

use crate::ecs::{
    component::{self, Component},
    error::{Error, Result},
    system::{self, System},
};

/// The identifier space a type was registered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A component type, attached to entities.
    Component,
    /// A system type, registered once per world.
    System,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Component => write!(f, "component"),
            TypeKind::System => write!(f, "system"),
        }
    }
}

/// Metadata about a registered type.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// The raw identifier inside its space.
    id: u32,

    /// Which space the identifier belongs to.
    kind: TypeKind,

    /// The Rust TypeId for runtime type checking.
    type_id: StdTypeId,

    /// The Rust type name, for logs and errors.
    name: &'static str,
}

impl TypeInfo {
    fn new<T: 'static>(id: u32, kind: TypeKind) -> Self {
        Self {
            id,
            kind,
            type_id: StdTypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Get the raw identifier.
    #[inline]
    pub fn index(&self) -> usize {
        self.id as usize
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    #[inline]
    pub fn type_id(&self) -> StdTypeId {
        self.type_id
    }

    /// Get the Rust type name.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// One identifier space: a type map, the info for every issued id and a bounded counter.
struct Space {
    kind: TypeKind,

    /// Map from Rust TypeId to our id. Lock-free reads via sharded concurrent hashmap.
    type_map: DashMap<StdTypeId, u32>,

    /// Info for every issued id, indexed by id. Protected by RwLock for rare writes.
    infos: RwLock<Vec<Option<TypeInfo>>>,

    /// Next available identifier.
    next_id: AtomicU32,

    /// Identifiers are issued from `0..capacity`.
    capacity: usize,
}

impl Space {
    fn new(kind: TypeKind, capacity: usize) -> Self {
        Self {
            kind,
            type_map: DashMap::new(),
            infos: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
            capacity,
        }
    }

    fn register<T: 'static>(&self) -> Result<u32> {
        let std_type_id = StdTypeId::of::<T>();

        // Fast path: already registered (lock-free read)
        if let Some(id) = self.type_map.get(&std_type_id) {
            return Ok(*id);
        }

        // Slow path: the entry API keeps two racing threads from issuing two ids.
        match self.type_map.entry(std_type_id) {
            dashmap::Entry::Occupied(occupied) => Ok(*occupied.get()),
            dashmap::Entry::Vacant(vacant) => {
                let capacity = self.capacity;
                let id = self
                    .next_id
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                        ((next as usize) < capacity).then_some(next + 1)
                    })
                    .map_err(|_| Error::TypeCapacity {
                        kind: self.kind,
                        name: type_name::<T>(),
                        capacity,
                    })?;

                let mut infos = self.infos.write().expect("type info lock poisoned");
                let index = id as usize;
                if index >= infos.len() {
                    infos.resize(index + 1, None);
                }
                infos[index] = Some(TypeInfo::new::<T>(id, self.kind));
                vacant.insert(id);

                Ok(id)
            }
        }
    }

    fn get<T: 'static>(&self) -> Option<u32> {
        self.type_map
            .get(&StdTypeId::of::<T>())
            .map(|entry| *entry.value())
    }

    fn info(&self, index: usize) -> Option<TypeInfo> {
        let infos = self.infos.read().expect("type info lock poisoned");
        infos.get(index).copied().flatten()
    }

    fn len(&self) -> usize {
        self.type_map.len()
    }
}

/// A thread-safe registry of component and system type identifiers.
pub struct TypeRegistry {
    components: Space,
    systems: Space,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_MAX_COMPONENT_TYPES,
            crate::config::DEFAULT_MAX_SYSTEM_TYPES,
        )
    }
}

impl TypeRegistry {
    /// Create an empty registry with the given capacity for each identifier space.
    #[inline]
    pub fn new(max_component_types: usize, max_system_types: usize) -> Self {
        Self {
            components: Space::new(TypeKind::Component, max_component_types),
            systems: Space::new(TypeKind::System, max_system_types),
        }
    }

    /// Get the id for component type `C`, issuing the next one on first use.
    ///
    /// Fails with [`Error::TypeCapacity`] once every component id has been issued.
    pub fn register_component<C: Component>(&self) -> Result<component::Id> {
        self.components.register::<C>().map(component::Id::new)
    }

    /// Get the id for system type `S`, issuing the next one on first use.
    ///
    /// Fails with [`Error::TypeCapacity`] once every system id has been issued.
    pub fn register_system<S: System>(&self) -> Result<system::Id> {
        self.systems.register::<S>().map(system::Id::new)
    }

    /// Get the id for component type `C` without registering it.
    #[inline]
    pub fn component<C: Component>(&self) -> Option<component::Id> {
        self.components.get::<C>().map(component::Id::new)
    }

    /// Get the id for system type `S` without registering it.
    #[inline]
    pub fn system<S: System>(&self) -> Option<system::Id> {
        self.systems.get::<S>().map(system::Id::new)
    }

    /// Get the info for a registered component id.
    #[inline]
    pub fn component_info(&self, id: component::Id) -> Option<TypeInfo> {
        self.components.info(id.index())
    }

    /// Get the info for a registered system id.
    #[inline]
    pub fn system_info(&self, id: system::Id) -> Option<TypeInfo> {
        self.systems.info(id.index())
    }

    /// The number of component ids a mask must be able to hold.
    #[inline]
    pub fn max_component_types(&self) -> usize {
        self.components.capacity
    }

    #[inline]
    pub fn max_system_types(&self) -> usize {
        self.systems.capacity
    }

    /// Number of component types registered so far.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of system types registered so far.
    #[inline]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::Require;
    use std::sync::Arc;
    use std::thread;

    struct Transform;
    impl Component for Transform {}

    struct MeshRenderer;
    impl Component for MeshRenderer {}

    struct AbilitySlot;
    impl Component for AbilitySlot {}

    struct RenderSystem;
    impl System for RenderSystem {
        fn require(&self, _require: &mut Require<'_>) -> Result<()> {
            Ok(())
        }
    }

    // ==================== Basic Registration ====================

    #[test]
    fn register_same_component_twice_returns_same_id() {
        // Given
        let registry = TypeRegistry::new(8, 8);

        // When
        let id1 = registry.register_component::<Transform>().unwrap();
        let id2 = registry.register_component::<Transform>().unwrap();

        // Then
        assert_eq!(id1, id2);
        assert_eq!(registry.component::<Transform>(), Some(id1));
        assert_eq!(registry.component_count(), 1);
    }

    #[test]
    fn ids_are_issued_in_first_use_order() {
        // Given
        let registry = TypeRegistry::new(8, 8);

        // When
        let transform = registry.register_component::<Transform>().unwrap();
        let mesh = registry.register_component::<MeshRenderer>().unwrap();

        // Then
        assert_eq!(transform, component::Id::new(0));
        assert_eq!(mesh, component::Id::new(1));
    }

    #[test]
    fn component_and_system_spaces_are_independent() {
        // Given
        let registry = TypeRegistry::new(8, 8);

        // When
        let transform = registry.register_component::<Transform>().unwrap();
        let render = registry.register_system::<RenderSystem>().unwrap();

        // Then - both spaces start at zero
        assert_eq!(transform.index(), 0);
        assert_eq!(render.index(), 0);
        assert_eq!(registry.system::<RenderSystem>(), Some(render));
        assert_eq!(
            registry.system_info(render).unwrap().kind(),
            TypeKind::System
        );
    }

    #[test]
    fn lookup_does_not_register() {
        // Given
        let registry = TypeRegistry::new(8, 8);

        // Then
        assert!(registry.component::<Transform>().is_none());
        assert_eq!(registry.component_count(), 0);
        assert!(registry.component_info(component::Id::new(0)).is_none());
    }

    #[test]
    fn type_info_available_after_registration() {
        // Given
        let registry = TypeRegistry::new(8, 8);
        let id = registry.register_component::<MeshRenderer>().unwrap();

        // When
        let info = registry.component_info(id).unwrap();

        // Then
        assert_eq!(info.index(), id.index());
        assert_eq!(info.kind(), TypeKind::Component);
        assert_eq!(info.type_id(), StdTypeId::of::<MeshRenderer>());
        assert!(info.name().ends_with("MeshRenderer"));
    }

    // ==================== Capacity ====================

    #[test]
    fn exceeding_component_capacity_is_an_error() {
        // Given
        let registry = TypeRegistry::new(2, 8);
        registry.register_component::<Transform>().unwrap();
        registry.register_component::<MeshRenderer>().unwrap();

        // When
        let result = registry.register_component::<AbilitySlot>();

        // Then
        match result {
            Err(Error::TypeCapacity {
                kind,
                name,
                capacity,
            }) => {
                assert_eq!(kind, TypeKind::Component);
                assert!(name.ends_with("AbilitySlot"));
                assert_eq!(capacity, 2);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }

        // Then - already issued ids still resolve and nothing was consumed
        assert!(registry.register_component::<Transform>().is_ok());
        assert!(registry.component::<AbilitySlot>().is_none());
        assert_eq!(registry.component_count(), 2);
    }

    #[test]
    fn exceeding_system_capacity_is_an_error() {
        // Given
        let registry = TypeRegistry::new(8, 0);

        // When
        let result = registry.register_system::<RenderSystem>();

        // Then
        assert!(matches!(
            result,
            Err(Error::TypeCapacity {
                kind: TypeKind::System,
                capacity: 0,
                ..
            })
        ));
    }

    // ==================== Concurrent Registration ====================

    #[test]
    fn concurrent_registration_different_types() {
        // Given
        let registry = Arc::new(TypeRegistry::new(8, 8));

        let handles: Vec<_> = (0..12)
            .map(|i| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || match i % 3 {
                    0 => registry.register_component::<Transform>(),
                    1 => registry.register_component::<MeshRenderer>(),
                    _ => registry.register_component::<AbilitySlot>(),
                })
            })
            .collect();

        // When
        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();

        // Then - each type has one consistent id and the three ids are distinct
        for offset in 0..3 {
            let ids: Vec<_> = results.iter().skip(offset).step_by(3).collect();
            assert!(ids.iter().all(|id| *id == ids[0]));
        }
        assert_ne!(results[0], results[1]);
        assert_ne!(results[0], results[2]);
        assert_ne!(results[1], results[2]);
        assert_eq!(registry.component_count(), 3);
    }
}
