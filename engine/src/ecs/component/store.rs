use std::{any::Any, collections::BTreeMap};

use crate::ecs::{
    component::{self, Component},
    entity,
};

/// A type-erased component instance along with the hook that finalizes it.
struct Cell {
    value: Box<dyn Any>,
    finalize: fn(&mut dyn Any),
}

impl Cell {
    fn new<C: Component>(component: C) -> Self {
        Self {
            value: Box::new(component),
            finalize: Self::finalize_impl::<C>,
        }
    }

    fn finalize_impl<C: Component>(value: &mut dyn Any) {
        if let Some(component) = value.downcast_mut::<C>() {
            component.finalize();
        }
    }

    /// Run the finalize hook and drop the instance.
    fn finalize(mut self) {
        (self.finalize)(self.value.as_mut());
    }
}

/// The components of one entity, keyed by component id.
#[derive(Default)]
struct Row {
    cells: BTreeMap<component::Id, Cell>,
}

/// Storage for every component instance in a world.
///
/// Rows are indexed by entity id. The store knows nothing about liveness or masks; the
/// world keeps those consistent with what is stored here.
#[derive(Default)]
pub struct Store {
    rows: Vec<Row>,
}

impl Store {
    /// Construct an empty store.
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Store a component for an entity and run its initialize hook.
    ///
    /// An instance of the same type that is already stored is finalized and dropped first.
    /// Returns `true` if such an instance was replaced.
    pub fn insert<C: Component>(
        &mut self,
        entity: entity::Id,
        id: component::Id,
        component: C,
    ) -> bool {
        let index = entity.index();
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, Row::default);
        }
        let row = &mut self.rows[index];
        let replaced = row.cells.remove(&id).map(Cell::finalize).is_some();

        let mut cell = Cell::new(component);
        if let Some(component) = cell.value.downcast_mut::<C>() {
            component.initialize();
        }
        row.cells.insert(id, cell);
        replaced
    }

    /// Finalize and drop a component. Returns `false` if there was nothing to remove.
    pub fn remove(&mut self, entity: entity::Id, id: component::Id) -> bool {
        self.rows
            .get_mut(entity.index())
            .and_then(|row| row.cells.remove(&id))
            .map(Cell::finalize)
            .is_some()
    }

    /// Finalize and drop every component of an entity, in ascending component id order.
    /// Returns how many were removed.
    pub fn clear(&mut self, entity: entity::Id) -> usize {
        let Some(row) = self.rows.get_mut(entity.index()) else {
            return 0;
        };
        let cells = std::mem::take(&mut row.cells);
        let count = cells.len();
        cells.into_values().for_each(Cell::finalize);
        count
    }

    /// Get a component of an entity.
    pub fn get<C: Component>(&self, entity: entity::Id, id: component::Id) -> Option<&C> {
        self.rows
            .get(entity.index())
            .and_then(|row| row.cells.get(&id))
            .and_then(|cell| cell.value.downcast_ref::<C>())
    }

    /// Get a mutable component of an entity.
    pub fn get_mut<C: Component>(
        &mut self,
        entity: entity::Id,
        id: component::Id,
    ) -> Option<&mut C> {
        self.rows
            .get_mut(entity.index())
            .and_then(|row| row.cells.get_mut(&id))
            .and_then(|cell| cell.value.downcast_mut::<C>())
    }
}
