//! Authoritative structure state and the registry of committed structures.

use std::collections::BTreeMap;

use homestead_core::{
    CellCoord, CellRect, ControllerError, Footprint, Rotation, StructureDefinition, StructureId,
    StructureSnapshot, StructureState,
};

/// Placeable structure tracked by the world.
///
/// The covered region is always derived from the anchor, declared size and
/// rotation, so it can never drift from the footprint geometry.
#[derive(Clone, Debug)]
pub struct Structure {
    id: StructureId,
    definition: StructureDefinition,
    anchor: CellCoord,
    rotation: Rotation,
    state: StructureState,
}

impl Structure {
    pub(crate) fn new(id: StructureId, definition: StructureDefinition, anchor: CellCoord) -> Self {
        Self {
            id,
            definition,
            anchor,
            rotation: Rotation::IDENTITY,
            state: StructureState::Normal,
        }
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> StructureId {
        self.id
    }

    /// Catalog definition the structure was built from.
    #[must_use]
    pub const fn definition(&self) -> &StructureDefinition {
        &self.definition
    }

    /// Bottom-left cell of the footprint.
    #[must_use]
    pub const fn anchor(&self) -> CellCoord {
        self.anchor
    }

    /// Rotation currently applied.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Presentation state.
    #[must_use]
    pub const fn state(&self) -> StructureState {
        self.state
    }

    /// Footprint at the current rotation.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.definition.footprint(self.rotation)
    }

    /// Cells covered at the current anchor and rotation.
    #[must_use]
    pub const fn region(&self) -> CellRect {
        self.footprint().region(self.anchor)
    }

    /// Captures an immutable snapshot for queries.
    #[must_use]
    pub fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            id: self.id,
            definition: self.definition.id().to_owned(),
            anchor: self.anchor,
            rotation: self.rotation,
            region: self.region(),
            state: self.state,
        }
    }

    pub(crate) fn set_position(&mut self, anchor: CellCoord) {
        self.anchor = anchor;
    }

    pub(crate) fn rotate(&mut self) {
        self.rotation = self.rotation.next();
    }

    pub(crate) fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub(crate) fn set_state(&mut self, state: StructureState) {
        self.state = state;
    }
}

/// Registry that stores committed structures and manages identifier allocation.
#[derive(Debug)]
pub struct StructureRegistry {
    entries: BTreeMap<StructureId, Structure>,
    next_structure_id: StructureId,
    selected: Option<StructureId>,
}

impl StructureRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_structure_id: StructureId::new(0),
            selected: None,
        }
    }

    pub(crate) fn allocate_id(&mut self) -> StructureId {
        let id = self.next_structure_id;
        self.next_structure_id = StructureId::new(id.get().saturating_add(1));
        id
    }

    pub(crate) fn insert(&mut self, structure: Structure) {
        debug_assert!(
            !self.entries.contains_key(&structure.id()),
            "structure {:?} registered twice",
            structure.id(),
        );
        let _ = self.entries.insert(structure.id(), structure);
    }

    /// Removes the structure, clearing the selection slot if it pointed at it.
    pub(crate) fn remove(&mut self, id: StructureId) -> Option<Structure> {
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.entries.remove(&id)
    }

    /// Drops every structure while keeping identifiers monotonic.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.selected = None;
    }

    pub(crate) fn get_mut(&mut self, id: StructureId) -> Option<&mut Structure> {
        self.entries.get_mut(&id)
    }

    /// Retrieves a committed structure.
    #[must_use]
    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.entries.get(&id)
    }

    /// Reports whether the structure is committed.
    #[must_use]
    pub fn contains(&self, id: StructureId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of committed structures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether no structure is committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over committed structures in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.entries.values()
    }

    /// Structure whose footprint covers the cell.
    #[must_use]
    pub fn find_at(&self, cell: CellCoord) -> Option<&Structure> {
        self.entries
            .values()
            .find(|structure| structure.region().contains(cell))
    }

    /// Structures whose footprint intersects the rectangle, in identifier order.
    pub fn find_in_area<'a>(&'a self, area: &'a CellRect) -> impl Iterator<Item = &'a Structure> {
        self.entries
            .values()
            .filter(move |structure| structure.region().intersects(area))
    }

    /// Currently selected structure.
    #[must_use]
    pub const fn selected(&self) -> Option<StructureId> {
        self.selected
    }

    /// Moves the selection slot to `id`, returning the structure it replaced.
    pub(crate) fn select(
        &mut self,
        id: StructureId,
    ) -> Result<Option<StructureId>, ControllerError> {
        if !self.entries.contains_key(&id) {
            return Err(ControllerError::UnknownStructure(id));
        }

        let previous = self.deselect();
        if let Some(structure) = self.entries.get_mut(&id) {
            structure.set_state(StructureState::Selected);
        }
        self.selected = Some(id);
        Ok(previous)
    }

    /// Clears the selection slot, returning the structure that was selected.
    pub(crate) fn deselect(&mut self) -> Option<StructureId> {
        let previous = self.selected.take()?;
        if let Some(structure) = self.entries.get_mut(&previous) {
            structure.set_state(StructureState::Normal);
        }
        Some(previous)
    }
}
