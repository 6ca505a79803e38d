//! Placement controller driving structures through preview, commit and rollback.

use std::mem;

use glam::Vec3;
use homestead_core::{
    CellCoord, ControllerError, Event, Occupant, PlacementMode, Rotation, StructureDefinition,
    StructureId, StructureState,
};
use tracing::{debug, info, warn};

use crate::{
    grid::Grid,
    occupancy,
    structures::{Structure, StructureRegistry},
};

/// Cell every freshly created candidate is anchored at until the pointer moves.
const DEFAULT_ANCHOR: CellCoord = CellCoord::new(0, 0);

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    PlacingNew {
        candidate: Structure,
    },
    Repositioning {
        candidate: Structure,
        committed_anchor: CellCoord,
        committed_rotation: Rotation,
    },
}

impl Phase {
    fn candidate(&self) -> Option<&Structure> {
        match self {
            Self::Idle => None,
            Self::PlacingNew { candidate } | Self::Repositioning { candidate, .. } => {
                Some(candidate)
            }
        }
    }

    fn candidate_mut(&mut self) -> Option<&mut Structure> {
        match self {
            Self::Idle => None,
            Self::PlacingNew { candidate } | Self::Repositioning { candidate, .. } => {
                Some(candidate)
            }
        }
    }

    fn mode(&self) -> PlacementMode {
        match self {
            Self::Idle => PlacementMode::Idle,
            Self::PlacingNew { .. } => PlacementMode::PlacingNew,
            Self::Repositioning { .. } => PlacementMode::Repositioning,
        }
    }
}

/// Owns the single in-flight candidate and every selection transition.
///
/// A candidate never claims grid cells; only [`occupancy::commit`] on confirm
/// (or on rollback of a reposition) writes its footprint into the grid.
#[derive(Debug, Default)]
pub struct PlacementController {
    phase: Phase,
}

impl PlacementController {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn mode(&self) -> PlacementMode {
        self.phase.mode()
    }

    /// Structure currently in flight, if any.
    #[must_use]
    pub fn candidate(&self) -> Option<&Structure> {
        self.phase.candidate()
    }

    /// Drops the candidate without touching the grid, used when the grid is rebuilt.
    pub(crate) fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    pub(crate) fn start_placement(
        &mut self,
        definition: &StructureDefinition,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) {
        deselect(registry, out_events);
        self.abandon(grid, registry, out_events);

        let id = registry.allocate_id();
        let candidate = Structure::new(id, definition.clone(), DEFAULT_ANCHOR);
        info!(structure = id.get(), definition = definition.id(), "placement started");
        out_events.push(Event::PlacementStarted {
            structure: id,
            definition: definition.id().to_owned(),
            mode: PlacementMode::PlacingNew,
        });
        self.phase = Phase::PlacingNew { candidate };
        self.refresh_preview(grid, out_events);
    }

    pub(crate) fn start_repositioning(
        &mut self,
        structure: StructureId,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if !registry.contains(structure) {
            return Err(ControllerError::UnknownStructure(structure));
        }

        deselect(registry, out_events);
        self.abandon(grid, registry, out_events);

        let candidate = registry
            .remove(structure)
            .ok_or(ControllerError::UnknownStructure(structure))?;
        let _ = occupancy::release(grid, Occupant::Structure(structure));

        info!(structure = structure.get(), "repositioning started");
        out_events.push(Event::PlacementStarted {
            structure,
            definition: candidate.definition().id().to_owned(),
            mode: PlacementMode::Repositioning,
        });
        self.phase = Phase::Repositioning {
            committed_anchor: candidate.anchor(),
            committed_rotation: candidate.rotation(),
            candidate,
        };
        self.refresh_preview(grid, out_events);
        Ok(())
    }

    /// Moves the candidate under a world-space pointer; positions off the grid are ignored.
    pub(crate) fn move_to_position(
        &mut self,
        position: Vec3,
        grid: &Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if self.phase.candidate().is_none() {
            return Err(ControllerError::NoCandidate);
        }
        match grid.world_to_cell(position) {
            Some(cell) => self.move_to_cell(cell, grid, out_events),
            None => Ok(()),
        }
    }

    pub(crate) fn move_to_cell(
        &mut self,
        cell: CellCoord,
        grid: &Grid,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        let candidate = self
            .phase
            .candidate_mut()
            .ok_or(ControllerError::NoCandidate)?;
        if candidate.anchor() == cell {
            return Ok(());
        }
        candidate.set_position(cell);
        self.refresh_preview(grid, out_events);
        Ok(())
    }

    /// Rotates the candidate, or the selected structure in place when idle.
    pub(crate) fn rotate(
        &mut self,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if let Some(candidate) = self.phase.candidate_mut() {
            candidate.rotate();
            self.refresh_preview(grid, out_events);
            return Ok(());
        }

        let id = registry.selected().ok_or(ControllerError::NothingSelected)?;
        let structure = registry
            .get_mut(id)
            .ok_or(ControllerError::UnknownStructure(id))?;
        let owner = Occupant::Structure(id);

        let _ = occupancy::release(grid, owner);
        structure.rotate();
        let outcome = occupancy::check(grid, &structure.region(), Some(owner));
        if outcome.is_err() {
            structure.set_rotation(structure.rotation().previous());
        }
        occupancy::commit(grid, &structure.region(), owner);

        match outcome {
            Ok(()) => {
                debug!(structure = id.get(), rotation = structure.rotation().index(), "structure rotated");
                out_events.push(Event::StructureRotated {
                    structure: id,
                    region: structure.region(),
                    rotation: structure.rotation(),
                });
                Ok(())
            }
            Err(reason) => {
                warn!(structure = id.get(), %reason, "rotation rolled back");
                out_events.push(Event::RotationRejected {
                    structure: id,
                    reason,
                });
                Err(reason.into())
            }
        }
    }

    pub(crate) fn confirm(
        &mut self,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        let candidate = self.phase.candidate().ok_or(ControllerError::NoCandidate)?;
        let owner = Occupant::Structure(candidate.id());
        if let Err(reason) = occupancy::check(grid, &candidate.region(), Some(owner)) {
            warn!(structure = candidate.id().get(), %reason, "placement rejected");
            out_events.push(Event::PlacementRejected {
                structure: candidate.id(),
                reason,
            });
            return Err(reason.into());
        }

        let mut candidate = match mem::take(&mut self.phase) {
            Phase::Idle => return Err(ControllerError::NoCandidate),
            Phase::PlacingNew { candidate } | Phase::Repositioning { candidate, .. } => candidate,
        };
        occupancy::commit(grid, &candidate.region(), owner);
        candidate.set_state(StructureState::Normal);

        info!(
            structure = candidate.id().get(),
            definition = candidate.definition().id(),
            column = candidate.anchor().column(),
            row = candidate.anchor().row(),
            "structure placed"
        );
        out_events.push(Event::StructurePlaced {
            structure: candidate.id(),
            definition: candidate.definition().id().to_owned(),
            region: candidate.region(),
            rotation: candidate.rotation(),
        });
        registry.insert(candidate);
        Ok(())
    }

    pub(crate) fn cancel(
        &mut self,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if self.phase.candidate().is_none() {
            return Err(ControllerError::NoCandidate);
        }
        self.abandon(grid, registry, out_events);
        Ok(())
    }

    pub(crate) fn delete(
        &mut self,
        structure: StructureId,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if !registry.contains(structure) {
            return Err(ControllerError::UnknownStructure(structure));
        }
        if registry.selected() == Some(structure) {
            deselect(registry, out_events);
        }

        let removed = registry
            .remove(structure)
            .ok_or(ControllerError::UnknownStructure(structure))?;
        let _ = occupancy::release(grid, Occupant::Structure(structure));

        info!(structure = structure.get(), "structure removed");
        out_events.push(Event::StructureRemoved {
            structure,
            region: removed.region(),
        });
        Ok(())
    }

    pub(crate) fn delete_selected(
        &mut self,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        let selected = registry.selected().ok_or(ControllerError::NothingSelected)?;
        self.delete(selected, grid, registry, out_events)
    }

    /// Moves the candidate onto the cell while placing, otherwise selects what covers it.
    pub(crate) fn select_cell(
        &mut self,
        cell: CellCoord,
        grid: &Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) -> Result<(), ControllerError> {
        if self.phase.candidate().is_some() {
            return self.move_to_cell(cell, grid, out_events);
        }

        match registry.find_at(cell).map(Structure::id) {
            Some(id) => select(id, registry, out_events),
            None => {
                deselect(registry, out_events);
                Ok(())
            }
        }
    }

    /// Abandons whatever is in flight; a no-op when idle.
    fn abandon(
        &mut self,
        grid: &mut Grid,
        registry: &mut StructureRegistry,
        out_events: &mut Vec<Event>,
    ) {
        match mem::take(&mut self.phase) {
            Phase::Idle => {}
            Phase::PlacingNew { candidate } => {
                debug_assert!(
                    grid.iter()
                        .all(|(_, cell)| cell.occupant() != Some(Occupant::Structure(candidate.id()))),
                    "new candidates must never claim cells",
                );
                info!(structure = candidate.id().get(), "placement cancelled");
                out_events.push(Event::PlacementCancelled {
                    structure: candidate.id(),
                    mode: PlacementMode::PlacingNew,
                });
            }
            Phase::Repositioning {
                mut candidate,
                committed_anchor,
                committed_rotation,
            } => {
                candidate.set_position(committed_anchor);
                candidate.set_rotation(committed_rotation);
                candidate.set_state(StructureState::Normal);
                let owner = Occupant::Structure(candidate.id());
                occupancy::commit(grid, &candidate.region(), owner);

                info!(structure = candidate.id().get(), "repositioning cancelled");
                out_events.push(Event::PlacementCancelled {
                    structure: candidate.id(),
                    mode: PlacementMode::Repositioning,
                });
                registry.insert(candidate);
            }
        }
    }

    fn refresh_preview(&mut self, grid: &Grid, out_events: &mut Vec<Event>) {
        let Some(candidate) = self.phase.candidate_mut() else {
            return;
        };
        let owner = Occupant::Structure(candidate.id());
        let region = candidate.region();
        let cells = occupancy::cell_validity(grid, &region, Some(owner));
        let valid = occupancy::is_valid(grid, &region, Some(owner));
        let state = if valid {
            StructureState::ValidPreview
        } else {
            StructureState::InvalidPreview
        };
        candidate.set_state(state);

        debug!(
            structure = candidate.id().get(),
            column = region.origin().column(),
            row = region.origin().row(),
            valid,
            "preview updated"
        );
        out_events.push(Event::PreviewUpdated {
            structure: candidate.id(),
            region,
            rotation: candidate.rotation(),
            state,
            cells,
        });
    }
}

fn select(
    id: StructureId,
    registry: &mut StructureRegistry,
    out_events: &mut Vec<Event>,
) -> Result<(), ControllerError> {
    if registry.selected() == Some(id) {
        return Ok(());
    }

    if let Some(previous) = registry.select(id)? {
        out_events.push(Event::StructureDeselected {
            structure: previous,
        });
    }
    debug!(structure = id.get(), "structure selected");
    out_events.push(Event::StructureSelected { structure: id });
    Ok(())
}

pub(crate) fn deselect(registry: &mut StructureRegistry, out_events: &mut Vec<Event>) {
    if let Some(previous) = registry.deselect() {
        debug!(structure = previous.get(), "structure deselected");
        out_events.push(Event::StructureDeselected {
            structure: previous,
        });
    }
}
