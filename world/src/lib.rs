#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Homestead.
//!
//! The world owns the cell grid, the committed structures, the in-flight
//! placement candidate and the crop field. Every mutation arrives as a
//! [`Command`] through [`apply`]; every observable consequence leaves as an
//! [`Event`] appended to the caller's buffer.

mod animation;
mod crops;
mod field;
mod grid;
pub mod occupancy;
mod placement;
mod structures;

use std::time::Duration;

use homestead_core::{
    Catalog, CellCoord, Command, ControllerError, Event, InteractionError, MAX_GRID_DIMENSION,
    WELCOME_BANNER,
};
use tracing::{info, warn};

pub use animation::{AnimationPhase, ToolAnimation};
pub use crops::Crop;
pub use field::CropField;
pub use grid::{Cell, Grid, DEFAULT_CELL_SIZE};
pub use placement::PlacementController;
pub use structures::{Structure, StructureRegistry};

const DEFAULT_GRID_COLUMNS: u32 = 10;
const DEFAULT_GRID_ROWS: u32 = 10;

/// Represents the authoritative Homestead world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: Catalog,
    grid: Grid,
    structures: StructureRegistry,
    placement: PlacementController,
    field: CropField,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a new world stocked with the built-in catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin())
    }

    /// Creates a new world whose definitions come from the provided catalog.
    #[must_use]
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            banner: WELCOME_BANNER,
            catalog,
            grid: Grid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_CELL_SIZE),
            structures: StructureRegistry::new(),
            placement: PlacementController::new(),
            field: CropField::new(),
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid {
            columns,
            rows,
            cell_size,
        } => {
            if columns > MAX_GRID_DIMENSION || rows > MAX_GRID_DIMENSION {
                warn!(columns, rows, max = MAX_GRID_DIMENSION, "grid configuration refused");
                out_events.push(Event::GridRejected { columns, rows });
                return;
            }
            world.placement.reset();
            world.structures.clear();
            world.field.clear();
            world.grid = Grid::new(columns, rows, cell_size);
            info!(columns, rows, cell_size = world.grid.cell_size(), "grid configured");
            out_events.push(Event::GridConfigured {
                columns,
                rows,
                cell_size: world.grid.cell_size(),
            });
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.field.tick(dt, &mut world.grid, out_events);
        }
        Command::BeginPlacement { definition } => {
            match world.catalog.structure(&definition) {
                Ok(definition) => world.placement.start_placement(
                    definition,
                    &mut world.grid,
                    &mut world.structures,
                    out_events,
                ),
                Err(error) => report_controller(Err(error.into()), out_events),
            }
        }
        Command::BeginRepositioning { structure } => {
            let result = world.placement.start_repositioning(
                structure,
                &mut world.grid,
                &mut world.structures,
                out_events,
            );
            report_controller(result, out_events);
        }
        Command::MoveCandidate { position } => {
            let result = world
                .placement
                .move_to_position(position, &world.grid, out_events);
            report_controller(result, out_events);
        }
        Command::MoveCandidateToCell { cell } => {
            let result = world.placement.move_to_cell(cell, &world.grid, out_events);
            report_controller(result, out_events);
        }
        Command::Rotate => {
            let result =
                world
                    .placement
                    .rotate(&mut world.grid, &mut world.structures, out_events);
            report_controller(result, out_events);
        }
        Command::ConfirmPlacement => {
            let result =
                world
                    .placement
                    .confirm(&mut world.grid, &mut world.structures, out_events);
            report_controller(result, out_events);
        }
        Command::CancelPlacement => {
            let result =
                world
                    .placement
                    .cancel(&mut world.grid, &mut world.structures, out_events);
            report_controller(result, out_events);
        }
        Command::SelectCell { cell } => {
            let result =
                world
                    .placement
                    .select_cell(cell, &world.grid, &mut world.structures, out_events);
            report_controller(result, out_events);
        }
        Command::Deselect => placement::deselect(&mut world.structures, out_events),
        Command::DeleteStructure { structure } => {
            let result = world.placement.delete(
                structure,
                &mut world.grid,
                &mut world.structures,
                out_events,
            );
            report_controller(result, out_events);
        }
        Command::DeleteSelected => {
            let result = world.placement.delete_selected(
                &mut world.grid,
                &mut world.structures,
                out_events,
            );
            report_controller(result, out_events);
        }
        Command::SelectCropKind { kind } => world.field.select_kind(kind, out_events),
        Command::SetInteractionGuard { guard } => {
            info!(?guard, "interaction guard changed");
            world.field.set_guard(guard);
        }
        Command::Interact { cell } => {
            let result = ensure_field_open(world).and_then(|()| {
                world
                    .field
                    .interact(cell, &mut world.grid, &world.catalog, out_events)
            });
            report_interaction(cell, result, out_events);
        }
        Command::Plant { cell } => {
            let result = ensure_field_open(world).and_then(|()| {
                world
                    .field
                    .plant(cell, &mut world.grid, &world.catalog, out_events)
            });
            report_interaction(cell, result, out_events);
        }
        Command::Water { cell } => {
            let result = ensure_field_open(world).and_then(|()| {
                world.field.water(cell, &world.grid, out_events)
            });
            report_interaction(cell, result, out_events);
        }
        Command::Harvest { cell } => {
            let result = ensure_field_open(world).and_then(|()| {
                world.field.harvest(cell, &mut world.grid, out_events)
            });
            report_interaction(cell, result, out_events);
        }
    }
}

/// Publishes a refused controller command.
///
/// Invalid footprints already produced a dedicated rejection event.
fn report_controller(result: Result<(), ControllerError>, out_events: &mut Vec<Event>) {
    match result {
        Ok(()) | Err(ControllerError::InvalidPlacement(_)) => {}
        Err(reason) => {
            warn!(%reason, "placement command refused");
            out_events.push(Event::ControllerRejected { reason });
        }
    }
}

/// Field commands wait while a placement holds cells released from the grid.
fn ensure_field_open(world: &World) -> Result<(), InteractionError> {
    if world.placement.mode().is_active() {
        return Err(InteractionError::PlacementInFlight);
    }
    Ok(())
}

fn report_interaction(
    cell: CellCoord,
    result: Result<(), InteractionError>,
    out_events: &mut Vec<Event>,
) {
    if let Err(reason) = result {
        warn!(column = cell.column(), row = cell.row(), %reason, "interaction refused");
        out_events.push(Event::InteractionRejected { cell, reason });
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{Crop, CropField, Grid, Structure, StructureRegistry, World};
    use homestead_core::{
        Catalog, CellCoord, CellRect, CellValidity, CropKind, CropSnapshot, Occupant,
        PlacementMode, StructureId, StructureSnapshot,
    };

    use crate::occupancy;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the definitions the world builds from.
    #[must_use]
    pub fn catalog(world: &World) -> &Catalog {
        &world.catalog
    }

    /// Provides read-only access to the cell grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Reports which entity claims the cell, if any.
    #[must_use]
    pub fn occupant(world: &World, cell: CellCoord) -> Option<Occupant> {
        world.grid.cell(cell).and_then(|slot| slot.occupant())
    }

    /// Simulated time accumulated from every tick.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Current lifecycle state of the placement controller.
    #[must_use]
    pub fn placement_mode(world: &World) -> PlacementMode {
        world.placement.mode()
    }

    /// Structure currently in flight, if any.
    #[must_use]
    pub fn candidate(world: &World) -> Option<&Structure> {
        world.placement.candidate()
    }

    /// Per-cell validity of the in-flight candidate's footprint.
    #[must_use]
    pub fn candidate_validity(world: &World) -> Option<Vec<CellValidity>> {
        let candidate = world.placement.candidate()?;
        Some(occupancy::cell_validity(
            &world.grid,
            &candidate.region(),
            Some(Occupant::Structure(candidate.id())),
        ))
    }

    /// Provides read-only access to the committed structures.
    #[must_use]
    pub fn structures(world: &World) -> &StructureRegistry {
        &world.structures
    }

    /// Snapshots every committed structure in identifier order.
    #[must_use]
    pub fn structure_view(world: &World) -> Vec<StructureSnapshot> {
        world.structures.iter().map(Structure::snapshot).collect()
    }

    /// Committed structure covering the cell.
    #[must_use]
    pub fn structure_at(world: &World, cell: CellCoord) -> Option<StructureId> {
        world.structures.find_at(cell).map(Structure::id)
    }

    /// Committed structures intersecting the rectangle, in identifier order.
    #[must_use]
    pub fn structures_in_area(world: &World, area: &CellRect) -> Vec<StructureId> {
        world
            .structures
            .find_in_area(area)
            .map(Structure::id)
            .collect()
    }

    /// Currently selected structure.
    #[must_use]
    pub fn selected_structure(world: &World) -> Option<StructureId> {
        world.structures.selected()
    }

    /// Provides read-only access to the crop field.
    #[must_use]
    pub fn field(world: &World) -> &CropField {
        &world.field
    }

    /// Snapshot of the crop growing on the cell.
    #[must_use]
    pub fn crop_at(world: &World, cell: CellCoord) -> Option<CropSnapshot> {
        world.field.crop_at(cell).map(Crop::snapshot)
    }

    /// Snapshots every crop in identifier order.
    #[must_use]
    pub fn crop_view(world: &World) -> Vec<CropSnapshot> {
        world.field.iter().map(Crop::snapshot).collect()
    }

    /// Crop kind sown by plant intents.
    #[must_use]
    pub fn selected_crop_kind(world: &World) -> CropKind {
        world.field.selected_kind()
    }

    /// Total yield harvested so far for the kind.
    #[must_use]
    pub fn harvested(world: &World, kind: CropKind) -> u32 {
        world.field.harvested(kind)
    }
}
