#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Homestead engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation collaborators to react to. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command batches.

mod catalog;
mod footprint;

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use catalog::{
    Catalog, CatalogError, CropDefinition, ReadyAt, StructureDefinition, WaterProfile,
};
pub use footprint::{actual_size, occupied_cells, Footprint, Rotation};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Homestead.";

/// Largest number of columns or rows a grid may be configured with.
pub const MAX_GRID_DIMENSION: u32 = 1024;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the cell grid, tearing down every structure, candidate and crop.
    ConfigureGrid {
        /// Number of cell columns laid out along the x axis.
        columns: u32,
        /// Number of cell rows laid out along the z axis.
        rows: u32,
        /// Side length of a single square cell measured in world units.
        cell_size: f32,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Starts placing a new structure built from the named catalog definition.
    BeginPlacement {
        /// Identifier of the structure definition inside the catalog.
        definition: String,
    },
    /// Lifts a committed structure off the grid so it can be moved.
    BeginRepositioning {
        /// Identifier of the committed structure to reposition.
        structure: StructureId,
    },
    /// Moves the in-flight candidate under the provided world-space pointer.
    MoveCandidate {
        /// Pointer position expressed in world units on the XZ plane.
        position: Vec3,
    },
    /// Moves the in-flight candidate so that it is anchored at the provided cell.
    MoveCandidateToCell {
        /// Cell that becomes the candidate's anchor.
        cell: CellCoord,
    },
    /// Rotates the in-flight candidate, or the selected structure when idle.
    Rotate,
    /// Commits the in-flight candidate if its placement is valid.
    ConfirmPlacement,
    /// Abandons the in-flight candidate, restoring any repositioned structure.
    CancelPlacement,
    /// Selects the structure covering the provided cell, or clears the selection.
    SelectCell {
        /// Cell chosen by the player.
        cell: CellCoord,
    },
    /// Clears the current structure selection.
    Deselect,
    /// Removes a committed structure from the grid.
    DeleteStructure {
        /// Identifier of the structure targeted for removal.
        structure: StructureId,
    },
    /// Removes the currently selected structure, if any.
    DeleteSelected,
    /// Chooses which crop kind future plant intents will sow.
    SelectCropKind {
        /// Crop kind to plant from now on.
        kind: CropKind,
    },
    /// Chooses how broadly a running tool animation blocks further interaction.
    SetInteractionGuard {
        /// Guard applied to subsequent interactions.
        guard: InteractionGuard,
    },
    /// Plants, waters or harvests depending on the state of the provided cell.
    Interact {
        /// Cell the player interacted with.
        cell: CellCoord,
    },
    /// Plants the selected crop kind on the provided cell.
    Plant {
        /// Cell that should receive the crop.
        cell: CellCoord,
    },
    /// Waters the crop growing on the provided cell.
    Water {
        /// Cell holding the crop to water.
        cell: CellCoord,
    },
    /// Harvests the ripe crop growing on the provided cell.
    Harvest {
        /// Cell holding the crop to harvest.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was rebuilt with new dimensions.
    GridConfigured {
        /// Number of cell columns in the rebuilt grid.
        columns: u32,
        /// Number of cell rows in the rebuilt grid.
        rows: u32,
        /// Side length of a single cell in world units.
        cell_size: f32,
    },
    /// Reports that a grid reconfiguration was refused and the old grid kept.
    GridRejected {
        /// Requested number of cell columns.
        columns: u32,
        /// Requested number of cell rows.
        rows: u32,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a structure became the in-flight placement candidate.
    PlacementStarted {
        /// Identifier of the candidate structure.
        structure: StructureId,
        /// Catalog definition the candidate was built from.
        definition: String,
        /// Whether the candidate is new or being repositioned.
        mode: PlacementMode,
    },
    /// Publishes the candidate's preview state for visual feedback.
    PreviewUpdated {
        /// Identifier of the candidate structure.
        structure: StructureId,
        /// Region of cells the candidate would occupy.
        region: CellRect,
        /// Rotation currently applied to the candidate.
        rotation: Rotation,
        /// Preview state derived from the validity check.
        state: StructureState,
        /// Validity of each covered cell in footprint order.
        cells: Vec<CellValidity>,
    },
    /// Reports that a placement confirmation was refused.
    PlacementRejected {
        /// Identifier of the candidate structure.
        structure: StructureId,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a structure was committed to the grid.
    StructurePlaced {
        /// Identifier of the committed structure.
        structure: StructureId,
        /// Catalog definition the structure was built from.
        definition: String,
        /// Region of cells occupied by the structure.
        region: CellRect,
        /// Rotation applied to the structure.
        rotation: Rotation,
    },
    /// Confirms that an in-flight placement was abandoned.
    PlacementCancelled {
        /// Identifier of the abandoned candidate.
        structure: StructureId,
        /// Mode the candidate was in when cancelled.
        mode: PlacementMode,
    },
    /// Confirms that a committed structure turned in place.
    StructureRotated {
        /// Identifier of the rotated structure.
        structure: StructureId,
        /// Region of cells occupied after the rotation.
        region: CellRect,
        /// Rotation applied after the turn.
        rotation: Rotation,
    },
    /// Reports that a committed structure could not turn in place.
    RotationRejected {
        /// Identifier of the structure that kept its rotation.
        structure: StructureId,
        /// Specific reason the rotated footprint was refused.
        reason: PlacementError,
    },
    /// Confirms that a structure was removed from the grid.
    StructureRemoved {
        /// Identifier of the removed structure.
        structure: StructureId,
        /// Region of cells previously occupied by the structure.
        region: CellRect,
    },
    /// Announces that a structure became the selection.
    StructureSelected {
        /// Identifier of the selected structure.
        structure: StructureId,
    },
    /// Announces that a structure is no longer selected.
    StructureDeselected {
        /// Identifier of the previously selected structure.
        structure: StructureId,
    },
    /// Reports that a placement controller command was refused.
    ControllerRejected {
        /// Specific reason the command failed.
        reason: ControllerError,
    },
    /// Announces which crop kind future plant intents will sow.
    CropKindSelected {
        /// Crop kind that became active.
        kind: CropKind,
    },
    /// Confirms that a crop was sown onto a cell.
    CropPlanted {
        /// Identifier assigned to the crop.
        crop: CropId,
        /// Kind of crop that was sown.
        kind: CropKind,
        /// Cell claimed by the crop.
        cell: CellCoord,
    },
    /// Announces that a crop reached a new growth stage.
    CropStageAdvanced {
        /// Identifier of the growing crop.
        crop: CropId,
        /// Zero-based stage the crop advanced to.
        stage: u32,
    },
    /// Announces that a crop is ready to be harvested.
    CropReady {
        /// Identifier of the ripe crop.
        crop: CropId,
    },
    /// Confirms that a crop received a watering bonus.
    CropWatered {
        /// Identifier of the watered crop.
        crop: CropId,
        /// Length of the bonus countdown.
        duration: Duration,
    },
    /// Announces that a crop's watering bonus ran out.
    WaterBonusExpired {
        /// Identifier of the crop whose bonus expired.
        crop: CropId,
    },
    /// Asks the animation collaborator to play a tool animation.
    AnimationStarted {
        /// Identifier of the crop being worked on.
        crop: CropId,
        /// Tool that is animating.
        tool: ToolKind,
        /// Total length of the animation.
        duration: Duration,
    },
    /// Announces that a tool animation ran to completion.
    AnimationFinished {
        /// Identifier of the crop that was worked on.
        crop: CropId,
        /// Tool that finished animating.
        tool: ToolKind,
    },
    /// Confirms that a crop was harvested and its cell released.
    CropHarvested {
        /// Identifier of the harvested crop.
        crop: CropId,
        /// Kind of crop that was harvested.
        kind: CropKind,
        /// Cell the crop released.
        cell: CellCoord,
        /// Number of items produced by the harvest.
        quantity: u32,
    },
    /// Reports that a field interaction was refused.
    InteractionRejected {
        /// Cell the interaction targeted.
        cell: CellCoord,
        /// Specific reason the interaction failed.
        reason: InteractionError,
    },
}

/// Unique identifier assigned to a structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(u32);

impl StructureId {
    /// Creates a new structure identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the structure identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CropId(u32);

impl CropId {
    /// Creates a new crop identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the crop identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Entity that holds the exclusive claim on a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Occupant {
    /// A committed structure.
    Structure(StructureId),
    /// A planted crop.
    Crop(CropId),
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Columns run along the world x axis and rows along the world z axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Bottom-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Exclusive column bound, widened so it cannot overflow.
    #[must_use]
    pub const fn column_end(&self) -> u64 {
        self.origin.column as u64 + self.size.width as u64
    }

    /// Exclusive row bound, widened so it cannot overflow.
    #[must_use]
    pub const fn row_end(&self) -> u64 {
        self.origin.row as u64 + self.size.height as u64
    }

    /// Reports whether the rectangle covers the provided cell.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let column = u64::from(cell.column());
        let row = u64::from(cell.row());
        column >= u64::from(self.origin.column())
            && column < self.column_end()
            && row >= u64::from(self.origin.row())
            && row < self.row_end()
    }

    /// Reports whether the two rectangles share at least one cell.
    #[must_use]
    pub fn intersects(&self, other: &CellRect) -> bool {
        if self.size.area() == 0 || other.size.area() == 0 {
            return false;
        }

        u64::from(self.origin.column()) < other.column_end()
            && u64::from(other.origin.column()) < self.column_end()
            && u64::from(self.origin.row()) < other.row_end()
            && u64::from(other.origin.row()) < self.row_end()
    }

    /// Iterates over every covered cell in row-major order.
    ///
    /// The cell at column offset `i` and row offset `j` is yielded at index
    /// `j * width + i`, which presentation layers rely on for indexed overlays.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let origin = self.origin;
        let width = self.size.width();
        let height = self.size.height();
        (0..height).flat_map(move |j| {
            (0..width).map(move |i| {
                CellCoord::new(
                    origin.column().saturating_add(i),
                    origin.row().saturating_add(j),
                )
            })
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells, measured along the z axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns the size with its axes swapped.
    #[must_use]
    pub const fn transposed(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Number of cells covered by a rectangle of this size.
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Validity of a single footprint cell, published for highlight overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellValidity {
    /// Cell covered by the footprint.
    pub cell: CellCoord,
    /// Whether the cell may be claimed by the footprint.
    pub valid: bool,
}

/// Lifecycle state of the placement controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlacementMode {
    /// No structure is in flight.
    #[default]
    Idle,
    /// A freshly created structure is being placed.
    PlacingNew,
    /// A previously committed structure is being moved.
    Repositioning,
}

impl PlacementMode {
    /// Reports whether a candidate structure is in flight.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Presentation state of a structure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StructureState {
    /// Committed and not selected.
    #[default]
    Normal,
    /// Committed and currently selected.
    Selected,
    /// In flight over a placement the grid would accept.
    ValidPreview,
    /// In flight over a placement the grid would refuse.
    InvalidPreview,
}

/// Growth state of a planted crop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CropState {
    /// Freshly sown.
    #[default]
    Seed,
    /// Accumulating growth time toward the final stage.
    Growing,
    /// Fully grown and waiting to be harvested.
    Ready,
    /// Harvested; terminal.
    Harvested,
}

/// Kinds of crops that can be sown into the field.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CropKind {
    /// Broccoli grows at a fixed pace and cannot be watered.
    Broccoli,
    /// Corn grows faster and yields more while watered.
    #[default]
    Corn,
}

impl CropKind {
    /// Every crop kind in declaration order.
    pub const ALL: [CropKind; 2] = [CropKind::Broccoli, CropKind::Corn];

    /// Human-readable name of the crop kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Broccoli => "Broccoli",
            Self::Corn => "Corn",
        }
    }
}

/// Scope of the busy check applied before every field interaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionGuard {
    /// Only an animation on the targeted cell blocks the interaction.
    #[default]
    PerCell,
    /// Any running animation anywhere in the field blocks the interaction.
    Global,
}

/// Tools whose animations gate crop interactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Harvest swing played before a ripe crop is collected.
    Harvest,
    /// Watering pour played when a growing crop is watered.
    Watering,
}

/// Immutable representation of a single structure used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureSnapshot {
    /// Identifier allocated to the structure by the world.
    pub id: StructureId,
    /// Catalog definition the structure was built from.
    pub definition: String,
    /// Anchor cell of the structure's footprint.
    pub anchor: CellCoord,
    /// Rotation applied to the structure.
    pub rotation: Rotation,
    /// Region of cells covered by the structure.
    pub region: CellRect,
    /// Presentation state of the structure.
    pub state: StructureState,
}

/// Immutable representation of a single crop used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropSnapshot {
    /// Identifier allocated to the crop by the world.
    pub id: CropId,
    /// Kind of crop that was sown.
    pub kind: CropKind,
    /// Cell claimed by the crop.
    pub cell: CellCoord,
    /// Current growth state.
    pub state: CropState,
    /// Zero-based growth stage.
    pub stage: u32,
    /// Growth time accumulated toward the next stage.
    pub growth_timer: Duration,
    /// Whether a watering bonus is active.
    pub watered: bool,
    /// Whether a tool animation currently blocks interaction.
    pub busy: bool,
    /// Yield the crop would produce if harvested now.
    pub harvest_yield: u32,
}

/// Reasons a footprint may be refused by the occupancy engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum PlacementError {
    /// The footprint extends beyond the configured grid bounds.
    #[error("footprint extends beyond the grid bounds")]
    OutOfBounds,
    /// The footprint overlaps a cell claimed by another occupant.
    #[error("footprint overlaps an occupied cell")]
    Occupied,
}

/// Reasons a placement controller command may be refused.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    /// The command requires an in-flight candidate but none exists.
    #[error("no structure placement is in flight")]
    NoCandidate,
    /// The candidate footprint cannot be committed where it stands.
    #[error("candidate placement is invalid: {0}")]
    InvalidPlacement(#[from] PlacementError),
    /// The referenced structure is not committed to the registry.
    #[error("structure {} is not committed to the grid", .0.get())]
    UnknownStructure(StructureId),
    /// The requested definition is missing from the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The command acts on the selection but nothing is selected.
    #[error("no structure is selected")]
    NothingSelected,
}

/// Reasons a crop field interaction may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum InteractionError {
    /// The cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The cell is already claimed, so nothing can be sown there.
    #[error("cell is already occupied")]
    Occupied,
    /// The cell is claimed by something other than a crop.
    #[error("cell is occupied by a structure")]
    OccupiedByStructure,
    /// The cell holds no crop to act on.
    #[error("no crop grows on this cell")]
    NoCrop,
    /// The crop has not finished growing.
    #[error("crop is not ready to harvest yet")]
    NotReady,
    /// The crop is fully grown and no longer benefits from water.
    #[error("crop is already ready to harvest")]
    AlreadyReady,
    /// The crop was already harvested.
    #[error("crop has already been harvested")]
    AlreadyHarvested,
    /// A tool animation is still running.
    #[error("a tool animation is still in progress")]
    AlreadyBusy,
    /// The crop kind has no watering profile.
    #[error("crop kind cannot be watered")]
    NotWaterable,
    /// The catalog has no definition for the selected crop kind.
    #[error("no crop definition configured for {}", .0.name())]
    MissingDefinition(CropKind),
    /// A structure placement holds released cells until it is confirmed or cancelled.
    #[error("a structure placement is in flight")]
    PlacementInFlight,
}

#[cfg(test)]
mod tests {
    use super::{CellCoord, CellRect, CellRectSize, ControllerError, PlacementError};

    #[test]
    fn rect_cells_are_row_major() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(2, 5), CellRectSize::new(3, 2));
        let cells: Vec<_> = rect.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(2, 5),
                CellCoord::new(3, 5),
                CellCoord::new(4, 5),
                CellCoord::new(2, 6),
                CellCoord::new(3, 6),
                CellCoord::new(4, 6),
            ]
        );
    }

    #[test]
    fn rect_contains_only_covered_cells() {
        let rect = CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 1));
        assert!(rect.contains(CellCoord::new(1, 1)));
        assert!(rect.contains(CellCoord::new(2, 1)));
        assert!(!rect.contains(CellCoord::new(3, 1)));
        assert!(!rect.contains(CellCoord::new(1, 2)));
        assert!(!rect.contains(CellCoord::new(0, 1)));
    }

    #[test]
    fn rect_intersection_detects_shared_cells() {
        let left = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 2));
        let touching = CellRect::from_origin_and_size(CellCoord::new(2, 0), CellRectSize::new(2, 2));
        let overlapping =
            CellRect::from_origin_and_size(CellCoord::new(1, 1), CellRectSize::new(2, 2));
        assert!(!left.intersects(&touching));
        assert!(left.intersects(&overlapping));
        assert!(overlapping.intersects(&left));
    }

    #[test]
    fn rect_bounds_do_not_overflow_near_the_coordinate_limit() {
        let rect = CellRect::from_origin_and_size(
            CellCoord::new(u32::MAX, u32::MAX),
            CellRectSize::new(2, 2),
        );
        assert_eq!(rect.column_end(), u64::from(u32::MAX) + 2);
        assert!(rect.contains(CellCoord::new(u32::MAX, u32::MAX)));
    }

    #[test]
    fn controller_error_wraps_placement_error() {
        let error: ControllerError = PlacementError::Occupied.into();
        assert_eq!(
            error.to_string(),
            "candidate placement is invalid: footprint overlaps an occupied cell"
        );
    }
}
