#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure builder system responsible for emitting structure placement commands.

use glam::Vec3;
use homestead_core::{CellCoord, Command, Event, PlacementMode, StructureId, StructureState};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuilderInput {
    /// Pointer position projected onto the ground plane, if it hits the ground.
    pub cursor_position: Option<Vec3>,
    /// Cell the player clicked on this frame.
    pub select_cell: Option<CellCoord>,
    /// Structure definition the player picked from the build menu this frame.
    pub begin_placement: Option<String>,
    /// Indicates whether the player confirmed a placement on this frame.
    pub confirm_action: bool,
    /// Indicates whether the player cancelled on this frame.
    pub cancel_action: bool,
    /// Indicates whether the player requested a quarter turn on this frame.
    pub rotate_action: bool,
    /// Indicates whether the player requested removal of the selection.
    pub delete_action: bool,
    /// Indicates whether the player asked to move the selection.
    pub reposition_action: bool,
}

/// Builder system that translates frame input into placement commands.
///
/// The placement mode and the selection are mirrored from world events, so
/// the system never inspects world state directly.
#[derive(Debug, Clone, Default)]
pub struct Builder {
    mode: PlacementMode,
    selected: Option<StructureId>,
    placeable: bool,
    last_cursor: Option<Vec3>,
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: PlacementMode::Idle,
            selected: None,
            placeable: false,
            last_cursor: None,
        }
    }

    /// Placement mode last reported by the world.
    #[must_use]
    pub const fn mode(&self) -> PlacementMode {
        self.mode
    }

    /// Structure selection last reported by the world.
    #[must_use]
    pub const fn selected(&self) -> Option<StructureId> {
        self.selected
    }

    /// Reports whether the world last previewed the candidate as placeable.
    #[must_use]
    pub const fn placeable(&self) -> bool {
        self.placeable
    }

    /// Consumes world events and adapter-derived input to emit builder commands.
    pub fn handle(&mut self, events: &[Event], input: &BuilderInput, out: &mut Vec<Command>) {
        for event in events {
            self.observe(event);
        }

        if let Some(definition) = &input.begin_placement {
            out.push(Command::BeginPlacement {
                definition: definition.clone(),
            });
            self.last_cursor = None;
            return;
        }

        if self.mode.is_active() {
            self.handle_placing(input, out);
        } else {
            self.handle_idle(input, out);
        }
    }

    fn observe(&mut self, event: &Event) {
        match event {
            Event::PlacementStarted { mode, .. } => {
                self.mode = *mode;
                self.placeable = false;
            }
            Event::PreviewUpdated { state, .. } => {
                self.placeable = *state == StructureState::ValidPreview;
            }
            Event::StructurePlaced { .. } | Event::PlacementCancelled { .. } => {
                self.mode = PlacementMode::Idle;
                self.placeable = false;
            }
            Event::GridConfigured { .. } => {
                self.mode = PlacementMode::Idle;
                self.placeable = false;
                self.selected = None;
            }
            Event::StructureSelected { structure } => self.selected = Some(*structure),
            Event::StructureDeselected { structure } | Event::StructureRemoved { structure, .. } => {
                if self.selected == Some(*structure) {
                    self.selected = None;
                }
            }
            _ => {}
        }
    }

    fn handle_placing(&mut self, input: &BuilderInput, out: &mut Vec<Command>) {
        if let Some(position) = input.cursor_position {
            if self.last_cursor != Some(position) {
                out.push(Command::MoveCandidate { position });
                self.last_cursor = Some(position);
            }
        }
        if let Some(cell) = input.select_cell {
            out.push(Command::MoveCandidateToCell { cell });
        }
        if input.rotate_action {
            out.push(Command::Rotate);
        }

        if input.cancel_action {
            out.push(Command::CancelPlacement);
        } else if input.confirm_action && self.placeable {
            out.push(Command::ConfirmPlacement);
        }
    }

    fn handle_idle(&mut self, input: &BuilderInput, out: &mut Vec<Command>) {
        self.last_cursor = None;

        if let Some(cell) = input.select_cell {
            out.push(Command::SelectCell { cell });
            return;
        }

        let Some(selected) = self.selected else {
            return;
        };

        if input.delete_action {
            out.push(Command::DeleteStructure {
                structure: selected,
            });
        } else if input.reposition_action {
            out.push(Command::BeginRepositioning {
                structure: selected,
            });
        } else if input.rotate_action {
            out.push(Command::Rotate);
        } else if input.cancel_action {
            out.push(Command::Deselect);
        }
    }
}
