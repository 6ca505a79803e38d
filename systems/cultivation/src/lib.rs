#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure cultivation system that turns pointer strokes into field interactions.

use std::{collections::BTreeSet, time::Duration};

use homestead_core::{CellCoord, Command, Event, PlacementMode};

/// Interval at which a held pointer re-samples the hovered cell.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Pointer state distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CultivationInput {
    /// Cell under the pointer, if the pointer hits the field.
    pub pointer_cell: Option<CellCoord>,
    /// Indicates whether the pointer was pressed on this frame.
    pub pressed: bool,
    /// Indicates whether the pointer is held down on this frame.
    pub held: bool,
    /// Indicates whether the pointer was released on this frame.
    pub released: bool,
    /// Frame duration used to pace re-sampling while held.
    pub dt: Duration,
}

#[derive(Clone, Debug, Default)]
struct Stroke {
    visited: BTreeSet<CellCoord>,
    since_sample: Duration,
}

impl Stroke {
    fn visit(&mut self, cell: CellCoord, out: &mut Vec<Command>) {
        if self.visited.insert(cell) {
            out.push(Command::Interact { cell });
        }
    }
}

/// Cultivation system emitting at most one interaction per cell per stroke.
#[derive(Clone, Debug)]
pub struct Cultivation {
    mode: PlacementMode,
    interval: Duration,
    stroke: Option<Stroke>,
}

impl Default for Cultivation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cultivation {
    /// Creates a cultivation system sampling at [`DEFAULT_SAMPLE_INTERVAL`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_interval(DEFAULT_SAMPLE_INTERVAL)
    }

    /// Creates a cultivation system sampling held strokes at `interval`.
    #[must_use]
    pub const fn with_interval(interval: Duration) -> Self {
        Self {
            mode: PlacementMode::Idle,
            interval,
            stroke: None,
        }
    }

    /// Reports whether a stroke is in progress.
    #[must_use]
    pub const fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Consumes world events and pointer input to emit interaction commands.
    pub fn handle(&mut self, events: &[Event], input: CultivationInput, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::PlacementStarted { mode, .. } => self.mode = *mode,
                Event::StructurePlaced { .. }
                | Event::PlacementCancelled { .. }
                | Event::GridConfigured { .. } => self.mode = PlacementMode::Idle,
                _ => {}
            }
        }

        if self.mode.is_active() {
            self.stroke = None;
            return;
        }

        if input.pressed {
            let mut stroke = Stroke::default();
            if let Some(cell) = input.pointer_cell {
                stroke.visit(cell, out);
            }
            self.stroke = Some(stroke);
        } else if input.held {
            if let Some(stroke) = self.stroke.as_mut() {
                stroke.since_sample = stroke.since_sample.saturating_add(input.dt);
                if stroke.since_sample >= self.interval {
                    stroke.since_sample = Duration::ZERO;
                    if let Some(cell) = input.pointer_cell {
                        stroke.visit(cell, out);
                    }
                }
            }
        }

        if input.released {
            self.stroke = None;
        }
    }
}
