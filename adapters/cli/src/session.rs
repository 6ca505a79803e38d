//! Frame loop that feeds scripted input through the systems into the world.

use std::time::Duration;

use glam::Vec3;
use homestead_core::{CellCoord, Command, CropKind, Event};
use homestead_system_builder::{Builder, BuilderInput};
use homestead_system_cultivation::{Cultivation, CultivationInput};
use homestead_world::{apply, query, World};
use tracing::{debug, info};

/// Drives the world one frame at a time.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    builder: Builder,
    cultivation: Cultivation,
    pending: Vec<Event>,
    dt: Duration,
    rejections: usize,
}

/// Outcome of a scripted session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) structures: usize,
    pub(crate) crops_in_field: usize,
    pub(crate) harvested: Vec<(CropKind, u32)>,
    pub(crate) rejections: usize,
}

impl Session {
    pub(crate) fn new(world: World, dt: Duration) -> Self {
        Self {
            world,
            builder: Builder::new(),
            cultivation: Cultivation::new(),
            pending: Vec::new(),
            dt,
            rejections: 0,
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Applies a command outside the frame loop, keeping its events for the next frame.
    pub(crate) fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events);
        self.record(&events);
        self.pending.extend(events);
    }

    /// Runs one frame: systems react to last frame's events, then time advances.
    pub(crate) fn frame(&mut self, builder: &BuilderInput, pointer: CultivationInput) {
        let events = std::mem::take(&mut self.pending);
        let mut commands = Vec::new();
        self.builder.handle(&events, builder, &mut commands);
        self.cultivation.handle(
            &events,
            CultivationInput {
                dt: self.dt,
                ..pointer
            },
            &mut commands,
        );
        commands.push(Command::Tick { dt: self.dt });

        let mut produced = Vec::new();
        for command in commands {
            debug!(?command, "applying command");
            apply(&mut self.world, command, &mut produced);
        }
        self.record(&produced);
        self.pending = produced;
    }

    /// Runs frames with no input.
    pub(crate) fn idle(&mut self, frames: u32) {
        for _ in 0..frames {
            self.frame(&BuilderInput::default(), CultivationInput::default());
        }
    }

    /// Places a structure by picking it from the menu, pointing at `anchor` and confirming.
    pub(crate) fn build(&mut self, definition: &str, anchor: CellCoord, turns: u32) {
        self.frame(
            &BuilderInput {
                begin_placement: Some(definition.to_owned()),
                ..BuilderInput::default()
            },
            CultivationInput::default(),
        );
        let cursor: Vec3 = query::grid(&self.world).cell_to_world(anchor);
        self.frame(
            &BuilderInput {
                cursor_position: Some(cursor),
                ..BuilderInput::default()
            },
            CultivationInput::default(),
        );
        for _ in 0..turns {
            self.frame(
                &BuilderInput {
                    cursor_position: Some(cursor),
                    rotate_action: true,
                    ..BuilderInput::default()
                },
                CultivationInput::default(),
            );
        }
        self.frame(
            &BuilderInput {
                cursor_position: Some(cursor),
                confirm_action: true,
                ..BuilderInput::default()
            },
            CultivationInput::default(),
        );
        self.idle(1);
    }

    /// Drags the pointer across `cells` in a single press-hold-release stroke.
    pub(crate) fn stroke(&mut self, cells: &[CellCoord]) {
        let Some((first, rest)) = cells.split_first() else {
            return;
        };
        self.frame(
            &BuilderInput::default(),
            CultivationInput {
                pointer_cell: Some(*first),
                pressed: true,
                held: true,
                ..CultivationInput::default()
            },
        );
        for cell in rest {
            self.frame(
                &BuilderInput::default(),
                CultivationInput {
                    pointer_cell: Some(*cell),
                    held: true,
                    ..CultivationInput::default()
                },
            );
        }
        self.frame(
            &BuilderInput::default(),
            CultivationInput {
                released: true,
                ..CultivationInput::default()
            },
        );
    }

    pub(crate) fn summary(&self) -> Summary {
        Summary {
            structures: query::structures(&self.world).len(),
            crops_in_field: query::crop_view(&self.world).len(),
            harvested: CropKind::ALL
                .iter()
                .map(|kind| (*kind, query::harvested(&self.world, *kind)))
                .collect(),
            rejections: self.rejections,
        }
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::StructurePlaced {
                    structure,
                    definition,
                    region,
                    ..
                } => info!(
                    structure = structure.get(),
                    definition = definition.as_str(),
                    column = region.origin().column(),
                    row = region.origin().row(),
                    "built"
                ),
                Event::CropHarvested { kind, quantity, .. } => {
                    info!(kind = kind.name(), quantity, "collected harvest");
                }
                Event::GridRejected { .. }
                | Event::PlacementRejected { .. }
                | Event::RotationRejected { .. }
                | Event::ControllerRejected { .. }
                | Event::InteractionRejected { .. } => {
                    self.rejections += 1;
                }
                _ => {}
            }
        }
    }
}

/// Plays a short farm day: build, sow, water, wait and reap.
pub(crate) fn run_script(session: &mut Session, growth_frames: u32) {
    session.build("shed", CellCoord::new(0, 0), 0);
    session.build("barn", CellCoord::new(6, 0), 1);
    session.build("coop", CellCoord::new(6, 6), 0);

    session.submit(Command::SelectCell {
        cell: CellCoord::new(0, 0),
    });
    session.frame(
        &BuilderInput {
            rotate_action: true,
            ..BuilderInput::default()
        },
        CultivationInput::default(),
    );

    let corn_row: Vec<_> = (1..5).map(|column| CellCoord::new(column, 4)).collect();
    let broccoli_row: Vec<_> = (1..5).map(|column| CellCoord::new(column, 6)).collect();

    session.stroke(&corn_row);
    session.submit(Command::SelectCropKind {
        kind: CropKind::Broccoli,
    });
    session.stroke(&broccoli_row);
    session.idle(1);
    session.stroke(&corn_row);

    session.idle(growth_frames);

    session.stroke(&corn_row);
    session.stroke(&broccoli_row);
    let settle = settle_frames(session);
    session.idle(settle);
}

fn settle_frames(session: &Session) -> u32 {
    let longest = query::field(session.world())
        .iter()
        .filter_map(|crop| crop.animation().map(|animation| animation.duration()))
        .max()
        .unwrap_or(Duration::ZERO);
    let dt = session.dt.as_secs_f64().max(f64::EPSILON);
    (longest.as_secs_f64() / dt).ceil() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::{Catalog, PlacementMode};

    fn session() -> Session {
        let mut session = Session::new(
            World::with_catalog(Catalog::builtin()),
            Duration::from_millis(500),
        );
        session.submit(Command::ConfigureGrid {
            columns: 10,
            rows: 10,
            cell_size: 1.0,
        });
        session
    }

    #[test]
    fn building_through_the_builder_commits_structures() {
        let mut session = session();
        session.build("barn", CellCoord::new(2, 2), 1);

        let structures = query::structure_view(session.world());
        assert_eq!(structures.len(), 1);
        assert_eq!(structures[0].anchor, CellCoord::new(2, 2));
        assert_eq!(structures[0].region.size().width(), 2);
        assert_eq!(query::placement_mode(session.world()), PlacementMode::Idle);
    }

    #[test]
    fn stroke_plants_each_cell_once() {
        let mut session = session();
        let cells = [CellCoord::new(1, 1), CellCoord::new(2, 1), CellCoord::new(1, 1)];
        session.stroke(&cells);

        assert_eq!(query::crop_view(session.world()).len(), 2);
        assert_eq!(session.summary().rejections, 0);
    }

    #[test]
    fn scripted_day_harvests_every_crop() {
        let mut session = session();
        run_script(&mut session, 80);

        let summary = session.summary();
        assert_eq!(summary.structures, 3);
        assert_eq!(summary.crops_in_field, 0, "every crop should be reaped");
        assert_eq!(
            summary.harvested,
            vec![(CropKind::Broccoli, 16), (CropKind::Corn, 16)]
        );
    }
}
