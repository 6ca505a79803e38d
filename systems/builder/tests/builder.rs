use glam::Vec3;
use homestead_core::{
    CellCoord, CellRect, CellRectSize, Command, Event, PlacementMode, Rotation, StructureId,
    StructureState,
};
use homestead_system_builder::{Builder, BuilderInput};

fn placing_events() -> Vec<Event> {
    vec![Event::PlacementStarted {
        structure: StructureId::new(0),
        definition: "shed".to_owned(),
        mode: PlacementMode::PlacingNew,
    }]
}

fn preview(state: StructureState) -> Event {
    Event::PreviewUpdated {
        structure: StructureId::new(0),
        region: CellRect::from_origin_and_size(CellCoord::new(3, 3), CellRectSize::new(2, 1)),
        rotation: Rotation::IDENTITY,
        state,
        cells: Vec::new(),
    }
}

fn confirm() -> BuilderInput {
    BuilderInput {
        confirm_action: true,
        ..BuilderInput::default()
    }
}

#[test]
fn menu_pick_begins_placement() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &BuilderInput {
            begin_placement: Some("barn".to_owned()),
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::BeginPlacement {
            definition: "barn".to_owned(),
        }],
        "a menu pick should start placement and swallow the rest of the frame",
    );
}

#[test]
fn confirm_emits_command_while_placing() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    let mut events = placing_events();
    events.push(preview(StructureState::ValidPreview));
    builder.handle(&events, &confirm(), &mut commands);

    assert_eq!(builder.mode(), PlacementMode::PlacingNew);
    assert!(builder.placeable());
    assert_eq!(
        commands,
        vec![Command::ConfirmPlacement],
        "builder should confirm the in-flight candidate",
    );
}

#[test]
fn confirm_ignored_when_idle() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert!(
        commands.is_empty(),
        "system must not confirm without a placement in flight",
    );
}

#[test]
fn cursor_movement_is_forwarded_once_per_change() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let input = BuilderInput {
        cursor_position: Some(Vec3::new(2.5, 0.0, 3.5)),
        ..BuilderInput::default()
    };

    builder.handle(&placing_events(), &input, &mut commands);
    builder.handle(&[], &input, &mut commands);

    assert_eq!(
        commands,
        vec![Command::MoveCandidate {
            position: Vec3::new(2.5, 0.0, 3.5),
        }],
        "an unchanged cursor must not resend the candidate position",
    );
}

#[test]
fn cancel_wins_over_confirm_while_placing() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &placing_events(),
        &BuilderInput {
            rotate_action: true,
            confirm_action: true,
            cancel_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(commands, vec![Command::Rotate, Command::CancelPlacement]);
}

#[test]
fn placement_outcome_returns_builder_to_idle() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(&placing_events(), &BuilderInput::default(), &mut commands);
    builder.handle(
        &[Event::StructurePlaced {
            structure: StructureId::new(0),
            definition: "shed".to_owned(),
            region: CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 1)),
            rotation: Default::default(),
        }],
        &BuilderInput {
            confirm_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(builder.mode(), PlacementMode::Idle);
    assert!(commands.is_empty());
}

#[test]
fn idle_click_selects_cell() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &BuilderInput {
            select_cell: Some(CellCoord::new(4, 2)),
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::SelectCell {
            cell: CellCoord::new(4, 2),
        }]
    );
}

#[test]
fn click_while_placing_moves_candidate() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &placing_events(),
        &BuilderInput {
            select_cell: Some(CellCoord::new(4, 2)),
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::MoveCandidateToCell {
            cell: CellCoord::new(4, 2),
        }]
    );
}

#[test]
fn delete_targets_tracked_selection() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let selected = StructureId::new(7);

    builder.handle(
        &[Event::StructureSelected {
            structure: selected,
        }],
        &BuilderInput {
            delete_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::DeleteStructure {
            structure: selected,
        }],
        "delete should remove the selected structure",
    );
}

#[test]
fn idle_intents_require_a_selection() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[],
        &BuilderInput {
            delete_action: true,
            rotate_action: true,
            cancel_action: true,
            reposition_action: true,
            ..BuilderInput::default()
        },
        &mut commands,
    );

    assert!(commands.is_empty(), "nothing is selected, so nothing to act on");
}

#[test]
fn selection_intents_map_to_commands() {
    let selected = StructureId::new(3);
    let selection = [Event::StructureSelected {
        structure: selected,
    }];

    let cases = [
        (
            BuilderInput {
                reposition_action: true,
                ..BuilderInput::default()
            },
            Command::BeginRepositioning {
                structure: selected,
            },
        ),
        (
            BuilderInput {
                rotate_action: true,
                ..BuilderInput::default()
            },
            Command::Rotate,
        ),
        (
            BuilderInput {
                cancel_action: true,
                ..BuilderInput::default()
            },
            Command::Deselect,
        ),
    ];

    for (input, expected) in cases {
        let mut builder = Builder::default();
        let mut commands = Vec::new();
        builder.handle(&selection, &input, &mut commands);
        assert_eq!(commands, vec![expected]);
    }
}

#[test]
fn deselection_and_removal_clear_tracked_selection() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let selected = StructureId::new(2);

    builder.handle(
        &[
            Event::StructureSelected {
                structure: selected,
            },
            Event::StructureRemoved {
                structure: selected,
                region: CellRect::from_origin_and_size(
                    CellCoord::new(0, 0),
                    CellRectSize::new(1, 1),
                ),
            },
        ],
        &BuilderInput::default(),
        &mut commands,
    );
    assert_eq!(builder.selected(), None);

    builder.handle(
        &[
            Event::StructureSelected {
                structure: selected,
            },
            Event::StructureDeselected {
                structure: selected,
            },
        ],
        &BuilderInput::default(),
        &mut commands,
    );
    assert_eq!(builder.selected(), None);
    assert!(commands.is_empty());
}

#[test]
fn confirm_waits_for_a_valid_preview() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let mut events = placing_events();
    events.push(preview(StructureState::InvalidPreview));

    builder.handle(&events, &confirm(), &mut commands);
    assert!(
        commands.is_empty(),
        "an invalid candidate must not be confirmed",
    );

    builder.handle(&[preview(StructureState::ValidPreview)], &confirm(), &mut commands);
    assert_eq!(commands, vec![Command::ConfirmPlacement]);
}

#[test]
fn new_placement_forgets_previous_preview() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[preview(StructureState::ValidPreview)],
        &BuilderInput::default(),
        &mut commands,
    );
    builder.handle(&placing_events(), &confirm(), &mut commands);

    assert!(!builder.placeable());
    assert!(commands.is_empty());
}
