use std::time::Duration;

use homestead_core::{CellCoord, Command, Event, PlacementMode, StructureId};
use homestead_system_cultivation::{Cultivation, CultivationInput};

fn press(cell: CellCoord) -> CultivationInput {
    CultivationInput {
        pointer_cell: Some(cell),
        pressed: true,
        held: true,
        ..CultivationInput::default()
    }
}

fn hold(cell: CellCoord, millis: u64) -> CultivationInput {
    CultivationInput {
        pointer_cell: Some(cell),
        held: true,
        dt: Duration::from_millis(millis),
        ..CultivationInput::default()
    }
}

#[test]
fn press_interacts_with_hovered_cell() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();

    system.handle(&[], press(CellCoord::new(1, 1)), &mut commands);

    assert_eq!(
        commands,
        vec![Command::Interact {
            cell: CellCoord::new(1, 1),
        }],
        "pressing should act on the cell under the pointer",
    );
    assert!(system.is_stroking());
}

#[test]
fn drag_visits_each_cell_once_per_stroke() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();
    let first = CellCoord::new(1, 1);
    let second = CellCoord::new(2, 1);

    system.handle(&[], press(first), &mut commands);
    system.handle(&[], hold(first, 100), &mut commands);
    system.handle(&[], hold(second, 100), &mut commands);
    system.handle(&[], hold(first, 100), &mut commands);
    system.handle(&[], hold(second, 100), &mut commands);

    assert_eq!(
        commands,
        vec![
            Command::Interact { cell: first },
            Command::Interact { cell: second },
        ],
        "revisited cells must not be interacted with twice",
    );
}

#[test]
fn held_pointer_samples_at_interval() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();
    let start = CellCoord::new(0, 0);
    let next = CellCoord::new(0, 1);

    system.handle(&[], press(start), &mut commands);
    system.handle(&[], hold(next, 40), &mut commands);
    system.handle(&[], hold(next, 40), &mut commands);
    assert_eq!(commands.len(), 1, "sampling waits for the interval");

    system.handle(&[], hold(next, 40), &mut commands);
    assert_eq!(commands.last(), Some(&Command::Interact { cell: next }));
}

#[test]
fn new_stroke_forgets_visited_cells() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();
    let cell = CellCoord::new(3, 3);

    system.handle(&[], press(cell), &mut commands);
    system.handle(
        &[],
        CultivationInput {
            released: true,
            ..CultivationInput::default()
        },
        &mut commands,
    );
    assert!(!system.is_stroking());

    system.handle(&[], press(cell), &mut commands);
    assert_eq!(commands.len(), 2, "a fresh press may act on the same cell");
}

#[test]
fn hold_without_press_does_nothing() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();

    system.handle(&[], hold(CellCoord::new(0, 0), 500), &mut commands);

    assert!(commands.is_empty());
}

#[test]
fn input_ignored_during_structure_placement() {
    let mut system = Cultivation::default();
    let mut commands = Vec::new();
    let placing = [Event::PlacementStarted {
        structure: StructureId::new(0),
        definition: "shed".to_owned(),
        mode: PlacementMode::PlacingNew,
    }];

    system.handle(&placing, press(CellCoord::new(1, 1)), &mut commands);
    assert!(commands.is_empty(), "field input must pause while placing");

    let cancelled = [Event::PlacementCancelled {
        structure: StructureId::new(0),
        mode: PlacementMode::PlacingNew,
    }];
    system.handle(&cancelled, press(CellCoord::new(1, 1)), &mut commands);
    assert_eq!(commands.len(), 1);
}
