//! Validity checks and the only mutators of grid cell ownership.
//!
//! Every claim and release of a cell flows through [`commit`], [`release`] or
//! [`release_region`]; the rest of the world reads the grid immutably.

use homestead_core::{CellRect, CellValidity, Occupant, PlacementError};

use crate::grid::Grid;

/// Checks whether `region` may be claimed, ignoring cells already owned by `exclude`.
///
/// Bounds are checked before occupancy, so a footprint that is both out of
/// bounds and overlapping reports [`PlacementError::OutOfBounds`].
pub fn check(
    grid: &Grid,
    region: &CellRect,
    exclude: Option<Occupant>,
) -> Result<(), PlacementError> {
    if !grid.contains_region(region) {
        return Err(PlacementError::OutOfBounds);
    }

    let blocked = grid
        .cells_in_area(region)
        .any(|(_, cell)| claimed_by_other(cell.occupant(), exclude));
    if blocked {
        return Err(PlacementError::Occupied);
    }

    Ok(())
}

/// Reports whether `region` may be claimed, ignoring cells already owned by `exclude`.
#[must_use]
pub fn is_valid(grid: &Grid, region: &CellRect, exclude: Option<Occupant>) -> bool {
    check(grid, region, exclude).is_ok()
}

/// Per-cell validity of `region` in row-major footprint order.
///
/// Out-of-bounds cells are reported as invalid alongside the in-bounds ones.
#[must_use]
pub fn cell_validity(
    grid: &Grid,
    region: &CellRect,
    exclude: Option<Occupant>,
) -> Vec<CellValidity> {
    region
        .cells()
        .map(|coord| {
            let valid = grid
                .cell(coord)
                .is_some_and(|cell| !claimed_by_other(cell.occupant(), exclude));
            CellValidity { cell: coord, valid }
        })
        .collect()
}

/// Claims every cell of `region` for `owner`.
///
/// Callers must have validated the region first; committing over another
/// owner is a contract violation and trips a debug assertion.
pub fn commit(grid: &mut Grid, region: &CellRect, owner: Occupant) {
    debug_assert!(
        is_valid(grid, region, Some(owner)),
        "commit of {owner:?} over {region:?} would corrupt occupancy",
    );
    for coord in region.cells() {
        if let Some(cell) = grid.cell_mut(coord) {
            cell.claim(owner);
        }
    }
}

/// Releases every cell owned by `owner`, returning how many were freed.
pub fn release(grid: &mut Grid, owner: Occupant) -> usize {
    let owned: Vec<_> = grid
        .iter()
        .filter(|(_, cell)| cell.occupant() == Some(owner))
        .map(|(coord, _)| coord)
        .collect();
    for coord in &owned {
        if let Some(cell) = grid.cell_mut(*coord) {
            cell.vacate();
        }
    }
    owned.len()
}

/// Releases the cells of `region` that are owned by `owner`.
///
/// Cells claimed by anyone else are left untouched.
pub fn release_region(grid: &mut Grid, region: &CellRect, owner: Occupant) -> usize {
    let mut released = 0;
    for coord in region.cells() {
        if let Some(cell) = grid.cell_mut(coord) {
            if cell.occupant() == Some(owner) {
                cell.vacate();
                released += 1;
            }
        }
    }
    released
}

fn claimed_by_other(occupant: Option<Occupant>, exclude: Option<Occupant>) -> bool {
    match occupant {
        Some(owner) => Some(owner) != exclude,
        None => false,
    }
}
