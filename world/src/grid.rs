//! Dense cell storage and conversions between grid and world space.

use glam::{IVec2, Vec3};
use homestead_core::{CellCoord, CellRect, Occupant, MAX_GRID_DIMENSION};

/// Side length used when a grid is configured with a degenerate cell size.
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Occupancy record for a single grid cell.
///
/// A cell is occupied exactly when it names an owner, so the two can never
/// disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    occupant: Option<Occupant>,
}

impl Cell {
    /// Reports whether any entity claims the cell.
    #[must_use]
    pub const fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    /// Entity that claims the cell, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<Occupant> {
        self.occupant
    }

    pub(crate) fn claim(&mut self, occupant: Occupant) {
        debug_assert!(
            self.occupant.map_or(true, |current| current == occupant),
            "cell already claimed by {:?}, refusing {:?}",
            self.occupant,
            occupant,
        );
        self.occupant = Some(occupant);
    }

    pub(crate) fn vacate(&mut self) {
        self.occupant = None;
    }
}

/// Fixed-size grid of cells laid out on the world XZ plane.
#[derive(Clone, Debug)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    ///
    /// Dimensions are clamped to [`MAX_GRID_DIMENSION`]. Non-finite or
    /// non-positive cell sizes fall back to [`DEFAULT_CELL_SIZE`].
    #[must_use]
    pub fn new(columns: u32, rows: u32, cell_size: f32) -> Self {
        let columns = columns.min(MAX_GRID_DIMENSION);
        let rows = rows.min(MAX_GRID_DIMENSION);
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            DEFAULT_CELL_SIZE
        };
        Self {
            columns,
            rows,
            cell_size,
            cells: vec![Cell::default(); capacity],
        }
    }

    /// Number of columns along the x axis.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows along the z axis.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Provides the dimensions of the grid as `(columns, rows)`.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate names a cell of this grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether every cell of the rectangle lies inside the grid.
    #[must_use]
    pub fn contains_region(&self, region: &CellRect) -> bool {
        region.column_end() <= u64::from(self.columns) && region.row_end() <= u64::from(self.rows)
    }

    /// Retrieves the cell at the provided coordinate.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    pub(crate) fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    /// Iterates over the in-bounds part of the rectangle in row-major order.
    pub fn cells_in_area<'a>(
        &'a self,
        region: &CellRect,
    ) -> impl Iterator<Item = (CellCoord, &'a Cell)> + 'a {
        region
            .cells()
            .filter_map(move |coord| self.cell(coord).map(|cell| (coord, cell)))
    }

    /// Iterates over every cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &Cell)> {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let index = index as u64;
            let column = (index % u64::from(columns)) as u32;
            let row = (index / u64::from(columns)) as u32;
            (CellCoord::new(column, row), cell)
        })
    }

    /// Converts a world-space position into unbounded grid coordinates.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> IVec2 {
        IVec2::new(
            (position.x / self.cell_size).floor() as i32,
            (position.z / self.cell_size).floor() as i32,
        )
    }

    /// Resolves the grid cell underneath a world-space position.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec3) -> Option<CellCoord> {
        let grid = self.world_to_grid(position);
        let column = u32::try_from(grid.x).ok()?;
        let row = u32::try_from(grid.y).ok()?;
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }

    /// World-space position of the centre of a cell on the ground plane.
    #[must_use]
    pub fn cell_to_world(&self, cell: CellCoord) -> Vec3 {
        let half = self.cell_size / 2.0;
        Vec3::new(
            cell.column() as f32 * self.cell_size + half,
            0.0,
            cell.row() as f32 * self.cell_size + half,
        )
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use homestead_core::CellRectSize;

    #[test]
    fn every_coordinate_maps_to_one_cell() {
        let grid = Grid::new(4, 3, 1.0);
        assert_eq!(grid.iter().count(), 12);
        for (coord, _) in grid.iter() {
            assert!(grid.cell(coord).is_some());
        }
        assert!(grid.cell(CellCoord::new(4, 0)).is_none());
        assert!(grid.cell(CellCoord::new(0, 3)).is_none());
    }

    #[test]
    fn world_positions_floor_into_cells() {
        let grid = Grid::new(10, 10, 2.0);
        assert_eq!(
            grid.world_to_cell(Vec3::new(3.9, 5.0, 0.1)),
            Some(CellCoord::new(1, 0))
        );
        assert_eq!(grid.world_to_cell(Vec3::new(-0.1, 0.0, 1.0)), None);
        assert_eq!(grid.world_to_cell(Vec3::new(20.0, 0.0, 1.0)), None);
        assert_eq!(
            grid.world_to_grid(Vec3::new(-0.1, 0.0, 1.0)),
            IVec2::new(-1, 0)
        );
    }

    #[test]
    fn cell_to_world_returns_cell_centre() {
        let grid = Grid::new(10, 10, 2.0);
        assert_eq!(
            grid.cell_to_world(CellCoord::new(1, 3)),
            Vec3::new(3.0, 0.0, 7.0)
        );
        let round_trip = grid.world_to_cell(grid.cell_to_world(CellCoord::new(7, 2)));
        assert_eq!(round_trip, Some(CellCoord::new(7, 2)));
    }

    #[test]
    fn dimensions_are_clamped() {
        let grid = Grid::new(MAX_GRID_DIMENSION + 1, 3, 1.0);
        assert_eq!(grid.dimensions(), (MAX_GRID_DIMENSION, 3));
        assert_eq!(grid.iter().count(), MAX_GRID_DIMENSION as usize * 3);
    }

    #[test]
    fn degenerate_cell_size_falls_back_to_default() {
        assert_eq!(Grid::new(2, 2, 0.0).cell_size(), DEFAULT_CELL_SIZE);
        assert_eq!(Grid::new(2, 2, f32::NAN).cell_size(), DEFAULT_CELL_SIZE);
    }

    #[test]
    fn area_queries_clip_to_bounds() {
        let grid = Grid::new(3, 3, 1.0);
        let region = CellRect::from_origin_and_size(CellCoord::new(2, 2), CellRectSize::new(2, 2));
        assert_eq!(grid.cells_in_area(&region).count(), 1);
        assert!(!grid.contains_region(&region));

        let inside = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(2, 2));
        assert!(grid.contains_region(&inside));
        assert_eq!(grid.cells_in_area(&inside).count(), 4);
    }
}
