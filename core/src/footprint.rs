//! Rotation-aware footprint geometry.
//!
//! Footprints are pure values: a declared base size plus a quarter-turn
//! rotation. Odd rotations swap the axes; nothing else changes, so the covered
//! cells always form an axis-aligned rectangle anchored at its bottom-left cell.

use serde::{Deserialize, Serialize};

use crate::{CellCoord, CellRect, CellRectSize};

/// Quarter-turn rotation applied to a structure footprint.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Rotation(u8);

impl Rotation {
    /// Unrotated orientation.
    pub const IDENTITY: Self = Self(0);

    /// Creates a rotation from an arbitrary quarter-turn index, normalised mod 4.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self((index % 4) as u8)
    }

    /// Quarter-turn index in the range `0..4`.
    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Rotation expressed in degrees around the vertical axis.
    #[must_use]
    pub fn degrees(self) -> f32 {
        f32::from(self.0) * 90.0
    }

    /// Reports whether the rotation swaps the footprint axes.
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        self.0 % 2 == 1
    }

    /// Rotation one quarter turn further.
    #[must_use]
    pub const fn next(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    /// Rotation one quarter turn back, equivalent to three turns forward.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self((self.0 + 3) % 4)
    }
}

/// Computes the occupied size of a footprint after rotation.
#[must_use]
pub const fn actual_size(base: CellRectSize, rotation: Rotation) -> CellRectSize {
    if rotation.swaps_axes() {
        base.transposed()
    } else {
        base
    }
}

/// Enumerates the cells covered by a footprint of `size` anchored at `anchor`.
///
/// Cells are yielded in row-major order (see [`CellRect::cells`]).
pub fn occupied_cells(anchor: CellCoord, size: CellRectSize) -> impl Iterator<Item = CellCoord> {
    CellRect::from_origin_and_size(anchor, size).cells()
}

/// Declared footprint of a structure together with its current rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Footprint {
    base: CellRectSize,
    rotation: Rotation,
}

impl Footprint {
    /// Creates a footprint from a declared base size and rotation.
    #[must_use]
    pub const fn new(base: CellRectSize, rotation: Rotation) -> Self {
        Self { base, rotation }
    }

    /// Declared, unrotated size.
    #[must_use]
    pub const fn base(&self) -> CellRectSize {
        self.base
    }

    /// Rotation currently applied.
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Size actually occupied on the grid.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        actual_size(self.base, self.rotation)
    }

    /// Region covered when anchored at the provided cell.
    #[must_use]
    pub const fn region(&self, anchor: CellCoord) -> CellRect {
        CellRect::from_origin_and_size(anchor, self.size())
    }

    /// Footprint turned one quarter further.
    #[must_use]
    pub const fn rotated(self) -> Self {
        Self {
            base: self.base,
            rotation: self.rotation.next(),
        }
    }

    /// Footprint with an explicit rotation.
    #[must_use]
    pub const fn with_rotation(self, rotation: Rotation) -> Self {
        Self {
            base: self.base,
            rotation,
        }
    }
}
