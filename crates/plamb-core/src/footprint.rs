//! Rotation snapping and occupied-rectangle math on the sub-grid.

use crate::grid::CellCoord;
use serde::{Deserialize, Serialize};

/// One of the four canonical orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All orientations, smallest angle first.
    pub const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Snap an arbitrary angle to the nearest canonical orientation.
    ///
    /// Distance is the plain absolute difference in degrees (no wrap-around),
    /// and the smaller angle wins a tie. Non-finite input snaps to 0°.
    pub fn snap(degrees: f64) -> Self {
        let mut best = Rotation::Deg0;
        let mut best_diff = f64::INFINITY;
        for rotation in Self::ALL {
            let diff = (rotation.degrees() as f64 - degrees).abs();
            if diff < best_diff {
                best = rotation;
                best_diff = diff;
            }
        }
        best
    }

    /// Angle in degrees.
    pub fn degrees(self) -> i32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Rotate by a number of quarter turns (negative turns counter-clockwise).
    pub fn rotated_by(self, quarter_turns: i32) -> Self {
        let degrees = (self.degrees() as i64 + 90 * quarter_turns as i64).rem_euclid(360);
        Self::snap(degrees as f64)
    }

    /// True for 90° and 270°, where length and width trade places.
    pub fn is_quarter_turn(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Self::snap(degrees as f64)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Inclusive axis-aligned rectangle in sub-grid cells.
///
/// `top` is the smaller row coordinate and `bottom` the larger one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Footprint {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Number of columns covered.
    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left).saturating_add(1)
    }

    /// Number of rows covered.
    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top).saturating_add(1)
    }

    /// True if `self` lies entirely inside `bounds`.
    pub fn is_within(&self, bounds: &Footprint) -> bool {
        self.left >= bounds.left
            && self.top >= bounds.top
            && self.right <= bounds.right
            && self.bottom <= bounds.bottom
    }

    /// True if the two rectangles share at least one cell.
    pub fn overlaps(&self, other: &Footprint) -> bool {
        !(self.right < other.left
            || other.right < self.left
            || self.top > other.bottom
            || other.top > self.bottom)
    }
}

/// Occupied rectangle of an object anchored at `anchor`.
///
/// A quarter turn swaps length and width. Each axis covers
/// `[anchor - half, anchor + (size - half) - 1]` with `half = size / 2`.
pub fn footprint(length: u32, width: u32, rotation: Rotation, anchor: CellCoord) -> Footprint {
    let (along_x, along_y) = if rotation.is_quarter_turn() {
        (width, length)
    } else {
        (length, width)
    };

    let (left, right) = axis_span(anchor.x, along_x);
    let (top, bottom) = axis_span(anchor.y, along_y);
    Footprint::new(left, top, right, bottom)
}

// Computed wide, then clamped to the i32 range.
fn axis_span(anchor: i32, size: u32) -> (i32, i32) {
    let anchor = i64::from(anchor);
    let size = i64::from(size);
    let half = size / 2;
    (clamp_i32(anchor - half), clamp_i32(anchor + (size - half) - 1))
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
