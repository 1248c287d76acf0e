//! World-space to grid-space mapping for the two grid granularities.
//!
//! The platform ("main") grid and the sub-grid share an origin; one platform
//! cell spans `sub_cells_per_main_cell` sub-cells along each axis. World
//! points on the active grid plane are given as a [`kurbo::Point`] whose `x`
//! is world X and whose `y` is world Z.
//!
//! Raw cell indices grow with world Z, while authored rows grow the other
//! way, so the row axis is flipped before the configured offset is added.

use crate::footprint::Rotation;
use crate::ids::{PlatformId, SubgridId};
use crate::settings::{EditorSettings, GridOffset};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Integer cell coordinate on one of the grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Result of mapping one world point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridPosition {
    /// Raw platform-grid cell (before remapping).
    pub main_cell: CellCoord,
    /// Raw sub-grid cell (before remapping).
    pub sub_cell: CellCoord,
    /// Platform-grid cell after offset and row flip.
    pub main: CellCoord,
    /// Sub-grid cell after offset and row flip, not yet reduced.
    pub sub: CellCoord,
}

/// What the cursor currently addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorTarget {
    pub platform_id: PlatformId,
    pub subgrid_id: SubgridId,
    /// Absolute remapped sub-grid cell, used as the footprint anchor.
    pub sub: CellCoord,
}

/// Which grid an object snaps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridKind {
    Main,
    Sub,
}

/// Converts world points into grid cells using the configured settings.
#[derive(Debug, Clone)]
pub struct GridMapper {
    main_cell_size: f64,
    sub_cell_size: f64,
    sub_cells_per_main_cell: u32,
    offset_main: GridOffset,
    offset_sub: GridOffset,
}

impl GridMapper {
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            main_cell_size: settings.main_cell_unit_size(),
            sub_cell_size: settings.sub_cell_unit_size,
            sub_cells_per_main_cell: settings.sub_cells_per_main_cell,
            offset_main: settings.grid_offset_main,
            offset_sub: settings.grid_offset_sub,
        }
    }

    pub fn sub_cells_per_main_cell(&self) -> u32 {
        self.sub_cells_per_main_cell
    }

    /// Raw cell index of a world point on a grid with the given cell size.
    ///
    /// Returns `None` when the index is not finite or does not fit an `i32`.
    pub fn world_to_cell(point: Point, cell_size: f64) -> Option<CellCoord> {
        Some(CellCoord::new(
            cell_index(point.x, cell_size)?,
            cell_index(point.y, cell_size)?,
        ))
    }

    /// Map a world point into both grids.
    ///
    /// Returns `None` for points too far out to be addressed on either grid.
    pub fn map_world_point(&self, point: Point) -> Option<GridPosition> {
        let main_cell = Self::world_to_cell(point, self.main_cell_size)?;
        let sub_cell = Self::world_to_cell(point, self.sub_cell_size)?;
        Some(GridPosition {
            main_cell,
            sub_cell,
            main: remap(main_cell, self.offset_main)?,
            sub: remap(sub_cell, self.offset_sub)?,
        })
    }

    /// Sub-grid id for an absolute remapped sub-cell.
    pub fn subgrid_id_for(&self, sub: CellCoord) -> Option<SubgridId> {
        let n = i32::try_from(self.sub_cells_per_main_cell).ok()?;
        SubgridId::new(sub.x.rem_euclid(n) as u32, sub.y.rem_euclid(n) as u32).ok()
    }

    /// Resolve a world point into the ids it addresses on `layer`.
    ///
    /// Returns `None` when the point lies outside the addressable grid.
    pub fn cursor_target(&self, point: Point, layer: u32) -> Option<CursorTarget> {
        let position = self.map_world_point(point)?;
        let column = u32::try_from(position.main.x).ok()?;
        let row = u32::try_from(position.main.y).ok()?;
        let platform_id = PlatformId::new(layer, column, row).ok()?;
        let subgrid_id = self.subgrid_id_for(position.sub)?;
        Some(CursorTarget {
            platform_id,
            subgrid_id,
            sub: position.sub,
        })
    }

    /// World-space corner of a raw cell.
    pub fn cell_to_world(&self, cell: CellCoord, kind: GridKind) -> Point {
        let size = match kind {
            GridKind::Main => self.main_cell_size,
            GridKind::Sub => self.sub_cell_size,
        };
        Point::new(cell.x as f64 * size, cell.y as f64 * size)
    }

    /// Offset that centers an object of the given size on its snapped cell.
    ///
    /// Platforms are shifted by half their extent; props only by half a cell
    /// on odd dimensions, with the axes swapped for quarter turns.
    pub fn centering_offset(&self, kind: GridKind, length: u32, width: u32, rotation: Rotation) -> Vec2 {
        let unit = self.sub_cell_size;
        match kind {
            GridKind::Main => Vec2::new(length as f64 / 2.0 * unit, width as f64 / 2.0 * unit),
            GridKind::Sub => {
                let x_offset = if length % 2 == 0 { 0.0 } else { 0.5 };
                let z_offset = if width % 2 == 0 { 0.0 } else { 0.5 };
                if rotation.is_quarter_turn() {
                    Vec2::new(z_offset * unit, x_offset * unit)
                } else {
                    Vec2::new(x_offset * unit, z_offset * unit)
                }
            }
        }
    }

    /// Where a ghost object should be drawn for the current cursor cell.
    pub fn ghost_world_position(
        &self,
        position: &GridPosition,
        kind: GridKind,
        length: u32,
        width: u32,
        rotation: Rotation,
    ) -> Point {
        let cell = match kind {
            GridKind::Main => position.main_cell,
            GridKind::Sub => position.sub_cell,
        };
        self.cell_to_world(cell, kind) + self.centering_offset(kind, length, width, rotation)
    }
}

fn cell_index(coordinate: f64, cell_size: f64) -> Option<i32> {
    let index = (coordinate / cell_size).floor();
    if !index.is_finite() || index < i32::MIN as f64 || index > i32::MAX as f64 {
        return None;
    }
    Some(index as i32)
}

fn remap(cell: CellCoord, offset: GridOffset) -> Option<CellCoord> {
    Some(CellCoord::new(
        cell.x.checked_add(offset.x)?,
        cell.y.checked_neg()?.checked_add(offset.y)?,
    ))
}
