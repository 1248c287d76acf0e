//! Placement legality checks against the registry.

use crate::footprint::Footprint;
use crate::grid::CellCoord;
use crate::ids::{PlatformId, SubgridId};
use crate::placeable::{LevelObject, Prop};
use crate::registry::PlacementRegistry;

/// Decides whether platforms and props may be placed.
///
/// Sub-grid rectangles are in remapped sub-grid space: platform cell
/// `(column, row)` covers sub-cells `column*n ..= column*n + n - 1` and
/// `row*n ..= row*n + n - 1`.
#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator {
    sub_cells_per_main_cell: u32,
}

impl PlacementValidator {
    pub fn new(sub_cells_per_main_cell: u32) -> Self {
        Self {
            sub_cells_per_main_cell,
        }
    }

    /// Sub-grid extent covered by a platform cell.
    ///
    /// Returns `None` when the extent does not fit strictly inside the `i32`
    /// range, so no saturated footprint can ever count as contained.
    pub fn platform_bounds(&self, platform_id: PlatformId) -> Option<Footprint> {
        let n = i32::try_from(self.sub_cells_per_main_cell).ok()?;
        let x_min = scaled(u32::from(platform_id.column()), n)?;
        let z_min = scaled(platform_id.row(), n)?;
        Some(Footprint::new(
            x_min,
            z_min,
            x_min.checked_add(n)? - 1,
            z_min.checked_add(n)? - 1,
        ))
    }

    /// Absolute sub-grid anchor of a slot on a platform.
    ///
    /// Returns `None` when the slot lies outside the platform's sub-grid or
    /// the platform cannot be addressed.
    pub fn prop_anchor(&self, platform_id: PlatformId, subgrid_id: SubgridId) -> Option<CellCoord> {
        if !self.is_local_slot(subgrid_id) {
            return None;
        }
        let bounds = self.platform_bounds(platform_id)?;
        Some(CellCoord::new(
            bounds.left + subgrid_id.column() as i32,
            bounds.top + subgrid_id.row() as i32,
        ))
    }

    /// True if the slot addresses a cell of one `n`×`n` sub-grid.
    pub fn is_local_slot(&self, subgrid_id: SubgridId) -> bool {
        u32::from(subgrid_id.column()) < self.sub_cells_per_main_cell
            && subgrid_id.row() < self.sub_cells_per_main_cell
    }

    /// Current footprint of a placed prop, from its slot and rotation.
    ///
    /// Returns `None` for props that were never placed.
    pub fn placed_footprint(&self, prop: &Prop) -> Option<Footprint> {
        let platform_id = prop.platform_id()?;
        let subgrid_id = prop.subgrid_id()?;
        Some(prop.footprint_at(self.prop_anchor(platform_id, subgrid_id)?))
    }

    /// A platform may go anywhere no platform is registered yet.
    pub fn can_place_platform(&self, registry: &PlacementRegistry, platform_id: PlatformId) -> bool {
        !registry.contains(platform_id)
    }

    /// A prop footprint must sit on a platform that takes props, stay inside
    /// its bounds, and not overlap any prop already on it.
    pub fn can_place_prop(
        &self,
        registry: &PlacementRegistry,
        platform_id: PlatformId,
        candidate: &Footprint,
    ) -> bool {
        let Some(platform) = registry.get(platform_id) else {
            return false;
        };
        if !platform.takes_props() {
            return false;
        }
        let Some(bounds) = self.platform_bounds(platform_id) else {
            return false;
        };
        if !candidate.is_within(&bounds) {
            return false;
        }
        !platform
            .props()
            .filter_map(|prop| self.placed_footprint(prop))
            .any(|placed| placed.overlaps(candidate))
    }
}

fn scaled(index: u32, n: i32) -> Option<i32> {
    i32::try_from(index).ok()?.checked_mul(n)
}
