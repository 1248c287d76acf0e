//! Placed-object graph: platforms keyed by id, each owning its props.

use crate::footprint::Rotation;
use crate::ids::{PlatformId, SubgridId};
use crate::placeable::{LevelObject, Platform, Prop, PropKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Registry consistency errors.
///
/// These indicate a caller that is out of sync with the registry, not a
/// routine rejection; occupied targets are reported as `false` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("No platform registered at {0}")]
    PlatformNotFound(PlatformId),
    #[error("No prop at {slot} on platform {platform}")]
    PropNotFound { platform: PlatformId, slot: SubgridId },
    #[error("Prop at {slot} on platform {platform} claims container {claimed:?}")]
    ContainerMismatch {
        platform: PlatformId,
        slot: SubgridId,
        claimed: Option<PlatformId>,
    },
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Owns every placed platform and, through them, every placed prop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementRegistry {
    platforms: BTreeMap<PlatformId, Platform>,
}

impl PlacementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a platform. Returns `false` without changes if the cell is taken.
    pub fn place(&mut self, platform_id: PlatformId, mut platform: Platform) -> bool {
        if self.platforms.contains_key(&platform_id) {
            log::debug!("Platform cell {} already occupied", platform_id);
            return false;
        }
        platform.assign_id(platform_id);
        self.platforms.insert(platform_id, platform);
        log::debug!("Placed platform {}", platform_id);
        true
    }

    /// Remove a platform together with all of its props.
    pub fn remove(&mut self, platform_id: PlatformId) -> RegistryResult<Platform> {
        let platform = self
            .platforms
            .remove(&platform_id)
            .ok_or(RegistryError::PlatformNotFound(platform_id))?;
        for prop in platform.props() {
            log::debug!(
                "Removed prop {} from {} with its platform",
                prop.lookup_key(),
                platform_id
            );
        }
        log::debug!("Removed platform {}", platform_id);
        Ok(platform)
    }

    /// Put a prop on a platform slot.
    ///
    /// Returns `Ok(false)` if the slot is already taken; the existing prop is
    /// left untouched and the new one is dropped.
    pub fn place_on_platform(
        &mut self,
        platform_id: PlatformId,
        subgrid_id: SubgridId,
        prop: Prop,
    ) -> RegistryResult<bool> {
        let platform = self
            .platforms
            .get_mut(&platform_id)
            .ok_or(RegistryError::PlatformNotFound(platform_id))?;
        match platform.insert_prop(subgrid_id, prop) {
            Ok(()) => {
                log::debug!("Placed prop at {}/{}", platform_id, subgrid_id);
                Ok(true)
            }
            Err(_) => {
                log::debug!("Prop slot {}/{} already occupied", platform_id, subgrid_id);
                Ok(false)
            }
        }
    }

    /// Take a prop off a platform. `Ok(None)` if the slot was empty.
    pub fn remove_from_platform(
        &mut self,
        platform_id: PlatformId,
        subgrid_id: SubgridId,
    ) -> RegistryResult<Option<Prop>> {
        let platform = self
            .platforms
            .get_mut(&platform_id)
            .ok_or(RegistryError::PlatformNotFound(platform_id))?;
        let removed = platform.take_prop(subgrid_id);
        if removed.is_some() {
            log::debug!("Removed prop at {}/{}", platform_id, subgrid_id);
        }
        Ok(removed)
    }

    pub fn get(&self, platform_id: PlatformId) -> Option<&Platform> {
        self.platforms.get(&platform_id)
    }

    pub fn contains(&self, platform_id: PlatformId) -> bool {
        self.platforms.contains_key(&platform_id)
    }

    /// Change the orientation of a placed platform.
    pub fn rotate_platform(&mut self, platform_id: PlatformId, rotation: Rotation) -> RegistryResult<()> {
        let platform = self
            .platforms
            .get_mut(&platform_id)
            .ok_or(RegistryError::PlatformNotFound(platform_id))?;
        platform.set_rotation(rotation);
        Ok(())
    }

    /// Change the orientation of a placed prop.
    pub fn rotate_prop(
        &mut self,
        platform_id: PlatformId,
        subgrid_id: SubgridId,
        rotation: Rotation,
    ) -> RegistryResult<()> {
        let platform = self
            .platforms
            .get_mut(&platform_id)
            .ok_or(RegistryError::PlatformNotFound(platform_id))?;
        let prop = platform.prop_mut(subgrid_id).ok_or(RegistryError::PropNotFound {
            platform: platform_id,
            slot: subgrid_id,
        })?;
        prop.set_rotation(rotation);
        Ok(())
    }

    /// Remove every platform on a layer. Returns how many were removed.
    pub fn clear_layer(&mut self, layer: u32) -> usize {
        let ids: Vec<PlatformId> = self
            .platforms
            .keys()
            .filter(|id| id.level() == layer)
            .copied()
            .collect();
        for id in &ids {
            self.platforms.remove(id);
        }
        log::info!("Cleared {} platforms from layer {}", ids.len(), layer);
        ids.len()
    }

    /// Remove every prop of the given kind from every platform.
    ///
    /// Each prop is taken out of the platform named by its own stored
    /// platform id. All matches are checked against the platform they were
    /// found on before anything is removed, so a desynchronized prop fails
    /// the whole call without partial changes.
    pub fn delete_props_of_type(&mut self, kind: PropKind) -> RegistryResult<usize> {
        let mut targets = Vec::new();
        for (&platform_id, platform) in &self.platforms {
            for slot in platform.slots_where(|prop| prop.kind == kind) {
                let claimed = platform.prop(slot).and_then(Prop::platform_id);
                if claimed != Some(platform_id) {
                    log::warn!(
                        "Prop at {}/{} claims container {:?}",
                        platform_id,
                        slot,
                        claimed
                    );
                    return Err(RegistryError::ContainerMismatch {
                        platform: platform_id,
                        slot,
                        claimed,
                    });
                }
                targets.push((platform_id, slot));
            }
        }

        for &(container, slot) in &targets {
            self.remove_from_platform(container, slot)?;
        }
        if !targets.is_empty() {
            log::debug!("Deleted {} props of kind {:?}", targets.len(), kind);
        }
        Ok(targets.len())
    }

    /// Drop everything, e.g. before loading another level.
    pub fn clear(&mut self) {
        self.platforms.clear();
    }

    /// Platforms in id order.
    pub fn platforms(&self) -> impl Iterator<Item = (PlatformId, &Platform)> {
        self.platforms.iter().map(|(&id, platform)| (id, platform))
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Total number of props across all platforms.
    pub fn prop_count(&self) -> usize {
        self.platforms.values().map(Platform::prop_count).sum()
    }

    pub fn has_prop_of_kind(&self, kind: PropKind) -> bool {
        self.platforms
            .values()
            .flat_map(Platform::props)
            .any(|prop| prop.kind == kind)
    }

    /// A level is playable once it has both a start and a goal.
    pub fn is_playable(&self) -> bool {
        self.has_prop_of_kind(PropKind::LevelStart) && self.has_prop_of_kind(PropKind::LevelGoal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeable::ObjectInfo;

    fn pid(level: u32, column: u32, row: u32) -> PlatformId {
        PlatformId::new(level, column, row).unwrap()
    }

    fn slot(column: u32, row: u32) -> SubgridId {
        SubgridId::new(column, row).unwrap()
    }

    fn floor() -> Platform {
        Platform::new(ObjectInfo::new("floor", 8, 8).unwrap(), true)
    }

    fn prop(key: &str, kind: PropKind) -> Prop {
        Prop::new(ObjectInfo::new(key, 1, 1).unwrap(), kind)
    }

    #[test]
    fn test_place_and_get() {
        let mut registry = PlacementRegistry::new();
        assert!(registry.place(pid(1, 2, 3), floor()));
        let platform = registry.get(pid(1, 2, 3)).unwrap();
        assert_eq!(platform.platform_id(), Some(pid(1, 2, 3)));
        assert!(registry.get(pid(1, 2, 4)).is_none());
    }

    #[test]
    fn test_place_on_occupied_cell_is_noop() {
        let mut registry = PlacementRegistry::new();
        assert!(registry.place(pid(0, 0, 0), floor()));
        let other = Platform::new(ObjectInfo::new("ice", 8, 8).unwrap(), false);
        assert!(!registry.place(pid(0, 0, 0), other));
        assert_eq!(registry.get(pid(0, 0, 0)).unwrap().lookup_key(), "floor");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_cascades_props() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        registry
            .place_on_platform(pid(0, 0, 0), slot(1, 1), prop("a", PropKind::Decoration))
            .unwrap();
        registry
            .place_on_platform(pid(0, 0, 0), slot(2, 2), prop("b", PropKind::Decoration))
            .unwrap();

        let removed = registry.remove(pid(0, 0, 0)).unwrap();
        assert_eq!(removed.prop_count(), 2);
        assert!(registry.is_empty());
        assert_eq!(registry.prop_count(), 0);
    }

    #[test]
    fn test_remove_unknown_platform_fails() {
        let mut registry = PlacementRegistry::new();
        assert_eq!(
            registry.remove(pid(0, 1, 1)).unwrap_err(),
            RegistryError::PlatformNotFound(pid(0, 1, 1))
        );
    }

    #[test]
    fn test_second_place_on_platform_is_noop() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        assert!(registry
            .place_on_platform(pid(0, 0, 0), slot(3, 3), prop("first", PropKind::Decoration))
            .unwrap());
        assert!(!registry
            .place_on_platform(pid(0, 0, 0), slot(3, 3), prop("second", PropKind::Decoration))
            .unwrap());

        let platform = registry.get(pid(0, 0, 0)).unwrap();
        assert_eq!(platform.prop_count(), 1);
        assert_eq!(platform.prop(slot(3, 3)).unwrap().lookup_key(), "first");
    }

    #[test]
    fn test_prop_on_missing_platform_fails() {
        let mut registry = PlacementRegistry::new();
        let result = registry.place_on_platform(pid(0, 0, 0), slot(0, 0), prop("a", PropKind::Decoration));
        assert_eq!(result, Err(RegistryError::PlatformNotFound(pid(0, 0, 0))));
        assert!(registry.remove_from_platform(pid(0, 0, 0), slot(0, 0)).is_err());
    }

    #[test]
    fn test_remove_from_platform_absent_is_noop() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        assert_eq!(registry.remove_from_platform(pid(0, 0, 0), slot(0, 0)), Ok(None));
    }

    #[test]
    fn test_rotate_prop() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        registry
            .place_on_platform(pid(0, 0, 0), slot(4, 4), prop("a", PropKind::Decoration))
            .unwrap();
        registry.rotate_prop(pid(0, 0, 0), slot(4, 4), Rotation::Deg270).unwrap();
        let platform = registry.get(pid(0, 0, 0)).unwrap();
        assert_eq!(platform.prop(slot(4, 4)).unwrap().rotation(), Rotation::Deg270);

        assert_eq!(
            registry.rotate_prop(pid(0, 0, 0), slot(5, 5), Rotation::Deg90),
            Err(RegistryError::PropNotFound {
                platform: pid(0, 0, 0),
                slot: slot(5, 5)
            })
        );
    }

    #[test]
    fn test_clear_layer() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(1, 0, 0), floor());
        registry.place(pid(1, 1, 0), floor());
        registry.place(pid(2, 0, 0), floor());

        assert_eq!(registry.clear_layer(1), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(pid(2, 0, 0)));
        assert_eq!(registry.clear_layer(7), 0);
    }

    #[test]
    fn test_delete_props_of_type() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        registry.place(pid(0, 1, 0), floor());
        registry
            .place_on_platform(pid(0, 0, 0), slot(0, 0), prop("start", PropKind::LevelStart))
            .unwrap();
        registry
            .place_on_platform(pid(0, 1, 0), slot(1, 1), prop("start", PropKind::LevelStart))
            .unwrap();
        registry
            .place_on_platform(pid(0, 1, 0), slot(2, 2), prop("rock", PropKind::Decoration))
            .unwrap();

        assert_eq!(registry.delete_props_of_type(PropKind::LevelStart), Ok(2));
        assert!(!registry.has_prop_of_kind(PropKind::LevelStart));
        assert_eq!(registry.prop_count(), 1);
        assert_eq!(registry.delete_props_of_type(PropKind::LevelStart), Ok(0));
    }

    #[test]
    fn test_delete_props_of_type_detects_mismatched_container() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        registry
            .place_on_platform(pid(0, 0, 0), slot(0, 0), prop("goal", PropKind::LevelGoal))
            .unwrap();
        registry
            .place_on_platform(pid(0, 0, 0), slot(1, 0), prop("goal", PropKind::LevelGoal))
            .unwrap();

        // Corrupt one prop so it claims a platform that does not exist
        let platform = registry.platforms.get_mut(&pid(0, 0, 0)).unwrap();
        platform.prop_mut(slot(1, 0)).unwrap().set_ids(pid(0, 5, 5), slot(1, 0));

        let err = registry.delete_props_of_type(PropKind::LevelGoal).unwrap_err();
        assert!(matches!(err, RegistryError::ContainerMismatch { .. }));
        // Nothing was removed
        assert_eq!(registry.prop_count(), 2);
    }

    #[test]
    fn test_is_playable() {
        let mut registry = PlacementRegistry::new();
        registry.place(pid(0, 0, 0), floor());
        assert!(!registry.is_playable());
        registry
            .place_on_platform(pid(0, 0, 0), slot(0, 0), prop("start", PropKind::LevelStart))
            .unwrap();
        assert!(!registry.is_playable());
        registry
            .place_on_platform(pid(0, 0, 0), slot(5, 5), prop("goal", PropKind::LevelGoal))
            .unwrap();
        assert!(registry.is_playable());
    }

    #[test]
    fn test_invariants_hold_under_mixed_operations() {
        let mut registry = PlacementRegistry::new();
        let mut state: u32 = 12345;
        let mut next = move |bound: u32| {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (state >> 16) % bound
        };

        for _ in 0..2000 {
            let id = pid(next(2), next(3), next(3));
            let sub = slot(next(3), next(3));
            match next(4) {
                0 => {
                    registry.place(id, floor());
                }
                1 => {
                    let _ = registry.remove(id);
                }
                2 => {
                    let _ = registry.place_on_platform(id, sub, prop("p", PropKind::Decoration));
                }
                _ => {
                    let _ = registry.remove_from_platform(id, sub);
                }
            }

            for (id, platform) in registry.platforms() {
                assert_eq!(platform.platform_id(), Some(id));
                for prop in platform.props() {
                    assert_eq!(prop.platform_id(), Some(id));
                    let slot = prop.subgrid_id().unwrap();
                    assert!(std::ptr::eq(platform.prop(slot).unwrap(), prop));
                }
            }
        }
    }
}
