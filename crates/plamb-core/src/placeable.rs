//! Placeable object descriptors: platforms and the props they host.

use crate::footprint::{footprint, Footprint, Rotation};
use crate::grid::CellCoord;
use crate::ids::{ConnectionId, PlatformId, SubgridId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised when building an object descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    #[error("Invalid dimensions {length}x{width} for {key:?}")]
    InvalidDimensions { key: String, length: u32, width: u32 },
    #[error("Empty lookup key")]
    EmptyLookupKey,
}

/// Fields shared by every placeable object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// Catalog key this object was created from.
    pub lookup_key: String,
    length: u32,
    width: u32,
    rotation: Rotation,
    /// Platform this object sits on (its own id, for platforms).
    platform_id: Option<PlatformId>,
}

impl ObjectInfo {
    pub fn new(lookup_key: impl Into<String>, length: u32, width: u32) -> Result<Self, ObjectError> {
        let lookup_key = lookup_key.into();
        if lookup_key.is_empty() {
            return Err(ObjectError::EmptyLookupKey);
        }
        if length == 0 || width == 0 {
            return Err(ObjectError::InvalidDimensions {
                key: lookup_key,
                length,
                width,
            });
        }
        Ok(Self {
            lookup_key,
            length,
            width,
            rotation: Rotation::default(),
            platform_id: None,
        })
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn platform_id(&self) -> Option<PlatformId> {
        self.platform_id
    }

    /// Layer of the platform this object belongs to, once placed.
    pub fn layer(&self) -> Option<u32> {
        self.platform_id.map(|id| id.level())
    }
}

/// Common behavior for placeable objects.
pub trait LevelObject {
    fn info(&self) -> &ObjectInfo;

    fn info_mut(&mut self) -> &mut ObjectInfo;

    fn lookup_key(&self) -> &str {
        &self.info().lookup_key
    }

    fn rotation(&self) -> Rotation {
        self.info().rotation()
    }

    fn set_rotation(&mut self, rotation: Rotation) {
        self.info_mut().set_rotation(rotation);
    }

    /// Occupied sub-grid rectangle when anchored at `anchor`.
    fn footprint_at(&self, anchor: CellCoord) -> Footprint {
        let info = self.info();
        footprint(info.length, info.width, info.rotation, anchor)
    }
}

/// Variant tag of a prop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropKind {
    /// Plain set dressing.
    #[default]
    Decoration,
    /// Player spawn point; at most one per level.
    LevelStart,
    /// Level exit; at most one per level.
    LevelGoal,
    /// Prop with attachment slots addressed by connection ids.
    Connectable,
}

impl PropKind {
    /// Kinds that may exist only once per level.
    pub fn is_unique(self) -> bool {
        matches!(self, PropKind::LevelStart | PropKind::LevelGoal)
    }
}

/// A coarse-grid object that can host props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub info: ObjectInfo,
    takes_props: bool,
    props: BTreeMap<SubgridId, Prop>,
}

impl Platform {
    pub fn new(info: ObjectInfo, takes_props: bool) -> Self {
        Self {
            info,
            takes_props,
            props: BTreeMap::new(),
        }
    }

    pub fn takes_props(&self) -> bool {
        self.takes_props
    }

    pub fn platform_id(&self) -> Option<PlatformId> {
        self.info.platform_id
    }

    pub fn props(&self) -> impl Iterator<Item = &Prop> {
        self.props.values()
    }

    pub fn prop(&self, subgrid_id: SubgridId) -> Option<&Prop> {
        self.props.get(&subgrid_id)
    }

    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    pub fn is_occupied(&self, subgrid_id: SubgridId) -> bool {
        self.props.contains_key(&subgrid_id)
    }

    pub(crate) fn assign_id(&mut self, platform_id: PlatformId) {
        self.info.platform_id = Some(platform_id);
    }

    pub(crate) fn prop_mut(&mut self, subgrid_id: SubgridId) -> Option<&mut Prop> {
        self.props.get_mut(&subgrid_id)
    }

    /// Insert a prop at a free slot. Returns the prop back if the slot is taken.
    pub(crate) fn insert_prop(&mut self, subgrid_id: SubgridId, mut prop: Prop) -> Result<(), Prop> {
        if self.props.contains_key(&subgrid_id) {
            return Err(prop);
        }
        prop.info.platform_id = self.info.platform_id;
        prop.subgrid_id = Some(subgrid_id);
        self.props.insert(subgrid_id, prop);
        Ok(())
    }

    pub(crate) fn take_prop(&mut self, subgrid_id: SubgridId) -> Option<Prop> {
        self.props.remove(&subgrid_id)
    }

    /// Slots whose props match a predicate, in slot order.
    pub(crate) fn slots_where(&self, mut predicate: impl FnMut(&Prop) -> bool) -> Vec<SubgridId> {
        self.props
            .iter()
            .filter(|(_, prop)| predicate(prop))
            .map(|(&slot, _)| slot)
            .collect()
    }
}

impl LevelObject for Platform {
    fn info(&self) -> &ObjectInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ObjectInfo {
        &mut self.info
    }
}

/// A fine-grid object hosted by exactly one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub info: ObjectInfo,
    pub kind: PropKind,
    subgrid_id: Option<SubgridId>,
    /// Attachment address, for connectable props.
    pub connection: Option<ConnectionId>,
}

impl Prop {
    pub fn new(info: ObjectInfo, kind: PropKind) -> Self {
        Self {
            info,
            kind,
            subgrid_id: None,
            connection: None,
        }
    }

    pub fn subgrid_id(&self) -> Option<SubgridId> {
        self.subgrid_id
    }

    pub fn platform_id(&self) -> Option<PlatformId> {
        self.info.platform_id
    }

    /// Stamp the container ids directly, bypassing the registry.
    #[cfg(test)]
    pub(crate) fn set_ids(&mut self, platform_id: PlatformId, subgrid_id: SubgridId) {
        self.info.platform_id = Some(platform_id);
        self.subgrid_id = Some(subgrid_id);
    }
}

impl LevelObject for Prop {
    fn info(&self) -> &ObjectInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut ObjectInfo {
        &mut self.info
    }
}

/// Any object the editor can place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Placeable {
    Platform(Platform),
    Prop(Prop),
}

impl Placeable {
    pub fn is_platform(&self) -> bool {
        matches!(self, Placeable::Platform(_))
    }
}

impl LevelObject for Placeable {
    fn info(&self) -> &ObjectInfo {
        match self {
            Placeable::Platform(platform) => &platform.info,
            Placeable::Prop(prop) => &prop.info,
        }
    }

    fn info_mut(&mut self) -> &mut ObjectInfo {
        match self {
            Placeable::Platform(platform) => &mut platform.info,
            Placeable::Prop(prop) => &mut prop.info,
        }
    }
}

impl From<Platform> for Placeable {
    fn from(platform: Platform) -> Self {
        Placeable::Platform(platform)
    }
}

impl From<Prop> for Placeable {
    fn from(prop: Prop) -> Self {
        Placeable::Prop(prop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_info_validation() {
        assert!(ObjectInfo::new("crate", 2, 2).is_ok());
        assert_eq!(ObjectInfo::new("", 2, 2), Err(ObjectError::EmptyLookupKey));
        assert!(matches!(
            ObjectInfo::new("crate", 0, 2),
            Err(ObjectError::InvalidDimensions { length: 0, .. })
        ));
    }

    #[test]
    fn test_insert_prop_stamps_ids() {
        let mut platform = Platform::new(ObjectInfo::new("floor", 8, 8).unwrap(), true);
        let id = PlatformId::new(1, 2, 3).unwrap();
        platform.assign_id(id);

        let slot = SubgridId::new(1, 1).unwrap();
        let prop = Prop::new(ObjectInfo::new("barrel", 1, 1).unwrap(), PropKind::Decoration);
        assert!(platform.insert_prop(slot, prop).is_ok());

        let stored = platform.prop(slot).unwrap();
        assert_eq!(stored.platform_id(), Some(id));
        assert_eq!(stored.subgrid_id(), Some(slot));
        assert_eq!(stored.info.layer(), Some(1));
    }

    #[test]
    fn test_insert_prop_refuses_occupied_slot() {
        let mut platform = Platform::new(ObjectInfo::new("floor", 8, 8).unwrap(), true);
        let slot = SubgridId::new(0, 0).unwrap();
        let first = Prop::new(ObjectInfo::new("a", 1, 1).unwrap(), PropKind::Decoration);
        let second = Prop::new(ObjectInfo::new("b", 1, 1).unwrap(), PropKind::Decoration);

        assert!(platform.insert_prop(slot, first).is_ok());
        let rejected = platform.insert_prop(slot, second).unwrap_err();
        assert_eq!(rejected.lookup_key(), "b");
        assert_eq!(platform.prop(slot).unwrap().lookup_key(), "a");
    }

    #[test]
    fn test_placeable_footprint_follows_rotation() {
        let mut object: Placeable =
            Prop::new(ObjectInfo::new("bench", 3, 1).unwrap(), PropKind::Decoration).into();
        let anchor = CellCoord::new(0, 0);
        assert_eq!(object.footprint_at(anchor).width(), 3);
        object.set_rotation(Rotation::Deg90);
        assert_eq!(object.footprint_at(anchor).width(), 1);
        assert_eq!(object.footprint_at(anchor).height(), 3);
    }

    #[test]
    fn test_unique_kinds() {
        assert!(PropKind::LevelStart.is_unique());
        assert!(PropKind::LevelGoal.is_unique());
        assert!(!PropKind::Decoration.is_unique());
        assert!(!PropKind::Connectable.is_unique());
    }
}
