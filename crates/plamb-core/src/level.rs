//! Persisted level format and conversion to and from the registry.

use crate::catalog::{CatalogError, ObjectCatalog};
use crate::footprint::Rotation;
use crate::ids::{ConnectionId, PlatformId, SubgridId};
use crate::placeable::{LevelObject, Placeable, PropKind};
use crate::placement::PlacementValidator;
use crate::registry::{PlacementRegistry, RegistryError};
use crate::settings::EditorSettings;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Level import/export errors.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("Failed to parse level: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Lookup key {0:?} is not a platform")]
    NotAPlatform(String),
    #[error("Lookup key {0:?} is not a prop")]
    NotAProp(String),
    #[error("Platform {0} appears more than once")]
    DuplicatePlatform(PlatformId),
    #[error("Prop slot {slot} on platform {platform} appears more than once")]
    DuplicateProp { platform: PlatformId, slot: SubgridId },
    #[error("Platform {platform} is outside the {layer_count} editable layers")]
    LayerOutOfRange { platform: PlatformId, layer_count: u32 },
    #[error("Platform {0} is outside the addressable grid")]
    PlatformOutOfRange(PlatformId),
    #[error("Prop slot {slot} is outside the sub-grid of platform {platform}")]
    SlotOutOfRange { platform: PlatformId, slot: SubgridId },
    #[error("Prop at {platform}/{slot} leaves its platform or overlaps another prop")]
    PropDoesNotFit { platform: PlatformId, slot: SubgridId },
}

/// Result type for level operations.
pub type LevelResult<T> = Result<T, LevelError>;

/// Descriptive fields carried alongside the placed objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelMetadata {
    pub level_name: String,
    pub level_rating: f32,
    pub level_completed: bool,
    pub level_lighting_setting: i32,
    pub revision: i32,
    pub author: String,
    /// ISO 8601 timestamp supplied by the host.
    pub date_time: String,
    pub follow_up_level: String,
    pub loading_done_image: String,
    pub guid: String,
}

impl Default for LevelMetadata {
    fn default() -> Self {
        Self {
            level_name: String::new(),
            level_rating: 0.0,
            level_completed: false,
            level_lighting_setting: 0,
            revision: 1,
            author: String::new(),
            date_time: String::new(),
            follow_up_level: String::new(),
            loading_done_image: String::new(),
            guid: String::new(),
        }
    }
}

/// A prop as stored in a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropEntry {
    pub rotation: Rotation,
    pub subgrid_id: SubgridId,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub connection_id: Option<ConnectionId>,
    pub lookup_key: String,
}

/// A platform and its props as stored in a level file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEntry {
    pub rotation: Rotation,
    pub platform_id: PlatformId,
    pub lookup_key: String,
    #[serde(default)]
    pub props: Vec<PropEntry>,
}

/// Top-level level record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelFile {
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
    #[serde(flatten)]
    pub metadata: LevelMetadata,
}

/// Older files write an empty string instead of omitting the field.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<ConnectionId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl LevelFile {
    /// Export the registry contents. A GUID is generated if the metadata has none.
    pub fn from_registry(registry: &PlacementRegistry, mut metadata: LevelMetadata) -> Self {
        if metadata.guid.is_empty() {
            metadata.guid = Uuid::new_v4().to_string();
        }

        let platforms = registry
            .platforms()
            .map(|(platform_id, platform)| PlatformEntry {
                rotation: platform.rotation(),
                platform_id,
                lookup_key: platform.lookup_key().to_string(),
                props: platform
                    .props()
                    .filter_map(|prop| {
                        Some(PropEntry {
                            rotation: prop.rotation(),
                            subgrid_id: prop.subgrid_id()?,
                            connection_id: prop.connection,
                            lookup_key: prop.lookup_key().to_string(),
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            platforms,
            metadata,
        }
    }

    /// Rebuild a registry, instantiating every object through the catalog.
    ///
    /// Every object goes through the same placement checks as interactive
    /// editing under `settings`.
    pub fn into_registry(
        &self,
        catalog: &ObjectCatalog,
        settings: &EditorSettings,
    ) -> LevelResult<PlacementRegistry> {
        let validator = PlacementValidator::new(settings.sub_cells_per_main_cell);
        let mut registry = PlacementRegistry::new();

        for entry in &self.platforms {
            if entry.platform_id.level() >= settings.layer_count {
                return Err(LevelError::LayerOutOfRange {
                    platform: entry.platform_id,
                    layer_count: settings.layer_count,
                });
            }
            if validator.platform_bounds(entry.platform_id).is_none() {
                return Err(LevelError::PlatformOutOfRange(entry.platform_id));
            }
            let Placeable::Platform(mut platform) = catalog.instantiate(&entry.lookup_key)? else {
                return Err(LevelError::NotAPlatform(entry.lookup_key.clone()));
            };
            platform.set_rotation(entry.rotation);
            if !registry.place(entry.platform_id, platform) {
                return Err(LevelError::DuplicatePlatform(entry.platform_id));
            }

            for prop_entry in &entry.props {
                let Placeable::Prop(mut prop) = catalog.instantiate(&prop_entry.lookup_key)? else {
                    return Err(LevelError::NotAProp(prop_entry.lookup_key.clone()));
                };
                prop.set_rotation(prop_entry.rotation);
                if let Some(connection) = prop_entry.connection_id {
                    if prop.kind == PropKind::Connectable {
                        prop.connection = Some(connection);
                    } else {
                        log::warn!(
                            "Ignoring connection {} on non-connectable prop {}",
                            connection,
                            prop_entry.lookup_key
                        );
                    }
                }
                let (platform_id, slot) = (entry.platform_id, prop_entry.subgrid_id);
                let anchor = validator
                    .prop_anchor(platform_id, slot)
                    .ok_or(LevelError::SlotOutOfRange {
                        platform: platform_id,
                        slot,
                    })?;
                let occupied = registry
                    .get(platform_id)
                    .is_some_and(|platform| platform.prop(slot).is_some());
                if occupied {
                    return Err(LevelError::DuplicateProp {
                        platform: platform_id,
                        slot,
                    });
                }
                if !validator.can_place_prop(&registry, platform_id, &prop.footprint_at(anchor)) {
                    return Err(LevelError::PropDoesNotFit {
                        platform: platform_id,
                        slot,
                    });
                }
                registry.place_on_platform(platform_id, slot, prop)?;
            }
        }

        log::info!(
            "Loaded level {:?} with {} platforms and {} props",
            self.metadata.level_name,
            registry.len(),
            registry.prop_count()
        );
        Ok(registry)
    }

    pub fn prop_count(&self) -> usize {
        self.platforms.iter().map(|platform| platform.props.len()).sum()
    }

    pub fn to_json(&self) -> LevelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> LevelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
