//! Level dimensions and grid configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid settings: {0}")]
    Invalid(String),
}

/// Integer offset applied to a remapped grid axis pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOffset {
    pub x: i32,
    pub y: i32,
}

impl GridOffset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Editor configuration, fixed at initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    /// Maximum length of the cursor ray used by the host to hit the grid plane.
    pub grid_raycast_length: u32,
    /// World size of one sub-grid cell.
    pub sub_cell_unit_size: f64,
    /// Number of vertical layers.
    pub layer_count: u32,
    /// Sub-grid cells along each side of one platform cell.
    pub sub_cells_per_main_cell: u32,
    /// Half extent of the playable grid in world units (camera clamping).
    pub grid_size_half: f64,
    /// Remap offset for the platform grid.
    pub grid_offset_main: GridOffset,
    /// Remap offset for the sub-grid.
    pub grid_offset_sub: GridOffset,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_raycast_length: 2000,
            sub_cell_unit_size: 0.5,
            layer_count: 10,
            sub_cells_per_main_cell: 8,
            // 24 cells * 4 units, half of that
            grid_size_half: 24.0 * 4.0 * 0.5,
            grid_offset_main: GridOffset::new(12, 11),
            grid_offset_sub: GridOffset::new(96, 95),
        }
    }
}

impl EditorSettings {
    /// World size of one platform cell.
    pub fn main_cell_unit_size(&self) -> f64 {
        self.sub_cell_unit_size * self.sub_cells_per_main_cell as f64
    }

    /// Layer the editor starts on.
    pub fn initial_layer(&self) -> u32 {
        self.layer_count / 2
    }

    /// Check values that would make grid math meaningless.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.sub_cell_unit_size.is_finite() && self.sub_cell_unit_size > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "subCellUnitSize must be positive, got {}",
                self.sub_cell_unit_size
            )));
        }
        if self.sub_cells_per_main_cell == 0 {
            return Err(SettingsError::Invalid(
                "subCellsPerMainCell must be at least 1".to_string(),
            ));
        }
        if self.layer_count == 0 {
            return Err(SettingsError::Invalid(
                "layerCount must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse settings from JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.layer_count, 10);
        assert_eq!(settings.sub_cells_per_main_cell, 8);
        assert!((settings.main_cell_unit_size() - 4.0).abs() < f64::EPSILON);
        assert!((settings.grid_size_half - 48.0).abs() < f64::EPSILON);
        assert_eq!(settings.initial_layer(), 5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = EditorSettings::from_json(r#"{ "layerCount": 4 }"#).unwrap();
        assert_eq!(settings.layer_count, 4);
        assert_eq!(settings.grid_offset_sub, GridOffset::new(96, 95));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = EditorSettings::from_json(r#"{ "subCellsPerMainCell": 0 }"#);
        assert!(matches!(result, Err(SettingsError::Invalid(_))));

        let result = EditorSettings::from_json(r#"{ "subCellUnitSize": -1.0 }"#);
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = EditorSettings {
            layer_count: 3,
            ..EditorSettings::default()
        };
        std::fs::write(&path, settings.to_json().unwrap()).unwrap();

        let loaded = EditorSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);

        let missing = EditorSettings::load(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(SettingsError::Io { .. })));
    }
}
