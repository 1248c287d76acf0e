//! Level file summaries.

use plamb_core::{EditorSettings, LevelError, LevelFile, ObjectCatalog, PropKind};
use std::collections::BTreeMap;
use std::fmt;

/// What a level contains, after it has been validated against a catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub name: String,
    pub author: String,
    pub guid: String,
    pub platforms: usize,
    pub props: usize,
    /// Platform count per layer.
    pub layers: BTreeMap<u32, usize>,
    pub has_start: bool,
    pub has_goal: bool,
}

impl LevelSummary {
    /// Rebuild the level through the catalog and summarize it.
    pub fn from_level(
        level: &LevelFile,
        catalog: &ObjectCatalog,
        settings: &EditorSettings,
    ) -> Result<Self, LevelError> {
        let registry = level.into_registry(catalog, settings)?;
        let mut layers = BTreeMap::new();
        for (platform_id, _) in registry.platforms() {
            *layers.entry(platform_id.level()).or_insert(0) += 1;
        }
        Ok(Self {
            name: level.metadata.level_name.clone(),
            author: level.metadata.author.clone(),
            guid: level.metadata.guid.clone(),
            platforms: registry.len(),
            props: registry.prop_count(),
            layers,
            has_start: registry.has_prop_of_kind(PropKind::LevelStart),
            has_goal: registry.has_prop_of_kind(PropKind::LevelGoal),
        })
    }

    pub fn is_playable(&self) -> bool {
        self.has_start && self.has_goal
    }
}

impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Level:     {}", self.name)?;
        writeln!(f, "Author:    {}", self.author)?;
        writeln!(f, "GUID:      {}", self.guid)?;
        writeln!(f, "Platforms: {}", self.platforms)?;
        writeln!(f, "Props:     {}", self.props)?;
        for (layer, count) in &self.layers {
            writeln!(f, "  layer {:2}: {} platforms", layer, count)?;
        }
        write!(f, "Playable:  {}", if self.is_playable() { "yes" } else { "no" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_layers() {
        let json = r#"{
            "platforms": [
                { "rotation": 0, "platformId": "2A0", "lookupKey": "floor",
                  "props": [ { "rotation": 0, "subgridId": "B2", "lookupKey": "level_start" } ] },
                { "rotation": 90, "platformId": "2B0", "lookupKey": "floor" },
                { "rotation": 0, "platformId": "4A0", "lookupKey": "pillar" }
            ],
            "levelName": "Two floors",
            "guid": "abc"
        }"#;
        let level = LevelFile::from_json(json).unwrap();
        let summary = LevelSummary::from_level(&level, &ObjectCatalog::builtin(), &EditorSettings::default())
                .unwrap();

        assert_eq!(summary.platforms, 3);
        assert_eq!(summary.props, 1);
        assert_eq!(summary.layers.get(&2), Some(&2));
        assert_eq!(summary.layers.get(&4), Some(&1));
        assert!(summary.has_start);
        assert!(!summary.is_playable());
        assert!(summary.to_string().contains("Playable:  no"));
    }
}
