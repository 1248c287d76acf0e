//! Lookup table of placeable object templates.

use crate::placeable::{ObjectError, ObjectInfo, Placeable, Platform, Prop, PropKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown lookup key: {0}")]
    UnknownKey(String),
    #[error("Duplicate lookup key: {0}")]
    DuplicateKey(String),
    #[error("Invalid catalog entry: {0}")]
    InvalidEntry(#[from] ObjectError),
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

fn default_size() -> u32 {
    8
}

/// What an entry instantiates into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EntryKind {
    #[serde(rename_all = "camelCase")]
    Platform { takes_props: bool },
    Prop {
        #[serde(default)]
        kind: PropKind,
    },
}

/// One template in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub lookup_key: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Tag used by the host to group entries in its picker.
    #[serde(default)]
    pub filter: String,
    #[serde(default = "default_size")]
    pub length: u32,
    #[serde(default = "default_size")]
    pub width: u32,
    pub kind: EntryKind,
}

impl CatalogEntry {
    pub fn platform(lookup_key: impl Into<String>, length: u32, width: u32, takes_props: bool) -> Self {
        Self::new(lookup_key.into(), length, width, EntryKind::Platform { takes_props })
    }

    pub fn prop(lookup_key: impl Into<String>, length: u32, width: u32, kind: PropKind) -> Self {
        Self::new(lookup_key.into(), length, width, EntryKind::Prop { kind })
    }

    fn new(lookup_key: String, length: u32, width: u32, kind: EntryKind) -> Self {
        Self {
            display_name: lookup_key.clone(),
            lookup_key,
            description: String::new(),
            filter: String::new(),
            length,
            width,
            kind,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn is_platform(&self) -> bool {
        matches!(self.kind, EntryKind::Platform { .. })
    }

    /// Build a fresh, unplaced descriptor from this template.
    pub fn instantiate(&self) -> CatalogResult<Placeable> {
        let info = ObjectInfo::new(self.lookup_key.clone(), self.length, self.width)?;
        Ok(match self.kind {
            EntryKind::Platform { takes_props } => Platform::new(info, takes_props).into(),
            EntryKind::Prop { kind } => Prop::new(info, kind).into(),
        })
    }
}

/// Templates addressed by lookup key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCatalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl ObjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small catalog with one entry per kind, used when no catalog file is given.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        let entries = [
            CatalogEntry::platform("floor", 8, 8, true).with_filter("platforms"),
            CatalogEntry::platform("pillar", 8, 8, false).with_filter("platforms"),
            CatalogEntry::prop("level_start", 2, 2, PropKind::LevelStart).with_filter("gameplay"),
            CatalogEntry::prop("level_goal", 2, 2, PropKind::LevelGoal).with_filter("gameplay"),
            CatalogEntry::prop("crate", 2, 2, PropKind::Decoration).with_filter("props"),
            CatalogEntry::prop("bench", 3, 1, PropKind::Decoration).with_filter("props"),
            CatalogEntry::prop("lever", 1, 1, PropKind::Connectable).with_filter("gameplay"),
        ];
        for entry in entries {
            catalog.entries.insert(entry.lookup_key.clone(), entry);
        }
        catalog
    }

    /// Add a template. Keys must be unique and dimensions valid.
    pub fn insert(&mut self, entry: CatalogEntry) -> CatalogResult<()> {
        ObjectInfo::new(entry.lookup_key.clone(), entry.length, entry.width)?;
        if self.entries.contains_key(&entry.lookup_key) {
            return Err(CatalogError::DuplicateKey(entry.lookup_key));
        }
        self.entries.insert(entry.lookup_key.clone(), entry);
        Ok(())
    }

    pub fn get(&self, lookup_key: &str) -> Option<&CatalogEntry> {
        self.entries.get(lookup_key)
    }

    pub fn contains(&self, lookup_key: &str) -> bool {
        self.entries.contains_key(lookup_key)
    }

    /// Create a fresh descriptor for a lookup key.
    pub fn instantiate(&self, lookup_key: &str) -> CatalogResult<Placeable> {
        self.get(lookup_key)
            .ok_or_else(|| CatalogError::UnknownKey(lookup_key.to_string()))?
            .instantiate()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// Entries carrying the given filter tag.
    pub fn filtered<'a>(&'a self, filter: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries.values().filter(move |entry| entry.filter == filter)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse a catalog from a JSON array of entries.
    pub fn from_json(json: &str) -> CatalogResult<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn to_json(&self) -> CatalogResult<String> {
        let entries: Vec<&CatalogEntry> = self.entries.values().collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} catalog entries from {}", catalog.len(), path.display());
        Ok(catalog)
    }
}
