//! Storage abstraction for level files.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::level::LevelFile;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Level not found: {0}")]
    NotFound(String),
    #[error("Level already exists and may not be overwritten: {0}")]
    AlreadyExists(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Which of the two level folders a storage points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFolder {
    /// Levels shipped with the game.
    Builtin,
    /// Levels authored in the editor.
    Custom,
}

impl LevelFolder {
    pub fn dir_name(self) -> &'static str {
        match self {
            LevelFolder::Builtin => "Levels",
            LevelFolder::Custom => "CustomLevels",
        }
    }
}

/// Whether `save` may replace an existing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    CreateNew,
    Overwrite,
}

/// Trait for level storage backends.
pub trait LevelStorage: Send + Sync {
    /// Save a level under a name.
    fn save(&self, name: &str, level: &LevelFile, mode: SaveMode) -> StorageResult<()>;

    /// Load a level.
    fn load(&self, name: &str) -> StorageResult<LevelFile>;

    /// Delete a level. Deleting a missing level is not an error.
    fn delete(&self, name: &str) -> StorageResult<()>;

    /// List all level names.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a level exists.
    fn exists(&self, name: &str) -> StorageResult<bool>;
}
