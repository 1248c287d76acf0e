//! File-based level storage.

use super::{LevelFolder, LevelStorage, SaveMode, StorageError, StorageResult};
use crate::level::LevelFile;
use std::fs;
use std::path::{Path, PathBuf};

const LEVEL_EXTENSION: &str = "json";

/// Stores levels as `<name>.json` files in one directory.
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create level directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage for one of the level folders.
    ///
    /// On Unix: `~/.local/share/plamb/<folder>/`
    /// On Windows: `%LOCALAPPDATA%\plamb\<folder>\`
    pub fn default_location(folder: LevelFolder) -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("plamb").join(folder.dir_name()))
    }

    fn level_path(&self, name: &str) -> PathBuf {
        let safe_name: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{}.{}", safe_name, LEVEL_EXTENSION))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl LevelStorage for FileStorage {
    fn save(&self, name: &str, level: &LevelFile, mode: SaveMode) -> StorageResult<()> {
        let path = self.level_path(name);
        if mode == SaveMode::CreateNew && path.exists() {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        let json = level
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        fs::write(&path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        log::info!("Saved level {} to {}", name, path.display());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<LevelFile> {
        let path = self.level_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }

        let json = fs::read_to_string(&path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))?;

        LevelFile::from_json(&json).map_err(|e| {
            StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let path = self.level_path(name);
        if path.exists() {
            fs::remove_file(&path).map_err(|e| {
                StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))
            })?;
            log::info!("Deleted level {}", name);
        }
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == LEVEL_EXTENSION))
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.level_path(name).exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelMetadata;
    use tempfile::tempdir;

    fn level(name: &str) -> LevelFile {
        LevelFile {
            metadata: LevelMetadata {
                level_name: name.to_string(),
                ..LevelMetadata::default()
            },
            ..LevelFile::default()
        }
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("level", &level("Test Level"), SaveMode::CreateNew).unwrap();
        let loaded = storage.load("level").unwrap();

        assert_eq!(loaded.metadata.level_name, "Test Level");
    }

    #[test]
    fn test_file_storage_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("level", &level("first"), SaveMode::CreateNew).unwrap();
        let result = storage.save("level", &level("second"), SaveMode::CreateNew);
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
        assert_eq!(storage.load("level").unwrap().metadata.level_name, "first");

        storage.save("level", &level("second"), SaveMode::Overwrite).unwrap();
        assert_eq!(storage.load("level").unwrap().metadata.level_name, "second");
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = storage.load("nonexistent");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_rejects_garbage() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let result = storage.load("broken");
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_storage_list() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("b", &level("b"), SaveMode::CreateNew).unwrap();
        storage.save("a", &level("a"), SaveMode::CreateNew).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(storage.list().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_file_storage_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("test", &level("test"), SaveMode::CreateNew).unwrap();
        assert!(storage.exists("test").unwrap());

        storage.delete("test").unwrap();
        assert!(!storage.exists("test").unwrap());
        storage.delete("test").unwrap();
    }

    #[test]
    fn test_file_storage_sanitizes_name() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        storage.save("../escape:me*", &level("x"), SaveMode::CreateNew).unwrap();
        assert!(storage.exists("../escape:me*").unwrap());
        assert!(!dir.path().parent().unwrap().join("escape_me_.json").exists());
    }
}
