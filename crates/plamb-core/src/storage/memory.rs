//! In-memory level storage.

use super::{LevelStorage, SaveMode, StorageError, StorageResult};
use crate::level::LevelFile;
use std::collections::BTreeMap;
use std::sync::RwLock;

/// In-memory storage for testing and scripted sessions.
#[derive(Default)]
pub struct MemoryStorage {
    levels: RwLock<BTreeMap<String, LevelFile>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl LevelStorage for MemoryStorage {
    fn save(&self, name: &str, level: &LevelFile, mode: SaveMode) -> StorageResult<()> {
        let mut levels = self.levels.write().map_err(lock_error)?;
        if mode == SaveMode::CreateNew && levels.contains_key(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        levels.insert(name.to_string(), level.clone());
        Ok(())
    }

    fn load(&self, name: &str) -> StorageResult<LevelFile> {
        let levels = self.levels.read().map_err(lock_error)?;
        levels
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn delete(&self, name: &str) -> StorageResult<()> {
        let mut levels = self.levels.write().map_err(lock_error)?;
        levels.remove(name);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let levels = self.levels.read().map_err(lock_error)?;
        Ok(levels.keys().cloned().collect())
    }

    fn exists(&self, name: &str) -> StorageResult<bool> {
        let levels = self.levels.read().map_err(lock_error)?;
        Ok(levels.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let level = LevelFile::default();

        storage.save("test", &level, SaveMode::CreateNew).unwrap();
        assert_eq!(storage.load("test").unwrap(), level);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        assert!(matches!(storage.load("nonexistent"), Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_create_new_refuses_existing() {
        let storage = MemoryStorage::new();
        let level = LevelFile::default();
        storage.save("test", &level, SaveMode::CreateNew).unwrap();
        assert!(matches!(
            storage.save("test", &level, SaveMode::CreateNew),
            Err(StorageError::AlreadyExists(_))
        ));
        assert!(storage.save("test", &level, SaveMode::Overwrite).is_ok());
    }

    #[test]
    fn test_delete_and_list() {
        let storage = MemoryStorage::new();
        let level = LevelFile::default();

        storage.save("doc2", &level, SaveMode::CreateNew).unwrap();
        storage.save("doc1", &level, SaveMode::CreateNew).unwrap();
        assert_eq!(storage.list().unwrap(), vec!["doc1".to_string(), "doc2".to_string()]);

        storage.delete("doc1").unwrap();
        assert!(!storage.exists("doc1").unwrap());
        assert_eq!(storage.list().unwrap().len(), 1);
    }
}
