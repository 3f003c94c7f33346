use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::StoreError;

/// where the best level goes between runs. a single integer, as text;
/// nothing stored yet means 1
pub trait PersistenceStore: Send + Sync {
    fn read_best_level(&self) -> Result<u32, StoreError>;

    fn write_best_level(&self, level: u32) -> Result<(), StoreError>;
}

/// keeps the best level in a text file, e.g. log/best_level.txt
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceStore for FileStore {
    fn read_best_level(&self) -> Result<u32, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(1),
            Err(e) => return Err(e.into()),
        };
        match content.trim().parse::<u32>() {
            Ok(level) => Ok(level.max(1)),
            Err(_) => Err(StoreError::Malformed { content }),
        }
    }

    fn write_best_level(&self, level: u32) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::write(&self.path, level.to_string())?;
        Ok(())
    }
}

/// dummy store for testing; can be told to fail writes
pub struct MemoryStore {
    level: Mutex<Option<u32>>,
    fail_writes: bool,
    writes: Mutex<Vec<u32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            level: Mutex::new(None),
            fail_writes: false,
            writes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_level(level: u32) -> Self {
        let store = Self::new();
        *store.level.lock().unwrap_or_else(|e| e.into_inner()) = Some(level);
        store
    }

    pub fn failing() -> Self {
        MemoryStore {
            fail_writes: true,
            ..Self::new()
        }
    }

    /// every value ever written, in order
    pub fn writes(&self) -> Vec<u32> {
        self.writes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistenceStore for MemoryStore {
    fn read_best_level(&self) -> Result<u32, StoreError> {
        let level = self.level.lock().unwrap_or_else(|e| e.into_inner());
        Ok(level.unwrap_or(1))
    }

    fn write_best_level(&self, level: u32) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "read-only store",
            )));
        }
        *self.level.lock().unwrap_or_else(|e| e.into_inner()) = Some(level);
        self.writes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_file_defaults_to_one() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("best_level.txt"));
        assert_eq!(store.read_best_level()?, 1);
        Ok(())
    }

    #[test]
    fn test_write_then_read() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let store = FileStore::new(dir.path().join("log").join("best_level.txt"));
        store.write_best_level(7)?;
        assert_eq!(store.read_best_level()?, 7);
        store.write_best_level(12)?;
        assert_eq!(store.read_best_level()?, 12);
        assert_eq!(fs::read_to_string(store.path())?, "12");
        Ok(())
    }

    #[test]
    fn test_tolerates_trailing_newline() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("best_level.txt");
        fs::write(&path, "5\n")?;
        assert_eq!(FileStore::new(path).read_best_level()?, 5);
        Ok(())
    }

    #[test]
    fn test_zero_clamps_to_one() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("best_level.txt");
        fs::write(&path, "0")?;
        assert_eq!(FileStore::new(path).read_best_level()?, 1);
        Ok(())
    }

    #[test]
    fn test_garbage_is_malformed() -> Result<(), StoreError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("best_level.txt");
        fs::write(&path, "lots")?;
        match FileStore::new(path).read_best_level() {
            Err(StoreError::Malformed { content }) => assert_eq!(content, "lots"),
            other => panic!("expected malformed, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_memory_store_records_writes() -> Result<(), StoreError> {
        let store = MemoryStore::new();
        assert_eq!(store.read_best_level()?, 1);
        store.write_best_level(2)?;
        store.write_best_level(3)?;
        assert_eq!(store.read_best_level()?, 3);
        assert_eq!(store.writes(), vec![2, 3]);
        Ok(())
    }

    #[test]
    fn test_failing_store() {
        let store = MemoryStore::failing();
        assert!(store.write_best_level(4).is_err());
        assert!(store.writes().is_empty());
    }
}
