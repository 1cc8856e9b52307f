//! Persistence Module
//!
//! Key-value substrate used to hydrate and persist store state.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::{PortalError, Result};

// == Persistence Trait ==
/// Synchronous key-value persistence over serialized JSON strings.
pub trait Persistence: Send + Sync {
    /// Returns the stored value, or `None` if nothing was written under `key`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes `value` under `key`, replacing anything already there.
    fn set(&self, key: &str, value: String) -> Result<()>;
}

// == Memory Persistence ==
/// Process-local persistence backed by a HashMap.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Persistence for MemoryPersistence {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| PortalError::Persistence("memory persistence lock poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| PortalError::Persistence("memory persistence lock poisoned".into()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

// == File Persistence ==
/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    /// Creates the backend, creating `dir` if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| {
            PortalError::Persistence(format!("cannot create {}: {}", dir.display(), e))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(PortalError::Persistence(format!(
                "invalid persistence key: '{}'",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Persistence for FilePersistence {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PortalError::Persistence(format!(
                "cannot read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        let path = self.path_for(key)?;
        fs::write(&path, value).map_err(|e| {
            PortalError::Persistence(format!("cannot write {}: {}", path.display(), e))
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_get_missing() {
        let persistence = MemoryPersistence::new();
        assert_eq!(persistence.get("app").unwrap(), None);
    }

    #[test]
    fn test_memory_set_overwrites() {
        let persistence = MemoryPersistence::new();
        persistence.set("app", "1".into()).unwrap();
        persistence.set("app", "2".into()).unwrap();
        assert_eq!(persistence.get("app").unwrap(), Some("2".into()));
    }

    #[test]
    fn test_file_set_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path()).unwrap();

        persistence.set("patient", r#"{"a":1}"#.into()).unwrap();
        assert_eq!(
            persistence.get("patient").unwrap(),
            Some(r#"{"a":1}"#.to_string())
        );
        assert!(dir.path().join("patient.json").exists());
    }

    #[test]
    fn test_file_get_missing() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path()).unwrap();
        assert_eq!(persistence.get("nothing").unwrap(), None);
    }

    #[test]
    fn test_file_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let persistence = FilePersistence::new(dir.path()).unwrap();
        let result = persistence.set("../escape", "x".into());
        assert!(matches!(result, Err(PortalError::Persistence(_))));
    }
}
