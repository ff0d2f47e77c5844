//! File-backed storage adapter
//!
//! Each key maps to `<data_dir>/<key>.json`. Writes go to a uniquely named
//! temp file in the same directory which is then renamed over the target, so
//! readers only ever see a complete document and concurrent writers never
//! share a temp file.

use super::StorageAdapter;
use crate::types::LedgerError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;

const EXTENSION: &str = "json";

/// Durable key-value storage rooted at a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a data directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(FileStorage { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, LedgerError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(LedgerError::storage(key, "invalid key"));
        }
        Ok(self.root.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl StorageAdapter for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LedgerError::storage(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError> {
        let path = self.path_for(key)?;
        // Dropping the temp file on any error path deletes it
        let mut tmp = Builder::new()
            .prefix(&format!(".{}-", key))
            .suffix(".tmp")
            .tempfile_in(&self.root)
            .map_err(|e| LedgerError::storage(key, e))?;
        tmp.write_all(value.as_bytes())
            .map_err(|e| LedgerError::storage(key, e))?;
        tmp.persist(&path)
            .map_err(|e| LedgerError::storage(key, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LedgerError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LedgerError::storage(key, e)),
        }
    }
}
