//! Save-record persistence on the local filesystem.

use hexrace_core::{SaveError, SaveRecord};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no save file at {0}")]
    Missing(PathBuf),

    #[error("save file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Invalid(#[from] SaveError),
}

/// A save file at a fixed path
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SaveRecord, StoreError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()))
            }
            Err(err) => return Err(err.into()),
        };
        Ok(SaveRecord::from_json(&json)?)
    }

    /// Write through a sibling temp file so a crash never leaves half a record
    pub fn save(&self, record: &SaveRecord) -> Result<(), StoreError> {
        let json = record.to_json()?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
