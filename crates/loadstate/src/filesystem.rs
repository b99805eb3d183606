//! Filesystem-backed load-state storage.

use std::path::PathBuf;

use crate::state::LoadState;
use crate::store::{LoadStateError, LoadStateStore};

/// Stores one JSON file per table in a directory.
///
/// Files are named `loadstate_<table>.json` and overwritten in place; the
/// record is current state, not history.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn path_for(&self, table: &str) -> PathBuf {
        self.dir.join(format!("loadstate_{table}.json"))
    }
}

impl LoadStateStore for FilesystemStore {
    fn load(&self, table: &str) -> Result<Option<LoadState>, LoadStateError> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, state: &LoadState) -> Result<(), LoadStateError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(&state.table);
        std::fs::write(&path, serde_json::to_string_pretty(state)?)?;

        tracing::debug!("Stored load state for '{}' to {}", state.table, path.display());
        Ok(())
    }

    fn delete(&self, table: &str) -> Result<bool, LoadStateError> {
        let path = self.path_for(table);
        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(path)?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<String>, LoadStateError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut tables = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let filename = entry.file_name().to_string_lossy().to_string();
            if let Some(table) = filename
                .strip_prefix("loadstate_")
                .and_then(|rest| rest.strip_suffix(".json"))
            {
                tables.push(table.to_string());
            }
        }

        tables.sort();
        Ok(tables)
    }
}
