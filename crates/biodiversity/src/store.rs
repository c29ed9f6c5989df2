//! Local JSON file of registry records.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{BiodiversityError, Result};
use crate::redlist::SpeciesRecord;

/// A JSON array of [`SpeciesRecord`]s on disk.
#[derive(Debug, Clone)]
pub struct SpeciesStore {
    path: PathBuf,
}

impl SpeciesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read every record in the file.
    pub fn load(&self) -> Result<Vec<SpeciesRecord>> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            BiodiversityError::store(format!("failed to read {}: {}", self.path.display(), e))
        })?;

        let records: Vec<SpeciesRecord> = serde_json::from_str(&content).map_err(|e| {
            BiodiversityError::store(format!("{} contains invalid JSON: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), count = records.len(), "Loaded species records");
        Ok(records)
    }

    /// Replace the file contents with `records`.
    ///
    /// Writes to a sibling temp file first so a crash never leaves a
    /// truncated document behind.
    pub fn save(&self, records: &[SpeciesRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                BiodiversityError::store(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| BiodiversityError::store(format!("failed to encode records: {}", e)))?;

        let tmp = self.path.with_extension("json.partial");
        fs::write(&tmp, json).map_err(|e| {
            BiodiversityError::store(format!("failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            BiodiversityError::store(format!("failed to move into {}: {}", self.path.display(), e))
        })?;

        Ok(())
    }

    /// Add `records` after the ones already stored, keeping one valid JSON array.
    ///
    /// Returns the total number of records now in the file.
    pub fn append(&self, records: &[SpeciesRecord]) -> Result<usize> {
        let mut all = if self.exists() { self.load()? } else { Vec::new() };
        all.extend_from_slice(records);
        self.save(&all)?;

        info!(
            path = %self.path.display(),
            added = records.len(),
            total = all.len(),
            "Saved species records"
        );
        Ok(all.len())
    }
}
