use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use space::PlayerId;

use crate::error::PersistenceError;

/// Best score per player, backed by a flat JSON file.
///
/// The whole table is loaded once at startup and rewritten in full on every
/// improvement. An absent entry means a best of 0.
#[derive(Debug, Default)]
pub struct HighScoreStore {
    /// None for stores that never touch disk.
    path: Option<PathBuf>,
    scores: BTreeMap<PlayerId, u32>,
}

impl HighScoreStore {
    /// Load the table from `path`. A missing file yields an empty table; a
    /// file that does not parse is reported as corrupt.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let scores = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| PersistenceError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?
        } else {
            tracing::info!(path = %path.display(), "no high score file, starting empty");
            BTreeMap::new()
        };

        tracing::info!(path = %path.display(), players = scores.len(), "High scores loaded");
        Ok(Self {
            path: Some(path),
            scores,
        })
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, player: PlayerId) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Store `candidate` if it beats the current best, then rewrite the file.
    ///
    /// Returns whether the table changed. On a write error the in-memory
    /// value is already updated; the error is returned for the caller to log.
    pub fn record_if_higher(&mut self, player: PlayerId, candidate: u32) -> Result<bool, PersistenceError> {
        if candidate <= self.get(player) {
            return Ok(false);
        }
        self.scores.insert(player, candidate);
        self.save()?;
        Ok(true)
    }

    /// Write the full table (temp file + rename).
    pub fn save(&self) -> Result<(), PersistenceError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.scores)?;

        let mut tmp: OsString = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp_path = PathBuf::from(tmp);
        std::fs::write(&tmp_path, json.as_bytes())?;
        std::fs::rename(&tmp_path, path)?;

        tracing::debug!(path = %path.display(), players = self.scores.len(), "High scores saved");
        Ok(())
    }
}
