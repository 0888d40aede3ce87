//! State file load and save

use crate::error::{KilnError, KilnResult};
use crate::registry::Registry;
use crate::state::record::PersistedState;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default state file name, relative to the build file's directory
pub const DEFAULT_STATE_FILE: &str = "state.json";

/// Handle on the single persisted state record
///
/// Concurrent processes sharing one state file are not coordinated; the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Create a store backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state
    ///
    /// A missing file is an empty state. A file that exists but is not a
    /// JSON object of target records is a `CorruptState` error.
    pub fn load(&self) -> KilnResult<PersistedState> {
        if !self.path.exists() {
            debug!("State file {} not found, starting empty", self.path.display());
            return Ok(PersistedState::new());
        }

        let content = fs::read(&self.path).map_err(|e| {
            KilnError::io(format!("reading state file {}", self.path.display()), e)
        })?;

        let state: PersistedState =
            serde_json::from_slice(&content).map_err(|e| KilnError::CorruptState {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        debug!(
            "Loaded {} target record(s) from {}",
            state.len(),
            self.path.display()
        );
        Ok(state)
    }

    /// Overwrite the state file with every target currently in `registry`
    pub fn save(&self, registry: &Registry) -> KilnResult<()> {
        self.write(&registry.to_state())
    }

    /// Overwrite the state file with `state`
    ///
    /// Writes to a sibling temp file and renames it over the target.
    pub fn write(&self, state: &PersistedState) -> KilnResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    KilnError::io(format!("creating state directory {}", parent.display()), e)
                })?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;

        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, content).map_err(|e| {
            KilnError::io(format!("writing state file {}", tmp_path.display()), e)
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            KilnError::io(
                format!(
                    "renaming {} to {}",
                    tmp_path.display(),
                    self.path.display()
                ),
                e,
            )
        })?;

        debug!(
            "Saved {} target record(s) to {}",
            state.len(),
            self.path.display()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_STATE_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
