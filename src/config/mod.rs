//! Build file discovery and loading

pub mod schema;

pub use schema::{BuildConfig, Config, LogFormat, LogLevel, OutdateConfig, OutputFormat};

use crate::error::{KilnError, KilnResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build file name searched for in the current directory and its ancestors
pub const CONFIG_FILE_NAME: &str = "kiln.toml";

/// Locates and loads one build file
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager for an explicit build file
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Find `kiln.toml` in `start` or its nearest ancestor
    pub fn discover(start: &Path) -> KilnResult<Self> {
        Self::find_config(start)
            .map(Self::with_path)
            .ok_or_else(|| KilnError::ConfigNotFound(start.join(CONFIG_FILE_NAME)))
    }

    /// Walk up from `start` looking for a build file
    pub fn find_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load and parse the build file
    pub fn load(&self) -> KilnResult<Config> {
        if !self.config_path.exists() {
            return Err(KilnError::ConfigNotFound(self.config_path.clone()));
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            KilnError::io(format!("reading build file {}", self.config_path.display()), e)
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| KilnError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: e.to_string(),
        })?;

        debug!(
            "Loaded {} target(s) from {}",
            config.build.len(),
            self.config_path.display()
        );
        Ok(config)
    }

    /// Directory commands run in and relative paths resolve against
    pub fn base_dir(&self) -> PathBuf {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// State file path, with `override_path` taking precedence over the build file
    pub fn state_path(&self, config: &Config, override_path: Option<&Path>) -> PathBuf {
        match override_path {
            Some(path) => path.to_path_buf(),
            None if config.state.path.is_absolute() => config.state.path.clone(),
            None => self.base_dir().join(&config.state.path),
        }
    }

    /// Get the build file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
