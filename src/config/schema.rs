//! Build file schema for Kiln
//!
//! The build file is `kiln.toml`. `[build.<name>]` tables declare targets and
//! `[outdate.<name>]` tables attach outdate predicates to them.

use crate::build::Propagation;
use crate::state::store::DEFAULT_STATE_FILE;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Root build file structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// State file settings
    pub state: StateConfig,

    /// Target recipes, keyed by target name
    pub build: BTreeMap<String, BuildConfig>,

    /// Outdate predicates, keyed by target name
    pub outdate: BTreeMap<String, OutdateConfig>,
}

/// General settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log verbosity when `--log-level` is not given
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// How far a build looks for staleness
    pub propagation: Propagation,
}

/// Logging verbosity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Registration, state and skip decisions too
    Debug,
    /// Recipe and predicate invocations
    #[default]
    Info,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// State file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// State file path, relative to the build file's directory
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

/// One `[build.<name>]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Shell command producing the value; dependency values arrive as `$1..$n`
    pub command: String,

    /// Dependency target names, in the order passed to the command
    #[serde(default)]
    pub deps: Vec<String>,

    /// How stdout becomes the target value
    #[serde(default)]
    pub output: OutputFormat,

    /// Attach the command to the terminal; the target then has no value
    #[serde(default)]
    pub interactive: bool,
}

/// How a command's stdout is turned into a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Trimmed stdout as a string; empty stdout is no value
    #[default]
    Text,
    /// Stdout parsed as JSON
    Json,
}

/// One `[outdate.<name>]` table; exactly one field must be set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutdateConfig {
    /// Always rebuild
    pub always: bool,

    /// Shell command; exit status 0 means outdated
    pub command: Option<String>,
}
