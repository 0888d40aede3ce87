//! CLI argument definitions using clap derive

use crate::config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

/// Kiln - minimal incremental build orchestrator
///
/// Builds a target declared in kiln.toml, rebuilding only what changed
/// since the last run.
#[derive(Parser, Debug)]
#[command(name = "kiln")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Target to build
    pub target: String,

    /// Logging verbosity (defaults to [general] log_level)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Build file path (defaults to the nearest kiln.toml)
    #[arg(short, long, env = "KILN_FILE")]
    pub file: Option<PathBuf>,

    /// State file path (overrides [state] path)
    #[arg(long, env = "KILN_STATE")]
    pub state: Option<PathBuf>,
}
