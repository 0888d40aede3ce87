//! Command-line interface

pub mod args;

pub use args::Cli;

use crate::config::{ConfigManager, LogFormat, LogLevel};
use crate::error::{KilnError, KilnResult};
use crate::project::Project;
use crate::recipe;
use crate::state::StateStore;
use console::style;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Locate the build file named by `cli`, or discover one from the current directory
pub fn config_manager(cli: &Cli) -> KilnResult<ConfigManager> {
    match &cli.file {
        Some(path) => Ok(ConfigManager::with_path(path.clone())),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| KilnError::io("getting current directory", e))?;
            ConfigManager::discover(&cwd)
        }
    }
}

/// Initialize logging to stderr
pub fn init_logging(level: LogLevel, format: LogFormat) {
    let filter = EnvFilter::new(format!("kiln={}", level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.without_time().init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Build the requested target
pub fn run(cli: Cli) -> KilnResult<()> {
    let manager = config_manager(&cli)?;
    let config = manager.load()?;

    init_logging(
        cli.log_level.unwrap_or(config.general.log_level),
        config.general.log_format,
    );
    debug!("Using build file {}", manager.path().display());

    let store = StateStore::new(manager.state_path(&config, cli.state.as_deref()));
    let mut project = Project::open(store)?.with_propagation(config.general.propagation);
    recipe::register_config(&mut project, &config, &manager.base_dir(), manager.path())?;

    let report = project.build(&cli.target)?;

    if report.is_up_to_date() {
        println!(
            "{} {} is up to date",
            style("✓").green(),
            style(&cli.target).cyan()
        );
    } else {
        println!(
            "{} Built {} ({} recipe run(s): {})",
            style("✓").green(),
            style(&cli.target).cyan(),
            report.rebuilt().len(),
            report.rebuilt().join(", ")
        );
    }

    Ok(())
}
