//! Targets declared in a build file
//!
//! Every `[build.<name>]` table becomes a shell recipe and every
//! `[outdate.<name>]` table a shell predicate. All recipes are registered
//! before any predicate, so a predicate for an undeclared target fails.

pub mod shell;

pub use shell::{ShellPredicate, ShellRecipe};

use crate::config::{Config, OutdateConfig};
use crate::error::{KilnError, KilnResult};
use crate::project::Project;
use crate::target::{BUILD_PREFIX, OUTDATE_PREFIX};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Register every target and predicate from `config` on `project`
///
/// Commands run in `workdir`. `config_path` is only used in error messages.
pub fn register_config(
    project: &mut Project,
    config: &Config,
    workdir: &Path,
    config_path: &Path,
) -> KilnResult<()> {
    for (name, build) in &config.build {
        reject_prefix(name, "build", BUILD_PREFIX, config_path)?;
        let recipe = ShellRecipe::new(name, &build.command, workdir.to_path_buf())
            .output(build.output)
            .interactive(build.interactive);
        project
            .registry_mut()
            .register(name, build.deps.clone(), Box::new(shell::into_recipe(recipe)))?;
    }

    for (name, outdate) in &config.outdate {
        reject_prefix(name, "outdate", OUTDATE_PREFIX, config_path)?;
        match outdate_kind(outdate, name, config_path)? {
            OutdateKind::Always => {
                project
                    .registry_mut()
                    .register_outdate_predicate(name, Box::new(|| Ok(true)))?;
            }
            OutdateKind::Command(command) => {
                let predicate = ShellPredicate::new(name, command, workdir.to_path_buf());
                let predicate = Box::new(shell::into_predicate(predicate));
                project
                    .registry_mut()
                    .register_outdate_predicate(name, predicate)?;
            }
        }
    }

    debug!(
        "Registered {} target(s) and {} outdate predicate(s)",
        config.build.len(),
        config.outdate.len()
    );
    Ok(())
}

/// Table keys are target names as-is; the registry would strip this prefix
fn reject_prefix(name: &str, table: &str, prefix: &str, config_path: &Path) -> KilnResult<()> {
    match name.strip_prefix(prefix) {
        Some(bare) => Err(invalid(
            config_path,
            format!(
                "[{table}.{name}] would register as `{bare}`; name it [{table}.{bare}]"
            ),
        )),
        None => Ok(()),
    }
}

enum OutdateKind<'a> {
    Always,
    Command(&'a str),
}

fn outdate_kind<'a>(
    outdate: &'a OutdateConfig,
    name: &str,
    config_path: &Path,
) -> KilnResult<OutdateKind<'a>> {
    match (outdate.always, outdate.command.as_deref()) {
        (true, None) => Ok(OutdateKind::Always),
        (false, Some(command)) => Ok(OutdateKind::Command(command)),
        (true, Some(_)) => Err(invalid(
            config_path,
            format!("[outdate.{}] sets both `always` and `command`", name),
        )),
        (false, None) => Err(invalid(
            config_path,
            format!("[outdate.{}] needs `always = true` or a `command`", name),
        )),
    }
}

fn invalid(path: &Path, reason: String) -> KilnError {
    KilnError::ConfigInvalid {
        path: PathBuf::from(path),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateStore;
    use tempfile::TempDir;

    fn project(temp: &TempDir) -> Project {
        Project::open(StateStore::new(temp.path().join("state.json"))).unwrap()
    }

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    fn register_fresh(temp: &TempDir, toml: &str) -> KilnResult<()> {
        let mut project = project(temp);
        register_config(&mut project, &parse(toml), temp.path(), Path::new("kiln.toml"))
    }

    #[test]
    fn registers_targets_and_predicates() {
        let temp = TempDir::new().unwrap();
        let mut project = project(&temp);
        let config = parse(
            r#"
            [build.image]
            command = "echo id-42"

            [outdate.image]
            always = true

            [build.container]
            deps = ["image"]
            command = "echo container-of-$1"
            "#,
        );

        register_config(&mut project, &config, temp.path(), Path::new("kiln.toml")).unwrap();

        let registry = project.registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.lookup("image").unwrap().has_outdate_predicate());
        assert_eq!(
            registry.lookup("container").unwrap().dependency_names(),
            ["image"]
        );
    }

    #[test]
    fn outdate_for_undeclared_target_fails() {
        let temp = TempDir::new().unwrap();
        let mut project = project(&temp);
        let config = parse("[outdate.image]\nalways = true\n");

        let err = register_config(&mut project, &config, temp.path(), Path::new("kiln.toml"))
            .unwrap_err();
        assert!(matches!(err, KilnError::UnknownTarget(name) if name == "image"));
    }

    #[test]
    fn outdate_needs_exactly_one_mode() {
        let temp = TempDir::new().unwrap();

        for outdate in ["", "always = true\ncommand = \"true\"\n"] {
            let toml = format!("[build.image]\ncommand = \"true\"\n[outdate.image]\n{outdate}");
            let err = register_fresh(&temp, &toml).unwrap_err();
            assert!(matches!(err, KilnError::ConfigInvalid { .. }));
        }
    }

    #[test]
    fn prefixed_table_names_are_rejected() {
        let temp = TempDir::new().unwrap();

        for toml in [
            "[build.build_image]\ncommand = \"true\"\n",
            "[build.image]\ncommand = \"true\"\n[build.build_image]\ncommand = \"true\"\n",
            "[build.image]\ncommand = \"true\"\n[outdate.outdate_image]\nalways = true\n",
        ] {
            let err = register_fresh(&temp, toml).unwrap_err();
            match err {
                KilnError::ConfigInvalid { reason, .. } => assert!(reason.contains("image")),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn config_targets_build_end_to_end() {
        let temp = TempDir::new().unwrap();
        let mut project = project(&temp);
        let config = parse(
            r#"
            [build.image]
            command = "echo id-42"

            [outdate.image]
            command = "true"

            [build.container]
            deps = ["image"]
            command = "echo container-of-$1"
            "#,
        );
        register_config(&mut project, &config, temp.path(), Path::new("kiln.toml")).unwrap();

        let report = project.build("container").unwrap();
        assert_eq!(report.rebuilt(), ["image", "container"]);

        let report = project.build("container").unwrap();
        assert_eq!(report.rebuilt(), ["image"]);

        let state = project.store().load().unwrap();
        assert_eq!(
            state["container"].value,
            Some(serde_json::json!("container-of-id-42"))
        );
    }
}
