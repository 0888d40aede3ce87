//! Shell command recipes and predicates
//!
//! Commands run through `sh -c` in the build file's directory. Dependency
//! values are passed as positional parameters, so a recipe reads its first
//! dependency as `$1`.

use crate::config::OutputFormat;
use crate::error::{BoxError, KilnError, KilnResult};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::debug;

/// Environment variable holding the name of the target being built
pub const TARGET_ENV: &str = "KILN_TARGET";

/// A `[build.<name>]` command
#[derive(Debug, Clone)]
pub struct ShellRecipe {
    target: String,
    command: String,
    workdir: PathBuf,
    output: OutputFormat,
    interactive: bool,
}

impl ShellRecipe {
    /// Create a recipe for `target` running `command` in `workdir`
    pub fn new(target: impl Into<String>, command: impl Into<String>, workdir: PathBuf) -> Self {
        Self {
            target: target.into(),
            command: command.into(),
            workdir,
            output: OutputFormat::default(),
            interactive: false,
        }
    }

    /// Set how stdout becomes the value
    pub fn output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Inherit the terminal instead of capturing stdout
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Run the command with `args` as `$1..$n`
    pub fn run(&self, args: &[Value]) -> KilnResult<Value> {
        let mut cmd = shell(&self.command, &self.target, &self.workdir);
        cmd.args(args.iter().map(positional));

        if self.interactive {
            debug!("Executing interactively: sh -c {:?}", self.command);
            let status = cmd
                .stdin(Stdio::inherit())
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .map_err(|e| KilnError::command_failed(&self.command, e))?;

            if !status.success() {
                return Err(KilnError::CommandExit {
                    command: self.command.clone(),
                    code: status.code(),
                    stderr: String::new(),
                });
            }
            return Ok(Value::Null);
        }

        let output = capture(cmd, &self.command)?;
        check_status(&output, &self.command)?;
        parse_output(&output.stdout, self.output, &self.command)
    }
}

/// An `[outdate.<name>]` command; exit status 0 means outdated
#[derive(Debug, Clone)]
pub struct ShellPredicate {
    target: String,
    command: String,
    workdir: PathBuf,
}

impl ShellPredicate {
    /// Create a predicate for `target` running `command` in `workdir`
    pub fn new(target: impl Into<String>, command: impl Into<String>, workdir: PathBuf) -> Self {
        Self {
            target: target.into(),
            command: command.into(),
            workdir,
        }
    }

    /// Run the command and report whether the target is outdated
    pub fn check(&self) -> KilnResult<bool> {
        let cmd = shell(&self.command, &self.target, &self.workdir);
        let output = capture(cmd, &self.command)?;
        if output.status.code().is_none() {
            return Err(KilnError::CommandExit {
                command: self.command.clone(),
                code: None,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output.status.success())
    }
}

/// Adapt a shell recipe to the registry's recipe signature
pub fn into_recipe(recipe: ShellRecipe) -> impl Fn(&[Value]) -> Result<Value, BoxError> {
    move |args: &[Value]| recipe.run(args).map_err(BoxError::from)
}

/// Adapt a shell predicate to the registry's predicate signature
pub fn into_predicate(predicate: ShellPredicate) -> impl Fn() -> Result<bool, BoxError> {
    move || predicate.check().map_err(BoxError::from)
}

fn shell(command: &str, target: &str, workdir: &Path) -> Command {
    let mut cmd = Command::new("sh");
    // $0 is the target name so `$1` is the first dependency
    cmd.arg("-c")
        .arg(command)
        .arg(target)
        .current_dir(workdir)
        .env(TARGET_ENV, target);
    cmd
}

fn capture(mut cmd: Command, command: &str) -> KilnResult<Output> {
    debug!("Executing: sh -c {:?}", command);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| KilnError::command_failed(command, e))
}

fn check_status(output: &Output, command: &str) -> KilnResult<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(KilnError::CommandExit {
        command: command.to_string(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Render a dependency value as a positional parameter
fn positional(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_output(stdout: &[u8], format: OutputFormat, command: &str) -> KilnResult<Value> {
    let text = std::str::from_utf8(stdout).map_err(|_| KilnError::CommandOutput {
        command: command.to_string(),
    })?;
    let trimmed = text.trim();
    match format {
        OutputFormat::Text if trimmed.is_empty() => Ok(Value::Null),
        OutputFormat::Text => Ok(Value::String(trimmed.to_string())),
        OutputFormat::Json => Ok(serde_json::from_str(trimmed)?),
    }
}
