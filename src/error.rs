//! Error types for Kiln
//!
//! All modules use `KilnResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Error type produced by user-supplied recipes and outdate predicates
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for Kiln operations
pub type KilnResult<T> = Result<T, KilnError>;

/// All errors that can occur in Kiln
#[derive(Error, Debug)]
pub enum KilnError {
    // Registry errors
    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Target already registered: {0}")]
    DuplicateTarget(String),

    // State errors
    #[error("Corrupt state file {path}: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    // Build errors
    #[error("Recipe for target '{target}' failed: {source}")]
    Recipe {
        target: String,
        #[source]
        source: BoxError,
    },

    #[error("Outdate predicate for target '{target}' failed: {source}")]
    Predicate {
        target: String,
        #[source]
        source: BoxError,
    },

    // Configuration errors
    #[error("Build file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid build file at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command exited with {}: {command}{}", exit_label(.code), stderr_suffix(.stderr))]
    CommandExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Command wrote output that is not UTF-8: {command}")]
    CommandOutput { command: String },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(", stderr: {}", trimmed)
    }
}

impl KilnError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Wrap a recipe failure for the given target
    pub fn recipe(target: impl Into<String>, source: BoxError) -> Self {
        Self::Recipe {
            target: target.into(),
            source,
        }
    }

    /// Wrap an outdate predicate failure for the given target
    pub fn predicate(target: impl Into<String>, source: BoxError) -> Self {
        Self::Predicate {
            target: target.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CorruptState { .. } => {
                Some("Delete the state file to rebuild every target from scratch")
            }
            Self::ConfigNotFound(_) => Some("Create a kiln.toml or pass one with --file"),
            Self::UnknownTarget(_) => Some("Check the [build.<name>] tables in your kiln.toml"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = KilnError::UnknownTarget("image".to_string());
        assert_eq!(err.to_string(), "Unknown target: image");
    }

    #[test]
    fn error_hint() {
        let err = KilnError::CorruptState {
            path: PathBuf::from("state.json"),
            reason: "expected value".to_string(),
        };
        assert!(err.hint().unwrap().contains("Delete the state file"));
        assert!(KilnError::DuplicateTarget("x".to_string()).hint().is_none());
    }

    #[test]
    fn recipe_error_keeps_source() {
        let err = KilnError::recipe("container", "no such image".into());
        assert!(err.to_string().contains("'container'"));
        assert!(err.to_string().contains("no such image"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn command_exit_display() {
        let err = KilnError::CommandExit {
            command: "false".to_string(),
            code: Some(1),
            stderr: "  boom\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Command exited with exit code 1: false, stderr: boom"
        );

        let err = KilnError::CommandExit {
            command: "sleep 10".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "Command exited with signal: sleep 10");
    }
}
