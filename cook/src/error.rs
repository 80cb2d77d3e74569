//! Error types for cook.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for cook operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cook operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (directory listing, build directory creation).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A parameter required by a requested action was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    /// Build target is not part of the profile's supported set.
    #[error("'{0}' is not supported, check supported projects with '--list'")]
    UnsupportedProject(String),

    /// Requested action is not offered by the profile.
    #[error("Action '{action}' is not available for profile '{profile}'")]
    UnsupportedAction {
        /// Profile name.
        profile: String,
        /// Action name.
        action: String,
    },

    /// None of the known compiler prefixes exist in the toolchain directory.
    #[error("No cross compiler found in {}: tried {candidates}", .dir.display())]
    ToolchainNotFound {
        /// Toolchain directory that was probed.
        dir: PathBuf,
        /// Comma-separated list of probed `<prefix>gcc` names.
        candidates: String,
    },

    /// Configuration name has no usable file component.
    #[error("Invalid configuration name: '{0}'")]
    InvalidConfigName(String),

    /// Configuration file or directory does not exist.
    #[error("Configuration not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// External tool could not be started.
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// External tool exited unsuccessfully.
    #[error("Command failed ({}): {command}", describe_code(.code))]
    CommandFailed {
        /// Rendered command line.
        command: String,
        /// Exit code, if the process exited normally.
        code: Option<i32>,
    },

    /// Run was interrupted by the embedding application.
    #[error("Interrupted")]
    Interrupted,
}

impl Error {
    /// Whether this error was raised while validating parameters, before
    /// any external command was started.
    pub fn is_parameter_error(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter(_)
                | Self::UnsupportedProject(_)
                | Self::UnsupportedAction { .. }
                | Self::ToolchainNotFound { .. }
                | Self::InvalidConfigName(_)
                | Self::ConfigNotFound(_)
        )
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
