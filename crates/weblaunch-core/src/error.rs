//! Launch failures and their exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// Exit code for every launcher-detected failure.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Errors returned by the launch sequence. The binary maps each one to an
/// exit code and a user-facing message in a single place.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Python interpreter not found (tried: {})", tried.join(", "))]
    RuntimeNotFound { tried: Vec<String> },

    #[error("Entry point '{}' not found in the current directory", path.display())]
    EntryPointMissing { path: PathBuf },

    #[error("Failed to start '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Application exited before it became ready ({})", describe_code(*code))]
    ChildExitedEarly { code: Option<i32> },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Lost track of the application process: {source}")]
    WaitFailed {
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {}", c),
        None => "terminated by signal".to_string(),
    }
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        FAILURE_EXIT_CODE
    }

    /// Stable identifier used in audit records and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RuntimeNotFound { .. } => "runtime_not_found",
            Self::EntryPointMissing { .. } => "entry_point_missing",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::ChildExitedEarly { .. } => "child_exited_early",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::WaitFailed { .. } => "wait_failed",
        }
    }

    /// What the user can do about it.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::RuntimeNotFound { .. } => {
                "Install Python 3 from https://www.python.org/downloads/ and make sure it is on PATH \
                 (or set WEBLAUNCH_PYTHON to the interpreter path)."
            }
            Self::EntryPointMissing { .. } => {
                "Run the launcher from the application directory, or pass --entry-point."
            }
            Self::SpawnFailed { .. } => "Check that the interpreter is executable and try again.",
            Self::ChildExitedEarly { .. } => {
                "Scroll up for the application's own error output (missing packages are the usual cause)."
            }
            Self::InvalidUrl { .. } => "Use a URL of the form http://host:port.",
            Self::WaitFailed { .. } => "The application may still be running; check the task manager.",
        }
    }
}
