//! Error types shared by the scanner, dispatcher and launch actions.

use crate::config::ConfigError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Errors that can end a dispatch run.
///
/// Sniffing failures and best-effort cleanup failures (archive removal,
/// permission changes) never show up here; they are logged and dropped.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The directory walk could not enumerate the package tree.
    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// An external program could not be started at all.
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// An external program ran but reported failure.
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },

    /// Archives kept unpacking into more archives past the configured limit.
    #[error("Gave up at {}: archive nesting exceeds {limit} levels", path.display())]
    RecursionLimit { path: PathBuf, limit: usize },

    /// A dry-run plan could not be rendered as JSON.
    #[error("Could not serialize plan: {0}")]
    PlanJson(#[from] serde_json::Error),

    /// Configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for launch operations.
pub type LaunchResult<T> = Result<T, LaunchError>;
