// crates/patternsmith-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: Failures that stop a command before or during a run.
// Purpose: Keep run-level failures distinct from per-job diagnostics.
// Dependencies: patternsmith-config, thiserror
// ============================================================================

//! ## Overview
//! Diagnostics produced by analysis are data and never become a [`CliError`];
//! these variants cover inputs that could not be read and outputs that could
//! not be written.

use std::io;
use std::path::Path;

use patternsmith_config::ConfigError;
use thiserror::Error;

/// Command failure.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The type catalog could not be loaded.
    #[error("catalog {path}: {message}")]
    Catalog {
        /// Catalog path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// Filesystem failure.
    #[error("io error at {path}: {message}")]
    Io {
        /// Path being read or written.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The requested job is not configured.
    #[error("unknown job: {0}")]
    UnknownJob(String),
    /// Two jobs produced the same artifact file.
    #[error("artifact `{artifact}` is produced by both `{first}` and `{second}`")]
    ArtifactCollision {
        /// Artifact file name.
        artifact: String,
        /// Job that produced it first.
        first: String,
        /// Job that produced it again.
        second: String,
    },
    /// Report or JSON serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
    /// Any other invalid input or output.
    #[error("{0}")]
    Invalid(String),
}

impl CliError {
    /// Builds an [`CliError::Io`] for a path.
    pub(crate) fn io(path: &Path, err: &io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
