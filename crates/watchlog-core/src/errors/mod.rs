//! Error types for the pipeline seams.
//!
//! Malformed report text and invalid status strings are deliberately absent
//! here: both degrade to defaults instead of surfacing as errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::ids::RunId;
use crate::model::RunStatus;

/// Relational store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened or did not answer a probe query.
    #[error("store unreachable at {location}: {reason}")]
    Unreachable { location: String, reason: String },

    #[error("run not found: {0}")]
    NotFound(RunId),

    /// Completion targeted a run that is missing or already terminal.
    #[error("run {0} is not in the running state")]
    NotRunning(RunId),

    /// The record handed to a write violates the run lifecycle.
    #[error("invalid run record: {0}")]
    InvalidRun(String),

    #[error("store connection lock poisoned")]
    Poisoned,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Artifact store errors. Decode failures on read are not errors; they are
/// reported as [`crate::ArtifactRead::Malformed`].
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// A different write already owns this run id.
    #[error("artifact for run {id} already exists at {}", path.display())]
    AlreadyExists { id: RunId, path: PathBuf },

    #[error("artifact io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode artifact for run {id}: {source}")]
    Encode {
        id: RunId,
        #[source]
        source: serde_json::Error,
    },
}

impl ArtifactError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Run lifecycle violations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("run {id} already terminal ({status})")]
    AlreadyTerminal { id: RunId, status: RunStatus },
}
