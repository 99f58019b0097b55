//! Write-ahead artifact stage.
//!
//! A completed run is persisted as one self-contained unit before any
//! database is involved. The importer later promotes these units into the
//! relational store; until then the artifact is the only copy.

mod dir;
mod memory;
mod wire;

pub use dir::DirArtifactStore;
pub use memory::MemoryArtifactStore;
pub use wire::RunArtifact;

use std::fmt;
use std::path::PathBuf;

use crate::errors::ArtifactError;
use crate::model::Run;

/// Opaque reference to one stored artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactHandle {
    File(PathBuf),
    Key(String),
}

impl fmt::Display for ArtifactHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactHandle::File(p) => write!(f, "{}", p.display()),
            ArtifactHandle::Key(k) => f.write_str(k),
        }
    }
}

/// Result of reading one artifact. Undecodable content is a value, not an
/// error, so a batch reader can skip it and continue.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactRead {
    Run(RunArtifact),
    Malformed {
        handle: ArtifactHandle,
        reason: String,
    },
}

/// Durable, per-run storage for completed runs.
///
/// Implementations keep every run in its own unit keyed by the run id, so
/// writing one run can never corrupt another. `list` carries no ordering
/// guarantee; sort by run id when order matters.
pub trait ArtifactStore {
    fn write(&self, run: &Run) -> Result<ArtifactHandle, ArtifactError>;

    fn list(&self) -> Result<Vec<ArtifactHandle>, ArtifactError>;

    fn read(&self, handle: &ArtifactHandle) -> ArtifactRead;
}

fn decode(handle: &ArtifactHandle, content: &str) -> ArtifactRead {
    match serde_json::from_str::<RunArtifact>(content) {
        Ok(artifact) => ArtifactRead::Run(artifact),
        Err(e) => ArtifactRead::Malformed {
            handle: handle.clone(),
            reason: format!("invalid artifact json: {e}"),
        },
    }
}
