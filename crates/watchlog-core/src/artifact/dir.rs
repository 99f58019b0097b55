use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{decode, ArtifactHandle, ArtifactRead, ArtifactStore, RunArtifact};
use crate::errors::ArtifactError;
use crate::ids::RunId;
use crate::model::{Run, DEFAULT_LOG_CAP_BYTES};

/// One `run_<id>.json` file per run under a results directory.
///
/// Writes reserve the final file name with `create_new` before any content
/// is produced, then replace the reservation by renaming a fully written,
/// fsynced temp file over it. A second write for the same id fails instead
/// of overwriting. A crash between the two steps leaves an empty
/// `run_<id>.json`; `list` skips empty files.
#[derive(Debug, Clone)]
pub struct DirArtifactStore {
    root: PathBuf,
    log_cap: usize,
}

impl DirArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_cap: DEFAULT_LOG_CAP_BYTES,
        }
    }

    pub fn with_log_cap(mut self, log_cap: usize) -> Self {
        self.log_cap = log_cap;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: RunId) -> PathBuf {
        self.root.join(format!("run_{}.json", id))
    }

    fn temp_path_for(&self, id: RunId) -> PathBuf {
        self.root.join(format!(".run_{}.json.tmp", id))
    }

    fn is_artifact_name(name: &str) -> bool {
        name.starts_with("run_") && name.ends_with(".json")
    }

    fn write_contents(&self, tmp: &Path, path: &Path, body: &[u8]) -> Result<(), ArtifactError> {
        let mut f = File::create(tmp).map_err(|e| ArtifactError::io(tmp, e))?;
        f.write_all(body).map_err(|e| ArtifactError::io(tmp, e))?;
        f.sync_all().map_err(|e| ArtifactError::io(tmp, e))?;
        fs::rename(tmp, path).map_err(|e| ArtifactError::io(path, e))
    }
}

impl ArtifactStore for DirArtifactStore {
    fn write(&self, run: &Run) -> Result<ArtifactHandle, ArtifactError> {
        fs::create_dir_all(&self.root).map_err(|e| ArtifactError::io(&self.root, e))?;

        let artifact = RunArtifact::from_run(run, self.log_cap);
        let body = serde_json::to_vec_pretty(&artifact).map_err(|source| ArtifactError::Encode {
            id: run.id,
            source,
        })?;

        let path = self.path_for(run.id);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ArtifactError::AlreadyExists { id: run.id, path });
            }
            Err(e) => return Err(ArtifactError::io(&path, e)),
        }

        let tmp = self.temp_path_for(run.id);
        if let Err(e) = self.write_contents(&tmp, &path, &body) {
            let _ = fs::remove_file(&tmp);
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        debug!(run_id = %run.id, path = %path.display(), status = %run.status, "artifact written");
        Ok(ArtifactHandle::File(path))
    }

    fn list(&self) -> Result<Vec<ArtifactHandle>, ArtifactError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(ArtifactError::io(&self.root, e)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ArtifactError::io(&self.root, e))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !Self::is_artifact_name(name) {
                continue;
            }
            let path = entry.path();
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() && meta.len() > 0 => out.push(ArtifactHandle::File(path)),
                // An empty file is a reservation whose write never finished.
                Ok(meta) if meta.is_file() => {
                    debug!(path = %path.display(), "skipping empty artifact reservation");
                }
                _ => {}
            }
        }
        Ok(out)
    }

    fn read(&self, handle: &ArtifactHandle) -> ArtifactRead {
        let ArtifactHandle::File(path) = handle else {
            return ArtifactRead::Malformed {
                handle: handle.clone(),
                reason: "not a file artifact handle".to_string(),
            };
        };
        match fs::read_to_string(path) {
            Ok(content) => decode(handle, &content),
            Err(e) => ArtifactRead::Malformed {
                handle: handle.clone(),
                reason: format!("unreadable: {e}"),
            },
        }
    }
}
