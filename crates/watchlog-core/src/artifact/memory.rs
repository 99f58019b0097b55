use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use super::{decode, ArtifactHandle, ArtifactRead, ArtifactStore, RunArtifact};
use crate::errors::ArtifactError;
use crate::model::{Run, DEFAULT_LOG_CAP_BYTES};

/// In-process artifact store holding serialized JSON per key.
#[derive(Debug)]
pub struct MemoryArtifactStore {
    units: Mutex<BTreeMap<String, String>>,
    log_cap: usize,
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self {
            units: Mutex::new(BTreeMap::new()),
            log_cap: DEFAULT_LOG_CAP_BYTES,
        }
    }

    pub fn with_log_cap(mut self, log_cap: usize) -> Self {
        self.log_cap = log_cap;
        self
    }

    /// Store raw content under `key`, bypassing encoding. Used to model
    /// hand-edited or truncated artifacts.
    pub fn insert_raw(&self, key: impl Into<String>, content: impl Into<String>) -> ArtifactHandle {
        let key = key.into();
        self.units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), content.into());
        ArtifactHandle::Key(key)
    }

    pub fn len(&self) -> usize {
        self.units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn write(&self, run: &Run) -> Result<ArtifactHandle, ArtifactError> {
        let key = format!("run_{}", run.id);
        let body = serde_json::to_string(&RunArtifact::from_run(run, self.log_cap)).map_err(
            |source| ArtifactError::Encode {
                id: run.id,
                source,
            },
        )?;

        let mut units = self.units.lock().unwrap_or_else(PoisonError::into_inner);
        if units.contains_key(&key) {
            return Err(ArtifactError::AlreadyExists {
                id: run.id,
                path: key.into(),
            });
        }
        units.insert(key.clone(), body);
        Ok(ArtifactHandle::Key(key))
    }

    fn list(&self) -> Result<Vec<ArtifactHandle>, ArtifactError> {
        Ok(self
            .units
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .map(ArtifactHandle::Key)
            .collect())
    }

    fn read(&self, handle: &ArtifactHandle) -> ArtifactRead {
        let content = match handle {
            ArtifactHandle::Key(key) => self
                .units
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key)
                .cloned(),
            ArtifactHandle::File(_) => None,
        };
        match content {
            Some(content) => decode(handle, &content),
            None => ArtifactRead::Malformed {
                handle: handle.clone(),
                reason: "no such artifact".to_string(),
            },
        }
    }
}
