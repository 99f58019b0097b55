//! Artifact → relational store promotion.
//!
//! One pass enumerates every artifact and inserts the runs the store does
//! not have yet. First import wins: an artifact never overwrites a stored
//! row. Bad artifacts and failed inserts are counted and skipped; only a
//! failure to enumerate the artifact set aborts the pass.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::{debug, info, warn};

use crate::artifact::{ArtifactRead, ArtifactStore};
use crate::errors::ArtifactError;
use crate::model::DEFAULT_LOG_CAP_BYTES;
use crate::storage::{InsertOutcome, Store};

/// Per-pass counters. Serializes with a derived `skipped` total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// Already present in the store.
    pub duplicates: usize,
    /// Unreadable or undecodable artifacts.
    pub malformed: usize,
    /// Decoded fine but the insert failed.
    pub failed: usize,
}

impl ImportReport {
    pub fn skipped(&self) -> usize {
        self.duplicates + self.malformed + self.failed
    }

    pub fn seen(&self) -> usize {
        self.imported + self.skipped()
    }
}

impl Serialize for ImportReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("ImportReport", 5)?;
        st.serialize_field("imported", &self.imported)?;
        st.serialize_field("skipped", &self.skipped())?;
        st.serialize_field("duplicates", &self.duplicates)?;
        st.serialize_field("malformed", &self.malformed)?;
        st.serialize_field("failed", &self.failed)?;
        st.end()
    }
}

pub struct Importer<'a> {
    artifacts: &'a dyn ArtifactStore,
    store: &'a Store,
    log_cap: usize,
}

impl<'a> Importer<'a> {
    pub fn new(artifacts: &'a dyn ArtifactStore, store: &'a Store) -> Self {
        Self {
            artifacts,
            store,
            log_cap: DEFAULT_LOG_CAP_BYTES,
        }
    }

    pub fn with_log_cap(mut self, log_cap: usize) -> Self {
        self.log_cap = log_cap;
        self
    }

    pub fn run(&self) -> Result<ImportReport, ArtifactError> {
        self.run_at(Utc::now())
    }

    /// One pass; `now` fills in missing timestamps.
    pub fn run_at(&self, now: DateTime<Utc>) -> Result<ImportReport, ArtifactError> {
        let handles = self.artifacts.list()?;
        let mut report = ImportReport::default();

        for handle in handles {
            let artifact = match self.artifacts.read(&handle) {
                ArtifactRead::Run(artifact) => artifact,
                ArtifactRead::Malformed { handle, reason } => {
                    warn!(artifact = %handle, %reason, "skipping malformed artifact");
                    report.malformed += 1;
                    continue;
                }
            };

            let run = artifact.into_run(now, self.log_cap);
            match self.store.insert_run_if_absent(&run) {
                Ok(InsertOutcome::Inserted) => {
                    debug!(run_id = %run.id, namespace = %run.namespace, status = %run.status, "run imported");
                    report.imported += 1;
                }
                Ok(InsertOutcome::AlreadyPresent) => {
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(artifact = %handle, run_id = %run.id, error = %e, "failed to import run");
                    report.failed += 1;
                }
            }
        }

        if report.imported > 0 || report.malformed > 0 || report.failed > 0 {
            info!(
                imported = report.imported,
                duplicates = report.duplicates,
                malformed = report.malformed,
                failed = report.failed,
                "import pass finished"
            );
        } else {
            debug!(duplicates = report.duplicates, "import pass found nothing new");
        }
        Ok(report)
    }
}
