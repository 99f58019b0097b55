use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RunId;
use crate::model::{
    format_timestamp, normalize_status, parse_timestamp, truncate_log, Run, RunStatus,
};

/// On-disk artifact format, one JSON object per run.
///
/// Only `id` is required. Everything else defaults so that legacy or
/// hand-written artifacts still import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub id: i64,
    #[serde(default)]
    pub started_at: String,
    /// Empty while the run is still `running`.
    #[serde(default)]
    pub ended_at: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub pod_count: i64,
    #[serde(default)]
    pub error_count: i64,
    #[serde(default)]
    pub fix_count: i64,
    #[serde(default)]
    pub report: String,
    #[serde(default)]
    pub log: String,
}

impl RunArtifact {
    pub fn from_run(run: &Run, log_cap: usize) -> Self {
        Self {
            id: run.id.get(),
            started_at: format_timestamp(run.started_at),
            ended_at: run.ended_at.map(format_timestamp).unwrap_or_default(),
            namespace: run.namespace.clone(),
            mode: run.mode.clone(),
            status: run.status.as_str().to_string(),
            pod_count: i64::from(run.pod_count),
            error_count: i64::from(run.error_count),
            fix_count: i64::from(run.fix_count),
            report: run.report.clone(),
            log: truncate_log(&run.log, log_cap),
        }
    }

    pub fn run_id(&self) -> RunId {
        RunId(self.id)
    }

    /// Convert to a [`Run`], normalising the status and defaulting missing
    /// or unparsable timestamps to `now`. A `running` artifact never gets
    /// an `ended_at`.
    pub fn into_run(self, now: DateTime<Utc>, log_cap: usize) -> Run {
        let status = normalize_status(&self.status);

        let started_at = parse_timestamp(&self.started_at).unwrap_or_else(|| {
            tracing::debug!(run_id = self.id, raw = %self.started_at, "started_at missing; using import time");
            now
        });
        let ended_at = if status.is_terminal() {
            Some(parse_timestamp(&self.ended_at).unwrap_or_else(|| {
                tracing::debug!(run_id = self.id, raw = %self.ended_at, "ended_at missing; using import time");
                now
            }))
        } else {
            None
        };

        Run {
            id: RunId(self.id),
            started_at,
            ended_at,
            namespace: self.namespace,
            mode: self.mode,
            status,
            pod_count: count(self.pod_count),
            error_count: count(self.error_count),
            fix_count: count(self.fix_count),
            report: self.report,
            log: truncate_log(&self.log, log_cap),
        }
    }

    pub fn status(&self) -> RunStatus {
        normalize_status(&self.status)
    }
}

fn count(v: i64) -> u32 {
    u32::try_from(v).unwrap_or(0)
}
