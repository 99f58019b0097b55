use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::TransitionError;
use crate::ids::RunId;

/// Lifecycle state of a run. `Running` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Ok,
    Fixed,
    Failed,
    IssuesFound,
}

impl RunStatus {
    pub const ALL: [RunStatus; 5] = [
        RunStatus::Running,
        RunStatus::Ok,
        RunStatus::Fixed,
        RunStatus::Failed,
        RunStatus::IssuesFound,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Ok => "ok",
            RunStatus::Fixed => "fixed",
            RunStatus::Failed => "failed",
            RunStatus::IssuesFound => "issues_found",
        }
    }

    /// Strict parse; `None` for anything outside the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|st| st.as_str() == s)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Allow-list validation for agent-supplied status strings. Anything outside
/// the closed set, including the empty string, becomes `Ok`.
pub fn normalize_status(raw: &str) -> RunStatus {
    RunStatus::parse(&raw.trim().to_ascii_lowercase()).unwrap_or(RunStatus::Ok)
}

/// Terminal fields applied to a run in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub pod_count: u32,
    pub error_count: u32,
    pub fix_count: u32,
    pub report: String,
    pub log: String,
}

impl RunOutcome {
    pub fn failed(log: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Failed,
            pod_count: 0,
            error_count: 0,
            fix_count: 0,
            report: String::new(),
            log: log.into(),
        }
    }
}

/// One watch cycle against a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub namespace: String,
    pub mode: String,
    pub status: RunStatus,
    pub pod_count: u32,
    pub error_count: u32,
    pub fix_count: u32,
    pub report: String,
    pub log: String,
}

impl Run {
    pub fn start(
        id: RunId,
        namespace: impl Into<String>,
        mode: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            started_at: now,
            ended_at: None,
            namespace: namespace.into(),
            mode: mode.into(),
            status: RunStatus::Running,
            pod_count: 0,
            error_count: 0,
            fix_count: 0,
            report: String::new(),
            log: String::new(),
        }
    }

    /// The single `running -> terminal` transition. All terminal fields are
    /// assigned together; a `running` outcome is coerced to `ok`.
    pub fn complete(
        &mut self,
        outcome: RunOutcome,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if self.status.is_terminal() {
            return Err(TransitionError::AlreadyTerminal {
                id: self.id,
                status: self.status,
            });
        }

        let status = if outcome.status.is_terminal() {
            outcome.status
        } else {
            tracing::warn!(run_id = %self.id, "agent reported non-terminal status; recording ok");
            RunStatus::Ok
        };

        self.status = status;
        self.ended_at = Some(now.max(self.started_at));
        self.pod_count = outcome.pod_count;
        self.error_count = outcome.error_count;
        self.fix_count = outcome.fix_count;
        self.report = outcome.report;
        self.log = outcome.log;
        Ok(())
    }

    pub fn fail(
        &mut self,
        log: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.complete(RunOutcome::failed(log), now)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Checks the lifecycle invariants; returns a description of the first
    /// violation found.
    pub fn validate(&self) -> Result<(), String> {
        match (self.status.is_terminal(), self.ended_at) {
            (false, Some(_)) => Err(format!("run {} is running but has ended_at", self.id)),
            (true, None) => Err(format!("run {} is {} without ended_at", self.id, self.status)),
            (true, Some(end)) if end < self.started_at => {
                Err(format!("run {} ended before it started", self.id))
            }
            _ => Ok(()),
        }
    }
}
