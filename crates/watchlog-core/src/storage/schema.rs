//! SQLite schema for run and fix records.
//!
//! Tables:
//! - `runs`: one row per watch cycle, `id` is the artifact's run id
//! - `fixes`: remediation actions, `run_id` nullable for unattributed fixes

/// DDL for the relational store. Every statement is idempotent.
///
/// `fixes.run_id` joins to `runs.id` but carries no foreign key: a fix can
/// be recorded while its run still only exists as an artifact.
pub const RUNS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS runs (
    id           INTEGER PRIMARY KEY,
    started_at   TEXT NOT NULL,
    ended_at     TEXT,
    namespace    TEXT NOT NULL,
    mode         TEXT NOT NULL DEFAULT '',
    status       TEXT NOT NULL
                 CHECK (status IN ('running', 'ok', 'fixed', 'failed', 'issues_found')),
    pod_count    INTEGER NOT NULL DEFAULT 0 CHECK (pod_count >= 0),
    error_count  INTEGER NOT NULL DEFAULT 0 CHECK (error_count >= 0),
    fix_count    INTEGER NOT NULL DEFAULT 0 CHECK (fix_count >= 0),
    report       TEXT,
    log          TEXT
);

CREATE TABLE IF NOT EXISTS fixes (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id         INTEGER,
    timestamp      TEXT NOT NULL,
    namespace      TEXT NOT NULL,
    pod_name       TEXT NOT NULL,
    error_type     TEXT NOT NULL,
    error_message  TEXT,
    fix_applied    TEXT,
    status         TEXT NOT NULL DEFAULT 'pending'
);

CREATE INDEX IF NOT EXISTS idx_runs_started_at ON runs(started_at);
CREATE INDEX IF NOT EXISTS idx_runs_namespace_status ON runs(namespace, status);
CREATE INDEX IF NOT EXISTS idx_fixes_run_id ON fixes(run_id);
CREATE INDEX IF NOT EXISTS idx_fixes_timestamp ON fixes(timestamp);
"#;
