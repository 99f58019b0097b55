//! Run read/write paths.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{limit_param, txn};
use crate::errors::StoreError;
use crate::ids::RunId;
use crate::model::{format_timestamp, parse_timestamp, Run, RunStatus};
use crate::storage::rows::{run_from_row, RUN_COLUMNS};
use crate::storage::store::InsertOutcome;

const INSERT_RUN_SQL: &str = "INSERT INTO runs(
        id, started_at, ended_at, namespace, mode, status,
        pod_count, error_count, fix_count, report, log
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT(id) DO NOTHING";

fn insert_run_row(conn: &Connection, run: &Run) -> Result<usize, StoreError> {
    Ok(conn.execute(
        INSERT_RUN_SQL,
        params![
            run.id.get(),
            format_timestamp(run.started_at),
            run.ended_at.map(format_timestamp),
            run.namespace,
            run.mode,
            run.status.as_str(),
            run.pod_count,
            run.error_count,
            run.fix_count,
            run.report,
            run.log,
        ],
    )?)
}

pub(crate) fn create_run_impl(conn: &Connection, run: &Run) -> Result<(), StoreError> {
    if run.status != RunStatus::Running {
        return Err(StoreError::InvalidRun(format!(
            "run {} must be created in the running state, got {}",
            run.id, run.status
        )));
    }
    run.validate().map_err(StoreError::InvalidRun)?;

    if insert_run_row(conn, run)? == 0 {
        return Err(StoreError::InvalidRun(format!("run {} already exists", run.id)));
    }
    debug!(run_id = %run.id, namespace = %run.namespace, "run created");
    Ok(())
}

pub(crate) fn complete_run_impl(conn: &Connection, run: &Run) -> Result<(), StoreError> {
    if !run.is_terminal() {
        return Err(StoreError::InvalidRun(format!(
            "run {} completion needs a terminal status",
            run.id
        )));
    }
    run.validate().map_err(StoreError::InvalidRun)?;

    let changed = conn.execute(
        "UPDATE runs SET
            ended_at = ?1,
            status = ?2,
            pod_count = ?3,
            error_count = ?4,
            fix_count = ?5,
            report = ?6,
            log = ?7
         WHERE id = ?8 AND status = 'running'",
        params![
            run.ended_at.map(format_timestamp),
            run.status.as_str(),
            run.pod_count,
            run.error_count,
            run.fix_count,
            run.report,
            run.log,
            run.id.get(),
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotRunning(run.id));
    }
    debug!(run_id = %run.id, status = %run.status, "run completed");
    Ok(())
}

pub(crate) fn insert_run_if_absent_impl(
    conn: &Connection,
    run: &Run,
) -> Result<InsertOutcome, StoreError> {
    txn::immediate(conn, |conn| {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM runs WHERE id = ?1)",
            params![run.id.get()],
            |r| r.get(0),
        )?;
        if exists {
            return Ok(InsertOutcome::AlreadyPresent);
        }

        // ON CONFLICT covers a writer on another connection that slipped in
        // before our lock was granted.
        match insert_run_row(conn, run)? {
            0 => Ok(InsertOutcome::AlreadyPresent),
            _ => Ok(InsertOutcome::Inserted),
        }
    })
}

pub(crate) fn get_runs_impl(
    conn: &Connection,
    namespace: Option<&str>,
    limit: usize,
) -> Result<Vec<Run>, StoreError> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    let sql = format!(
        "SELECT {RUN_COLUMNS} FROM runs
         WHERE (?1 IS NULL OR namespace = ?1)
         ORDER BY started_at DESC, id DESC
         LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![namespace, limit_param(limit)], run_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn get_run_impl(conn: &Connection, id: RunId) -> Result<Run, StoreError> {
    let sql = format!("SELECT {RUN_COLUMNS} FROM runs WHERE id = ?1");
    conn.query_row(&sql, params![id.get()], run_from_row)
        .optional()?
        .ok_or(StoreError::NotFound(id))
}

pub(crate) fn count_runs_impl(conn: &Connection, namespace: Option<&str>) -> Result<u64, StoreError> {
    let namespace = namespace.filter(|ns| !ns.is_empty());
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM runs WHERE (?1 IS NULL OR namespace = ?1)",
        params![namespace],
        |r| r.get(0),
    )?;
    Ok(n as u64)
}

pub(crate) fn last_completed_time_impl(
    conn: &Connection,
    namespace: &str,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    let raw: Option<String> = conn.query_row(
        "SELECT MAX(ended_at) FROM runs WHERE namespace = ?1 AND status != 'running'",
        params![namespace],
        |r| r.get(0),
    )?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}
