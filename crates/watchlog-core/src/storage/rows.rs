//! Row mapping between SQLite rows and model types.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;

use crate::ids::RunId;
use crate::model::{parse_timestamp, Fix, FixStatus, Run, RunStatus};

pub(crate) const RUN_COLUMNS: &str = "id, started_at, COALESCE(ended_at, ''), namespace, mode, \
     status, pod_count, error_count, fix_count, COALESCE(report, ''), COALESCE(log, '')";

pub(crate) const FIX_COLUMNS: &str = "id, run_id, timestamp, namespace, pod_name, error_type, \
     COALESCE(error_message, ''), COALESCE(fix_applied, ''), status";

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn required_timestamp(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_timestamp(&raw).ok_or_else(|| conversion_error(idx, format!("bad timestamp {raw:?}")))
}

pub(crate) fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Run> {
    let ended_raw: String = row.get(2)?;
    let status_raw: String = row.get(5)?;
    let status = RunStatus::parse(&status_raw)
        .ok_or_else(|| conversion_error(5, format!("unknown run status {status_raw:?}")))?;

    Ok(Run {
        id: RunId(row.get(0)?),
        started_at: required_timestamp(row, 1)?,
        ended_at: parse_timestamp(&ended_raw),
        namespace: row.get(3)?,
        mode: row.get(4)?,
        status,
        pod_count: row.get(6)?,
        error_count: row.get(7)?,
        fix_count: row.get(8)?,
        report: row.get(9)?,
        log: row.get(10)?,
    })
}

pub(crate) fn fix_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Fix> {
    Ok(Fix {
        id: row.get(0)?,
        run_id: row.get::<_, Option<i64>>(1)?.map(RunId),
        timestamp: required_timestamp(row, 2)?,
        namespace: row.get(3)?,
        pod_name: row.get(4)?,
        error_type: row.get(5)?,
        error_message: row.get(6)?,
        fix_applied: row.get(7)?,
        status: FixStatus::parse(&row.get::<_, String>(8)?),
    })
}
