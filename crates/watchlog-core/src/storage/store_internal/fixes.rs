//! Fix read/write paths.

use rusqlite::{params, Connection};

use super::limit_param;
use crate::errors::StoreError;
use crate::ids::RunId;
use crate::model::{format_timestamp, Fix, NewFix};
use crate::storage::rows::{fix_from_row, FIX_COLUMNS};

pub(crate) fn insert_fix_impl(conn: &Connection, fix: &NewFix) -> Result<i64, StoreError> {
    conn.execute(
        "INSERT INTO fixes(
            run_id, timestamp, namespace, pod_name, error_type,
            error_message, fix_applied, status
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            fix.run_id.map(RunId::get),
            format_timestamp(fix.timestamp),
            fix.namespace,
            fix.pod_name,
            fix.error_type,
            fix.error_message,
            fix.fix_applied,
            fix.status.as_str(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn get_fixes_impl(conn: &Connection, limit: usize) -> Result<Vec<Fix>, StoreError> {
    let sql = format!(
        "SELECT {FIX_COLUMNS} FROM fixes
         ORDER BY timestamp DESC, id DESC
         LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![limit_param(limit)], fix_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn get_fixes_by_run_impl(conn: &Connection, run_id: RunId) -> Result<Vec<Fix>, StoreError> {
    let sql = format!(
        "SELECT {FIX_COLUMNS} FROM fixes
         WHERE run_id = ?1
         ORDER BY timestamp DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![run_id.get()], fix_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
