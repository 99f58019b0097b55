//! Aggregations over runs and fixes.

use rusqlite::{params, Connection};

use crate::errors::StoreError;
use crate::model::{GlobalStats, NamespaceStats};

const NAMESPACE_COUNTS: &str = "COUNT(*),
    COALESCE(SUM(CASE WHEN status = 'ok' THEN 1 ELSE 0 END), 0),
    COALESCE(SUM(CASE WHEN status = 'fixed' THEN 1 ELSE 0 END), 0),
    COALESCE(SUM(CASE WHEN status IN ('failed', 'issues_found') THEN 1 ELSE 0 END), 0)";

fn counts_from_row(
    row: &rusqlite::Row<'_>,
    offset: usize,
    namespace: String,
) -> rusqlite::Result<NamespaceStats> {
    Ok(NamespaceStats {
        namespace,
        run_count: row.get::<_, i64>(offset)? as u64,
        ok_count: row.get::<_, i64>(offset + 1)? as u64,
        fixed_count: row.get::<_, i64>(offset + 2)? as u64,
        failed_count: row.get::<_, i64>(offset + 3)? as u64,
    })
}

pub(crate) fn namespace_stats_impl(conn: &Connection) -> Result<Vec<NamespaceStats>, StoreError> {
    let sql = format!(
        "SELECT namespace, {NAMESPACE_COUNTS}
         FROM runs
         GROUP BY namespace
         ORDER BY namespace"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| counts_from_row(row, 1, row.get(0)?))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub(crate) fn stats_for_namespace_impl(
    conn: &Connection,
    namespace: &str,
) -> Result<NamespaceStats, StoreError> {
    let sql = format!("SELECT {NAMESPACE_COUNTS} FROM runs WHERE namespace = ?1");
    Ok(conn.query_row(&sql, params![namespace], |row| {
        counts_from_row(row, 0, namespace.to_string())
    })?)
}

pub(crate) fn global_stats_impl(conn: &Connection) -> Result<GlobalStats, StoreError> {
    Ok(conn.query_row(
        "SELECT COUNT(*),
            COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status IN ('pending', 'analyzing') THEN 1 ELSE 0 END), 0)
         FROM fixes",
        [],
        |row| {
            Ok(GlobalStats {
                total: row.get::<_, i64>(0)? as u64,
                success: row.get::<_, i64>(1)? as u64,
                failed: row.get::<_, i64>(2)? as u64,
                pending: row.get::<_, i64>(3)? as u64,
            })
        },
    )?)
}
