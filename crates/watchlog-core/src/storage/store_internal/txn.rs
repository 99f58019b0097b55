use rusqlite::Connection;

use crate::errors::StoreError;

/// Run `f` inside `BEGIN IMMEDIATE`; commit on `Ok`, roll back on `Err`.
/// The write lock is taken up front so a concurrent writer waits on the busy
/// timeout instead of interleaving between check and insert.
pub(crate) fn immediate<T>(
    conn: &Connection,
    f: impl FnOnce(&Connection) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    conn.execute("BEGIN IMMEDIATE", [])?;
    let result = f(conn);

    match &result {
        Ok(_) => {
            if let Err(e) = conn.execute("COMMIT", []) {
                let _ = conn.execute("ROLLBACK", []);
                return Err(e.into());
            }
        }
        Err(_) => {
            let _ = conn.execute("ROLLBACK", []);
        }
    }

    result
}
