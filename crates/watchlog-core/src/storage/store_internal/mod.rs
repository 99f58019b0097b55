//! Implementation modules behind the `Store` facade. Each function takes an
//! already locked connection.

pub(crate) mod fixes;
pub(crate) mod runs;
pub(crate) mod stats;
pub(crate) mod txn;

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
