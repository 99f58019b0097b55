//! Run and fix records plus the derived aggregates served by the query layer.

mod fix;
mod run;

pub use fix::{Fix, FixStatus, GlobalStats, NewFix};
pub use run::{normalize_status, Run, RunOutcome, RunStatus};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Default cap for the transcript excerpt kept on a run.
pub const DEFAULT_LOG_CAP_BYTES: usize = 64 * 1024;

/// Fixed-width UTC rendering, so lexical order equals chronological order.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `None` for empty or unparsable input.
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Per-namespace aggregate. `failed_count` covers both `failed` and
/// `issues_found`; runs still `running` are only counted in `run_count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceStats {
    pub namespace: String,
    pub run_count: u64,
    pub ok_count: u64,
    pub fixed_count: u64,
    pub failed_count: u64,
}

impl NamespaceStats {
    pub fn terminal_count(&self) -> u64 {
        self.ok_count + self.fixed_count + self.failed_count
    }
}

/// Keep the trailing `cap` bytes of `log`, cut on a char boundary.
pub fn truncate_log(log: &str, cap: usize) -> String {
    if log.len() <= cap {
        return log.to_string();
    }
    let mut start = log.len() - cap;
    while !log.is_char_boundary(start) {
        start += 1;
    }
    log[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_fixed_width_utc() {
        let ts = parse_timestamp("2024-03-01T10:00:00+02:00").unwrap();
        assert_eq!(format_timestamp(ts), "2024-03-01T08:00:00.000Z");
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn truncate_log_keeps_tail() {
        assert_eq!(truncate_log("abcdef", 3), "def");
        assert_eq!(truncate_log("abc", 10), "abc");
        assert_eq!(truncate_log("abc", 0), "");
    }

    #[test]
    fn truncate_log_respects_char_boundaries() {
        // "é" is two bytes; a cut through it drops the whole char.
        let out = truncate_log("aébc", 3);
        assert_eq!(out, "bc");
        assert!(out.len() <= 3);
    }
}
