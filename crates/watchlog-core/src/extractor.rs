//! Report extraction from free-form agent transcripts.
//!
//! The agent is asked to end its output with one delimited block:
//!
//! ```text
//! ===REPORT_START===
//! {"status": "fixed", "pod_count": 12, "error_count": 3, "fix_count": 2}
//! ===REPORT_END===
//! ```
//!
//! Nothing here fails. A transcript without a block yields an empty report,
//! and each field falls back to its default independently of the others.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::model::{normalize_status, RunOutcome, RunStatus};

pub const REPORT_START_MARKER: &str = "===REPORT_START===";
pub const REPORT_END_MARKER: &str = "===REPORT_END===";

fn count_field(name: &str) -> Regex {
    // Key optionally quoted, must not be the tail of a longer identifier, and
    // must carry an integer; bare mentions of the key are skipped.
    Regex::new(&format!(
        r#"(?:^|[^A-Za-z0-9_])"?{name}"?\s*:\s*(-?\d+)"#
    ))
    .expect("static count pattern")
}

lazy_static! {
    static ref POD_COUNT: Regex = count_field("pod_count");
    static ref ERROR_COUNT: Regex = count_field("error_count");
    static ref FIX_COUNT: Regex = count_field("fix_count");
    static ref STATUS: Regex =
        Regex::new(r#"(?:^|[^A-Za-z0-9_])"?status"?\s*:\s*"([^"]*)""#)
            .expect("static status pattern");
}

/// Typed view of the report block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedReport {
    /// Single-line report body; empty when the transcript has no block.
    pub report: String,
    pub pod_count: u32,
    pub error_count: u32,
    pub fix_count: u32,
    pub status: RunStatus,
}

impl Default for ExtractedReport {
    fn default() -> Self {
        Self {
            report: String::new(),
            pod_count: 0,
            error_count: 0,
            fix_count: 0,
            status: RunStatus::Ok,
        }
    }
}

impl ExtractedReport {
    pub fn into_outcome(self, log: impl Into<String>) -> RunOutcome {
        RunOutcome {
            status: self.status,
            pod_count: self.pod_count,
            error_count: self.error_count,
            fix_count: self.fix_count,
            report: self.report,
            log: log.into(),
        }
    }
}

/// Extract the first report block from `transcript` and decode its fields.
pub fn extract_report(transcript: &str) -> ExtractedReport {
    let Some(report) = report_block(transcript) else {
        return ExtractedReport::default();
    };

    ExtractedReport {
        pod_count: first_count(&POD_COUNT, &report),
        error_count: first_count(&ERROR_COUNT, &report),
        fix_count: first_count(&FIX_COUNT, &report),
        status: first_status(&report),
        report,
    }
}

/// Lines strictly between the first start marker and the next end marker
/// (or end of input), folded into one whitespace-collapsed line.
fn report_block(transcript: &str) -> Option<String> {
    let mut lines = transcript.lines();
    lines.by_ref().find(|l| l.contains(REPORT_START_MARKER))?;

    let body: Vec<&str> = lines
        .take_while(|l| !l.contains(REPORT_END_MARKER))
        .collect();

    Some(body.join(" ").split_whitespace().collect::<Vec<_>>().join(" "))
}

fn first_count(pattern: &Regex, report: &str) -> u32 {
    pattern
        .captures(report)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .unwrap_or(0)
}

fn first_status(report: &str) -> RunStatus {
    STATUS
        .captures(report)
        .and_then(|c| c.get(1))
        .map(|m| normalize_status(m.as_str()))
        .unwrap_or(RunStatus::Ok)
}
