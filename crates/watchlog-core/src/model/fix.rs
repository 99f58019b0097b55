use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RunId;

/// Status of an individual remediation. Values written by other tools are
/// kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FixStatus {
    Pending,
    Analyzing,
    Success,
    Failed,
    Other(String),
}

impl FixStatus {
    pub fn as_str(&self) -> &str {
        match self {
            FixStatus::Pending => "pending",
            FixStatus::Analyzing => "analyzing",
            FixStatus::Success => "success",
            FixStatus::Failed => "failed",
            FixStatus::Other(s) => s,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "pending" => FixStatus::Pending,
            "analyzing" => FixStatus::Analyzing,
            "success" => FixStatus::Success,
            "failed" => FixStatus::Failed,
            other => FixStatus::Other(other.to_string()),
        }
    }

    /// `pending` and `analyzing` both count as pending in global stats.
    pub fn is_pending(&self) -> bool {
        matches!(self, FixStatus::Pending | FixStatus::Analyzing)
    }
}

impl fmt::Display for FixStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FixStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FixStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(FixStatus::parse(&s))
    }
}

/// A remediation action reported during a run. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fix {
    pub id: i64,
    /// `None` for fixes not yet attributed to a run.
    pub run_id: Option<RunId>,
    pub timestamp: DateTime<Utc>,
    pub namespace: String,
    pub pod_name: String,
    pub error_type: String,
    pub error_message: String,
    pub fix_applied: String,
    pub status: FixStatus,
}

/// Insert payload for a fix; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFix {
    pub run_id: Option<RunId>,
    pub timestamp: DateTime<Utc>,
    pub namespace: String,
    pub pod_name: String,
    pub error_type: String,
    pub error_message: String,
    pub fix_applied: String,
    pub status: FixStatus,
}

/// Fix totals across all namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub pending: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_status_keeps_unknown_values() {
        assert_eq!(FixStatus::parse("analyzing"), FixStatus::Analyzing);
        let odd = FixStatus::parse("rolled_back");
        assert_eq!(odd.as_str(), "rolled_back");
        assert!(!odd.is_pending());
        assert!(FixStatus::Analyzing.is_pending());
        assert!(FixStatus::Pending.is_pending());
    }

    #[test]
    fn fix_status_serializes_as_plain_string() {
        let json = serde_json::to_string(&FixStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
        let back: FixStatus = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(back, FixStatus::Other("manual".into()));
    }
}
