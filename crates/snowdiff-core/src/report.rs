//! Diff summary artifact (stable v1)
//!
//! The JSON summary written next to the bucket CSVs. The schema is
//! versioned; breaking changes require a new version.

use crate::bucket::DiffBucket;
use serde::{Deserialize, Serialize};

/// Summary schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryVersion {
    pub major: u32,
    pub minor: u32,
}

impl SummaryVersion {
    /// Current summary schema version
    pub const CURRENT: SummaryVersion = SummaryVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for SummaryVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Result counts for one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    /// Schema version
    pub version: SummaryVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Source table (fully qualified)
    pub source: String,

    /// Target table (fully qualified)
    pub target: String,

    /// Name of the materialized diff table in the warehouse
    pub materialized_table: String,

    /// Rows present in the source but absent from the target
    pub missing_in_target: usize,

    /// Rows present in the target but absent from the source
    pub missing_in_source: usize,

    /// Rows present on both sides with differing values
    pub value_mismatch: usize,
}

impl DiffSummary {
    /// Create a summary stamped with the current time
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        materialized_table: impl Into<String>,
    ) -> Self {
        Self {
            version: SummaryVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            source: source.into(),
            target: target.into(),
            materialized_table: materialized_table.into(),
            missing_in_target: 0,
            missing_in_source: 0,
            value_mismatch: 0,
        }
    }

    /// Count for one bucket
    pub fn count(&self, bucket: DiffBucket) -> usize {
        match bucket {
            DiffBucket::MissingInTarget => self.missing_in_target,
            DiffBucket::MissingInSource => self.missing_in_source,
            DiffBucket::ValueMismatch => self.value_mismatch,
        }
    }

    /// Set the count for one bucket
    pub fn set_count(&mut self, bucket: DiffBucket, count: usize) {
        match bucket {
            DiffBucket::MissingInTarget => self.missing_in_target = count,
            DiffBucket::MissingInSource => self.missing_in_source = count,
            DiffBucket::ValueMismatch => self.value_mismatch = count,
        }
    }

    /// Total rows across all buckets
    pub fn total(&self) -> usize {
        self.missing_in_target + self.missing_in_source + self.value_mismatch
    }

    /// True when the tables matched exactly
    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }

    /// Save as pretty-printed JSON
    pub fn save_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_bucket() {
        let mut summary = DiffSummary::new("A.B.C", "X.Y.Z", "X.Y.Z_DIFF");
        summary.set_count(DiffBucket::MissingInTarget, 1);
        summary.set_count(DiffBucket::MissingInSource, 2);
        summary.set_count(DiffBucket::ValueMismatch, 3);

        assert_eq!(summary.count(DiffBucket::MissingInTarget), 1);
        assert_eq!(summary.count(DiffBucket::MissingInSource), 2);
        assert_eq!(summary.count(DiffBucket::ValueMismatch), 3);
        assert_eq!(summary.total(), 6);
        assert!(!summary.is_clean());
    }

    #[test]
    fn clean_summary() {
        let summary = DiffSummary::new("A.B.C", "X.Y.Z", "X.Y.Z_DIFF");
        assert!(summary.is_clean());
        assert_eq!(summary.version.to_string(), "1.0");
    }

    #[test]
    fn json_roundtrip() {
        let mut summary = DiffSummary::new("A.B.C", "X.Y.Z", "X.Y.Z_DIFF");
        summary.set_count(DiffBucket::ValueMismatch, 7);

        let json = serde_json::to_string(&summary).unwrap();
        let parsed: DiffSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary, parsed);
    }

    #[test]
    fn save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");

        let summary = DiffSummary::new("A.B.C", "X.Y.Z", "X.Y.Z_DIFF");
        summary.save_to_file(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: DiffSummary = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, summary);
    }
}
