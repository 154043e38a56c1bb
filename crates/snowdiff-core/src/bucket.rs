//! Diff bucket registry
//!
//! The three buckets partition the materialized diff result by the two
//! exclusivity flags. The string identifiers and file stems are stable;
//! do not rename them.

use serde::{Deserialize, Serialize};

/// One of the three disjoint diff-result categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffBucket {
    /// Row exists in the source but not in the target
    MissingInTarget,

    /// Row exists in the target but not in the source
    MissingInSource,

    /// Row exists on both sides with differing values
    ValueMismatch,
}

impl DiffBucket {
    /// All buckets, in display order
    pub const ALL: [DiffBucket; 3] = [
        DiffBucket::MissingInTarget,
        DiffBucket::MissingInSource,
        DiffBucket::ValueMismatch,
    ];

    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingInTarget => "missing_in_target",
            Self::MissingInSource => "missing_in_source",
            Self::ValueMismatch => "value_mismatch",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingInTarget => "Missing in Target",
            Self::MissingInSource => "Missing in Source",
            Self::ValueMismatch => "Value Mismatch",
        }
    }

    /// File name for the downloadable CSV artifact
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }

    /// Classify a row by its two exclusivity flags
    ///
    /// Returns `None` for `(true, true)`, which the diff engine is
    /// assumed never to emit.
    pub fn from_flags(exclusive_a: bool, exclusive_b: bool) -> Option<DiffBucket> {
        match (exclusive_a, exclusive_b) {
            (true, false) => Some(Self::MissingInTarget),
            (false, true) => Some(Self::MissingInSource),
            (false, false) => Some(Self::ValueMismatch),
            (true, true) => None,
        }
    }
}

impl std::fmt::Display for DiffBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
