//! Partitioning of the materialized diff result
//!
//! Every row of the read-back result is claimed by at most one bucket,
//! decided entirely by the `is_exclusive_a`/`is_exclusive_b` flags. The
//! engine is assumed never to emit both flags set; such a row belongs to
//! no bucket and is dropped.

use crate::engine::EngineError;
use snowdiff_core::{DiffBucket, QueryOutput};

/// Flag column marking rows that only exist in the source
pub const EXCLUSIVE_A_COLUMN: &str = "is_exclusive_a";
/// Flag column marking rows that only exist in the target
pub const EXCLUSIVE_B_COLUMN: &str = "is_exclusive_b";

/// The rows of one bucket, with the full materialized column set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet {
    /// Which bucket this is
    pub bucket: DiffBucket,

    /// Column names, identical across the three buckets
    pub columns: Vec<String>,

    /// Rows claimed by this bucket
    pub rows: Vec<Vec<String>>,
}

impl BucketSet {
    fn empty(bucket: DiffBucket, columns: &[String]) -> Self {
        Self {
            bucket,
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Cardinality of the bucket
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no rows landed here
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one named column, for previews
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self
            .columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(idx).map(String::as_str))
                .collect(),
        )
    }
}

/// The three disjoint buckets of one diff run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub missing_in_target: BucketSet,
    pub missing_in_source: BucketSet,
    pub value_mismatch: BucketSet,
}

impl Classification {
    /// The bucket set for one bucket
    pub fn bucket(&self, bucket: DiffBucket) -> &BucketSet {
        match bucket {
            DiffBucket::MissingInTarget => &self.missing_in_target,
            DiffBucket::MissingInSource => &self.missing_in_source,
            DiffBucket::ValueMismatch => &self.value_mismatch,
        }
    }

    /// Total rows claimed across all buckets
    pub fn total(&self) -> usize {
        DiffBucket::ALL
            .iter()
            .map(|b| self.bucket(*b).len())
            .sum()
    }
}

/// Partition the materialized diff result into the three buckets
///
/// Fails when either flag column is absent or a flag value does not
/// parse as a boolean; per the all-or-nothing rule the caller then
/// shows no buckets at all.
pub fn classify(output: &QueryOutput) -> Result<Classification, EngineError> {
    let a_idx = output.column_index(EXCLUSIVE_A_COLUMN).ok_or_else(|| {
        EngineError::Classify(format!("missing {} column", EXCLUSIVE_A_COLUMN))
    })?;
    let b_idx = output.column_index(EXCLUSIVE_B_COLUMN).ok_or_else(|| {
        EngineError::Classify(format!("missing {} column", EXCLUSIVE_B_COLUMN))
    })?;

    let mut missing_in_target = BucketSet::empty(DiffBucket::MissingInTarget, &output.columns);
    let mut missing_in_source = BucketSet::empty(DiffBucket::MissingInSource, &output.columns);
    let mut value_mismatch = BucketSet::empty(DiffBucket::ValueMismatch, &output.columns);

    for (row_idx, row) in output.rows.iter().enumerate() {
        let exclusive_a = parse_flag(row.get(a_idx), row_idx, EXCLUSIVE_A_COLUMN)?;
        let exclusive_b = parse_flag(row.get(b_idx), row_idx, EXCLUSIVE_B_COLUMN)?;

        match DiffBucket::from_flags(exclusive_a, exclusive_b) {
            Some(DiffBucket::MissingInTarget) => missing_in_target.rows.push(row.clone()),
            Some(DiffBucket::MissingInSource) => missing_in_source.rows.push(row.clone()),
            Some(DiffBucket::ValueMismatch) => value_mismatch.rows.push(row.clone()),
            None => {
                // Precondition violation; the row belongs to no bucket
                tracing::warn!(row = row_idx, "both exclusivity flags set, row dropped");
            }
        }
    }

    Ok(Classification {
        missing_in_target,
        missing_in_source,
        value_mismatch,
    })
}

fn parse_flag(
    value: Option<&String>,
    row_idx: usize,
    column: &str,
) -> Result<bool, EngineError> {
    let value = value.ok_or_else(|| {
        EngineError::Classify(format!("row {} is missing the {} value", row_idx, column))
    })?;

    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(EngineError::Classify(format!(
            "row {}: {} value '{}' is not a boolean",
            row_idx, column, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff_output(flags: &[(&str, &str)]) -> QueryOutput {
        QueryOutput::new(
            vec![
                "is_exclusive_a".to_string(),
                "is_exclusive_b".to_string(),
                "order_id_a".to_string(),
                "order_id_b".to_string(),
            ],
            flags
                .iter()
                .enumerate()
                .map(|(i, (a, b))| {
                    vec![
                        a.to_string(),
                        b.to_string(),
                        format!("{}", i),
                        format!("{}", i),
                    ]
                })
                .collect(),
        )
    }

    #[test]
    fn worked_example_counts() {
        let output = diff_output(&[
            ("true", "false"),
            ("false", "true"),
            ("false", "false"),
            ("false", "false"),
        ]);

        let classification = classify(&output).unwrap();
        assert_eq!(classification.missing_in_target.len(), 1);
        assert_eq!(classification.missing_in_source.len(), 1);
        assert_eq!(classification.value_mismatch.len(), 2);
        assert_eq!(classification.total(), 4);
    }

    #[test]
    fn every_row_lands_in_exactly_one_bucket() {
        let output = diff_output(&[
            ("true", "false"),
            ("false", "true"),
            ("false", "false"),
        ]);

        let classification = classify(&output).unwrap();
        let total: usize = DiffBucket::ALL
            .iter()
            .map(|b| classification.bucket(*b).len())
            .sum();
        assert_eq!(total, output.len());
    }

    #[test]
    fn both_flags_set_claims_no_bucket() {
        let output = diff_output(&[("true", "true"), ("false", "false")]);

        let classification = classify(&output).unwrap();
        assert_eq!(classification.total(), 1);
        assert_eq!(classification.value_mismatch.len(), 1);
    }

    #[test]
    fn flags_accept_numeric_booleans() {
        let output = diff_output(&[("1", "0"), ("0", "1")]);

        let classification = classify(&output).unwrap();
        assert_eq!(classification.missing_in_target.len(), 1);
        assert_eq!(classification.missing_in_source.len(), 1);
    }

    #[test]
    fn missing_flag_column_fails() {
        let output = QueryOutput::new(
            vec!["is_exclusive_a".to_string(), "order_id_a".to_string()],
            vec![vec!["true".to_string(), "1".to_string()]],
        );

        let err = classify(&output).unwrap_err();
        assert!(matches!(err, EngineError::Classify(_)));
        assert!(err.to_string().contains("is_exclusive_b"));
    }

    #[test]
    fn unparseable_flag_fails() {
        let output = diff_output(&[("yes", "false")]);
        let err = classify(&output).unwrap_err();
        assert!(matches!(err, EngineError::Classify(_)));
    }

    #[test]
    fn bucket_column_preview() {
        let output = diff_output(&[("true", "false"), ("true", "false")]);
        let classification = classify(&output).unwrap();

        let preview = classification
            .missing_in_target
            .column_values("order_id_a")
            .unwrap();
        assert_eq!(preview, vec!["0", "1"]);
        assert!(classification
            .missing_in_target
            .column_values("no_such_column")
            .is_none());
    }
}
