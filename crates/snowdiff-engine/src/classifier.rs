//! Diff classification orchestration
//!
//! One entry point for "compute diff": precondition gate, engine call,
//! materialized read-back, partitioning, CSV payloads, counts. Fully
//! succeeds or reports one failure; partial buckets are never produced.

use crate::classify::{classify, Classification};
use crate::engine::{BoundTable, DiffEngine, EngineError};
use crate::export::bucket_to_csv;
use snowdiff_catalog::Warehouse;
use snowdiff_core::{DiffBucket, DiffSummary, ResolvedTable};
use std::sync::Arc;

/// One bucket's downloadable artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketArtifact {
    pub bucket: DiffBucket,
    pub count: usize,
    pub csv: Vec<u8>,
}

/// The full result of one classification run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// Counts plus run metadata
    pub summary: DiffSummary,

    /// The three bucket datasets
    pub classification: Classification,

    /// CSV payloads in [`DiffBucket::ALL`] order
    pub artifacts: Vec<BucketArtifact>,
}

impl DiffOutcome {
    /// The artifact for one bucket
    pub fn artifact(&self, bucket: DiffBucket) -> Option<&BucketArtifact> {
        self.artifacts.iter().find(|a| a.bucket == bucket)
    }
}

/// Runs the external diff engine and classifies its materialized output
pub struct DiffClassifier {
    engine: Arc<dyn DiffEngine>,
    warehouse: Arc<dyn Warehouse>,
}

impl DiffClassifier {
    pub fn new(engine: Arc<dyn DiffEngine>, warehouse: Arc<dyn Warehouse>) -> Self {
        Self { engine, warehouse }
    }

    /// Name the diff result is materialized under
    pub fn materialize_name(target: &ResolvedTable) -> String {
        format!("{}_DIFF", target.qualified_name())
    }

    /// Read-back statement for a materialized diff table
    pub fn readback_sql(materialized: &str) -> String {
        format!("SELECT * FROM {};", materialized)
    }

    /// Run the whole classification
    ///
    /// Both sides must be resolved; an unresolved side means the
    /// engine is never invoked.
    pub async fn run(
        &self,
        source: Option<&ResolvedTable>,
        target: Option<&ResolvedTable>,
    ) -> Result<DiffOutcome, EngineError> {
        let (source, target) = match (source, target) {
            (Some(source), Some(target)) => (source, target),
            _ => {
                return Err(EngineError::Precondition(
                    "Source and Target tables must be selected before showing table diff."
                        .to_string(),
                ));
            }
        };

        let materialized = Self::materialize_name(target);
        let extra_columns: Vec<String> =
            source.columns.iter().map(|c| c.name.clone()).collect();

        self.engine
            .diff(
                &BoundTable::bind(source),
                &BoundTable::bind(target),
                &extra_columns,
                &materialized,
            )
            .await?;

        let output = self
            .warehouse
            .query(&Self::readback_sql(&materialized))
            .await
            .map_err(|e| EngineError::Readback(e.to_string()))?;

        let classification = classify(&output)?;

        let mut artifacts = Vec::with_capacity(DiffBucket::ALL.len());
        for bucket in DiffBucket::ALL {
            let set = classification.bucket(bucket);
            artifacts.push(BucketArtifact {
                bucket,
                count: set.len(),
                csv: bucket_to_csv(set)?,
            });
        }

        let mut summary = DiffSummary::new(
            source.qualified_name(),
            target.qualified_name(),
            materialized,
        );
        for artifact in &artifacts {
            summary.set_count(artifact.bucket, artifact.count);
        }

        tracing::info!(
            missing_in_target = summary.missing_in_target,
            missing_in_source = summary.missing_in_source,
            value_mismatch = summary.value_mismatch,
            "diff classified"
        );

        Ok(DiffOutcome {
            summary,
            classification,
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn materialize_name_is_target_suffixed() {
        use snowdiff_core::{ColumnDescriptor, TableIdentifier};

        let target = ResolvedTable {
            table: TableIdentifier::new("STAGING", "PUBLIC", "ORDERS"),
            key_column: "ORDER_ID".to_string(),
            columns: vec![ColumnDescriptor::new("ORDER_ID", 0)],
        };

        assert_eq!(
            DiffClassifier::materialize_name(&target),
            "STAGING.PUBLIC.ORDERS_DIFF"
        );
        assert_eq!(
            DiffClassifier::readback_sql("STAGING.PUBLIC.ORDERS_DIFF"),
            "SELECT * FROM STAGING.PUBLIC.ORDERS_DIFF;"
        );
    }
}
