//! Diff engine port and the SQL-pushdown implementation
//!
//! The engine contract is deliberately small: bind a logical table to a
//! physical table plus key column, then compute the full row-level diff
//! and persist it under a given name. Nothing here consumes the diff
//! incrementally; full materialization is the only behavior relied on.

use snowdiff_catalog::{CatalogError, Warehouse};
use snowdiff_core::ResolvedTable;
use std::sync::Arc;

/// Errors from diff computation, read-back, or classification
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Diff requested with incomplete source/target selection
    #[error("{0}")]
    Precondition(String),

    #[error("diff engine failed: {0}")]
    Engine(String),

    #[error("failed to read materialized diff: {0}")]
    Readback(String),

    #[error("failed to classify diff output: {0}")]
    Classify(String),

    #[error("CSV export failed: {0}")]
    Csv(String),
}

/// A logical table bound to a physical table and its key column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundTable {
    /// Fully qualified `database.schema.table`
    pub qualified_name: String,

    /// The key column rows are matched on
    pub key_column: String,
}

impl BoundTable {
    /// Bind a resolved table
    pub fn bind(resolved: &ResolvedTable) -> Self {
        Self {
            qualified_name: resolved.qualified_name(),
            key_column: resolved.key_column.clone(),
        }
    }
}

/// Port: row-level diff between two bound tables
///
/// Implementations must overwrite the materialization target on
/// re-invocation, never append.
#[async_trait::async_trait]
pub trait DiffEngine: Send + Sync {
    /// Compute the full diff and persist it under `materialize_to`
    ///
    /// `extra_columns` are carried through for inspection, suffixed
    /// `_a` (source side) and `_b` (target side) in the output, next to
    /// the `is_exclusive_a`/`is_exclusive_b` flags.
    async fn diff(
        &self,
        source: &BoundTable,
        target: &BoundTable,
        extra_columns: &[String],
        materialize_to: &str,
    ) -> Result<(), EngineError>;
}

/// Diff engine that pushes the whole computation down to the warehouse
///
/// One `CREATE OR REPLACE TABLE ... AS SELECT` full outer join: rows
/// kept are those missing on either side or differing in at least one
/// carried column. `CREATE OR REPLACE` gives the overwrite-on-rerun
/// contract for free.
pub struct SqlDiffEngine {
    warehouse: Arc<dyn Warehouse>,
}

impl SqlDiffEngine {
    pub fn new(warehouse: Arc<dyn Warehouse>) -> Self {
        Self { warehouse }
    }

    /// The materialization statement for one diff run
    pub fn materialize_sql(
        source: &BoundTable,
        target: &BoundTable,
        extra_columns: &[String],
        materialize_to: &str,
    ) -> String {
        let mut select_list = vec![
            format!("(t.{} IS NULL) AS is_exclusive_a", target.key_column),
            format!("(s.{} IS NULL) AS is_exclusive_b", source.key_column),
        ];
        for column in extra_columns {
            select_list.push(format!("s.{} AS {}_a", column, column.to_lowercase()));
            select_list.push(format!("t.{} AS {}_b", column, column.to_lowercase()));
        }

        let mut predicates = vec![
            format!("t.{} IS NULL", target.key_column),
            format!("s.{} IS NULL", source.key_column),
        ];
        for column in extra_columns {
            if column.eq_ignore_ascii_case(&source.key_column) {
                // Matched rows agree on the key by construction
                continue;
            }
            predicates.push(format!("s.{c} IS DISTINCT FROM t.{c}", c = column));
        }

        format!(
            "CREATE OR REPLACE TABLE {name} AS SELECT {select} FROM {source} s \
             FULL OUTER JOIN {target} t ON s.{skey} = t.{tkey} WHERE {predicates};",
            name = materialize_to,
            select = select_list.join(", "),
            source = source.qualified_name,
            target = target.qualified_name,
            skey = source.key_column,
            tkey = target.key_column,
            predicates = predicates.join(" OR "),
        )
    }
}

#[async_trait::async_trait]
impl DiffEngine for SqlDiffEngine {
    async fn diff(
        &self,
        source: &BoundTable,
        target: &BoundTable,
        extra_columns: &[String],
        materialize_to: &str,
    ) -> Result<(), EngineError> {
        let sql = Self::materialize_sql(source, target, extra_columns, materialize_to);
        tracing::info!(
            source = %source.qualified_name,
            target = %target.qualified_name,
            materialize_to,
            "materializing diff"
        );

        self.warehouse.execute(&sql).await.map_err(|e| match e {
            CatalogError::Authentication(msg) => EngineError::Engine(msg),
            other => EngineError::Engine(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snowdiff_core::{ColumnDescriptor, TableIdentifier};

    fn resolved(db: &str, table: &str, key: &str) -> ResolvedTable {
        ResolvedTable {
            table: TableIdentifier::new(db, "PUBLIC", table),
            key_column: key.to_string(),
            columns: vec![ColumnDescriptor::new(key, 0)],
        }
    }

    #[test]
    fn bind_carries_name_and_key() {
        let bound = BoundTable::bind(&resolved("SALES", "ORDERS", "ORDER_ID"));
        assert_eq!(bound.qualified_name, "SALES.PUBLIC.ORDERS");
        assert_eq!(bound.key_column, "ORDER_ID");
    }

    #[test]
    fn materialize_sql_shape() {
        let source = BoundTable::bind(&resolved("SALES", "ORDERS", "ORDER_ID"));
        let target = BoundTable::bind(&resolved("STAGING", "ORDERS", "ORDER_ID"));
        let extra = vec!["ORDER_ID".to_string(), "AMOUNT".to_string()];

        let sql = SqlDiffEngine::materialize_sql(
            &source,
            &target,
            &extra,
            "STAGING.PUBLIC.ORDERS_DIFF",
        );

        assert!(sql.starts_with("CREATE OR REPLACE TABLE STAGING.PUBLIC.ORDERS_DIFF AS"));
        assert!(sql.contains("(t.ORDER_ID IS NULL) AS is_exclusive_a"));
        assert!(sql.contains("(s.ORDER_ID IS NULL) AS is_exclusive_b"));
        assert!(sql.contains("s.AMOUNT AS amount_a"));
        assert!(sql.contains("t.AMOUNT AS amount_b"));
        assert!(sql.contains("FULL OUTER JOIN STAGING.PUBLIC.ORDERS t"));
        assert!(sql.contains("s.AMOUNT IS DISTINCT FROM t.AMOUNT"));
        // The key never appears in the mismatch predicate
        assert!(!sql.contains("s.ORDER_ID IS DISTINCT FROM t.ORDER_ID"));
    }

    #[test]
    fn materialize_sql_is_deterministic() {
        let source = BoundTable::bind(&resolved("A", "T", "ID"));
        let target = BoundTable::bind(&resolved("B", "T", "ID"));
        let extra = vec!["ID".to_string()];

        let first = SqlDiffEngine::materialize_sql(&source, &target, &extra, "B.PUBLIC.T_DIFF");
        let second = SqlDiffEngine::materialize_sql(&source, &target, &extra, "B.PUBLIC.T_DIFF");
        assert_eq!(first, second);
    }
}
