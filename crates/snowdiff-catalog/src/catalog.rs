//! Typed catalog listings with fixed shape contracts
//!
//! The four discovery queries the resolver depends on. Each result has a
//! fixed column count; anything else is a [`CatalogError::ShapeMismatch`].
//! Results are memoized by query text for the session's TTL window.

use crate::cache::QueryCache;
use crate::warehouse::{CatalogError, Warehouse};
use snowdiff_core::{ColumnDescriptor, QueryOutput};
use std::sync::Arc;
use std::time::Duration;

/// Result width of the database listing
pub const DATABASE_LIST_WIDTH: usize = 4;
/// Result width of `SHOW TERSE SCHEMAS`
pub const SCHEMA_LIST_WIDTH: usize = 5;
/// Result width of `SHOW TERSE TABLES`
pub const TABLE_LIST_WIDTH: usize = 5;
/// Result width of `SHOW TERSE COLUMNS`
pub const COLUMN_LIST_WIDTH: usize = 11;

// Positions of the consumed value within each fixed shape.
// SHOW TERSE SCHEMAS/TABLES: (created_on, name, kind, database_name,
// schema_name). SHOW TERSE COLUMNS puts column_name third.
const DATABASE_NAME_IDX: usize = 0;
const SCHEMA_NAME_IDX: usize = 1;
const TABLE_NAME_IDX: usize = 1;
const COLUMN_NAME_IDX: usize = 2;

/// Catalog facade over a shared warehouse handle
///
/// Owns the query cache; the warehouse handle itself is injected and
/// shared with whoever else needs it.
pub struct Catalog {
    warehouse: Arc<dyn Warehouse>,
    cache: QueryCache,
}

impl Catalog {
    /// Create a catalog over a warehouse handle with the given cache TTL
    pub fn new(warehouse: Arc<dyn Warehouse>, cache_ttl: Duration) -> Self {
        Self {
            warehouse,
            cache: QueryCache::new(cache_ttl),
        }
    }

    /// The underlying warehouse handle
    pub fn warehouse(&self) -> Arc<dyn Warehouse> {
        Arc::clone(&self.warehouse)
    }

    /// SQL for the database listing, newest first
    pub fn databases_sql() -> String {
        "SELECT DATABASE_NAME, CREATED, DATABASE_OWNER, COMMENT \
         FROM SNOWFLAKE.INFORMATION_SCHEMA.DATABASES ORDER BY CREATED DESC;"
            .to_string()
    }

    /// SQL for the schema listing of one database
    pub fn schemas_sql(database: &str) -> String {
        format!("SHOW TERSE SCHEMAS IN {};", database)
    }

    /// SQL for the table listing of one schema
    pub fn tables_sql(database: &str, schema: &str) -> String {
        format!("SHOW TERSE TABLES IN SCHEMA {}.{};", database, schema)
    }

    /// SQL for the column listing of one table
    pub fn columns_sql(database: &str, schema: &str, table: &str) -> String {
        format!("SHOW TERSE COLUMNS IN {}.{}.{};", database, schema, table)
    }

    /// List databases, most recently created first
    pub async fn list_databases(&self) -> Result<Vec<String>, CatalogError> {
        let out = self.cached_query(&Self::databases_sql()).await?;
        Self::names_from(
            &out,
            DATABASE_LIST_WIDTH,
            DATABASE_NAME_IDX,
            "database listing",
            "No databases found.",
        )
    }

    /// List schemas within a database
    pub async fn list_schemas(&self, database: &str) -> Result<Vec<String>, CatalogError> {
        let out = self.cached_query(&Self::schemas_sql(database)).await?;
        Self::names_from(
            &out,
            SCHEMA_LIST_WIDTH,
            SCHEMA_NAME_IDX,
            "schema listing",
            "No schemas found.",
        )
    }

    /// List tables within a schema
    pub async fn list_tables(
        &self,
        database: &str,
        schema: &str,
    ) -> Result<Vec<String>, CatalogError> {
        let out = self.cached_query(&Self::tables_sql(database, schema)).await?;
        Self::names_from(
            &out,
            TABLE_LIST_WIDTH,
            TABLE_NAME_IDX,
            "table listing",
            "No tables found.",
        )
    }

    /// List columns of a table, in catalog order
    pub async fn list_columns(
        &self,
        database: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, CatalogError> {
        let out = self
            .cached_query(&Self::columns_sql(database, schema, table))
            .await?;
        let names = Self::names_from(
            &out,
            COLUMN_LIST_WIDTH,
            COLUMN_NAME_IDX,
            "column listing",
            "No columns found.",
        )?;

        Ok(names
            .into_iter()
            .enumerate()
            .map(|(ordinal, name)| ColumnDescriptor::new(name, ordinal))
            .collect())
    }

    async fn cached_query(&self, sql: &str) -> Result<Arc<QueryOutput>, CatalogError> {
        if let Some(hit) = self.cache.get(sql) {
            tracing::debug!(sql, "catalog cache hit");
            return Ok(hit);
        }

        let out = self.warehouse.query(sql).await?;
        self.cache.insert(sql, out.clone());
        Ok(Arc::new(out))
    }

    fn names_from(
        out: &QueryOutput,
        expected_width: usize,
        name_idx: usize,
        context: &str,
        empty_message: &str,
    ) -> Result<Vec<String>, CatalogError> {
        if out.is_empty() {
            return Err(CatalogError::EmptyResult(empty_message.to_string()));
        }

        if out.width() != expected_width {
            return Err(CatalogError::ShapeMismatch {
                expected: expected_width,
                actual: out.width(),
                context: context.to_string(),
            });
        }

        out.rows
            .iter()
            .map(|row| {
                row.get(name_idx).cloned().ok_or_else(|| {
                    CatalogError::ShapeMismatch {
                        expected: expected_width,
                        actual: row.len(),
                        context: context.to_string(),
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockWarehouse;

    fn output(width: usize, names: &[&str], name_idx: usize) -> QueryOutput {
        let columns = (0..width).map(|i| format!("C{}", i)).collect();
        let rows = names
            .iter()
            .map(|name| {
                (0..width)
                    .map(|i| {
                        if i == name_idx {
                            name.to_string()
                        } else {
                            String::new()
                        }
                    })
                    .collect()
            })
            .collect();
        QueryOutput::new(columns, rows)
    }

    fn catalog_over(mock: &MockWarehouse) -> Catalog {
        Catalog::new(Arc::new(mock.clone()), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn list_databases_newest_first() {
        let mock = MockWarehouse::new();
        mock.add_result(
            &Catalog::databases_sql(),
            output(DATABASE_LIST_WIDTH, &["NEWER_DB", "OLDER_DB"], 0),
        )
        .await;

        let catalog = catalog_over(&mock);
        let databases = catalog.list_databases().await.unwrap();
        assert_eq!(databases, vec!["NEWER_DB", "OLDER_DB"]);
    }

    #[tokio::test]
    async fn empty_listing_per_step_message() {
        let mock = MockWarehouse::new();
        mock.add_result(
            &Catalog::columns_sql("DB", "S", "T"),
            QueryOutput::new(vec!["x".to_string(); COLUMN_LIST_WIDTH], vec![]),
        )
        .await;

        let catalog = catalog_over(&mock);
        let err = catalog.list_columns("DB", "S", "T").await.unwrap_err();
        assert!(err.to_string().contains("No columns found"));
    }

    #[tokio::test]
    async fn shape_mismatch_is_detected() {
        let mock = MockWarehouse::new();
        // 3 columns where the schema listing contract requires 5
        mock.add_result(&Catalog::schemas_sql("DB"), output(3, &["PUBLIC"], 1))
            .await;

        let catalog = catalog_over(&mock);
        let err = catalog.list_schemas("DB").await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ShapeMismatch {
                expected: 5,
                actual: 3,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn column_listing_keeps_catalog_order() {
        let mock = MockWarehouse::new();
        mock.add_result(
            &Catalog::columns_sql("DB", "S", "T"),
            output(COLUMN_LIST_WIDTH, &["ID", "NAME", "CREATED_AT"], 2),
        )
        .await;

        let catalog = catalog_over(&mock);
        let columns = catalog.list_columns("DB", "S", "T").await.unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0], ColumnDescriptor::new("ID", 0));
        assert_eq!(columns[2], ColumnDescriptor::new("CREATED_AT", 2));
    }

    #[tokio::test]
    async fn repeated_listing_hits_the_cache() {
        let mock = MockWarehouse::new();
        let sql = Catalog::tables_sql("DB", "S");
        mock.add_result(&sql, output(TABLE_LIST_WIDTH, &["ORDERS"], 1))
            .await;

        let catalog = catalog_over(&mock);
        catalog.list_tables("DB", "S").await.unwrap();
        catalog.list_tables("DB", "S").await.unwrap();
        catalog.list_tables("DB", "S").await.unwrap();

        assert_eq!(mock.query_count(&sql).await, 1);
    }

    #[tokio::test]
    async fn query_errors_pass_through() {
        let mock = MockWarehouse::new();
        mock.add_error(
            &Catalog::databases_sql(),
            CatalogError::Query("warehouse suspended".to_string()),
        )
        .await;

        let catalog = catalog_over(&mock);
        let err = catalog.list_databases().await.unwrap_err();
        assert!(matches!(err, CatalogError::Query(_)));
    }
}
