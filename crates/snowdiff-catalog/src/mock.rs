//! Mock warehouse for testing
//!
//! Returns canned query results keyed by the exact SQL text, without
//! connecting anywhere. Useful for:
//! - Unit testing resolution and classification logic
//! - Integration tests in CI without credentials
//! - Simulating error conditions per statement
//!
//! ## Usage
//!
//! ```rust,ignore
//! use snowdiff_catalog::{MockWarehouse, Warehouse};
//! use snowdiff_core::QueryOutput;
//!
//! let warehouse = MockWarehouse::new();
//! warehouse
//!     .add_result("SELECT 1", QueryOutput::new(vec!["1".into()], vec![vec!["1".into()]]))
//!     .await;
//! let out = warehouse.query("SELECT 1").await?;
//! ```

use crate::warehouse::{CatalogError, Warehouse};
use snowdiff_core::QueryOutput;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Mock warehouse storing canned results in memory
///
/// Thread-safe; clones share state, so a test can keep a handle while
/// the code under test owns another.
pub struct MockWarehouse {
    /// Canned query results by SQL text
    results: Arc<RwLock<HashMap<String, QueryOutput>>>,

    /// Errors to return for specific statements
    errors: Arc<RwLock<HashMap<String, CatalogError>>>,

    /// Number of times each statement was queried
    query_counts: Arc<RwLock<HashMap<String, usize>>>,

    /// Statements run through `execute`, in order
    executed: Arc<RwLock<Vec<String>>>,

    /// Simulate connection failure
    fail_connection: bool,
}

impl MockWarehouse {
    /// Create a mock with no canned results
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(HashMap::new())),
            errors: Arc::new(RwLock::new(HashMap::new())),
            query_counts: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            fail_connection: false,
        }
    }

    /// Register the result for a statement
    pub async fn add_result(&self, sql: &str, output: QueryOutput) {
        self.results.write().await.insert(sql.to_string(), output);
    }

    /// Register an error for a statement
    pub async fn add_error(&self, sql: &str, error: CatalogError) {
        self.errors.write().await.insert(sql.to_string(), error);
    }

    /// Fail every connection test
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// How many times a statement was queried
    pub async fn query_count(&self, sql: &str) -> usize {
        self.query_counts
            .read()
            .await
            .get(sql)
            .copied()
            .unwrap_or(0)
    }

    /// Statements run through `execute`, in order
    pub async fn executed_statements(&self) -> Vec<String> {
        self.executed.read().await.clone()
    }
}

impl Default for MockWarehouse {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockWarehouse {
    fn clone(&self) -> Self {
        Self {
            results: Arc::clone(&self.results),
            errors: Arc::clone(&self.errors),
            query_counts: Arc::clone(&self.query_counts),
            executed: Arc::clone(&self.executed),
            fail_connection: self.fail_connection,
        }
    }
}

#[async_trait::async_trait]
impl Warehouse for MockWarehouse {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn query(&self, sql: &str) -> Result<QueryOutput, CatalogError> {
        *self
            .query_counts
            .write()
            .await
            .entry(sql.to_string())
            .or_insert(0) += 1;

        if let Some(error) = self.errors.read().await.get(sql) {
            return Err(error.clone());
        }

        self.results
            .read()
            .await
            .get(sql)
            .cloned()
            .ok_or_else(|| CatalogError::Query(format!("no canned result for: {}", sql)))
    }

    async fn execute(&self, sql: &str) -> Result<(), CatalogError> {
        if let Some(error) = self.errors.read().await.get(sql) {
            return Err(error.clone());
        }

        self.executed.write().await.push(sql.to_string());
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), CatalogError> {
        if self.fail_connection {
            Err(CatalogError::Network(
                "simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Fluent builder for a pre-populated [`MockWarehouse`]
pub struct MockWarehouseBuilder {
    results: HashMap<String, QueryOutput>,
    errors: HashMap<String, CatalogError>,
    fail_connection: bool,
}

impl MockWarehouseBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            results: HashMap::new(),
            errors: HashMap::new(),
            fail_connection: false,
        }
    }

    /// Register the result for a statement
    pub fn with_result(mut self, sql: &str, output: QueryOutput) -> Self {
        self.results.insert(sql.to_string(), output);
        self
    }

    /// Register an error for a statement
    pub fn with_error(mut self, sql: &str, error: CatalogError) -> Self {
        self.errors.insert(sql.to_string(), error);
        self
    }

    /// Fail every connection test
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Build the mock
    pub fn build(self) -> MockWarehouse {
        MockWarehouse {
            results: Arc::new(RwLock::new(self.results)),
            errors: Arc::new(RwLock::new(self.errors)),
            query_counts: Arc::new(RwLock::new(HashMap::new())),
            executed: Arc::new(RwLock::new(Vec::new())),
            fail_connection: self.fail_connection,
        }
    }
}

impl Default for MockWarehouseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_row() -> QueryOutput {
        QueryOutput::new(vec!["N".to_string()], vec![vec!["1".to_string()]])
    }

    #[tokio::test]
    async fn canned_result() {
        let warehouse = MockWarehouse::new();
        warehouse.add_result("SELECT 1", one_row()).await;

        let out = warehouse.query("SELECT 1").await.unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(warehouse.query_count("SELECT 1").await, 1);
    }

    #[tokio::test]
    async fn unknown_statement_is_a_query_error() {
        let warehouse = MockWarehouse::new();
        let result = warehouse.query("SELECT 2").await;
        assert!(matches!(result, Err(CatalogError::Query(_))));
    }

    #[tokio::test]
    async fn injected_error() {
        let warehouse = MockWarehouse::new();
        warehouse
            .add_error(
                "SHOW TERSE TABLES IN SCHEMA A.B;",
                CatalogError::Query("insufficient privileges".to_string()),
            )
            .await;

        let result = warehouse.query("SHOW TERSE TABLES IN SCHEMA A.B;").await;
        assert!(matches!(result, Err(CatalogError::Query(_))));
    }

    #[tokio::test]
    async fn execute_is_logged() {
        let warehouse = MockWarehouse::new();
        warehouse.execute("CREATE OR REPLACE TABLE T AS ...").await.unwrap();

        let executed = warehouse.executed_statements().await;
        assert_eq!(executed, vec!["CREATE OR REPLACE TABLE T AS ..."]);
    }

    #[tokio::test]
    async fn connection_failure() {
        let warehouse = MockWarehouse::new().with_connection_failure();
        let result = warehouse.test_connection().await;
        assert!(matches!(result, Err(CatalogError::Network(_))));
    }

    #[tokio::test]
    async fn builder() {
        let warehouse = MockWarehouseBuilder::new()
            .with_result("SELECT 1", one_row())
            .with_error("SELECT 2", CatalogError::Query("boom".to_string()))
            .build();

        assert!(warehouse.query("SELECT 1").await.is_ok());
        assert!(warehouse.query("SELECT 2").await.is_err());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let warehouse = MockWarehouse::new();
        let cloned = warehouse.clone();

        warehouse.add_result("SELECT 1", one_row()).await;
        assert!(cloned.query("SELECT 1").await.is_ok());
        assert_eq!(warehouse.query_count("SELECT 1").await, 1);
    }
}
