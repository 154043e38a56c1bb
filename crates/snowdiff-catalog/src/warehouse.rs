//! Warehouse connection port

use snowdiff_core::QueryOutput;

/// Errors produced while talking to the warehouse catalog
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    /// A catalog query returned zero rows
    #[error("{0}")]
    EmptyResult(String),

    /// A catalog query's column count doesn't match the expected fixed shape
    #[error("unexpected result shape for {context}: expected {expected} columns, got {actual}")]
    ShapeMismatch {
        expected: usize,
        actual: usize,
        context: String,
    },

    #[error("query failed: {0}")]
    Query(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Trait for warehouse connections
///
/// One handle is created per run and shared by every query; the
/// execution model runs one operation at a time against it.
#[async_trait::async_trait]
pub trait Warehouse: Send + Sync {
    /// Warehouse name (e.g., "Snowflake")
    fn name(&self) -> &'static str;

    /// Run a query and materialize the full result
    async fn query(&self, sql: &str) -> Result<QueryOutput, CatalogError>;

    /// Run a statement for its side effect, discarding any result
    async fn execute(&self, sql: &str) -> Result<(), CatalogError>;

    /// Validate the connection before doing real work
    async fn test_connection(&self) -> Result<(), CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_display() {
        let err = CatalogError::ShapeMismatch {
            expected: 11,
            actual: 3,
            context: "column listing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unexpected result shape for column listing: expected 11 columns, got 3"
        );
    }

    #[test]
    fn empty_result_display_is_the_user_message() {
        let err = CatalogError::EmptyResult("No columns found.".to_string());
        assert_eq!(err.to_string(), "No columns found.");
    }
}
