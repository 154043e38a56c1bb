//! Table identifiers and resolved selections

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a table in the warehouse
///
/// All three parts are non-empty once a resolution has completed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Database name
    pub database: String,

    /// Schema name
    pub schema: String,

    /// Table name
    pub table: String,
}

impl TableIdentifier {
    /// Create a new table identifier
    pub fn new(
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Get the fully qualified name
    pub fn fqn(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fqn())
    }
}

/// A column as discovered from the warehouse catalog
///
/// The ordinal is the position in the catalog listing; the order carries
/// no meaning beyond display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,

    /// Position in the table's column list
    pub ordinal: usize,
}

impl ColumnDescriptor {
    /// Create a new column descriptor
    pub fn new(name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            ordinal,
        }
    }
}

/// The output of a completed table resolution
///
/// Immutable once produced; created per interaction and discarded at the
/// end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTable {
    /// The selected table
    pub table: TableIdentifier,

    /// The column chosen as the unique key (uniqueness is assumed, not
    /// verified)
    pub key_column: String,

    /// The full column list in catalog order
    pub columns: Vec<ColumnDescriptor>,
}

impl ResolvedTable {
    /// Fully qualified `database.schema.table` name
    pub fn qualified_name(&self) -> String {
        self.table.fqn()
    }

    /// Column names in catalog order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_identifier_fqn() {
        let table = TableIdentifier::new("SALES", "PUBLIC", "ORDERS");
        assert_eq!(table.database, "SALES");
        assert_eq!(table.schema, "PUBLIC");
        assert_eq!(table.table, "ORDERS");
        assert_eq!(table.fqn(), "SALES.PUBLIC.ORDERS");
        assert_eq!(table.to_string(), "SALES.PUBLIC.ORDERS");
    }

    #[test]
    fn resolved_table_accessors() {
        let resolved = ResolvedTable {
            table: TableIdentifier::new("SALES", "PUBLIC", "ORDERS"),
            key_column: "ORDER_ID".to_string(),
            columns: vec![
                ColumnDescriptor::new("ORDER_ID", 0),
                ColumnDescriptor::new("AMOUNT", 1),
            ],
        };

        assert_eq!(resolved.qualified_name(), "SALES.PUBLIC.ORDERS");
        assert_eq!(resolved.column_names(), vec!["ORDER_ID", "AMOUNT"]);
    }
}
