//! Query result wire shape
//!
//! Every warehouse round-trip, catalog listing or materialized diff
//! read-back, flattens to named columns plus string-valued rows.

use serde::{Deserialize, Serialize};

/// A materialized query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutput {
    /// Result column names, in result order
    pub columns: Vec<String>,

    /// Rows; each row has exactly `columns.len()` values
    pub rows: Vec<Vec<String>>,
}

impl QueryOutput {
    /// Build an output from column names and rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows }
    }

    /// An output with no columns and no rows
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of result columns
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the result has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a named column, case-insensitive
    ///
    /// Snowflake reports result column names in upper case; callers pass
    /// whatever casing they have.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Values of one column across all rows
    pub fn column_values(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QueryOutput {
        QueryOutput::new(
            vec!["NAME".to_string(), "KIND".to_string()],
            vec![
                vec!["ORDERS".to_string(), "TABLE".to_string()],
                vec!["USERS".to_string(), "TABLE".to_string()],
            ],
        )
    }

    #[test]
    fn dimensions() {
        let out = sample();
        assert_eq!(out.width(), 2);
        assert_eq!(out.len(), 2);
        assert!(!out.is_empty());
        assert!(QueryOutput::empty().is_empty());
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let out = sample();
        assert_eq!(out.column_index("name"), Some(0));
        assert_eq!(out.column_index("KIND"), Some(1));
        assert_eq!(out.column_index("missing"), None);
    }

    #[test]
    fn column_values() {
        let out = sample();
        assert_eq!(out.column_values(0), vec!["ORDERS", "USERS"]);
    }
}
