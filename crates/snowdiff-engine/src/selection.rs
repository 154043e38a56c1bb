//! Table selection state machine
//!
//! Four dependent steps, each constrained by the previous choice:
//! database, schema, table, key column. Every step first asks the
//! catalog for the legal choices and then accepts exactly one of them,
//! so a typo or a stale name fails the same way an empty listing does.
//!
//! The resolver boundary never propagates: any failure at any step is
//! logged and collapsed into the "selection incomplete" sentinel.

use snowdiff_catalog::{Catalog, CatalogError};
use snowdiff_core::{ColumnDescriptor, ResolvedTable, TableIdentifier};

/// The four names one side of a comparison is driven by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableChoices {
    pub database: String,
    pub schema: String,
    pub table: String,
    pub key_column: String,
}

impl TableChoices {
    /// Parse `DATABASE.SCHEMA.TABLE` plus a key column name
    pub fn parse(qualified: &str, key_column: &str) -> Result<Self, ResolutionError> {
        let parts: Vec<&str> = qualified.split('.').collect();
        match parts.as_slice() {
            [database, schema, table]
                if !database.is_empty() && !schema.is_empty() && !table.is_empty() =>
            {
                Ok(Self {
                    database: database.to_string(),
                    schema: schema.to_string(),
                    table: table.to_string(),
                    key_column: key_column.to_string(),
                })
            }
            _ => Err(ResolutionError::InvalidReference(qualified.to_string())),
        }
    }
}

/// Errors produced while driving the selection machine
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("'{choice}' is not one of the available {step} choices")]
    InvalidChoice { step: &'static str, choice: String },

    #[error("'{0}' is not a DATABASE.SCHEMA.TABLE reference")]
    InvalidReference(String),

    #[error("selection is already complete")]
    AlreadyResolved,
}

/// One side's selection progress
///
/// Each confirmed choice produces a new state; the machine only moves
/// forward. `Resolved` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState {
    /// Nothing chosen yet
    Start,

    /// Database confirmed
    Database { database: String },

    /// Database and schema confirmed
    Schema { database: String, schema: String },

    /// Database, schema and table confirmed; key column outstanding
    Table {
        database: String,
        schema: String,
        table: String,
    },

    /// All four choices confirmed
    Resolved(ResolvedTable),
}

impl SelectionState {
    /// Fresh machine with nothing chosen
    pub fn new() -> Self {
        Self::Start
    }

    /// Name of the step the machine is waiting on
    pub fn pending_step(&self) -> &'static str {
        match self {
            Self::Start => "database",
            Self::Database { .. } => "schema",
            Self::Schema { .. } => "table",
            Self::Table { .. } => "key column",
            Self::Resolved(_) => "none",
        }
    }

    /// The legal choices for the next step
    ///
    /// Errors with [`CatalogError::EmptyResult`] when the warehouse has
    /// nothing to offer at this step.
    pub async fn options(&self, catalog: &Catalog) -> Result<Vec<String>, ResolutionError> {
        match self {
            Self::Start => Ok(catalog.list_databases().await?),
            Self::Database { database } => Ok(catalog.list_schemas(database).await?),
            Self::Schema { database, schema } => Ok(catalog.list_tables(database, schema).await?),
            Self::Table {
                database,
                schema,
                table,
            } => Ok(catalog
                .list_columns(database, schema, table)
                .await?
                .into_iter()
                .map(|c| c.name)
                .collect()),
            Self::Resolved(_) => Err(ResolutionError::AlreadyResolved),
        }
    }

    /// Confirm one choice and advance
    ///
    /// The choice must be one of [`Self::options`]; anything else is an
    /// [`ResolutionError::InvalidChoice`].
    pub async fn select(
        self,
        catalog: &Catalog,
        choice: &str,
    ) -> Result<SelectionState, ResolutionError> {
        let step = self.pending_step();

        // The final step needs the full descriptors, not just names
        if let Self::Table {
            database,
            schema,
            table,
        } = &self
        {
            let columns = catalog.list_columns(database, schema, table).await?;
            return Self::select_key(database, schema, table, columns, choice);
        }

        let options = self.options(catalog).await?;
        if !options.iter().any(|o| o == choice) {
            return Err(ResolutionError::InvalidChoice {
                step,
                choice: choice.to_string(),
            });
        }

        Ok(match self {
            Self::Start => Self::Database {
                database: choice.to_string(),
            },
            Self::Database { database } => Self::Schema {
                database,
                schema: choice.to_string(),
            },
            Self::Schema { database, schema } => Self::Table {
                database,
                schema,
                table: choice.to_string(),
            },
            Self::Table { .. } => unreachable!("handled above"),
            Self::Resolved(_) => return Err(ResolutionError::AlreadyResolved),
        })
    }

    fn select_key(
        database: &str,
        schema: &str,
        table: &str,
        columns: Vec<ColumnDescriptor>,
        choice: &str,
    ) -> Result<SelectionState, ResolutionError> {
        if !columns.iter().any(|c| c.name == choice) {
            return Err(ResolutionError::InvalidChoice {
                step: "key column",
                choice: choice.to_string(),
            });
        }

        Ok(SelectionState::Resolved(ResolvedTable {
            table: TableIdentifier::new(database, schema, table),
            key_column: choice.to_string(),
            columns,
        }))
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

/// Drive the machine end to end with the given choices
///
/// Any failure at any step - empty listing, query error, shape mismatch,
/// bad choice - is logged with context and collapsed into `None`:
/// "selection incomplete", never a fatal error.
pub async fn resolve_table(catalog: &Catalog, choices: &TableChoices) -> Option<ResolvedTable> {
    match try_resolve(catalog, choices).await {
        Ok(resolved) => {
            tracing::info!(table = %resolved.qualified_name(), key = %resolved.key_column, "table resolved");
            Some(resolved)
        }
        Err(e) => {
            tracing::error!(
                database = %choices.database,
                schema = %choices.schema,
                table = %choices.table,
                "Error loading database/schema/table list: {}",
                e
            );
            None
        }
    }
}

/// Like [`resolve_table`], but surfaces the failure
pub async fn try_resolve(
    catalog: &Catalog,
    choices: &TableChoices,
) -> Result<ResolvedTable, ResolutionError> {
    let state = SelectionState::new()
        .select(catalog, &choices.database)
        .await?
        .select(catalog, &choices.schema)
        .await?
        .select(catalog, &choices.table)
        .await?
        .select(catalog, &choices.key_column)
        .await?;

    match state {
        SelectionState::Resolved(resolved) => Ok(resolved),
        // Four selects always land on Resolved or error out earlier
        _ => Err(ResolutionError::AlreadyResolved),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_choices() {
        let choices = TableChoices::parse("SALES.PUBLIC.ORDERS", "ORDER_ID").unwrap();
        assert_eq!(choices.database, "SALES");
        assert_eq!(choices.schema, "PUBLIC");
        assert_eq!(choices.table, "ORDERS");
        assert_eq!(choices.key_column, "ORDER_ID");
    }

    #[test]
    fn parse_rejects_partial_references() {
        assert!(TableChoices::parse("PUBLIC.ORDERS", "ID").is_err());
        assert!(TableChoices::parse("A.B.C.D", "ID").is_err());
        assert!(TableChoices::parse("..ORDERS", "ID").is_err());
    }

    #[test]
    fn pending_steps() {
        assert_eq!(SelectionState::new().pending_step(), "database");
        assert_eq!(
            SelectionState::Database {
                database: "DB".to_string()
            }
            .pending_step(),
            "schema"
        );
    }
}
