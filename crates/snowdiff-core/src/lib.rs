//! Snowdiff Core
//!
//! Core domain model with stable types shared by every other crate:
//! table identifiers, resolved selections, diff buckets, the query
//! wire shape, configuration and the summary report.

pub mod bucket;
pub mod config;
pub mod query;
pub mod report;
pub mod table;

pub use bucket::DiffBucket;
pub use config::{Config, ConfigError, WarehouseConfig};
pub use query::QueryOutput;
pub use report::{DiffSummary, SummaryVersion};
pub use table::{ColumnDescriptor, ResolvedTable, TableIdentifier};
