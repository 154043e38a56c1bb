//! Snowdiff engine - table resolution and diff classification
//!
//! This crate implements the two components the tool is built from:
//! - the selection state machine that narrows Database -> Schema ->
//!   Table -> Key Column into one [`snowdiff_core::ResolvedTable`]
//! - the diff classifier that binds both resolved tables to a diff
//!   engine, reads the materialized result back, and partitions rows
//!   into the three buckets with counts and CSV payloads

pub mod classifier;
pub mod classify;
pub mod engine;
pub mod export;
pub mod selection;

pub use classifier::{BucketArtifact, DiffClassifier, DiffOutcome};
pub use classify::{classify, BucketSet, Classification};
pub use engine::{BoundTable, DiffEngine, EngineError, SqlDiffEngine};
pub use export::bucket_to_csv;
pub use selection::{resolve_table, ResolutionError, SelectionState, TableChoices};
