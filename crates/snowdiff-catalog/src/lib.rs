//! Warehouse access for snowdiff
//!
//! This crate owns everything that touches the warehouse: the
//! [`Warehouse`] connection port, the Snowflake implementation (behind
//! the `snowflake` cargo feature), a mock for tests, a TTL query cache,
//! and the [`Catalog`] facade exposing the four typed catalog listings
//! with their fixed result-shape contracts.
//!
//! ## Example
//!
//! ```rust,ignore
//! use snowdiff_catalog::{Catalog, SnowflakeWarehouse};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let warehouse = SnowflakeWarehouse::builder()
//!     .with_password("xy12345.us-east-1", "user", "pass")
//!     .build()?;
//! let catalog = Catalog::new(Arc::new(warehouse), Duration::from_secs(600));
//! let databases = catalog.list_databases().await?;
//! ```

pub mod cache;
pub mod catalog;
pub mod mock;
pub mod snowflake;
pub mod warehouse;

pub use cache::QueryCache;
pub use catalog::Catalog;
pub use mock::{MockWarehouse, MockWarehouseBuilder};
pub use snowflake::{SnowflakeWarehouse, SnowflakeWarehouseBuilder};
pub use warehouse::{CatalogError, Warehouse};
