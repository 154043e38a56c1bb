//! Snowflake warehouse connection
//!
//! Runs catalog queries and diff statements over the Snowflake SQL API.
//! Requires the usual privileges: USAGE on the databases and schemas
//! being browsed, SELECT on the compared tables, and CREATE TABLE in the
//! target schema for materialization.
//!
//! ## Authentication Methods
//!
//! 1. Password authentication (username/password)
//! 2. Key-pair authentication (private key PEM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! let warehouse = SnowflakeWarehouse::builder()
//!     .with_password("xy12345.us-east-1", "username", "password")
//!     .with_compute_warehouse("COMPUTE_WH")
//!     .with_role("ANALYST")
//!     .build()?;
//! ```

use crate::warehouse::{CatalogError, Warehouse};
use snowdiff_core::QueryOutput;

#[cfg(feature = "snowflake")]
use snowflake_api::SnowflakeApi;

#[cfg(feature = "snowflake")]
use arrow_array::cast::AsArray;

#[cfg(feature = "snowflake")]
use arrow_array::types::{
    Date32Type, Date64Type, Decimal128Type, Float32Type, Float64Type, Int16Type, Int32Type,
    Int64Type, Int8Type, TimestampMicrosecondType, TimestampMillisecondType,
    TimestampNanosecondType, TimestampSecondType,
};

#[cfg(feature = "snowflake")]
use arrow_array::Array;

#[cfg(not(feature = "snowflake"))]
const FEATURE_HINT: &str =
    "Snowflake support not compiled. Rebuild with: cargo build --features snowflake";

/// Snowflake authentication credentials
#[derive(Clone)]
pub enum SnowflakeCredentials {
    /// Password-based authentication
    Password(String),
    /// Key-pair authentication (PEM format private key)
    PrivateKey(String),
}

/// Builder for [`SnowflakeWarehouse`]
pub struct SnowflakeWarehouseBuilder {
    account: String,
    username: String,
    credentials: SnowflakeCredentials,
    compute_warehouse: Option<String>,
    role: Option<String>,
    database: Option<String>,
}

impl SnowflakeWarehouseBuilder {
    /// Create a builder with password authentication
    pub fn with_password(
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::Password(password.into()),
            compute_warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Create a builder with key-pair authentication
    pub fn with_key_pair(
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> Self {
        Self {
            account: account.into(),
            username: username.into(),
            credentials: SnowflakeCredentials::PrivateKey(private_key_pem.into()),
            compute_warehouse: None,
            role: None,
            database: None,
        }
    }

    /// Set the compute warehouse to run on
    pub fn with_compute_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.compute_warehouse = Some(warehouse.into());
        self
    }

    /// Set the role to use
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Set the default database
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Build the connection
    #[cfg(feature = "snowflake")]
    pub fn build(self) -> Result<SnowflakeWarehouse, CatalogError> {
        let api = match &self.credentials {
            SnowflakeCredentials::Password(password) => SnowflakeApi::with_password_auth(
                &self.account,
                self.compute_warehouse.as_deref(),
                self.database.as_deref(),
                None, // schema
                &self.username,
                self.role.as_deref(),
                password,
            )
            .map_err(|e| {
                CatalogError::Authentication(format!("Failed to authenticate with Snowflake: {}", e))
            })?,
            SnowflakeCredentials::PrivateKey(private_key_pem) => {
                SnowflakeApi::with_certificate_auth(
                    &self.account,
                    self.compute_warehouse.as_deref(),
                    self.database.as_deref(),
                    None, // schema
                    &self.username,
                    self.role.as_deref(),
                    private_key_pem,
                )
                .map_err(|e| {
                    CatalogError::Authentication(format!(
                        "Failed to authenticate with key-pair: {}",
                        e
                    ))
                })?
            }
        };

        Ok(SnowflakeWarehouse { api })
    }

    /// Build without snowflake feature
    #[cfg(not(feature = "snowflake"))]
    pub fn build(self) -> Result<SnowflakeWarehouse, CatalogError> {
        Err(CatalogError::Config(FEATURE_HINT.to_string()))
    }
}

/// Snowflake warehouse connection
pub struct SnowflakeWarehouse {
    #[cfg(feature = "snowflake")]
    api: SnowflakeApi,

    #[cfg(not(feature = "snowflake"))]
    _private: (),
}

impl SnowflakeWarehouse {
    /// Builder pattern entry point
    pub fn builder() -> SnowflakeWarehouseBuilderInit {
        SnowflakeWarehouseBuilderInit
    }

    #[cfg(feature = "snowflake")]
    fn map_exec_error(error: impl std::fmt::Display) -> CatalogError {
        let err_str = error.to_string();
        if err_str.contains("Insufficient privileges") || err_str.contains("Permission") {
            CatalogError::Query(format!("permission denied: {}", err_str))
        } else if err_str.contains("authenticat") {
            CatalogError::Authentication(err_str)
        } else {
            CatalogError::Query(err_str)
        }
    }

    #[cfg(feature = "snowflake")]
    fn render_value(array: &dyn Array, row: usize) -> Result<String, CatalogError> {
        use arrow_schema::DataType;

        if array.is_null(row) {
            return Ok(String::new());
        }

        match array.data_type() {
            DataType::Utf8 => Ok(array.as_string::<i32>().value(row).to_string()),
            DataType::LargeUtf8 => Ok(array.as_string::<i64>().value(row).to_string()),
            DataType::Boolean => Ok(array.as_boolean().value(row).to_string()),
            DataType::Int8 => Ok(array.as_primitive::<Int8Type>().value(row).to_string()),
            DataType::Int16 => Ok(array.as_primitive::<Int16Type>().value(row).to_string()),
            DataType::Int32 => Ok(array.as_primitive::<Int32Type>().value(row).to_string()),
            DataType::Int64 => Ok(array.as_primitive::<Int64Type>().value(row).to_string()),
            DataType::Float32 => Ok(array.as_primitive::<Float32Type>().value(row).to_string()),
            DataType::Float64 => Ok(array.as_primitive::<Float64Type>().value(row).to_string()),
            DataType::Decimal128(_, _) => Ok(array
                .as_primitive::<Decimal128Type>()
                .value_as_string(row)),
            DataType::Date32 => {
                let days = array.as_primitive::<Date32Type>().value(row);
                Ok(arrow_array::temporal_conversions::date32_to_datetime(days)
                    .map(|dt| dt.date().to_string())
                    .unwrap_or_default())
            }
            DataType::Date64 => {
                let millis = array.as_primitive::<Date64Type>().value(row);
                Ok(arrow_array::temporal_conversions::date64_to_datetime(millis)
                    .map(|dt| dt.to_string())
                    .unwrap_or_default())
            }
            DataType::Timestamp(unit, _) => {
                use arrow_array::temporal_conversions as tc;
                use arrow_schema::TimeUnit;

                let dt = match unit {
                    TimeUnit::Second => {
                        tc::timestamp_s_to_datetime(
                            array.as_primitive::<TimestampSecondType>().value(row),
                        )
                    }
                    TimeUnit::Millisecond => tc::timestamp_ms_to_datetime(
                        array.as_primitive::<TimestampMillisecondType>().value(row),
                    ),
                    TimeUnit::Microsecond => tc::timestamp_us_to_datetime(
                        array.as_primitive::<TimestampMicrosecondType>().value(row),
                    ),
                    TimeUnit::Nanosecond => tc::timestamp_ns_to_datetime(
                        array.as_primitive::<TimestampNanosecondType>().value(row),
                    ),
                };
                Ok(dt.map(|d| d.to_string()).unwrap_or_default())
            }
            other => Err(CatalogError::Query(format!(
                "unsupported result column type: {}",
                other
            ))),
        }
    }

    #[cfg(feature = "snowflake")]
    fn flatten_batches(
        batches: Vec<arrow_array::RecordBatch>,
    ) -> Result<QueryOutput, CatalogError> {
        let Some(first) = batches.first() else {
            return Ok(QueryOutput::empty());
        };

        let columns: Vec<String> = first
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect();

        let mut rows = Vec::new();
        for batch in &batches {
            for row_idx in 0..batch.num_rows() {
                let mut row = Vec::with_capacity(batch.num_columns());
                for col_idx in 0..batch.num_columns() {
                    row.push(Self::render_value(
                        batch.column(col_idx).as_ref(),
                        row_idx,
                    )?);
                }
                rows.push(row);
            }
        }

        Ok(QueryOutput::new(columns, rows))
    }
}

/// Empty struct for builder pattern initialization
pub struct SnowflakeWarehouseBuilderInit;

impl SnowflakeWarehouseBuilderInit {
    pub fn with_password(
        self,
        account: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> SnowflakeWarehouseBuilder {
        SnowflakeWarehouseBuilder::with_password(account, username, password)
    }

    pub fn with_key_pair(
        self,
        account: impl Into<String>,
        username: impl Into<String>,
        private_key_pem: impl Into<String>,
    ) -> SnowflakeWarehouseBuilder {
        SnowflakeWarehouseBuilder::with_key_pair(account, username, private_key_pem)
    }
}

#[async_trait::async_trait]
impl Warehouse for SnowflakeWarehouse {
    fn name(&self) -> &'static str {
        "Snowflake"
    }

    #[cfg(feature = "snowflake")]
    async fn query(&self, sql: &str) -> Result<QueryOutput, CatalogError> {
        use snowflake_api::QueryResult;

        let result = self.api.exec(sql).await.map_err(Self::map_exec_error)?;

        match result {
            QueryResult::Arrow(batches) => Self::flatten_batches(batches),
            QueryResult::Empty => Ok(QueryOutput::empty()),
            QueryResult::Json(_) => Err(CatalogError::Query(
                "unexpected JSON result format".to_string(),
            )),
        }
    }

    #[cfg(not(feature = "snowflake"))]
    async fn query(&self, _sql: &str) -> Result<QueryOutput, CatalogError> {
        Err(CatalogError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "snowflake")]
    async fn execute(&self, sql: &str) -> Result<(), CatalogError> {
        self.api.exec(sql).await.map_err(Self::map_exec_error)?;
        Ok(())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn execute(&self, _sql: &str) -> Result<(), CatalogError> {
        Err(CatalogError::Config(FEATURE_HINT.to_string()))
    }

    #[cfg(feature = "snowflake")]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        self.api
            .exec("SELECT 1")
            .await
            .map_err(|e| CatalogError::Query(format!("connection test failed: {}", e)))?;
        Ok(())
    }

    #[cfg(not(feature = "snowflake"))]
    async fn test_connection(&self) -> Result<(), CatalogError> {
        Err(CatalogError::Config(FEATURE_HINT.to_string()))
    }
}
