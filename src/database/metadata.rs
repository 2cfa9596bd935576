//! Schema introspection against INFORMATION_SCHEMA catalog views.
//!
//! All operations are pure reads. Catalog failures are recovered locally:
//! the caller receives an empty result plus a logged diagnostic. The one
//! exception is a failure to establish the shared connection, which is fatal
//! to the call path and propagates.

use crate::database::{QueryExecutor, Record};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// A `(schema, table)` pair from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

/// Column metadata in ordinal order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub max_length: Option<i64>,
    pub numeric_precision: Option<i64>,
    pub numeric_scale: Option<i64>,
    pub default_expr: Option<String>,
}

/// Metadata inspector over the live store's catalog views.
pub struct MetadataInspector {
    executor: Arc<QueryExecutor>,
}

impl MetadataInspector {
    /// Create a new inspector sharing the gateway's query executor.
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Distinct schema names in ascending lexical order.
    pub async fn list_schemas(&self) -> Result<Vec<String>, ServerError> {
        let records = self
            .recover(
                "SELECT DISTINCT TABLE_SCHEMA \
                 FROM INFORMATION_SCHEMA.TABLES \
                 ORDER BY TABLE_SCHEMA",
                "list schemas",
            )
            .await?;

        Ok(records
            .iter()
            .filter_map(|record| as_string(record, "TABLE_SCHEMA"))
            .collect())
    }

    /// Base tables (not views), optionally restricted to one schema, ordered
    /// `(schema, table)` ascending.
    pub async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<TableRef>, ServerError> {
        let query = match schema {
            Some(schema) => format!(
                "SELECT TABLE_SCHEMA, TABLE_NAME \
                 FROM INFORMATION_SCHEMA.TABLES \
                 WHERE TABLE_SCHEMA = '{}' AND TABLE_TYPE = 'BASE TABLE' \
                 ORDER BY TABLE_SCHEMA, TABLE_NAME",
                schema.replace('\'', "''")
            ),
            None => "SELECT TABLE_SCHEMA, TABLE_NAME \
                     FROM INFORMATION_SCHEMA.TABLES \
                     WHERE TABLE_TYPE = 'BASE TABLE' \
                     ORDER BY TABLE_SCHEMA, TABLE_NAME"
                .to_string(),
        };

        let records = self.recover(&query, "list tables").await?;

        Ok(records
            .iter()
            .filter_map(|record| {
                Some(TableRef {
                    schema: as_string(record, "TABLE_SCHEMA")?,
                    table: as_string(record, "TABLE_NAME")?,
                })
            })
            .collect())
    }

    /// Column descriptors for one table, ordered by ordinal position.
    pub async fn describe_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, ServerError> {
        let query = format!(
            "SELECT \
                COLUMN_NAME, \
                DATA_TYPE, \
                IS_NULLABLE, \
                CHARACTER_MAXIMUM_LENGTH, \
                NUMERIC_PRECISION, \
                NUMERIC_SCALE, \
                COLUMN_DEFAULT \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' \
             ORDER BY ORDINAL_POSITION",
            schema.replace('\'', "''"),
            table.replace('\'', "''")
        );

        let records = self.recover(&query, "describe columns").await?;

        Ok(records
            .iter()
            .filter_map(|record| {
                Some(ColumnDescriptor {
                    name: as_string(record, "COLUMN_NAME")?,
                    data_type: as_string(record, "DATA_TYPE")?,
                    nullable: as_string(record, "IS_NULLABLE")
                        .map(|v| v.eq_ignore_ascii_case("YES"))
                        .unwrap_or(true),
                    max_length: as_i64(record, "CHARACTER_MAXIMUM_LENGTH"),
                    numeric_precision: as_i64(record, "NUMERIC_PRECISION"),
                    numeric_scale: as_i64(record, "NUMERIC_SCALE"),
                    default_expr: as_string(record, "COLUMN_DEFAULT"),
                })
            })
            .collect())
    }

    /// Sample up to `limit` rows through the safe-read path.
    pub async fn sample_rows(&self, schema: &str, table: &str, limit: usize) -> Vec<Record> {
        self.executor.read_table(schema, table, limit).await
    }

    /// Run a catalog query, recovering non-connection failures to an empty
    /// result with a logged diagnostic.
    async fn recover(&self, query: &str, operation: &str) -> Result<Vec<Record>, ServerError> {
        match self.executor.execute(query).await {
            Ok(records) => Ok(records),
            Err(e) if e.is_connection_error() => Err(e),
            Err(e) => {
                warn!("Catalog read failed ({}): {}", operation, e);
                Ok(Vec::new())
            }
        }
    }
}

fn as_string(record: &Record, column: &str) -> Option<String> {
    record.get(column)?.as_str().map(str::to_string)
}

fn as_i64(record: &Record, column: &str) -> Option<i64> {
    record.get(column)?.as_i64()
}
