//! Query execution and result serialization.
//!
//! Caller-supplied query text is executed as-is against the live connection.
//! There is no validation, no parameterization, and no injection defense:
//! the gateway is deliberately open, and scoping happens at the context
//! rendering layer instead.

use crate::constants::{LOG_QUERY_TRUNCATE_LENGTH, NON_SERIALIZABLE_TYPES};
use crate::database::types::TypeMapper;
use crate::database::ConnectionManager;
use crate::error::ServerError;
use serde_json::Value;
use std::sync::Arc;
use tiberius::Row;
use tracing::{debug, warn};

/// One result row: column name to value, in result-set column order.
///
/// `serde_json`'s `preserve_order` feature keeps the insertion order, so the
/// serialized record lists columns exactly as the store returned them.
pub type Record = serde_json::Map<String, Value>;

/// Executor for caller-supplied queries and the safe table-read path.
pub struct QueryExecutor {
    connections: Arc<ConnectionManager>,
}

impl QueryExecutor {
    /// Create a new query executor over the shared connection.
    pub fn new(connections: Arc<ConnectionManager>) -> Self {
        Self { connections }
    }

    /// Execute arbitrary query text and convert the first result set into
    /// records.
    ///
    /// Blank query text and empty result sets yield an empty sequence, never
    /// an error.
    pub async fn execute(&self, query: &str) -> Result<Vec<Record>, ServerError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        debug!("Executing query: {}", truncate_for_log(query, LOG_QUERY_TRUNCATE_LENGTH));

        let rows = self.connections.run(query).await?;
        Ok(rows_to_records(&rows))
    }

    /// Read up to `limit` rows from a table, casting non-serializable column
    /// types (geography, geometry, hierarchyid, sql_variant) to NVARCHAR(MAX)
    /// so the result stays representable as JSON.
    ///
    /// Falls back to an unqualified `SELECT TOP {limit} *` when column
    /// introspection fails. Execution failures are recovered locally: the
    /// caller gets an empty sequence and a logged diagnostic.
    pub async fn read_table(&self, schema: &str, table: &str, limit: usize) -> Vec<Record> {
        let query = match self.column_types(schema, table).await {
            Ok(columns) if !columns.is_empty() => {
                build_safe_select(schema, table, limit, &columns)
            }
            Ok(_) => {
                warn!("Could not get column info for {}.{}", schema, table);
                format!("SELECT TOP {} * FROM [{}].[{}]", limit, schema, table)
            }
            Err(e) => {
                warn!(
                    "Column introspection failed for {}.{}: {}",
                    schema, table, e
                );
                format!("SELECT TOP {} * FROM [{}].[{}]", limit, schema, table)
            }
        };

        match self.execute(&query).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Error reading table {}.{}: {}", schema, table, e);
                Vec::new()
            }
        }
    }

    /// Fetch `(column name, data type)` pairs in ordinal order.
    async fn column_types(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<(String, String)>, ServerError> {
        let query = format!(
            "SELECT COLUMN_NAME, DATA_TYPE \
             FROM INFORMATION_SCHEMA.COLUMNS \
             WHERE TABLE_SCHEMA = '{}' AND TABLE_NAME = '{}' \
             ORDER BY ORDINAL_POSITION",
            schema.replace('\'', "''"),
            table.replace('\'', "''")
        );

        let records = self.execute(&query).await?;
        Ok(records
            .iter()
            .filter_map(|record| {
                let name = record.get("COLUMN_NAME")?.as_str()?.to_string();
                let data_type = record.get("DATA_TYPE")?.as_str()?.to_string();
                Some((name, data_type))
            })
            .collect())
    }
}

/// Build a `SELECT TOP {limit}` statement that casts non-serializable column
/// types to NVARCHAR(MAX), re-aliased to their original names.
pub fn build_safe_select(
    schema: &str,
    table: &str,
    limit: usize,
    columns: &[(String, String)],
) -> String {
    let select_list: Vec<String> = columns
        .iter()
        .map(|(name, data_type)| {
            if NON_SERIALIZABLE_TYPES.contains(&data_type.to_lowercase().as_str()) {
                format!("CONVERT(NVARCHAR(MAX), [{}]) AS [{}]", name, name)
            } else {
                format!("[{}]", name)
            }
        })
        .collect();

    format!(
        "SELECT TOP {} {} FROM [{}].[{}]",
        limit,
        select_list.join(", "),
        schema,
        table
    )
}

/// Convert result rows into ordered records.
fn rows_to_records(rows: &[Row]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut record = Record::new();
            for (idx, column) in row.columns().iter().enumerate() {
                let value = TypeMapper::extract_column(row, idx);
                record.insert(column.name().to_string(), value.to_json());
            }
            record
        })
        .collect()
}

/// Truncate a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let cut = s
            .char_indices()
            .take_while(|(i, _)| *i <= max_len)
            .last()
            .map(|(i, _)| i)
            .unwrap_or(0);
        format!("{}...", &s[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    fn offline_executor() -> (Arc<ConnectionManager>, QueryExecutor) {
        let manager = Arc::new(ConnectionManager::new(DatabaseConfig {
            host: "localhost".to_string(),
            port: 1433,
            database: Some("master".to_string()),
            username: "sa".to_string(),
            password: "test".to_string(),
            encrypt: false,
            trust_server_certificate: true,
            application_name: "test".to_string(),
        }));
        let executor = QueryExecutor::new(manager.clone());
        (manager, executor)
    }

    #[tokio::test]
    async fn test_blank_query_yields_empty_without_connecting() {
        let (manager, executor) = offline_executor();

        assert!(executor.execute("").await.unwrap().is_empty());
        assert!(executor.execute("   ").await.unwrap().is_empty());
        assert!(executor.execute("\n\t").await.unwrap().is_empty());
        assert!(!manager.is_connected().await);
    }

    fn cols(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, t)| (n.to_string(), t.to_string()))
            .collect()
    }

    #[test]
    fn test_safe_select_plain_columns() {
        let query = build_safe_select(
            "Sales",
            "Customers",
            100,
            &cols(&[("CustomerID", "int"), ("CustomerName", "nvarchar")]),
        );
        assert_eq!(
            query,
            "SELECT TOP 100 [CustomerID], [CustomerName] FROM [Sales].[Customers]"
        );
    }

    #[test]
    fn test_safe_select_casts_geography() {
        let query = build_safe_select(
            "Application",
            "Cities",
            5,
            &cols(&[("CityID", "int"), ("Location", "geography")]),
        );
        assert!(query.contains("CONVERT(NVARCHAR(MAX), [Location]) AS [Location]"));
        assert!(query.contains("[CityID],"));
    }

    #[test]
    fn test_safe_select_casts_all_exotic_types() {
        for exotic in ["geometry", "hierarchyid", "sql_variant", "GEOGRAPHY"] {
            let query =
                build_safe_select("dbo", "T", 1, &cols(&[("Payload", exotic)]));
            assert!(
                query.contains("CONVERT(NVARCHAR(MAX), [Payload]) AS [Payload]"),
                "{} should be cast",
                exotic
            );
        }
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert!(truncate_for_log(&"x".repeat(300), 200).ends_with("..."));
    }
}
