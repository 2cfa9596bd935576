//! Scoped schema-context rendering.
//!
//! Builds the compact textual description of the curated table set that is
//! handed to the text-completion collaborator. The output is a two-stage
//! filter: the fixed catalog bounds what can ever be described, and the
//! per-instance allow-list narrows it further.

use crate::catalog::{table_allowed, KEY_TABLES};
use crate::constants::{CONTEXT_HEADING, MAX_CONTEXT_COLUMNS};
use crate::database::{ColumnDescriptor, MetadataInspector};
use crate::error::ServerError;
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// Source of column descriptors for catalog tables.
///
/// The seam between context rendering and the live store; tests provide an
/// in-memory implementation.
pub trait ColumnSource {
    fn key_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> impl Future<Output = Result<Vec<ColumnDescriptor>, ServerError>> + Send;
}

impl ColumnSource for MetadataInspector {
    async fn key_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, ServerError> {
        self.describe_columns(schema, table).await
    }
}

/// Renders schema context for a curated, allow-list-filtered table set.
pub struct ContextBuilder<S> {
    source: Arc<S>,
}

impl<S: ColumnSource> ContextBuilder<S> {
    /// Create a builder over a column source.
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Render the schema context.
    ///
    /// `allow_list` of `None` or an empty slice includes every catalog table.
    /// Tables whose column lookup fails or returns nothing are silently
    /// omitted. Connection failures propagate.
    pub async fn build_context(
        &self,
        allow_list: Option<&[String]>,
    ) -> Result<String, ServerError> {
        let mut output = String::from(CONTEXT_HEADING);
        output.push('\n');

        for (schema, tables) in filter_catalog(allow_list) {
            output.push_str(&format!("\n### {}\n", schema));

            for table in tables {
                match self.source.key_columns(schema, table).await {
                    Ok(columns) if !columns.is_empty() => {
                        output.push_str(&render_table_line(schema, table, &columns));
                        output.push('\n');
                    }
                    Ok(_) => {}
                    Err(e) if e.is_connection_error() => return Err(e),
                    Err(e) => {
                        warn!("Skipping {}.{} in context: {}", schema, table, e);
                    }
                }
            }
        }

        Ok(output)
    }
}

/// Apply the allow-list to the curated catalog, keeping catalog order.
/// Schemas that retain no tables are dropped.
pub fn filter_catalog(
    allow_list: Option<&[String]>,
) -> Vec<(&'static str, Vec<&'static str>)> {
    let allow_list = allow_list.unwrap_or(&[]);

    KEY_TABLES
        .iter()
        .filter_map(|(schema, tables)| {
            let retained: Vec<&'static str> = tables
                .iter()
                .copied()
                .filter(|table| table_allowed(schema, table, allow_list))
                .collect();
            (!retained.is_empty()).then_some((*schema, retained))
        })
        .collect()
}

/// Render one table line: `schema.table(col1:type1, col2:type2, ...)`.
/// At most the first 10 columns are kept, to bound prompt size.
pub fn render_table_line(schema: &str, table: &str, columns: &[ColumnDescriptor]) -> String {
    let column_list: Vec<String> = columns
        .iter()
        .take(MAX_CONTEXT_COLUMNS)
        .map(|column| format!("{}:{}", column.name, column.data_type))
        .collect();

    format!("{}.{}({})", schema, table, column_list.join(", "))
}
