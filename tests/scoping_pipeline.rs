//! End-to-end tests for the catalog / allow-list / context rendering
//! pipeline, using an in-memory column source.

use mssql_scope_mcp::catalog::KEY_TABLES;
use mssql_scope_mcp::context::{ColumnSource, ContextBuilder};
use mssql_scope_mcp::database::ColumnDescriptor;
use mssql_scope_mcp::ServerError;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Default)]
struct FakeColumnSource {
    columns: HashMap<(String, String), Vec<ColumnDescriptor>>,
    failing: HashSet<(String, String)>,
    unreachable: bool,
}

impl FakeColumnSource {
    fn with_table(mut self, schema: &str, table: &str, columns: &[(&str, &str)]) -> Self {
        let descriptors = columns
            .iter()
            .map(|(name, data_type)| ColumnDescriptor {
                name: name.to_string(),
                data_type: data_type.to_string(),
                nullable: true,
                max_length: None,
                numeric_precision: None,
                numeric_scale: None,
                default_expr: None,
            })
            .collect();
        self.columns
            .insert((schema.to_string(), table.to_string()), descriptors);
        self
    }

    fn with_failing_table(mut self, schema: &str, table: &str) -> Self {
        self.failing
            .insert((schema.to_string(), table.to_string()));
        self
    }

    /// Register two stock columns for every catalog table.
    fn covering_catalog() -> Self {
        let mut source = Self::default();
        for (schema, tables) in KEY_TABLES {
            for table in *tables {
                source = source.with_table(
                    schema,
                    table,
                    &[(&format!("{}ID", table), "int"), ("Name", "nvarchar")],
                );
            }
        }
        source
    }
}

impl ColumnSource for FakeColumnSource {
    async fn key_columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, ServerError> {
        if self.unreachable {
            return Err(ServerError::connection("store unreachable"));
        }

        let key = (schema.to_string(), table.to_string());
        if self.failing.contains(&key) {
            return Err(ServerError::query_error("synthetic catalog failure"));
        }

        Ok(self.columns.get(&key).cloned().unwrap_or_default())
    }
}

fn builder(source: FakeColumnSource) -> ContextBuilder<FakeColumnSource> {
    ContextBuilder::new(Arc::new(source))
}

fn allow(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn unscoped_context_covers_the_whole_catalog() {
    let context = builder(FakeColumnSource::covering_catalog())
        .build_context(None)
        .await
        .unwrap();

    assert!(context.starts_with("## Key Tables\n"));
    for (schema, tables) in KEY_TABLES {
        assert!(context.contains(&format!("### {}", schema)));
        for table in *tables {
            assert!(
                context.contains(&format!("{}.{}(", schema, table)),
                "{}.{} missing from context",
                schema,
                table
            );
        }
    }
}

#[tokio::test]
async fn schema_entry_scopes_to_one_schema() {
    let context = builder(FakeColumnSource::covering_catalog())
        .build_context(Some(allow(&["sales"]).as_slice()))
        .await
        .unwrap();

    assert!(context.contains("### Sales"));
    assert!(context.contains("Sales.Customers("));
    assert!(!context.contains("### Purchasing"));
    assert!(!context.contains("### Warehouse"));
    assert!(!context.contains("### Application"));
}

#[tokio::test]
async fn disjoint_schema_entry_omits_other_sections_entirely() {
    let context = builder(FakeColumnSource::covering_catalog())
        .build_context(Some(allow(&["purchasing"]).as_slice()))
        .await
        .unwrap();

    assert!(!context.contains("### Sales"));
    assert!(context.contains("Purchasing.Suppliers("));
}

#[tokio::test]
async fn qualified_and_bare_entries_combine() {
    let context = builder(FakeColumnSource::covering_catalog())
        .build_context(Some(allow(&["warehouse.colors", "Orders"]).as_slice()))
        .await
        .unwrap();

    assert!(context.contains("Sales.Orders("));
    assert!(context.contains("Warehouse.Colors("));
    assert!(!context.contains("Sales.Customers("));
    assert!(!context.contains("Warehouse.StockItems("));
}

#[tokio::test]
async fn table_lines_cap_at_ten_columns() {
    let many: Vec<(String, String)> = (0..15)
        .map(|i| (format!("Col{}", i), "int".to_string()))
        .collect();
    let many_refs: Vec<(&str, &str)> = many
        .iter()
        .map(|(n, t)| (n.as_str(), t.as_str()))
        .collect();

    let source = FakeColumnSource::default().with_table("Sales", "Orders", &many_refs);
    let context = builder(source)
        .build_context(Some(allow(&["sales.orders"]).as_slice()))
        .await
        .unwrap();

    let line = context
        .lines()
        .find(|line| line.starts_with("Sales.Orders("))
        .expect("table line rendered");
    assert!(line.contains("Col9:int"));
    assert!(!line.contains("Col10:int"));
}

#[tokio::test]
async fn failing_and_empty_tables_are_silently_omitted() {
    let source = FakeColumnSource::default()
        .with_table("Sales", "Customers", &[("CustomerID", "int")])
        .with_failing_table("Sales", "Orders");

    let context = builder(source)
        .build_context(Some(allow(&["sales"]).as_slice()))
        .await
        .unwrap();

    assert!(context.contains("Sales.Customers(CustomerID:int)"));
    assert!(!context.contains("Sales.Orders("));
    // OrderLines has no registered columns and is likewise absent
    assert!(!context.contains("Sales.OrderLines("));
}

#[tokio::test]
async fn connection_failure_propagates() {
    let source = FakeColumnSource {
        unreachable: true,
        ..FakeColumnSource::default()
    };

    let err = builder(source).build_context(None).await.unwrap_err();
    assert!(err.is_connection_error());
}
