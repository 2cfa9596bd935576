//! Database connectivity, query execution, and metadata inspection.

mod connection;
pub mod metadata;
mod query;
pub mod types;

pub use connection::ConnectionManager;
pub use metadata::{ColumnDescriptor, MetadataInspector, TableRef};
pub use query::{build_safe_select, QueryExecutor, Record};
pub use types::{SqlValue, TypeMapper};
