//! MCP server wiring for the scope gateway.

use crate::config::Config;
use crate::context::ContextBuilder;
use crate::database::{ConnectionManager, MetadataInspector, QueryExecutor};
use crate::llm::LlmClient;
use crate::registry::InstanceRegistry;
use crate::resolver::InstanceResolver;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};
use std::sync::Arc;

const SERVER_INSTRUCTIONS: &str = "MSSQL scope gateway. Exposes named, access-scoped views (instances) of a SQL Server database.

Tools:
- get_database_context: describe the tables visible to the requesting instance.
- generate_sql_query: turn a natural-language request into a SQL query using the full schema context.
- execute_query: run a SQL query verbatim and return the rows as JSON records.

Over HTTP, address an instance by path (/llm/mcp/{instance_id}), the instance_id query parameter, or the X-MCP-Instance-ID header.";

/// The MCP-facing gateway server.
///
/// All state is behind `Arc` so the streamable HTTP transport can clone one
/// server per session while every session shares the single database
/// connection.
#[derive(Clone)]
pub struct ScopeMcpServer {
    pub(crate) connections: Arc<ConnectionManager>,
    pub(crate) executor: Arc<QueryExecutor>,
    pub(crate) context: Arc<ContextBuilder<MetadataInspector>>,
    pub(crate) resolver: Arc<InstanceResolver>,
    pub(crate) llm: Arc<LlmClient>,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl ScopeMcpServer {
    /// Wire up the gateway. No database connection is opened here; the shared
    /// connection is established lazily on the first query.
    pub fn new(config: Config) -> Self {
        let connections = Arc::new(ConnectionManager::new(config.database.clone()));
        let executor = Arc::new(QueryExecutor::new(connections.clone()));
        let inspector = Arc::new(MetadataInspector::new(executor.clone()));
        let context = Arc::new(ContextBuilder::new(inspector));
        let registry = Arc::new(InstanceRegistry::new(config.registry.path.clone()));
        let resolver = Arc::new(InstanceResolver::new(registry));
        let llm = Arc::new(LlmClient::new(config.llm.clone()));

        Self {
            connections,
            executor,
            context,
            resolver,
            llm,
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for ScopeMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
