//! The three gateway tools.
//!
//! Failures never cross the tool boundary as protocol faults. Every error is
//! converted to a short readable message in the tool result, with the full
//! diagnostic logged server-side.

use crate::constants::{CONTEXT_HEADING, SQL_SYSTEM_PROMPT};
use crate::error::ServerError;
use crate::server::ScopeMcpServer;
use axum::http::request::Parts;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{schemars, tool, tool_router, ErrorData};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

/// Parameters for SQL generation from a natural-language request.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GenerateSqlQueryParams {
    /// Natural-language description of the data the caller wants.
    pub query: String,
}

/// Parameters for verbatim query execution.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExecuteQueryParams {
    /// SQL query text, executed exactly as given.
    pub query: String,
}

#[tool_router(router = tool_router, vis = "pub")]
impl ScopeMcpServer {
    #[tool(
        description = "Generate a SQL query from a natural-language request, using the full database schema context."
    )]
    async fn generate_sql_query(
        &self,
        Parameters(params): Parameters<GenerateSqlQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Generating SQL for request: {}", params.query);

        let context = match self.context.build_context(None).await {
            Ok(context) => context,
            Err(e) => {
                error!("Failed to build schema context: {}", e);
                return Ok(error_text(&e));
            }
        };

        let user_prompt = format!(
            "User request: {}\n\nDatabase context: {}",
            params.query, context
        );

        match self.llm.complete(SQL_SYSTEM_PROMPT, &user_prompt).await {
            Ok(sql) => Ok(CallToolResult::success(vec![Content::json(
                json!({ "sql_query": sql }),
            )?])),
            Err(e) => {
                error!("SQL generation failed: {}", e);
                Ok(error_text(&e))
            }
        }
    }

    #[tool(
        description = "Describe the database tables visible to the requesting instance, as a compact schema listing."
    )]
    async fn get_database_context(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let instance = match context.extensions.get::<Parts>() {
            Some(parts) => self.resolver.resolve_parts(parts),
            None => Err(ServerError::invalid_input(
                "No instance_id found in request",
            )),
        };

        let instance = match instance {
            Ok(instance) => instance,
            Err(e) => {
                error!("Instance resolution failed: {}", e);
                return Ok(CallToolResult::success(vec![Content::text(
                    resolution_failure_message(&e),
                )]));
            }
        };

        info!("Building schema context for instance {}", instance.id);

        // An instance record with no allow-list at all exposes nothing.
        let rendered = match &instance.allowed_tables {
            None => Ok(format!("{}\n", CONTEXT_HEADING)),
            Some(allowed) => self.context.build_context(Some(allowed.as_slice())).await,
        };

        match rendered {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => {
                error!("Failed to build schema context: {}", e);
                Ok(error_text(&e))
            }
        }
    }

    #[tool(description = "Execute a SQL query verbatim and return the rows as JSON records.")]
    async fn execute_query(
        &self,
        Parameters(params): Parameters<ExecuteQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        match self.executor.execute(&params.query).await {
            Ok(records) => Ok(CallToolResult::success(vec![Content::json(
                json!({ "data": records }),
            )?])),
            Err(e) => {
                error!("Query execution failed: {}", e);
                Ok(CallToolResult::success(vec![Content::json(
                    json!({ "error": e.to_string() }),
                )?]))
            }
        }
    }
}

/// Short readable error body for tool results.
fn error_text(e: &ServerError) -> CallToolResult {
    CallToolResult::success(vec![Content::text(format!("Error: {}", e))])
}

/// Readable message for an instance-resolution failure.
///
/// A request carrying no id and a request addressing an unknown instance get
/// their fixed messages; anything else (an unreadable registry store, say)
/// keeps its own description rather than being misreported as a missing id.
fn resolution_failure_message(e: &ServerError) -> String {
    match e {
        ServerError::InvalidInput(_) => "Error: No instance_id found in request".to_string(),
        ServerError::InstanceNotFound(_) => "Error: MCP instance not found".to_string(),
        other => format!("Error: {}", other),
    }
}
