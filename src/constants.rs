//! Centralized constants for the scope gateway.
//!
//! This module contains the magic numbers and default values used throughout
//! the codebase, making them easy to find, understand, and modify.

// =============================================================================
// Database Defaults
// =============================================================================

/// Default SQL Server port.
pub const DEFAULT_MSSQL_PORT: u16 = 1433;

/// Application name reported to SQL Server.
pub const DEFAULT_APPLICATION_NAME: &str = "mssql-scope-mcp";

// =============================================================================
// Read Path Constants
// =============================================================================

/// Default row cap for the safe table-read path.
pub const DEFAULT_READ_LIMIT: usize = 100;

/// Default row cap for table sampling.
pub const DEFAULT_SAMPLE_ROWS: usize = 5;

/// Column types that cannot be serialized as-is and must be cast to
/// NVARCHAR(MAX) before selection.
pub const NON_SERIALIZABLE_TYPES: [&str; 4] =
    ["geography", "geometry", "hierarchyid", "sql_variant"];

// =============================================================================
// Context Rendering Constants
// =============================================================================

/// Maximum number of columns rendered per table in the schema context.
/// Truncation is intentional, to bound prompt size.
pub const MAX_CONTEXT_COLUMNS: usize = 10;

/// Heading for the rendered schema context.
pub const CONTEXT_HEADING: &str = "## Key Tables";

// =============================================================================
// Instance Resolution Constants
// =============================================================================

/// Header carrying the instance identifier.
pub const INSTANCE_ID_HEADER: &str = "X-MCP-Instance-ID";

/// Primary query parameter carrying the instance identifier.
pub const INSTANCE_ID_PARAM: &str = "instance_id";

/// Alternate query parameter accepted for the instance identifier.
pub const INSTANCE_ID_PARAM_ALIAS: &str = "id";

/// Path segment that precedes the instance identifier.
pub const INSTANCE_PATH_MARKER: &str = "mcp";

// =============================================================================
// HTTP Transport Defaults
// =============================================================================

/// Default HTTP bind host.
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP bind port.
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Mount path for the MCP endpoint over HTTP.
pub const MCP_HTTP_PATH: &str = "/llm/mcp";

// =============================================================================
// Registry Defaults
// =============================================================================

/// Default path of the flat instance registry store.
pub const DEFAULT_REGISTRY_PATH: &str = "data/instances.json";

// =============================================================================
// LLM Defaults
// =============================================================================

/// Default chat-completions endpoint base URL.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model used for SQL generation.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

/// System prompt sent with every SQL generation request.
pub const SQL_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates SQL queries based on the user's request.";

// =============================================================================
// Logging Constants
// =============================================================================

/// Truncation length for query logging.
pub const LOG_QUERY_TRUNCATE_LENGTH: usize = 200;
