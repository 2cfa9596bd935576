//! Error types for the scope gateway.
//!
//! The error taxonomy follows the call-path policy: connection failures are
//! fatal to the call and propagate; catalog reads and query execution recover
//! locally; instance lookups produce descriptive not-found results. Failures
//! that reach the tool gateway are always converted to textual, non-fatal
//! responses.

use rmcp::model::ErrorCode;
use rmcp::ErrorData;
use thiserror::Error;

/// Domain errors for the scope gateway.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error (fatal to the call path, never retried)
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Query execution error
    #[error("Query execution error: {message}")]
    QueryExecution {
        message: String,
        sql_error_code: Option<u32>,
    },

    /// Instance lookup failure
    #[error("MCP instance not found: {0}")]
    InstanceNotFound(String),

    /// Instance registry I/O or parse failure
    #[error("Registry error: {0}")]
    Registry(String),

    /// Text-completion collaborator failure
    #[error("LLM request failed: {0}")]
    Llm(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a query execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a query execution error with the SQL Server error code.
    pub fn query_error_with_code(msg: impl Into<String>, code: u32) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create an instance lookup failure.
    pub fn instance_not_found(id: impl Into<String>) -> Self {
        Self::InstanceNotFound(id.into())
    }

    /// Create a registry error.
    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    /// Create an LLM collaborator error.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error came from failing to reach or authenticate against
    /// the backing store. Such errors clear the shared connection so the next
    /// call reconnects.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Authentication(_))
    }
}

/// Map SQL Server error codes to semantic error types.
pub fn from_sql_error(code: u32, message: &str) -> ServerError {
    match code {
        // Login failures
        18456 => ServerError::auth(format!("Login failed: {}", message)),

        // Database unavailable
        4060 => ServerError::connection(format!("Cannot open database: {}", message)),

        // Invalid object / column / syntax
        208 => ServerError::query_error_with_code(format!("Invalid object: {}", message), code),
        207 => ServerError::query_error_with_code(format!("Invalid column: {}", message), code),
        102 => ServerError::query_error_with_code(format!("Syntax error: {}", message), code),

        // Permission denied still surfaces as a query error: the read paths
        // recover from it with an empty result
        229 | 230 => {
            ServerError::query_error_with_code(format!("Permission denied: {}", message), code)
        }

        _ => ServerError::query_error_with_code(message, code),
    }
}

impl From<tiberius::error::Error> for ServerError {
    fn from(e: tiberius::error::Error) -> Self {
        use tiberius::error::Error;

        match &e {
            Error::Server(token) => from_sql_error(token.code(), token.message()),
            Error::Io { .. } => ServerError::connection(format!("IO error: {}", e)),
            Error::Tls(_) => ServerError::connection(format!("TLS error: {}", e)),
            Error::Routing { host, port } => {
                ServerError::connection(format!("Server rerouted to {}:{}", host, port))
            }
            Error::Protocol(_) => ServerError::connection(format!("Protocol error: {}", e)),
            Error::Encoding(_) | Error::Conversion(_) => {
                ServerError::query_error(format!("Type conversion error: {}", e))
            }
            _ => ServerError::internal(e.to_string()),
        }
    }
}

/// Convert to an MCP protocol error.
///
/// Tool-level failures should return error text in the tool result instead of
/// using this conversion; it exists for protocol-level faults only.
impl From<ServerError> for ErrorData {
    fn from(e: ServerError) -> Self {
        let code = match &e {
            ServerError::Config(_) | ServerError::InvalidInput(_) => ErrorCode::INVALID_PARAMS,
            ServerError::InstanceNotFound(_) => ErrorCode::RESOURCE_NOT_FOUND,
            _ => ErrorCode::INTERNAL_ERROR,
        };
        ErrorData {
            code,
            message: e.to_string().into(),
            data: None,
        }
    }
}
