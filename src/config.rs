//! Configuration management for the scope gateway.
//!
//! Configuration is loaded from environment variables following the 12-factor
//! app pattern.

use crate::constants::{
    DEFAULT_APPLICATION_NAME, DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT, DEFAULT_LLM_BASE_URL,
    DEFAULT_LLM_MODEL, DEFAULT_MSSQL_PORT, DEFAULT_REGISTRY_PATH,
};
use crate::error::ServerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Transport configuration
    pub transport: TransportConfig,

    /// Instance registry configuration
    pub registry: RegistryConfig,

    /// Text-completion collaborator configuration
    pub llm: LlmConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQL Server hostname or IP address
    pub host: String,

    /// SQL Server port (default: 1433)
    pub port: u16,

    /// Database name
    pub database: Option<String>,

    /// SQL Server username
    pub username: String,

    /// SQL Server password
    pub password: String,

    /// Enable TLS encryption
    pub encrypt: bool,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Application name sent to SQL Server
    pub application_name: String,
}

/// Transport selection and HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Transport type: stdio (default) or http.
    pub transport_type: TransportType,

    /// HTTP bind host.
    pub http_host: String,

    /// HTTP bind port.
    pub http_port: u16,

    /// Enable permissive CORS on the HTTP transport.
    pub enable_cors: bool,
}

/// Available transport types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportType {
    /// Standard input/output transport (default).
    Stdio,

    /// Streamable HTTP transport.
    Http,
}

/// Instance registry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Path of the flat JSON store holding instance records.
    pub path: PathBuf,
}

/// Text-completion collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Chat-completions endpoint base URL.
    pub base_url: String,

    /// API key sent as a bearer token.
    pub api_key: String,

    /// Model identifier.
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `MSSQL_HOST`: SQL Server hostname
    /// - `MSSQL_USER`: SQL Server username
    /// - `MSSQL_PASSWORD`: SQL Server password
    ///
    /// ## Optional
    /// - `MSSQL_PORT`: Port number (default: 1433)
    /// - `MSSQL_DATABASE`: Database name
    /// - `MSSQL_ENCRYPT`: Enable TLS (default: true)
    /// - `MSSQL_TRUST_CERT`: Trust server certificate (default: false)
    /// - `GATEWAY_TRANSPORT`: stdio or http (default: stdio)
    /// - `GATEWAY_HTTP_HOST` / `GATEWAY_HTTP_PORT`: HTTP bind address
    /// - `GATEWAY_CORS`: Permissive CORS on HTTP (default: true)
    /// - `INSTANCE_REGISTRY_PATH`: Instance store path
    /// - `LLM_BASE_URL` / `LLM_API_KEY` / `LLM_MODEL`: SQL generation backend
    pub fn from_env() -> Result<Self, ServerError> {
        let host = std::env::var("MSSQL_HOST")
            .map_err(|_| ServerError::config("MSSQL_HOST environment variable is required"))?;

        let username = std::env::var("MSSQL_USER")
            .map_err(|_| ServerError::config("MSSQL_USER environment variable is required"))?;

        let password = std::env::var("MSSQL_PASSWORD")
            .map_err(|_| ServerError::config("MSSQL_PASSWORD environment variable is required"))?;

        let port = std::env::var("MSSQL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_MSSQL_PORT);

        let database = std::env::var("MSSQL_DATABASE").ok();

        let encrypt = std::env::var("MSSQL_ENCRYPT")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        let trust_server_certificate = std::env::var("MSSQL_TRUST_CERT")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        let application_name = std::env::var("MSSQL_APP_NAME")
            .unwrap_or_else(|_| DEFAULT_APPLICATION_NAME.to_string());

        let transport_type = match std::env::var("GATEWAY_TRANSPORT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "http" | "sse" | "web" => TransportType::Http,
            _ => TransportType::Stdio,
        };

        let http_host =
            std::env::var("GATEWAY_HTTP_HOST").unwrap_or_else(|_| DEFAULT_HTTP_HOST.to_string());

        let http_port = std::env::var("GATEWAY_HTTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);

        let enable_cors = std::env::var("GATEWAY_CORS")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        let registry_path = std::env::var("INSTANCE_REGISTRY_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_REGISTRY_PATH));

        let llm_base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string());
        let llm_api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
        let llm_model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string());

        Ok(Config {
            database: DatabaseConfig {
                host,
                port,
                database,
                username,
                password,
                encrypt,
                trust_server_certificate,
                application_name,
            },
            transport: TransportConfig {
                transport_type,
                http_host,
                http_port,
                enable_cors,
            },
            registry: RegistryConfig {
                path: registry_path,
            },
            llm: LlmConfig {
                base_url: llm_base_url,
                api_key: llm_api_key,
                model: llm_model,
            },
        })
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            transport_type: TransportType::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            enable_cors: true,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_LLM_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.transport_type, TransportType::Stdio);
        assert_eq!(config.http_port, DEFAULT_HTTP_PORT);
        assert!(config.enable_cors);
    }

    #[test]
    fn test_llm_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, DEFAULT_LLM_MODEL);
        assert!(config.api_key.is_empty());
    }
}
