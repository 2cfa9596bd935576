//! Binary entry point for the scope gateway.

use anyhow::Result;
use mssql_scope_mcp::config::TransportType;
use mssql_scope_mcp::{transport, Config, ScopeMcpServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize logging to stderr. Stdout is reserved for JSON-RPC when the
/// stdio transport is active.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,mssql_scope_mcp=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env()?;

    info!(
        "Starting mssql-scope-mcp v{} (store {}:{})",
        env!("CARGO_PKG_VERSION"),
        config.database.host,
        config.database.port
    );

    let transport_type = config.transport.transport_type;
    let server = ScopeMcpServer::new(config.clone());

    match transport_type {
        TransportType::Stdio => transport::serve_stdio(server).await?,
        TransportType::Http => transport::serve_http(server, &config).await?,
    }

    Ok(())
}
