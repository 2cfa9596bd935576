//! Transport runners: stdio and streamable HTTP.

use crate::config::Config;
use crate::constants::MCP_HTTP_PATH;
use crate::error::ServerError;
use crate::server::ScopeMcpServer;
use axum::routing::get;
use axum::Router;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Serve over stdio. Blocks until the peer disconnects.
///
/// Stdout carries JSON-RPC exclusively; all logging goes to stderr.
pub async fn serve_stdio(server: ScopeMcpServer) -> Result<(), ServerError> {
    info!("Starting stdio transport");

    let connections = server.connections.clone();
    let (stdin, stdout) = stdio();
    let running = serve_server(server, (stdin, stdout))
        .await
        .map_err(|e| ServerError::internal(format!("Failed to start stdio transport: {}", e)))?;

    let result = running
        .waiting()
        .await
        .map_err(|e| ServerError::internal(format!("Stdio transport failed: {}", e)));

    connections.close().await;
    result.map(|_| ())
}

/// Serve over streamable HTTP, mounted at `/llm/mcp`, with a `/health`
/// route. Blocks until the listener fails.
pub async fn serve_http(server: ScopeMcpServer, config: &Config) -> Result<(), ServerError> {
    let bind_addr = format!(
        "{}:{}",
        config.transport.http_host, config.transport.http_port
    );

    let service: StreamableHttpService<ScopeMcpServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(server.clone()),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig::default(),
        );

    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service(MCP_HTTP_PATH, service)
        .layer(TraceLayer::new_for_http());

    if config.transport.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }

    info!("Starting HTTP transport on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| ServerError::internal(format!("Failed to bind {}: {}", bind_addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::internal(format!("HTTP transport failed: {}", e)))?;

    Ok(())
}
