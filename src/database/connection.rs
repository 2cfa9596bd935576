//! Single shared connection to SQL Server with reconnect-on-demand.
//!
//! The gateway holds one live session per process. Every consumer goes
//! through [`ConnectionManager::run`], which connects lazily on first use and
//! reconnects whenever a previous call left the slot empty. There is no
//! pooling, no retry, and no timeout: a connection failure is fatal to the
//! call that observed it.

use crate::config::DatabaseConfig;
use crate::error::ServerError;
use tiberius::{AuthMethod, Client, Config as TdsConfig, EncryptionLevel, Row};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

/// The live TDS client type.
type SqlClient = Client<Compat<TcpStream>>;

/// Owner of the process-wide database session.
///
/// Concurrent calls serialize on the inner mutex, so the single session is
/// never used by two queries at once.
pub struct ConnectionManager {
    config: DatabaseConfig,
    client: Mutex<Option<SqlClient>>,
}

impl ConnectionManager {
    /// Create a manager. No connection is made until the first query runs.
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            client: Mutex::new(None),
        }
    }

    fn tds_config(&self) -> TdsConfig {
        let mut config = TdsConfig::new();
        config.host(&self.config.host);
        config.port(self.config.port);
        if let Some(database) = &self.config.database {
            config.database(database);
        }
        config.authentication(AuthMethod::sql_server(
            &self.config.username,
            &self.config.password,
        ));
        config.application_name(&self.config.application_name);
        if self.config.encrypt {
            config.encryption(EncryptionLevel::Required);
        } else {
            config.encryption(EncryptionLevel::NotSupported);
        }
        if self.config.trust_server_certificate {
            config.trust_cert();
        }
        config
    }

    /// Establish a new session to the configured server.
    async fn open(&self) -> Result<SqlClient, ServerError> {
        info!(
            "Connecting to {}:{} (database: {})",
            self.config.host,
            self.config.port,
            self.config.database.as_deref().unwrap_or("<default>")
        );

        let config = self.tds_config();
        let tcp = TcpStream::connect(config.get_addr()).await.map_err(|e| {
            ServerError::connection_with_source(
                format!(
                    "Failed to reach {}:{}",
                    self.config.host, self.config.port
                ),
                e,
            )
        })?;
        tcp.set_nodelay(true)
            .map_err(|e| ServerError::connection_with_source("Failed to set TCP_NODELAY", e))?;

        let client = Client::connect(config, tcp.compat_write()).await?;
        info!("Connected to the database");
        Ok(client)
    }

    /// Execute `sql` on the shared session and collect the first result set.
    ///
    /// Connects first if no live session exists. A connection-class failure
    /// clears the slot so the next call reconnects, then propagates.
    pub async fn run(&self, sql: &str) -> Result<Vec<Row>, ServerError> {
        let mut slot = self.client.lock().await;
        if slot.is_none() {
            *slot = Some(self.open().await?);
        }

        let result = match slot.as_mut() {
            Some(client) => {
                debug!("Running statement on shared session");
                query_rows(client, sql).await
            }
            None => Err(ServerError::connection("No connection")),
        };

        if let Err(e) = &result {
            if e.is_connection_error() {
                // Drop the broken session; a later call will reconnect.
                *slot = None;
            }
        }

        result
    }

    /// Release the session. Safe to call when already closed.
    pub async fn close(&self) {
        let mut slot = self.client.lock().await;
        match slot.take() {
            Some(_) => info!("Database connection closed"),
            None => info!("No database connection to close"),
        }
    }

    /// Whether a live session currently exists.
    pub async fn is_connected(&self) -> bool {
        self.client.lock().await.is_some()
    }
}

async fn query_rows(client: &mut SqlClient, sql: &str) -> Result<Vec<Row>, ServerError> {
    let stream = client.simple_query(sql.to_string()).await?;
    let rows = stream.into_first_result().await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 1433,
            database: Some("master".to_string()),
            username: "sa".to_string(),
            password: "test".to_string(),
            encrypt: false,
            trust_server_certificate: true,
            application_name: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let manager = ConnectionManager::new(test_config());
        assert!(!manager.is_connected().await);
    }

    #[tokio::test]
    async fn test_close_without_connection_does_not_fail() {
        let manager = ConnectionManager::new(test_config());
        manager.close().await;
        manager.close().await;
        assert!(!manager.is_connected().await);
    }
}
