// SQLite connection pool implementation

use crate::config::DatabaseConfig;
use crate::errors::StorageError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Database connection pool wrapper
///
/// Provides a managed connection pool to the SQLite file backing the ledger.
/// The store is created on first run if the file does not exist.
#[derive(Debug, Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Create a new connection pool for the configured store file
    ///
    /// # Errors
    /// Returns `StorageError::ConnectionFailed` if the store cannot be opened
    #[instrument(skip(config), fields(path = %config.path))]
    pub async fn new(config: &DatabaseConfig) -> Result<Self, StorageError> {
        info!("Opening ledger store");

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to open ledger store");
                StorageError::ConnectionFailed(e.to_string())
            })?;

        info!(
            max_connections = config.max_connections,
            "Ledger store opened"
        );

        Ok(Self { pool })
    }

    /// Create a pool backed by an in-memory store, for tests
    pub async fn connect_in_memory() -> Result<Self, StorageError> {
        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Get a reference to the underlying pool
    ///
    /// This is used by repositories to execute queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Perform a health check on the store
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Ledger health check failed");
                StorageError::ConnectionFailed(e.to_string())
            })?;

        tracing::debug!("Ledger health check passed");
        Ok(())
    }

    /// Compact the store file after pruning
    ///
    /// Callers treat a failure here as non-fatal: correctness does not depend
    /// on reclamation happening promptly.
    #[instrument(skip(self))]
    pub async fn reclaim_space(&self) -> Result<(), StorageError> {
        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to vacuum ledger store");
                StorageError::QueryFailed(e.to_string())
            })?;

        tracing::debug!("Ledger store compacted");
        Ok(())
    }

    /// Close the connection pool gracefully
    #[instrument(skip(self))]
    pub async fn close(&self) {
        info!("Closing ledger store");
        self.pool.close().await;
    }
}
