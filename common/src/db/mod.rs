// Ledger persistence layer: pool, schema bootstrap, and repositories

pub mod pool;
pub mod repositories;

pub use pool::DbPool;
pub use repositories::{AnnouncementRepository, CheckMarkRepository};

use crate::errors::StorageError;
use tracing::{info, instrument};

/// Create the ledger tables if they do not already exist
///
/// Idempotent: first run and every subsequent run succeed identically. Table
/// and column names match the original store layout, so an existing ledger
/// file keeps working across upgrades.
#[instrument(skip(db))]
pub async fn create_schema(db: &DbPool) -> Result<(), StorageError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS videos_posted (
            id TEXT PRIMARY KEY UNIQUE,
            date_posted TEXT NOT NULL
        ) WITHOUT ROWID
        "#,
    )
    .execute(db.pool())
    .await
    .map_err(|e| StorageError::SchemaFailed(e.to_string()))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS channel_check_times (
            id TEXT PRIMARY KEY UNIQUE,
            date_checked TEXT NOT NULL
        ) WITHOUT ROWID
        "#,
    )
    .execute(db.pool())
    .await
    .map_err(|e| StorageError::SchemaFailed(e.to_string()))?;

    info!("Ledger schema ready");
    Ok(())
}
