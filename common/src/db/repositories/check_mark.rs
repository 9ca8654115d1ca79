// Channel check-mark repository implementation

use crate::db::DbPool;
use crate::errors::StorageError;
use chrono::{DateTime, Utc};
use tracing::instrument;

/// Repository for channel check-mark ledger operations
///
/// A live mark for a channel means "scanned within the minimum interval";
/// the sweeper expires marks, which is what re-enables scanning.
#[derive(Debug, Clone)]
pub struct CheckMarkRepository {
    db: DbPool,
}

impl CheckMarkRepository {
    /// Create a new CheckMarkRepository
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Check whether a live mark exists for the channel
    #[instrument(skip(self))]
    pub async fn was_recently_checked(&self, channel_id: &str) -> Result<bool, StorageError> {
        let row: (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM channel_check_times WHERE id = ?)")
                .bind(channel_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(row.0 != 0)
    }

    /// Record that a channel scan is underway
    ///
    /// Must be called before the search is issued, so a crash or slow API
    /// response mid-scan cannot cause an immediate rescan on the next run.
    /// Upsert keeps at most one mark per channel even when a stale mark has
    /// not been pruned yet.
    #[instrument(skip(self))]
    pub async fn mark_checked(
        &self,
        channel_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO channel_check_times (id, date_checked) VALUES (?, ?)
             ON CONFLICT(id) DO UPDATE SET date_checked = excluded.date_checked",
        )
        .bind(channel_id)
        .bind(now)
        .execute(self.db.pool())
        .await?;

        tracing::debug!(channel_id = channel_id, "Channel marked checked");
        Ok(())
    }

    /// Delete marks older than the cutoff
    ///
    /// Idempotent; safe to call with no matching rows.
    #[instrument(skip(self))]
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM channel_check_times WHERE date_checked < ?")
            .bind(cutoff)
            .execute(self.db.pool())
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::info!(deleted_count = deleted, "Pruned expired check marks");
        }
        Ok(deleted)
    }
}
