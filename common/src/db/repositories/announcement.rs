// Announced-video repository implementation

use crate::db::DbPool;
use crate::errors::StorageError;
use chrono::{DateTime, Utc};
use tracing::instrument;

/// Repository for announced-video ledger operations
///
/// The primary key on `videos_posted.id` is the authoritative guard against
/// double announcement: callers are expected to check first, but the insert
/// itself rejects duplicates under concurrent or repeated runs.
#[derive(Debug, Clone)]
pub struct AnnouncementRepository {
    db: DbPool,
}

impl AnnouncementRepository {
    /// Create a new AnnouncementRepository
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Check whether a video id has already been announced
    ///
    /// No side effects.
    #[instrument(skip(self))]
    pub async fn has_been_announced(&self, video_id: &str) -> Result<bool, StorageError> {
        let row: (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM videos_posted WHERE id = ?)")
                .bind(video_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(row.0 != 0)
    }

    /// Record a video as announced
    ///
    /// # Errors
    /// Returns `StorageError::DuplicateKey` if the video id already exists.
    /// The existing row is never overwritten; a duplicate insert indicates a
    /// race or a logic defect upstream.
    #[instrument(skip(self))]
    pub async fn record_announcement(
        &self,
        video_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query("INSERT INTO videos_posted (id, date_posted) VALUES (?, ?)")
            .bind(video_id)
            .bind(now)
            .execute(self.db.pool())
            .await?;

        tracing::info!(video_id = video_id, "Announcement recorded");
        Ok(())
    }

    /// Delete announcement rows older than the cutoff
    ///
    /// Idempotent; safe to call with no matching rows.
    #[instrument(skip(self))]
    pub async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM videos_posted WHERE date_posted < ?")
            .bind(cutoff)
            .execute(self.db.pool())
            .await?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            tracing::info!(deleted_count = deleted, "Pruned old announcements");
        }
        Ok(deleted)
    }
}
