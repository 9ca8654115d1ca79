// Retention sweeper: bounds ledger growth and re-enables channel scans

use crate::db::{AnnouncementRepository, CheckMarkRepository, DbPool};
use chrono::{DateTime, Duration, Utc};
use tracing::{instrument, warn};

/// Retention windows for the two ledger tables
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Announced videos older than this are never re-offered by the search
    /// lookback window, so the rows can go
    pub announcement_retention_days: u64,
    /// Check-mark expiry; this is what re-enables scanning a channel
    pub check_mark_retention_hours: u64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            announcement_retention_days: 30,
            check_mark_retention_hours: 12,
        }
    }
}

/// Summary of one sweep, for logging
#[derive(Debug, Default, Clone, Copy)]
pub struct SweepReport {
    pub announcements_pruned: u64,
    pub check_marks_pruned: u64,
    pub space_reclaimed: bool,
}

/// Removes expired ledger rows and compacts the store
///
/// Runs once per cycle after all channels are processed. Every failure in
/// here is logged and swallowed: correctness never depends on a sweep.
pub struct RetentionSweeper {
    policy: RetentionPolicy,
    db: DbPool,
    announcements: AnnouncementRepository,
    check_marks: CheckMarkRepository,
}

impl RetentionSweeper {
    /// Create a new sweeper over the given store
    pub fn new(policy: RetentionPolicy, db: DbPool) -> Self {
        Self {
            policy,
            announcements: AnnouncementRepository::new(db.clone()),
            check_marks: CheckMarkRepository::new(db.clone()),
            db,
        }
    }

    /// Prune expired rows and reclaim space
    #[instrument(skip(self))]
    pub async fn sweep(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let announcement_cutoff =
            now - Duration::days(self.policy.announcement_retention_days as i64);
        match self.announcements.prune_older_than(announcement_cutoff).await {
            Ok(deleted) => report.announcements_pruned = deleted,
            Err(e) => warn!(error = %e, "Failed to prune old announcements"),
        }

        let check_mark_cutoff =
            now - Duration::hours(self.policy.check_mark_retention_hours as i64);
        match self.check_marks.prune_older_than(check_mark_cutoff).await {
            Ok(deleted) => report.check_marks_pruned = deleted,
            Err(e) => warn!(error = %e, "Failed to prune expired check marks"),
        }

        match self.db.reclaim_space().await {
            Ok(()) => report.space_reclaimed = true,
            Err(e) => warn!(error = %e, "Failed to reclaim store space"),
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_schema;

    async fn setup() -> (DbPool, RetentionSweeper) {
        let db = DbPool::connect_in_memory().await.unwrap();
        create_schema(&db).await.unwrap();
        let sweeper = RetentionSweeper::new(RetentionPolicy::default(), db.clone());
        (db, sweeper)
    }

    #[tokio::test]
    async fn test_sweep_enforces_retention_bounds() {
        let (db, sweeper) = setup().await;
        let now = Utc::now();

        let announcements = AnnouncementRepository::new(db.clone());
        let check_marks = CheckMarkRepository::new(db.clone());

        announcements
            .record_announcement("expired", now - Duration::days(31))
            .await
            .unwrap();
        announcements
            .record_announcement("retained", now - Duration::days(29))
            .await
            .unwrap();
        check_marks
            .mark_checked("expired-channel", now - Duration::hours(13))
            .await
            .unwrap();
        check_marks
            .mark_checked("retained-channel", now - Duration::hours(11))
            .await
            .unwrap();

        let report = sweeper.sweep(now).await;

        assert_eq!(report.announcements_pruned, 1);
        assert_eq!(report.check_marks_pruned, 1);
        assert!(report.space_reclaimed);

        assert!(!announcements.has_been_announced("expired").await.unwrap());
        assert!(announcements.has_been_announced("retained").await.unwrap());
        assert!(!check_marks
            .was_recently_checked("expired-channel")
            .await
            .unwrap());
        assert!(check_marks
            .was_recently_checked("retained-channel")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_sweep_on_empty_ledger_is_a_noop() {
        let (_db, sweeper) = setup().await;
        let report = sweeper.sweep(Utc::now()).await;
        assert_eq!(report.announcements_pruned, 0);
        assert_eq!(report.check_marks_pruned, 0);
    }
}
