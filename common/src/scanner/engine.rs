// Scan engine implementation

use crate::db::{AnnouncementRepository, CheckMarkRepository, DbPool};
use crate::errors::{ScanError, StorageError};
use crate::models::{MonitoredChannel, VideoCandidate};
use crate::notify::{announcement_message, Notifier};
use crate::pacing::Pacer;
use crate::search::VideoSearch;
use crate::sweeper::{RetentionPolicy, RetentionSweeper};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Configuration for the scan engine
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Minimum time between two scans of the same channel
    pub recheck_interval_hours: u64,
    /// Lookback window for the search; must exceed the recheck interval
    pub lookback_hours: u64,
    /// Page size requested from the search collaborator
    pub max_results: u32,
    /// How long announced videos stay in the ledger
    pub announcement_retention_days: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recheck_interval_hours: 12,
            lookback_hours: 48,
            max_results: 1,
            announcement_retention_days: 30,
        }
    }
}

/// Summary of one full cycle, for logging and the exit path
#[derive(Debug, Default, Clone, Copy)]
pub struct CycleReport {
    pub channels_scanned: usize,
    pub channels_skipped: usize,
    pub channels_failed: usize,
    pub videos_announced: usize,
}

enum ChannelOutcome {
    Scanned { announced: usize },
    Skipped,
}

/// Main scan engine
///
/// Owns the per-cycle control flow: the check-mark gate, the announcement
/// pipeline, and the retention sweep that closes each cycle.
pub struct ScanEngine {
    config: ScanConfig,
    announcements: AnnouncementRepository,
    check_marks: CheckMarkRepository,
    sweeper: RetentionSweeper,
    search: Arc<dyn VideoSearch>,
    notifier: Arc<dyn Notifier>,
    pacer: Arc<dyn Pacer>,
}

impl ScanEngine {
    /// Create a new scan engine
    pub fn new(
        config: ScanConfig,
        db: DbPool,
        search: Arc<dyn VideoSearch>,
        notifier: Arc<dyn Notifier>,
        pacer: Arc<dyn Pacer>,
    ) -> Self {
        let policy = RetentionPolicy {
            announcement_retention_days: config.announcement_retention_days,
            check_mark_retention_hours: config.recheck_interval_hours,
        };

        Self {
            config,
            announcements: AnnouncementRepository::new(db.clone()),
            check_marks: CheckMarkRepository::new(db.clone()),
            sweeper: RetentionSweeper::new(policy, db),
            search,
            notifier,
            pacer,
        }
    }

    /// Run one full cycle over the monitored channels, then sweep
    ///
    /// A search failure is confined to its channel: the failure is logged and
    /// the remaining channels still run. A storage failure aborts the cycle,
    /// since ledger integrity cannot be assumed afterwards.
    #[instrument(skip(self, channels), fields(channel_count = channels.len()))]
    pub async fn run_cycle(
        &self,
        channels: &[MonitoredChannel],
        now: DateTime<Utc>,
    ) -> Result<CycleReport, StorageError> {
        let mut report = CycleReport::default();

        for channel in channels {
            match self.process_channel(channel, now).await {
                Ok(ChannelOutcome::Scanned { announced }) => {
                    report.channels_scanned += 1;
                    report.videos_announced += announced;
                    // A search call went out for this channel, even when it
                    // returned nothing; pace before the next channel's call.
                    self.pacer.pause().await;
                }
                Ok(ChannelOutcome::Skipped) => {
                    report.channels_skipped += 1;
                }
                Err(ScanError::Search(e)) => {
                    warn!(
                        channel_name = %channel.name,
                        channel_id = %channel.channel_id,
                        error = %e,
                        "Channel search failed, skipping this cycle"
                    );
                    report.channels_failed += 1;
                    self.pacer.pause().await;
                }
                Err(ScanError::Storage(e)) => {
                    error!(
                        channel_name = %channel.name,
                        channel_id = %channel.channel_id,
                        error = %e,
                        "Ledger failure, aborting cycle"
                    );
                    return Err(e);
                }
            }
        }

        let sweep = self.sweeper.sweep(now).await;
        info!(
            channels_scanned = report.channels_scanned,
            channels_skipped = report.channels_skipped,
            channels_failed = report.channels_failed,
            videos_announced = report.videos_announced,
            announcements_pruned = sweep.announcements_pruned,
            check_marks_pruned = sweep.check_marks_pruned,
            "Cycle complete"
        );

        Ok(report)
    }

    /// Scan a single channel if its minimum recheck interval has elapsed
    #[instrument(skip(self, channel), fields(channel_name = %channel.name, channel_id = %channel.channel_id))]
    async fn process_channel(
        &self,
        channel: &MonitoredChannel,
        now: DateTime<Utc>,
    ) -> Result<ChannelOutcome, ScanError> {
        if self
            .check_marks
            .was_recently_checked(&channel.channel_id)
            .await?
        {
            debug!("Channel checked within the recheck interval, skipping");
            return Ok(ChannelOutcome::Skipped);
        }

        // The mark goes in before the search so a crash or a slow API call
        // mid-scan cannot cause an immediate rescan on the next run.
        self.check_marks
            .mark_checked(&channel.channel_id, now)
            .await?;

        let published_after = now - Duration::hours(self.config.lookback_hours as i64);
        info!(cutoff = %published_after, "Checking for new videos");

        let candidates = self
            .search
            .latest_videos(
                &channel.channel_id,
                published_after,
                self.config.max_results,
            )
            .await?;

        let mut announced = 0;
        for (index, candidate) in candidates.iter().enumerate() {
            // Pace between successive candidates; the channel-level pause in
            // run_cycle covers the gap to the next channel.
            if index > 0 {
                self.pacer.pause().await;
            }
            if self.process_candidate(candidate, now).await? {
                announced += 1;
            }
        }

        Ok(ChannelOutcome::Scanned { announced })
    }

    /// Announce one candidate unless it is filtered or already handled
    ///
    /// Returns true when an announcement was recorded.
    async fn process_candidate(
        &self,
        candidate: &VideoCandidate,
        now: DateTime<Utc>,
    ) -> Result<bool, StorageError> {
        if !candidate.kind.is_video() {
            debug!(
                kind = ?candidate.kind,
                id = %candidate.video_id,
                "Skipping non-video candidate"
            );
            return Ok(false);
        }

        if self
            .announcements
            .has_been_announced(&candidate.video_id)
            .await?
        {
            debug!(video_id = %candidate.video_id, "Already announced");
            return Ok(false);
        }

        let title = html_escape::decode_html_entities(&candidate.title);
        info!(video_id = %candidate.video_id, title = %title, "Announcing new video");

        let message = announcement_message(&candidate.channel_title, &candidate.video_id);
        if let Err(e) = self.notifier.deliver(&message).await {
            // At-most-once policy: a failed delivery is logged, never retried,
            // and the video is still marked done below.
            warn!(
                video_id = %candidate.video_id,
                error = %e,
                "Webhook delivery failed, recording as announced anyway"
            );
        }

        match self
            .announcements
            .record_announcement(&candidate.video_id, now)
            .await
        {
            Ok(()) => Ok(true),
            Err(StorageError::DuplicateKey(_)) => {
                // Another instance won the insert race after our existence
                // check; the ledger already holds the row, so keep going.
                warn!(video_id = %candidate.video_id, "Announcement already recorded");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
