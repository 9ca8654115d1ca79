use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Configuration Models
// ============================================================================

/// A channel the bot watches for new uploads.
///
/// Loaded once at startup from configuration and never mutated afterwards.
/// The `name` is only used when rendering announcement messages; `channel_id`
/// is the platform's stable identifier and the key for check marks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoredChannel {
    pub name: String,
    pub channel_id: String,
}

// ============================================================================
// Ledger Models
// ============================================================================

/// A video that has already been announced to the webhook.
///
/// Created exactly once per video id; never updated. Rows older than the
/// retention window are removed by the sweeper.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnnouncedVideo {
    #[sqlx(rename = "id")]
    pub video_id: String,
    #[sqlx(rename = "date_posted")]
    pub announced_at: DateTime<Utc>,
}

/// A timestamped record that a channel was scanned.
///
/// Written before the search call is made, so a crash or a slow API response
/// mid-scan still counts as a completed check for the minimum interval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChannelCheckMark {
    #[sqlx(rename = "id")]
    pub channel_id: String,
    #[sqlx(rename = "date_checked")]
    pub checked_at: DateTime<Utc>,
}

// ============================================================================
// Search Models
// ============================================================================

/// Resource kind of a search result item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CandidateKind {
    Video,
    Playlist,
    Channel,
    Other,
}

impl CandidateKind {
    /// Parse the `youtube#*` kind string returned by the search API.
    pub fn from_api_kind(kind: &str) -> Self {
        match kind {
            "youtube#video" => CandidateKind::Video,
            "youtube#playlist" => CandidateKind::Playlist,
            "youtube#channel" => CandidateKind::Channel,
            _ => CandidateKind::Other,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, CandidateKind::Video)
    }
}

/// One item from a channel search. Transient: consumed within a single scan
/// cycle and never persisted.
///
/// `title` and `channel_title` arrive HTML-entity-escaped from the API; they
/// are decoded at message-formatting time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub kind: CandidateKind,
    pub video_id: String,
    pub title: String,
    pub channel_title: String,
    pub published_at: DateTime<Utc>,
}
