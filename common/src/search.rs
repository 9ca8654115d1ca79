// Video search collaborator: YouTube Data API v3 search endpoint

use crate::errors::SearchError;
use crate::models::{CandidateKind, VideoCandidate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// Search collaborator seam
///
/// The scan engine only depends on this trait; the production implementation
/// talks to the YouTube Data API, tests substitute their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoSearch: Send + Sync {
    /// Return the newest candidates for a channel published after the cutoff,
    /// newest first, capped at `max_results`.
    async fn latest_videos(
        &self,
        channel_id: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, SearchError>;
}

/// YouTube Data API v3 search client
pub struct YouTubeSearchClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YouTubeSearchClient {
    /// Create a new search client with a bounded request timeout
    pub fn new(base_url: &str, api_key: &str, timeout_seconds: u64) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| {
                SearchError::RequestFailed(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearchClient {
    #[instrument(skip(self), fields(channel_id = channel_id))]
    async fn latest_videos(
        &self,
        channel_id: &str,
        published_after: DateTime<Utc>,
        max_results: u32,
    ) -> Result<Vec<VideoCandidate>, SearchError> {
        let url = format!("{}/search", self.base_url);
        let published_after_str = published_after.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let max_results_str = max_results.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", channel_id),
                ("channelType", "any"),
                ("order", "date"),
                ("type", "video"),
                ("maxResults", max_results_str.as_str()),
                ("publishedAfter", published_after_str.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        let candidates: Vec<VideoCandidate> = search_response
            .items
            .into_iter()
            .map(SearchItem::into_candidate)
            .collect();

        tracing::debug!(
            channel_id = channel_id,
            count = candidates.len(),
            "Search returned candidates"
        );

        Ok(candidates)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

impl SearchItem {
    fn into_candidate(self) -> VideoCandidate {
        let id = self
            .id
            .video_id
            .or(self.id.playlist_id)
            .or(self.id.channel_id)
            .unwrap_or_default();

        VideoCandidate {
            kind: CandidateKind::from_api_kind(&self.id.kind),
            video_id: id,
            title: self.snippet.title,
            channel_title: self.snippet.channel_title,
            published_at: self.snippet.published_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItemId {
    kind: String,
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    playlist_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchSnippet {
    title: String,
    channel_title: String,
    published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        serde_json::json!({
            "kind": "youtube#searchListResponse",
            "items": [
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#video", "videoId": "v1" },
                    "snippet": {
                        "publishedAt": "2024-01-15T10:00:00Z",
                        "title": "Foo &amp; Bar",
                        "channelTitle": "Test &amp; Channel"
                    }
                },
                {
                    "kind": "youtube#searchResult",
                    "id": { "kind": "youtube#playlist", "playlistId": "p1" },
                    "snippet": {
                        "publishedAt": "2024-01-14T10:00:00Z",
                        "title": "Some playlist",
                        "channelTitle": "Test Channel"
                    }
                }
            ]
        })
    }

    #[tokio::test]
    async fn test_latest_videos_parses_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("channelId", "UC123"))
            .and(query_param("order", "date"))
            .and(query_param("type", "video"))
            .and(query_param("maxResults", "5"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&server.uri(), "test-key", 5).unwrap();
        let cutoff = "2024-01-13T00:00:00Z".parse().unwrap();
        let candidates = client.latest_videos("UC123", cutoff, 5).await.unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].kind, CandidateKind::Video);
        assert_eq!(candidates[0].video_id, "v1");
        // Entity decoding happens at formatting time, not in the client.
        assert_eq!(candidates[0].title, "Foo &amp; Bar");
        assert_eq!(candidates[1].kind, CandidateKind::Playlist);
        assert_eq!(candidates[1].video_id, "p1");
    }

    #[tokio::test]
    async fn test_latest_videos_sends_published_after_cutoff() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("publishedAfter", "2024-01-13T06:30:00Z"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "items": [] })),
            )
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&server.uri(), "test-key", 5).unwrap();
        let cutoff = "2024-01-13T06:30:00Z".parse().unwrap();
        let candidates = client.latest_videos("UC123", cutoff, 1).await.unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_latest_videos_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quotaExceeded"))
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&server.uri(), "test-key", 5).unwrap();
        let err = client
            .latest_videos("UC123", Utc::now(), 1)
            .await
            .unwrap_err();

        match err {
            SearchError::ApiStatus { status, body } => {
                assert_eq!(status, 403);
                assert!(body.contains("quotaExceeded"));
            }
            other => panic!("expected ApiStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_response_yields_no_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = YouTubeSearchClient::new(&server.uri(), "test-key", 5).unwrap();
        let candidates = client.latest_videos("UC123", Utc::now(), 1).await.unwrap();
        assert!(candidates.is_empty());
    }
}
