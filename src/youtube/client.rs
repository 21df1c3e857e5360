//! Blocking client for the YouTube Data API v3.

use crate::youtube::error::ApiError;
use crate::youtube::types::{
    ChannelListResponse, CommentThreadListResponse, PlaylistItemListResponse, VideoListResponse,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Platform maximum for `playlistItems.list`.
pub const PLAYLIST_PAGE_SIZE: u32 = 50;
/// Platform maximum for `commentThreads.list`.
pub const COMMENT_PAGE_SIZE: u32 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// The four upstream calls the harvest relies on.
///
/// Stages take `&impl YouTubeApi` so tests can substitute a scripted fake for
/// the HTTP client.
pub trait YouTubeApi {
    /// `channels.list` for a single channel id.
    fn list_channel(&self, channel_id: &str) -> Result<ChannelListResponse, ApiError>;

    /// One page of `playlistItems.list`.
    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError>;

    /// `videos.list` for a single video id.
    fn list_video(&self, video_id: &str) -> Result<VideoListResponse, ApiError>;

    /// One page of `commentThreads.list`, newest first, replies inlined.
    fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError>;
}

/// Key-authenticated HTTP client. Build it once and hand it to every stage.
pub struct YouTubeClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl YouTubeClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("yt-harvest/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Issues a GET against `<base>/<resource>` and decodes the JSON body.
    fn get<T: DeserializeOwned>(
        &self,
        resource: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{resource}", self.base_url);
        let mut request = self.agent.get(&url).query("key", &self.api_key);
        for (name, value) in query {
            request = request.query(name, value);
        }

        let response = match request.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                return Err(ApiError::from_status(status, &body));
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(ApiError::Transport(transport.to_string()));
            }
        };

        let decoded = response
            .into_json::<T>()
            .map_err(|err| ApiError::Decode(format!("{resource}: {err}")))?;
        tracing::trace!(resource, "decoded response");
        Ok(decoded)
    }
}

impl YouTubeApi for YouTubeClient {
    fn list_channel(&self, channel_id: &str) -> Result<ChannelListResponse, ApiError> {
        self.get(
            "channels",
            &[("part", "snippet,contentDetails,statistics"), ("id", channel_id)],
        )
    }

    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        let max_results = PLAYLIST_PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        self.get("playlistItems", &query)
    }

    fn list_video(&self, video_id: &str) -> Result<VideoListResponse, ApiError> {
        self.get(
            "videos",
            &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
        )
    }

    fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError> {
        let max_results = COMMENT_PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "snippet,replies"),
            ("videoId", video_id),
            ("maxResults", max_results.as_str()),
            ("order", "time"),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }
        self.get("commentThreads", &query)
    }
}
