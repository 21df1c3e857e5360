//! Flat records produced by the extraction stages.
//!
//! Every struct here mirrors one object of the JSON documents written by the
//! persistence sink. Records are built fresh per upstream item and never
//! mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const UNKNOWN: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";

/// One resolved channel, carrying the id of its uploads playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub channel_name: String,
    pub description: String,
    pub viewcount: u64,
    pub subscribers: u64,
    pub videocount: u64,
    pub uploads_playlist_id: String,
}

impl ChannelRecord {
    /// `false` when the upstream response did not name an uploads playlist.
    pub fn has_uploads(&self) -> bool {
        !self.uploads_playlist_id.is_empty() && self.uploads_playlist_id != UNKNOWN
    }
}

/// Entry of an uploads playlist. Only lives long enough to drive the detail
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub video_id: String,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub channel_name: String,
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub viewcount: u64,
    pub likecount: u64,
    pub commentcount: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    TopLevel,
    Reply,
}

/// A top-level comment or one of its inline replies.
///
/// Text and timestamp are passed through as absent when upstream omits them;
/// `parent_id` is only set on replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text_original: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: u64,
    pub kind: CommentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// Parses the decimal strings YouTube uses for statistics. Missing or
/// malformed counts read as zero.
pub fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Passes the value through untouched unless it is missing or blank.
pub(crate) fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}
