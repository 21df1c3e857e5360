//! Uploads enumeration and per-video detail lookups.

use crate::pager::{Page, Walk, walk};
use crate::records::{ChannelRecord, VideoRecord, VideoRef, parse_count};
use crate::youtube::{PlaylistItem, Video, YouTubeApi};

/// Lists every video of an uploads playlist, oldest page first.
///
/// A failing page ends the enumeration for this playlist only; whatever was
/// collected up to that point is returned.
pub fn enumerate_uploads(api: &impl YouTubeApi, playlist_id: &str) -> Vec<VideoRef> {
    let uploads: Walk<PlaylistItem> = walk(|token| {
        api.list_playlist_items(playlist_id, token)
            .map(Page::from)
    });

    if !uploads.is_complete() {
        tracing::error!(
            %playlist_id,
            pages = uploads.pages,
            collected = uploads.items.len(),
            "playlist enumeration stopped early"
        );
    }

    uploads.items.into_iter().filter_map(video_ref).collect()
}

fn video_ref(item: PlaylistItem) -> Option<VideoRef> {
    let details = item.content_details.unwrap_or_default();
    match details.video_id.filter(|id| !id.trim().is_empty()) {
        Some(video_id) => Some(VideoRef {
            video_id,
            published_at: details.video_published_at,
        }),
        None => {
            tracing::warn!("playlist item without a video id, skipping");
            None
        }
    }
}

/// Enumerates each channel's uploads and looks every video up.
///
/// Output order is channel order, then enumeration order within a channel.
/// Videos that are missing or fail to load are logged and skipped.
pub fn fetch_videos(api: &impl YouTubeApi, channels: &[ChannelRecord]) -> Vec<VideoRecord> {
    let mut records = Vec::new();

    for channel in channels {
        if !channel.has_uploads() {
            tracing::warn!(
                channel_name = %channel.channel_name,
                "channel has no uploads playlist, skipping"
            );
            continue;
        }

        let refs = enumerate_uploads(api, &channel.uploads_playlist_id);
        tracing::info!(
            channel_name = %channel.channel_name,
            videos = refs.len(),
            "enumerated uploads"
        );

        for video in &refs {
            if let Some(record) = fetch_video(api, &channel.channel_name, &video.video_id) {
                records.push(record);
            }
        }
    }

    records
}

fn fetch_video(api: &impl YouTubeApi, channel_name: &str, video_id: &str) -> Option<VideoRecord> {
    let response = match api.list_video(video_id) {
        Ok(response) => response,
        Err(err) if err.is_quota() => {
            tracing::error!(%video_id, error = %err, "quota exceeded while fetching video");
            return None;
        }
        Err(err) => {
            tracing::error!(%video_id, error = %err, "video lookup failed");
            return None;
        }
    };

    if response.is_empty() {
        tracing::warn!(%video_id, "no items found for video");
        return None;
    }
    Some(video_record(channel_name, video_id, &response.items[0]))
}

/// Flattens a video resource. `requested_id` stands in when the response
/// omits the id.
pub fn video_record(channel_name: &str, requested_id: &str, video: &Video) -> VideoRecord {
    let snippet = video.snippet.as_ref();
    let statistics = video.statistics.as_ref();

    VideoRecord {
        channel_name: channel_name.to_string(),
        video_id: video
            .id
            .clone()
            .unwrap_or_else(|| requested_id.to_string()),
        title: snippet
            .and_then(|snippet| snippet.title.clone())
            .unwrap_or_default(),
        description: snippet
            .and_then(|snippet| snippet.description.clone())
            .unwrap_or_default(),
        viewcount: parse_count(statistics.and_then(|stats| stats.view_count.as_deref())),
        likecount: parse_count(statistics.and_then(|stats| stats.like_count.as_deref())),
        commentcount: parse_count(statistics.and_then(|stats| stats.comment_count.as_deref())),
    }
}
