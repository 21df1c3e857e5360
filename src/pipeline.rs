//! Stage composition: channels → uploads → video details → comments.

use serde::Serialize;

use crate::channels::resolve_channels;
use crate::comments::{Cooldown, QuotaGate, fetch_comments};
use crate::records::{ChannelRecord, CommentRecord, VideoRecord};
use crate::videos::fetch_videos;
use crate::youtube::YouTubeApi;

/// Everything one run extracted. Each list is built by exactly one stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Harvest {
    pub channels: Vec<ChannelRecord>,
    pub videos: Vec<VideoRecord>,
    pub comments: Vec<CommentRecord>,
}

/// Runs every stage in order, feeding each stage's output to the next.
/// Upstream failures only shrink the result; they never abort the run.
pub fn run<C: Cooldown>(
    api: &impl YouTubeApi,
    gate: &QuotaGate<C>,
    channel_ids: &[String],
) -> Harvest {
    tracing::info!(channels = channel_ids.len(), "resolving channels");
    let channels = resolve_channels(api, channel_ids);

    tracing::info!(channels = channels.len(), "fetching videos");
    let videos = fetch_videos(api, &channels);

    tracing::info!(videos = videos.len(), "fetching comments");
    let comments = fetch_comments(api, gate, &videos);

    tracing::info!(
        channels = channels.len(),
        videos = videos.len(),
        comments = comments.len(),
        quota_pauses = gate.trips(),
        "harvest complete"
    );

    Harvest {
        channels,
        videos,
        comments,
    }
}
