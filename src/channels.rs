//! Channel resolution: one `channels.list` lookup per requested id.

use crate::records::{ChannelRecord, NO_DESCRIPTION, UNKNOWN, non_blank, parse_count};
use crate::youtube::{Channel, YouTubeApi};

/// Resolves every id in order. Unknown ids and failed lookups are logged and
/// left out, so the output never has more entries than the input.
pub fn resolve_channels(api: &impl YouTubeApi, channel_ids: &[String]) -> Vec<ChannelRecord> {
    let mut records = Vec::with_capacity(channel_ids.len());

    for channel_id in channel_ids {
        let response = match api.list_channel(channel_id) {
            Ok(response) => response,
            Err(err) if err.is_quota() => {
                tracing::error!(%channel_id, error = %err, "quota exceeded while resolving channel");
                continue;
            }
            Err(err) => {
                tracing::error!(%channel_id, error = %err, "channel lookup failed");
                continue;
            }
        };

        if response.is_empty() {
            tracing::error!(%channel_id, "no channel found");
            continue;
        }

        let record = channel_record(&response.items[0]);
        tracing::info!(%channel_id, channel_name = %record.channel_name, "channel found");
        records.push(record);
    }

    records
}

/// Flattens a channel resource, filling absent fields with sentinels.
pub fn channel_record(channel: &Channel) -> ChannelRecord {
    let snippet = channel.snippet.as_ref();
    let statistics = channel.statistics.as_ref();
    let uploads = channel
        .content_details
        .as_ref()
        .and_then(|details| details.related_playlists.as_ref())
        .and_then(|playlists| non_blank(playlists.uploads.as_deref()));

    ChannelRecord {
        channel_name: non_blank(snippet.and_then(|snippet| snippet.title.as_deref()))
            .unwrap_or(UNKNOWN)
            .to_string(),
        description: snippet
            .and_then(|snippet| snippet.description.clone())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        viewcount: parse_count(statistics.and_then(|stats| stats.view_count.as_deref())),
        subscribers: parse_count(statistics.and_then(|stats| stats.subscriber_count.as_deref())),
        videocount: parse_count(statistics.and_then(|stats| stats.video_count.as_deref())),
        uploads_playlist_id: uploads.unwrap_or(UNKNOWN).to_string(),
    }
}
