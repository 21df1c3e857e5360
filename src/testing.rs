//! In-memory doubles shared by the unit tests.

use crate::comments::Cooldown;
use crate::records::{ChannelRecord, NO_DESCRIPTION, VideoRecord};
use crate::sink::{ObjectStore, StoreError};
use crate::youtube::types::{
    ChannelContentDetails, ChannelSnippet, ChannelStatistics, CommentReplies, CommentSnippet,
    CommentThreadSnippet, PageInfo, PlaylistItemContentDetails, RelatedPlaylists, VideoSnippet,
    VideoStatistics,
};
use crate::youtube::{
    ApiError, Channel, ChannelListResponse, Comment, CommentThread, CommentThreadListResponse,
    ListResponse, PlaylistItem, PlaylistItemListResponse, Video, VideoListResponse, YouTubeApi,
};
use chrono::{TimeZone, Utc};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

type PageKey = (String, Option<String>);

/// Scripted upstream. Unknown channel and video ids answer with an empty
/// page, unknown playlists with a 404 and unknown comment pages with an empty
/// page. Every call is recorded as `<resource>:<id>[:<token>]`.
#[derive(Default)]
pub struct FakeApi {
    channels: HashMap<String, Result<ChannelListResponse, ApiError>>,
    playlists: HashMap<PageKey, Result<PlaylistItemListResponse, ApiError>>,
    videos: HashMap<String, Result<VideoListResponse, ApiError>>,
    comments: HashMap<PageKey, Result<CommentThreadListResponse, ApiError>>,
    log: RefCell<Vec<String>>,
}

fn key(id: &str, token: Option<&str>) -> PageKey {
    (id.to_string(), token.map(str::to_string))
}

fn page<T>(items: Vec<T>, next: Option<&str>) -> ListResponse<T> {
    ListResponse {
        page_info: PageInfo {
            total_results: items.len() as u64,
            results_per_page: items.len() as u64,
        },
        items,
        next_page_token: next.map(str::to_string),
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, id: &str, title: &str, uploads: &str) -> Self {
        let channel = Channel {
            snippet: Some(ChannelSnippet {
                title: Some(title.to_string()),
                description: Some(format!("About {title}")),
            }),
            statistics: Some(ChannelStatistics {
                view_count: Some("1000".into()),
                subscriber_count: Some("100".into()),
                video_count: Some("10".into()),
            }),
            content_details: Some(ChannelContentDetails {
                related_playlists: Some(RelatedPlaylists {
                    uploads: Some(uploads.to_string()),
                }),
            }),
        };
        self.channels
            .insert(id.to_string(), Ok(page(vec![channel], None)));
        self
    }

    pub fn with_channel_error(mut self, id: &str, err: ApiError) -> Self {
        self.channels.insert(id.to_string(), Err(err));
        self
    }

    pub fn with_playlist_page(
        mut self,
        playlist_id: &str,
        token: Option<&str>,
        video_ids: &[&str],
        next: Option<&str>,
    ) -> Self {
        let items = video_ids
            .iter()
            .enumerate()
            .map(|(offset, video_id)| PlaylistItem {
                content_details: Some(PlaylistItemContentDetails {
                    video_id: Some(video_id.to_string()),
                    video_published_at: Utc
                        .with_ymd_and_hms(2024, 1, 1 + offset as u32, 12, 0, 0)
                        .single(),
                }),
            })
            .collect();
        self.playlists
            .insert(key(playlist_id, token), Ok(page(items, next)));
        self
    }

    pub fn with_playlist_error(
        mut self,
        playlist_id: &str,
        token: Option<&str>,
        err: ApiError,
    ) -> Self {
        self.playlists.insert(key(playlist_id, token), Err(err));
        self
    }

    pub fn with_video(mut self, id: &str, title: &str) -> Self {
        let video = Video {
            id: Some(id.to_string()),
            snippet: Some(VideoSnippet {
                title: Some(title.to_string()),
                description: Some(format!("{title} description")),
            }),
            statistics: Some(VideoStatistics {
                view_count: Some("100".into()),
                like_count: Some("10".into()),
                comment_count: Some("3".into()),
            }),
        };
        self.videos.insert(id.to_string(), Ok(page(vec![video], None)));
        self
    }

    pub fn with_video_error(mut self, id: &str, err: ApiError) -> Self {
        self.videos.insert(id.to_string(), Err(err));
        self
    }

    pub fn with_comment_page(
        mut self,
        video_id: &str,
        token: Option<&str>,
        threads: Vec<CommentThread>,
        next: Option<&str>,
    ) -> Self {
        self.comments
            .insert(key(video_id, token), Ok(page(threads, next)));
        self
    }

    pub fn with_comment_error(mut self, video_id: &str, token: Option<&str>, err: ApiError) -> Self {
        self.comments.insert(key(video_id, token), Err(err));
        self
    }

    /// Number of calls made against `resource` (`channels`, `playlistItems`,
    /// `videos` or `commentThreads`).
    pub fn calls(&self, resource: &str) -> usize {
        let prefix = format!("{resource}:");
        self.log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with(&prefix))
            .count()
    }

    fn record(&self, resource: &str, id: &str, token: Option<&str>) {
        let entry = match token {
            Some(token) => format!("{resource}:{id}:{token}"),
            None => format!("{resource}:{id}"),
        };
        self.log.borrow_mut().push(entry);
    }
}

impl YouTubeApi for FakeApi {
    fn list_channel(&self, channel_id: &str) -> Result<ChannelListResponse, ApiError> {
        self.record("channels", channel_id, None);
        self.channels
            .get(channel_id)
            .cloned()
            .unwrap_or_else(|| Ok(ListResponse::default()))
    }

    fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        self.record("playlistItems", playlist_id, page_token);
        self.playlists
            .get(&key(playlist_id, page_token))
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::Http {
                    status: 404,
                    message: format!("playlist {playlist_id} not found"),
                })
            })
    }

    fn list_video(&self, video_id: &str) -> Result<VideoListResponse, ApiError> {
        self.record("videos", video_id, None);
        self.videos
            .get(video_id)
            .cloned()
            .unwrap_or_else(|| Ok(ListResponse::default()))
    }

    fn list_comment_threads(
        &self,
        video_id: &str,
        page_token: Option<&str>,
    ) -> Result<CommentThreadListResponse, ApiError> {
        self.record("commentThreads", video_id, page_token);
        self.comments
            .get(&key(video_id, page_token))
            .cloned()
            .unwrap_or_else(|| Ok(ListResponse::default()))
    }
}

/// Thread whose top-level comment shares the thread id; the reported reply
/// count matches the inline replies.
pub fn thread(id: &str, text: &str, replies: &[Comment]) -> CommentThread {
    CommentThread {
        id: Some(id.to_string()),
        snippet: Some(CommentThreadSnippet {
            top_level_comment: Some(Comment {
                id: Some(id.to_string()),
                snippet: Some(CommentSnippet {
                    text_original: Some(text.to_string()),
                    published_at: Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).single(),
                    like_count: 2,
                    parent_id: None,
                }),
            }),
            total_reply_count: replies.len() as u64,
        }),
        replies: (!replies.is_empty()).then(|| CommentReplies {
            comments: replies.to_vec(),
        }),
    }
}

pub fn reply(parent: &str, id: &str, text: &str) -> Comment {
    Comment {
        id: Some(format!("{parent}.{id}")),
        snippet: Some(CommentSnippet {
            text_original: Some(text.to_string()),
            published_at: Utc.with_ymd_and_hms(2024, 2, 2, 9, 0, 0).single(),
            like_count: 0,
            parent_id: Some(parent.to_string()),
        }),
    }
}

pub fn channel(name: &str, uploads: &str) -> ChannelRecord {
    ChannelRecord {
        channel_name: name.to_string(),
        description: NO_DESCRIPTION.to_string(),
        viewcount: 0,
        subscribers: 0,
        videocount: 0,
        uploads_playlist_id: uploads.to_string(),
    }
}

pub fn video(id: &str) -> VideoRecord {
    VideoRecord {
        channel_name: "Alpha".to_string(),
        video_id: id.to_string(),
        title: format!("Video {id}"),
        description: String::new(),
        viewcount: 0,
        likecount: 0,
        commentcount: 0,
    }
}

/// Records requested pauses instead of sleeping.
#[derive(Default)]
pub struct RecordingCooldown {
    pauses: RefCell<Vec<Duration>>,
}

impl RecordingCooldown {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.borrow().clone()
    }
}

impl Cooldown for RecordingCooldown {
    fn pause(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

/// Object store keeping uploads in memory. Keys listed in `failures` answer
/// with the configured error instead.
#[derive(Default)]
pub struct MemoryStore {
    objects: RefCell<Vec<StoredObject>>,
    failures: HashMap<String, StoreError>,
}

impl MemoryStore {
    pub fn failing(mut self, key: &str, err: StoreError) -> Self {
        self.failures.insert(key.to_string(), err);
        self
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.borrow().clone()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        if let Some(err) = self.failures.get(key) {
            return Err(err.clone());
        }
        self.objects.borrow_mut().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}
