//! Comment thread harvesting with quota-aware backoff.
//!
//! Each page of `commentThreads.list` is flattened as soon as it arrives: one
//! record per top-level comment, followed by one per inline reply.

use crate::records::{CommentKind, CommentRecord, VideoRecord};
use crate::youtube::{ApiError, Comment, CommentThread, YouTubeApi};
use std::cell::Cell;
use std::time::Duration;

/// 24h, long enough for the daily quota to reset.
pub const DEFAULT_QUOTA_COOLDOWN: Duration = Duration::from_secs(86_400);

/// Blocks the caller for a while. Swapped out in tests.
pub trait Cooldown {
    fn pause(&self, duration: Duration);
}

/// Sleeps the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Cooldown for ThreadSleep {
    fn pause(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Process-wide backoff gate. Tripping it suspends every further request for
/// the configured cooldown.
pub struct QuotaGate<C: Cooldown = ThreadSleep> {
    cooldown: C,
    duration: Duration,
    trips: Cell<usize>,
}

impl QuotaGate<ThreadSleep> {
    pub fn sleeping(duration: Duration) -> Self {
        Self::new(ThreadSleep, duration)
    }
}

impl<C: Cooldown> QuotaGate<C> {
    pub fn new(cooldown: C, duration: Duration) -> Self {
        Self {
            cooldown,
            duration,
            trips: Cell::new(0),
        }
    }

    /// Logs the quota failure and waits out the cooldown.
    pub fn trip(&self, video_id: &str, err: &ApiError) {
        self.trips.set(self.trips.get() + 1);
        tracing::error!(
            %video_id,
            error = %err,
            cooldown_secs = self.duration.as_secs(),
            "quota exceeded, pausing all requests until the quota resets"
        );
        self.cooldown.pause(self.duration);
        tracing::info!("quota cooldown elapsed, resuming");
    }

    pub fn trips(&self) -> usize {
        self.trips.get()
    }

    pub fn cooldown(&self) -> &C {
        &self.cooldown
    }
}

/// Fetches every comment page for each video in order.
///
/// A generic page failure abandons the rest of that video. A quota failure
/// additionally trips `gate` before moving on to the next video.
pub fn fetch_comments<C: Cooldown>(
    api: &impl YouTubeApi,
    gate: &QuotaGate<C>,
    videos: &[VideoRecord],
) -> Vec<CommentRecord> {
    let mut comments = Vec::new();

    for video in videos {
        let video_id = video.video_id.as_str();
        let before = comments.len();
        let mut token: Option<String> = None;

        loop {
            let page = match api.list_comment_threads(video_id, token.as_deref()) {
                Ok(page) => page,
                Err(err) if err.is_quota() => {
                    gate.trip(video_id, &err);
                    break;
                }
                Err(err) => {
                    tracing::error!(%video_id, error = %err, "comment page failed, skipping video");
                    break;
                }
            };

            tracing::trace!(
                %video_id,
                threads = page.items.len(),
                total_results = page.page_info.total_results,
                "comment page"
            );
            for thread in &page.items {
                comments.extend(thread_records(video_id, thread));
            }

            match page.next_page_token.filter(|next| !next.is_empty()) {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        tracing::debug!(%video_id, comments = comments.len() - before, "collected comments");
    }

    comments
}

/// Flattens one thread: the top-level comment, then each inline reply when
/// the thread reports any. Replies beyond the inline page are not fetched.
pub fn thread_records(video_id: &str, thread: &CommentThread) -> Vec<CommentRecord> {
    let snippet = thread.snippet.clone().unwrap_or_default();
    let top = snippet.top_level_comment.unwrap_or_default();

    let thread_id = thread.id.as_deref();

    let mut records = vec![comment_record(video_id, &top, CommentKind::TopLevel, thread_id)];

    if snippet.total_reply_count > 0
        && let Some(replies) = &thread.replies
    {
        for reply in &replies.comments {
            records.push(comment_record(video_id, reply, CommentKind::Reply, thread_id));
        }
    }

    records
}

/// Builds a fresh record for one comment. The thread id stands in for a
/// missing top-level comment id or reply parent id.
fn comment_record(
    video_id: &str,
    comment: &Comment,
    kind: CommentKind,
    thread_id: Option<&str>,
) -> CommentRecord {
    let snippet = comment.snippet.clone().unwrap_or_default();
    let thread_id = thread_id.map(str::to_string);
    let (id, parent_id) = match kind {
        CommentKind::TopLevel => (comment.id.clone().or(thread_id), None),
        CommentKind::Reply => (
            comment.id.clone(),
            Some(snippet.parent_id.or(thread_id).unwrap_or_default()),
        ),
    };

    CommentRecord {
        video_id: video_id.to_string(),
        id,
        text_original: snippet.text_original,
        published_at: snippet.published_at,
        like_count: snippet.like_count,
        kind,
        parent_id,
    }
}
