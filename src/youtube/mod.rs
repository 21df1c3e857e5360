//! Minimal YouTube Data API v3 surface: the four list calls the harvest
//! needs, their wire types and the error taxonomy.

pub mod client;
pub mod error;
pub mod types;

pub use client::{DEFAULT_API_BASE_URL, YouTubeApi, YouTubeClient};
pub use error::ApiError;
pub use types::{
    Channel, ChannelListResponse, Comment, CommentThread, CommentThreadListResponse, ListResponse,
    PlaylistItem, PlaylistItemListResponse, Video, VideoListResponse,
};
