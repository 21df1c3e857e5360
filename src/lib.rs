#![forbid(unsafe_code)]

//! Pulls channel, video and comment metadata out of the YouTube Data API,
//! flattens it into plain records and persists the result as JSON.

pub mod channels;
pub mod comments;
pub mod config;
pub mod pager;
pub mod pipeline;
pub mod records;
pub mod sink;
pub mod videos;
pub mod youtube;

#[cfg(test)]
pub(crate) mod testing;
