//! YouTube channel feed collection.
//!
//! Fetches each configured channel's Atom feed and merges unseen videos
//! into a JSON store, newest first.

mod collector;
mod merge;
mod parser;
mod types;
mod youtube;

pub use collector::{collect_feeds, load_channels};
pub use merge::{merge_entries, MergeOutcome};
pub use parser::parse_youtube_feed;
pub use types::*;
pub use youtube::YoutubeFeedClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Feed for channel {channel_id} returned HTTP {status}")]
    Status { channel_id: String, status: u16 },

    #[error("Failed to parse feed: {0}")]
    Parse(String),

    #[error("No channels configured")]
    NoChannels,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Source of channel feeds.
#[async_trait]
pub trait VideoFeed: Send + Sync {
    /// Fetch and parse the feed of `channel_id`.
    async fn fetch(&self, channel_id: &str) -> Result<ParsedFeed, FeedError>;
}
