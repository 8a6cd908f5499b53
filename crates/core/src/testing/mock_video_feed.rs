//! Mock video feed for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::feed::{FeedError, ParsedFeed, VideoFeed};

/// Mock implementation of the VideoFeed trait.
///
/// Channels without a configured feed fail with an HTTP 404 error.
#[derive(Debug, Clone, Default)]
pub struct MockVideoFeed {
    feeds: Arc<RwLock<HashMap<String, ParsedFeed>>>,
    fetched: Arc<RwLock<Vec<String>>>,
}

impl MockVideoFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `feed` for `channel_id`.
    pub async fn set_feed(&self, channel_id: &str, feed: ParsedFeed) {
        self.feeds.write().await.insert(channel_id.to_string(), feed);
    }

    /// Channel IDs fetched, in call order.
    pub async fn fetched_channels(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }
}

#[async_trait]
impl VideoFeed for MockVideoFeed {
    async fn fetch(&self, channel_id: &str) -> Result<ParsedFeed, FeedError> {
        self.fetched.write().await.push(channel_id.to_string());

        self.feeds
            .read()
            .await
            .get(channel_id)
            .cloned()
            .ok_or_else(|| FeedError::Status {
                channel_id: channel_id.to_string(),
                status: 404,
            })
    }
}
