//! YouTube channel feed client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::parser::parse_youtube_feed;
use super::types::ParsedFeed;
use super::{FeedError, VideoFeed};
use crate::config::FeedConfig;

/// Fetches the public Atom feed of a YouTube channel.
pub struct YoutubeFeedClient {
    client: Client,
    base_url: String,
}

impl YoutubeFeedClient {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl VideoFeed for YoutubeFeedClient {
    async fn fetch(&self, channel_id: &str) -> Result<ParsedFeed, FeedError> {
        debug!("Fetching feed for channel {}", channel_id);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("channel_id", channel_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                channel_id: channel_id.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        parse_youtube_feed(&body)
    }
}
