use serde::{Deserialize, Serialize};

/// A channel entry from the channels config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// YouTube channel ID (`UC...`).
    pub id: String,
    /// Display name, used when the feed carries no title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A video as stored in the videos JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub title: String,
    pub video_id: String,
    /// Publication timestamp as given by the feed (RFC 3339).
    pub published: String,
    #[serde(default)]
    pub thumbnail: String,
    pub channel_id: String,
    #[serde(default)]
    pub channel_name: String,
}

/// A video parsed out of a channel feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedVideo {
    pub video_id: String,
    pub title: String,
    pub published: String,
    pub thumbnail: Option<String>,
}

/// A parsed channel feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFeed {
    /// Channel title from the feed header.
    pub title: Option<String>,
    pub videos: Vec<FeedVideo>,
}

impl ParsedFeed {
    /// Convert the videos into store entries for `channel`.
    pub fn into_entries(self, channel: &Channel) -> Vec<FeedEntry> {
        let channel_name = self
            .title
            .or_else(|| channel.name.clone())
            .unwrap_or_default();

        self.videos
            .into_iter()
            .map(|v| FeedEntry {
                title: v.title,
                video_id: v.video_id,
                published: v.published,
                thumbnail: v.thumbnail.unwrap_or_default(),
                channel_id: channel.id.clone(),
                channel_name: channel_name.clone(),
            })
            .collect()
    }
}

/// Summary of a feed collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedReport {
    /// Channels fetched successfully.
    pub channels_fetched: usize,
    /// Channels whose feed could not be fetched.
    pub channels_failed: usize,
    /// Videos not previously in the store.
    pub added: usize,
    /// Videos in the store after the merge.
    pub total: usize,
}
