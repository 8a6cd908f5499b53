use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub enrich: EnrichConfig,
    #[serde(default)]
    pub feed: FeedConfig,
}

/// Cast enrichment configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichConfig {
    /// JSON array of movie records to enrich.
    #[serde(default = "default_movies_path")]
    pub input: PathBuf,
    /// Where results are written (default: overwrite `input`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Pause between lookups in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Maximum number of successful lookups (default: all records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_requests: Option<usize>,
    /// Persist partial progress every N successful lookups.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
}

impl EnrichConfig {
    /// Resolved output path.
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| self.input.clone())
    }
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            input: default_movies_path(),
            output: None,
            delay_ms: default_delay_ms(),
            max_requests: None,
            checkpoint_every: default_checkpoint_every(),
        }
    }
}

fn default_movies_path() -> PathBuf {
    PathBuf::from("movies.json")
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_checkpoint_every() -> usize {
    50
}

/// OMDb API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    /// Pool of interchangeable API keys, tried in order.
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Base URL (default: http://www.omdbapi.com).
    #[serde(default = "default_omdb_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            base_url: default_omdb_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_omdb_url() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Video feed collection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    /// JSON array of channels (`[{"id": "UC..."}]`).
    #[serde(default = "default_channels_path")]
    pub channels: PathBuf,
    /// JSON store of previously collected videos.
    #[serde(default = "default_videos_path")]
    pub store: PathBuf,
    /// Feed endpoint (default: https://www.youtube.com/feeds/videos.xml).
    #[serde(default = "default_feed_url")]
    pub base_url: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            channels: default_channels_path(),
            store: default_videos_path(),
            base_url: default_feed_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_channels_path() -> PathBuf {
    PathBuf::from("channels.json")
}

fn default_videos_path() -> PathBuf {
    PathBuf::from("videos.json")
}

fn default_feed_url() -> String {
    "https://www.youtube.com/feeds/videos.xml".to_string()
}

/// Sanitized config for logging (API keys redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub enrich: EnrichConfig,
    pub omdb: SanitizedOmdbConfig,
    pub feed: FeedConfig,
}

/// Sanitized OMDb config (keys hidden, only counted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedOmdbConfig {
    pub base_url: String,
    pub api_keys_configured: usize,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            enrich: config.enrich.clone(),
            omdb: SanitizedOmdbConfig {
                base_url: config.omdb.base_url.clone(),
                api_keys_configured: config.omdb.api_keys.len(),
                timeout_secs: config.omdb.timeout_secs,
            },
            feed: config.feed.clone(),
        }
    }
}
