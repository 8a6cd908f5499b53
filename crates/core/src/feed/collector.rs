use std::path::Path;

use tracing::{info, warn};

use super::merge::merge_entries;
use super::types::{Channel, FeedEntry, FeedReport};
use super::{FeedError, VideoFeed};
use crate::store::{read_json_array, read_json_array_or_default, write_json_array};

/// Read the channels config file.
pub async fn load_channels(path: &Path) -> Result<Vec<Channel>, FeedError> {
    let channels: Vec<Channel> = read_json_array(path).await?;
    Ok(channels)
}

/// Fetch every channel feed, merge new videos into the store at
/// `store_path` and write it back once.
///
/// Channels whose feed cannot be fetched are logged and skipped. A missing
/// store counts as empty; an unreadable one aborts before anything is
/// written.
pub async fn collect_feeds<F>(
    source: &F,
    channels: &[Channel],
    store_path: &Path,
) -> Result<FeedReport, FeedError>
where
    F: VideoFeed + ?Sized,
{
    if channels.is_empty() {
        return Err(FeedError::NoChannels);
    }

    let existing: Vec<FeedEntry> = read_json_array_or_default(store_path).await?;
    info!(
        "Loaded {} stored videos from {}",
        existing.len(),
        store_path.display()
    );

    let mut report = FeedReport::default();
    let mut fresh = Vec::new();

    for channel in channels {
        match source.fetch(&channel.id).await {
            Ok(feed) => {
                let entries = feed.into_entries(channel);
                info!("Channel {}: {} videos in feed", channel.id, entries.len());
                fresh.extend(entries);
                report.channels_fetched += 1;
            }
            Err(e) => {
                warn!("Skipping channel {}: {}", channel.id, e);
                report.channels_failed += 1;
            }
        }
    }

    let merged = merge_entries(fresh, existing);
    report.added = merged.added;
    report.total = merged.entries.len();

    write_json_array(store_path, &merged.entries).await?;
    info!("Added {} new videos ({} total)", report.added, report.total);

    Ok(report)
}
