use chrono::{DateTime, FixedOffset};
use std::cmp::Reverse;
use std::collections::HashSet;

use super::types::FeedEntry;

/// Result of merging freshly fetched entries into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Deduplicated entries, newest first.
    pub entries: Vec<FeedEntry>,
    /// How many entries were not in the store before.
    pub added: usize,
}

/// Merge `fresh` entries into `existing`.
///
/// Fresh entries win over stored ones with the same video ID. The result is
/// sorted by publication time, newest first; entries with an unparsable
/// timestamp go last in their original relative order.
pub fn merge_entries(fresh: Vec<FeedEntry>, existing: Vec<FeedEntry>) -> MergeOutcome {
    let known: HashSet<String> = existing.iter().map(|e| e.video_id.clone()).collect();

    let mut seen = HashSet::new();
    let mut added = 0;
    let mut entries = Vec::with_capacity(fresh.len() + existing.len());

    for (is_fresh, entry) in fresh
        .into_iter()
        .map(|e| (true, e))
        .chain(existing.into_iter().map(|e| (false, e)))
    {
        if !seen.insert(entry.video_id.clone()) {
            continue;
        }
        if is_fresh && !known.contains(&entry.video_id) {
            added += 1;
        }
        entries.push(entry);
    }

    entries.sort_by_key(|e| Reverse(published_at(e)));

    MergeOutcome { entries, added }
}

fn published_at(entry: &FeedEntry) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(&entry.published).ok()
}
