//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the lookup, storage and feed
//! traits, allowing the enrichment loop and feed collector to be tested
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use marquee_core::testing::{fixtures, MockCastLookup, MockRecordStore};
//!
//! let lookup = MockCastLookup::new();
//! let store = MockRecordStore::with_records(vec![fixtures::movie("Vikram", "2022")]);
//!
//! lookup.set_cast("Vikram", &["Kamal Haasan"]).await;
//! let enricher = fixtures::enricher(lookup.clone(), store.clone(), EnrichOptions::default());
//! ```

mod mock_cast_lookup;
mod mock_record_store;
mod mock_video_feed;

pub use mock_cast_lookup::{MockCastLookup, RecordedLookup};
pub use mock_record_store::MockRecordStore;
pub use mock_video_feed::MockVideoFeed;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::enrichment::{
        CastEnricher, CredentialPool, EnrichOptions, FixedDelay, MovieRecord,
    };
    use crate::external_catalog::CastLookup;
    use crate::feed::{FeedVideo, ParsedFeed};
    use crate::store::CheckpointSink;

    /// A record with a title and year but no cast.
    pub fn movie(title: &str, year: &str) -> MovieRecord {
        MovieRecord::new(title, Some(year), None)
    }

    /// A record that already has a cast.
    pub fn movie_with_cast(title: &str, year: &str, cast: &[&str]) -> MovieRecord {
        MovieRecord::new(
            title,
            Some(year),
            Some(cast.iter().map(|c| c.to_string()).collect()),
        )
    }

    /// `count` distinct uncast records, titled `Movie 0`, `Movie 1`, ...
    pub fn movies(count: usize) -> Vec<MovieRecord> {
        (0..count)
            .map(|i| movie(&format!("Movie {}", i), "2020"))
            .collect()
    }

    /// A pool of `size` tokens named `key-0`, `key-1`, ...
    pub fn credential_pool(size: usize) -> CredentialPool {
        CredentialPool::new((0..size).map(|i| format!("key-{}", i)).collect())
            .expect("pool size must be at least 1")
    }

    /// An enricher that does not sleep between lookups.
    pub fn enricher<L, C>(lookup: L, store: C, options: EnrichOptions) -> CastEnricher<L, C>
    where
        L: CastLookup,
        C: CheckpointSink,
    {
        CastEnricher::new(lookup, store, options)
            .with_pacer(Arc::new(FixedDelay(Duration::ZERO)))
    }

    /// A parsed feed holding `ids` with increasing publication dates.
    pub fn feed(title: &str, ids: &[&str]) -> ParsedFeed {
        ParsedFeed {
            title: Some(title.to_string()),
            videos: ids
                .iter()
                .enumerate()
                .map(|(i, id)| FeedVideo {
                    video_id: id.to_string(),
                    title: format!("Video {}", id),
                    published: format!("2024-01-{:02}T10:00:00+00:00", i + 1),
                    thumbnail: Some(format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", id)),
                })
                .collect(),
        }
    }
}
