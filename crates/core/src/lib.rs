pub mod config;
pub mod enrichment;
pub mod external_catalog;
pub mod feed;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, EnrichConfig,
    FeedConfig, OmdbConfig, SanitizedConfig,
};
pub use enrichment::{
    CastEnricher, CredentialError, CredentialPool, EnrichOptions, EnrichOutcome, EnrichReport,
    EnrichStats, FixedDelay, MovieRecord, RequestPacer, StopReason,
};
pub use external_catalog::{CastLookup, Credential, ExternalCatalogError, LookupResult, OmdbClient};
pub use feed::{
    collect_feeds, load_channels, Channel, FeedEntry, FeedError, FeedReport, VideoFeed,
    YoutubeFeedClient,
};
pub use store::{CheckpointSink, MovieStore, RecordStore, StoreError};
