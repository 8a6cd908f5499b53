//! Cast enrichment loop.
//!
//! Walks the catalog newest-first, asks the lookup backend for each record
//! missing a cast, rotates credentials on rate limits and checkpoints
//! progress every few successes. The returned records keep input order.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::credentials::CredentialPool;
use super::pacer::{FixedDelay, RequestPacer};
use super::types::{EnrichOutcome, EnrichStats, MovieRecord, StopReason};
use crate::config::EnrichConfig;
use crate::external_catalog::{CastLookup, LookupResult};
use crate::store::{CheckpointSink, RecordStore, StoreError};

/// Tuning knobs for one enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Stop after this many successful lookups (`None`: no limit).
    pub max_requests: Option<usize>,
    /// Persist partial progress every N successful lookups.
    pub checkpoint_every: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            max_requests: None,
            checkpoint_every: 50,
        }
    }
}

impl From<&EnrichConfig> for EnrichOptions {
    fn from(config: &EnrichConfig) -> Self {
        Self {
            max_requests: config.max_requests,
            checkpoint_every: config.checkpoint_every.max(1),
        }
    }
}

/// Summary of a full load/enrich/save run.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichReport {
    pub total_records: usize,
    pub stop_reason: StopReason,
    pub stats: EnrichStats,
    /// Whether the final write succeeded.
    pub persisted: bool,
}

/// Drives cast lookups over a record sequence.
pub struct CastEnricher<L, C> {
    lookup: L,
    store: C,
    options: EnrichOptions,
    pacer: Arc<dyn RequestPacer>,
}

impl<L, C> CastEnricher<L, C>
where
    L: CastLookup,
    C: CheckpointSink,
{
    /// Create an enricher pausing one second between lookups.
    pub fn new(lookup: L, store: C, options: EnrichOptions) -> Self {
        Self {
            lookup,
            store,
            options,
            pacer: Arc::new(FixedDelay::default()),
        }
    }

    /// Replace the pacing strategy.
    pub fn with_pacer(mut self, pacer: Arc<dyn RequestPacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Enrich `records`, returning them in their original order.
    ///
    /// Every returned record has a `cast` field. Records that already had a
    /// non-empty cast are returned unchanged.
    pub async fn enrich(
        &self,
        mut records: Vec<MovieRecord>,
        pool: &mut CredentialPool,
    ) -> EnrichOutcome {
        let total = records.len();
        let max_requests = self.options.max_requests.unwrap_or(total);
        let checkpoint_every = self.options.checkpoint_every.max(1);
        let order = processing_order(&records);

        info!(
            "Enriching {} records, up to {} lookups using {} API keys",
            total,
            max_requests,
            pool.len()
        );

        let mut stats = EnrichStats::default();
        let mut stop_reason = StopReason::Completed;

        for (position, &idx) in order.iter().enumerate() {
            if stats.successes >= max_requests {
                info!(
                    "Reached request limit of {}, leaving remaining records untouched",
                    max_requests
                );
                stop_reason = StopReason::BudgetExhausted;
                break;
            }

            let record = &mut records[idx];
            if record.has_cast() {
                debug!("[{}/{}] Cast already present, skipping", position + 1, total);
                stats.skipped += 1;
                continue;
            }

            let Some(title) = record.title().map(str::to_string) else {
                debug!("[{}/{}] No title, skipping", position + 1, total);
                record.ensure_cast();
                stats.untitled += 1;
                continue;
            };
            let year = record.year();

            debug!(
                "[{}/{}] {} ({}) with API key #{}",
                position + 1,
                total,
                title,
                year.as_deref().unwrap_or("unknown year"),
                pool.cursor() + 1
            );

            let result = self
                .lookup_with_rotation(&title, year.as_deref(), pool, &mut stats)
                .await;
            debug!("  Lookup result: {}", result.label());

            let found = match result {
                LookupResult::Found(cast) => {
                    debug!("  Found {} cast members", cast.len());
                    record.set_cast(cast);
                    stats.successes += 1;
                    true
                }
                LookupResult::NotFound => {
                    debug!("  No cast information found for '{}'", title);
                    record.ensure_cast();
                    stats.not_found += 1;
                    false
                }
                LookupResult::TransientError => {
                    warn!("  Lookup failed for '{}', leaving cast empty", title);
                    record.ensure_cast();
                    stats.transient_errors += 1;
                    false
                }
                LookupResult::RateLimited => {
                    error!("All API keys have reached their limits, stopping");
                    stop_reason = StopReason::PoolExhausted;
                    break;
                }
            };

            let more_work = position + 1 < total && stats.successes < max_requests;
            if !more_work {
                continue;
            }

            if found && stats.successes % checkpoint_every == 0 {
                self.checkpoint(&records, &mut stats).await;
            }

            self.pacer.pause().await;
        }

        for record in &mut records {
            record.ensure_cast();
        }

        info!(
            "Enrichment stopped ({:?}): {} found, {} skipped, {} not found, {} errors, {} lookups",
            stop_reason,
            stats.successes,
            stats.skipped,
            stats.not_found,
            stats.transient_errors,
            stats.lookups
        );

        EnrichOutcome {
            records,
            stop_reason,
            stats,
        }
    }

    /// Look up one title, rotating credentials on rate limits.
    ///
    /// Returns `RateLimited` only once every credential in the pool was
    /// rate limited for this title.
    async fn lookup_with_rotation(
        &self,
        title: &str,
        year: Option<&str>,
        pool: &mut CredentialPool,
        stats: &mut EnrichStats,
    ) -> LookupResult {
        let start = pool.cursor();

        loop {
            stats.lookups += 1;
            let result = self.lookup.lookup(title, year, pool.current()).await;
            if result != LookupResult::RateLimited {
                return result;
            }

            warn!("API limit reached for key #{}", pool.cursor() + 1);
            let next = pool.rotate();
            stats.rotations += 1;
            if next == start {
                return LookupResult::RateLimited;
            }
            info!("Switching to API key #{}", next + 1);
        }
    }

    async fn checkpoint(&self, records: &[MovieRecord], stats: &mut EnrichStats) {
        match self.store.save(records).await {
            Ok(()) => {
                stats.checkpoints += 1;
                info!(
                    "Progress saved: {} found, {} skipped",
                    stats.successes, stats.skipped
                );
            }
            Err(e) => {
                stats.checkpoint_failures += 1;
                warn!("Error saving progress: {}", e);
            }
        }
    }
}

impl<L, C> CastEnricher<L, C>
where
    L: CastLookup,
    C: RecordStore,
{
    /// Load records, enrich them and write the result.
    ///
    /// A load failure aborts before any lookup. A failed final write is
    /// logged and reported through [`EnrichReport::persisted`].
    pub async fn run(&self, mut pool: CredentialPool) -> Result<EnrichReport, StoreError> {
        let records = self.store.load().await?;
        let total_records = records.len();
        info!("Loaded {} movies", total_records);

        let outcome = self.enrich(records, &mut pool).await;

        let persisted = match self.store.save(&outcome.records).await {
            Ok(()) => {
                info!("Updated movies saved ({} records)", total_records);
                true
            }
            Err(e) => {
                error!("Error saving file: {}", e);
                false
            }
        };

        Ok(EnrichReport {
            total_records,
            stop_reason: outcome.stop_reason,
            stats: outcome.stats,
            persisted,
        })
    }
}

/// Indices of `records` sorted newest year first.
///
/// Years compare as strings; records without a year go last. The sort is
/// stable so equal years keep input order.
fn processing_order(records: &[MovieRecord]) -> Vec<usize> {
    let years: Vec<Option<String>> = records.iter().map(MovieRecord::year).collect();
    let mut order: Vec<usize> = (0..records.len()).collect();
    order.sort_by(|&a, &b| years[b].cmp(&years[a]));
    order
}
