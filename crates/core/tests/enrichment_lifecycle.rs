//! Enrichment loop integration tests.
//!
//! These tests drive the cast enricher with a scripted lookup and an
//! in-memory store:
//! - Output order, length and untouched records
//! - Request budget and credential rotation
//! - Pool exhaustion as an orderly stop
//! - Checkpoint cadence and failure handling
//! - Pauses between lookups

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use marquee_core::{
    enrichment::{CastEnricher, EnrichOptions, MovieRecord, RequestPacer, StopReason},
    external_catalog::LookupResult,
    store::{MovieStore, RecordStore},
    testing::{fixtures, MockCastLookup, MockRecordStore, RecordedLookup},
};

fn titles(records: &[MovieRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.title().unwrap_or_default().to_string())
        .collect()
}

fn default_enricher(lookup: &MockCastLookup) -> CastEnricher<MockCastLookup, MockRecordStore> {
    fixtures::enricher(
        lookup.clone(),
        MockRecordStore::default(),
        EnrichOptions::default(),
    )
}

fn uncast_count(records: &[MovieRecord]) -> usize {
    records.iter().filter(|r| !r.has_cast()).count()
}

/// Pacer that only counts how often it was asked to wait.
#[derive(Default)]
struct CountingPacer {
    pauses: AtomicUsize,
}

impl CountingPacer {
    fn count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestPacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

fn counting_enricher(
    lookup: &MockCastLookup,
    options: EnrichOptions,
) -> (CastEnricher<MockCastLookup, MockRecordStore>, Arc<CountingPacer>) {
    let pacer = Arc::new(CountingPacer::default());
    let enricher = fixtures::enricher(lookup.clone(), MockRecordStore::default(), options)
        .with_pacer(pacer.clone());
    (enricher, pacer)
}

// =============================================================================
// Record semantics
// =============================================================================

#[tokio::test]
async fn test_enriches_missing_cast_and_keeps_input_order() {
    let lookup = MockCastLookup::new();
    lookup.set_cast("B", &["Y", "Z"]).await;

    let records = vec![
        fixtures::movie_with_cast("A", "2020", &["X"]),
        fixtures::movie("B", "2021"),
    ];
    let enricher = default_enricher(&lookup);
    let mut pool = fixtures::credential_pool(3);

    let outcome = enricher.enrich(records, &mut pool).await;

    assert_eq!(outcome.stop_reason, StopReason::Completed);
    assert_eq!(titles(&outcome.records), vec!["A", "B"]);
    assert_eq!(outcome.records[0].cast(), Some(vec!["X".to_string()]));
    assert_eq!(
        outcome.records[1].cast(),
        Some(vec!["Y".to_string(), "Z".to_string()])
    );
    assert_eq!(outcome.stats.successes, 1);
    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(
        lookup.recorded_lookups().await,
        vec![RecordedLookup {
            title: "B".to_string(),
            year: Some("2021".to_string()),
            credential_index: 0,
        }]
    );
}

#[tokio::test]
async fn test_processes_newest_first_but_returns_input_order() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Someone".to_string()])).await;

    let records = vec![
        fixtures::movie("Nayakan", "1987"),
        MovieRecord::new("Undated", None, None),
        fixtures::movie("Jailer", "2023"),
        fixtures::movie("Asuran", "2019"),
    ];
    let input_titles = titles(&records);

    let enricher = default_enricher(&lookup);
    let outcome = enricher.enrich(records, &mut fixtures::credential_pool(1)).await;

    assert_eq!(
        lookup.looked_up_titles().await,
        vec!["Jailer", "Asuran", "Nayakan", "Undated"]
    );
    assert_eq!(titles(&outcome.records), input_titles);
    assert_eq!(uncast_count(&outcome.records), 0);
}

#[tokio::test]
async fn test_records_with_cast_are_byte_identical() {
    let raw = r#"[
        {"title": "Vikram", "cast": ["Kamal Haasan", "Vijay Sethupathi"], "year": "2022", "rating": 8.3},
        {"poster": null, "title": "Leo", "year": 2023},
        {"title": "Master", "year": "2021", "cast": ["Vijay"], "genres": ["Action", "Thriller"]}
    ]"#;
    let records: Vec<MovieRecord> = serde_json::from_str(raw).unwrap();
    let before: Vec<String> = records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();

    let lookup = MockCastLookup::new();
    lookup.set_cast("Leo", &["Vijay", "Trisha"]).await;
    let enricher = default_enricher(&lookup);
    let outcome = enricher.enrich(records, &mut fixtures::credential_pool(2)).await;

    let after: Vec<String> = outcome
        .records
        .iter()
        .map(|r| serde_json::to_string(r).unwrap())
        .collect();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(
        after[1],
        r#"{"poster":null,"title":"Leo","year":2023,"cast":["Vijay","Trisha"]}"#
    );
    assert_eq!(lookup.lookup_count().await, 1);
}

#[tokio::test]
async fn test_every_output_record_has_cast() {
    let lookup = MockCastLookup::new();
    lookup.push_result("Unknown Film", LookupResult::NotFound).await;
    lookup.push_result("Flaky Film", LookupResult::TransientError).await;
    lookup.set_cast("Known Film", &["Actor"]).await;

    let untitled: MovieRecord = serde_json::from_str(r#"{"year": "2001", "id": 7}"#).unwrap();
    let null_cast: MovieRecord =
        serde_json::from_str(r#"{"title": "Known Film", "year": "2005", "cast": null}"#).unwrap();
    let records = vec![
        fixtures::movie("Unknown Film", "2010"),
        untitled,
        fixtures::movie("Flaky Film", "2012"),
        null_cast,
    ];

    let enricher = default_enricher(&lookup);
    let outcome = enricher.enrich(records, &mut fixtures::credential_pool(1)).await;

    assert!(outcome.records.iter().all(|r| r.cast().is_some()));
    assert_eq!(outcome.records[0].cast(), Some(vec![]));
    assert_eq!(outcome.records[1].cast(), Some(vec![]));
    assert_eq!(outcome.records[1].get("id"), Some(&serde_json::json!(7)));
    assert_eq!(outcome.records[3].cast(), Some(vec!["Actor".to_string()]));
    assert_eq!(outcome.stats.untitled, 1);
    assert_eq!(outcome.stats.not_found, 1);
    assert_eq!(outcome.stats.transient_errors, 1);
    assert_eq!(outcome.stats.successes, 1);
}

#[tokio::test]
async fn test_malformed_cast_is_replaced_when_not_found() {
    let lookup = MockCastLookup::new();
    let records: Vec<MovieRecord> = serde_json::from_str(
        r#"[{"title": "Master", "year": "2021", "cast": "Vijay"}]"#,
    )
    .unwrap();

    let outcome = default_enricher(&lookup)
        .enrich(records, &mut fixtures::credential_pool(1))
        .await;

    assert_eq!(lookup.looked_up_titles().await, vec!["Master"]);
    assert_eq!(outcome.records[0].cast(), Some(vec![]));
}

#[tokio::test]
async fn test_not_found_and_transient_are_not_retried() {
    let lookup = MockCastLookup::new();
    lookup.push_result("Flaky", LookupResult::TransientError).await;
    lookup.set_cast("Flaky", &["Never Reached"]).await;

    let enricher = default_enricher(&lookup);
    let outcome = enricher
        .enrich(vec![fixtures::movie("Flaky", "2015")], &mut fixtures::credential_pool(2))
        .await;

    assert_eq!(lookup.lookup_count().await, 1);
    assert_eq!(outcome.records[0].cast(), Some(vec![]));
}

#[tokio::test]
async fn test_empty_cast_list_is_looked_up() {
    let lookup = MockCastLookup::new();
    lookup.set_cast("Soorarai Pottru", &["Suriya"]).await;

    let record = MovieRecord::new("Soorarai Pottru", Some("2020"), Some(vec![]));
    let enricher = default_enricher(&lookup);
    let outcome = enricher.enrich(vec![record], &mut fixtures::credential_pool(1)).await;

    assert_eq!(outcome.records[0].cast(), Some(vec!["Suriya".to_string()]));
}

// =============================================================================
// Request budget
// =============================================================================

#[tokio::test]
async fn test_zero_budget_makes_no_lookups() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let records = vec![
        fixtures::movie("One", "2020"),
        fixtures::movie_with_cast("Two", "2019", &["Cast"]),
        fixtures::movie("Three", "2018"),
    ];
    let options = EnrichOptions {
        max_requests: Some(0),
        ..EnrichOptions::default()
    };
    let enricher = fixtures::enricher(lookup.clone(), MockRecordStore::default(), options);
    let outcome = enricher.enrich(records.clone(), &mut fixtures::credential_pool(2)).await;

    assert_eq!(lookup.lookup_count().await, 0);
    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);

    let mut expected = records;
    for record in &mut expected {
        record.ensure_cast();
    }
    assert_eq!(outcome.records, expected);
}

#[tokio::test]
async fn test_budget_counts_only_successes() {
    let lookup = MockCastLookup::new();
    lookup.push_result("Miss", LookupResult::NotFound).await;
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let records = vec![
        fixtures::movie("Oldest", "2001"),
        fixtures::movie("Miss", "2024"),
        fixtures::movie("Newer", "2023"),
        fixtures::movie("Middle", "2010"),
    ];
    let options = EnrichOptions {
        max_requests: Some(2),
        ..EnrichOptions::default()
    };
    let enricher = fixtures::enricher(lookup.clone(), MockRecordStore::default(), options);
    let outcome = enricher.enrich(records, &mut fixtures::credential_pool(1)).await;

    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(outcome.stats.successes, 2);
    assert_eq!(
        lookup.looked_up_titles().await,
        vec!["Miss", "Newer", "Middle"]
    );
    assert_eq!(outcome.records[0].cast(), Some(vec![]));
    assert_eq!(titles(&outcome.records), vec!["Oldest", "Miss", "Newer", "Middle"]);
}

// =============================================================================
// Credential rotation
// =============================================================================

#[tokio::test]
async fn test_rate_limit_rotates_and_keeps_new_key() {
    let lookup = MockCastLookup::new();
    lookup.limit_credential(0).await;
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let records = vec![fixtures::movie("First", "2022"), fixtures::movie("Second", "2021")];
    let enricher = default_enricher(&lookup);
    let mut pool = fixtures::credential_pool(3);
    let outcome = enricher.enrich(records, &mut pool).await;

    let used: Vec<usize> = lookup
        .recorded_lookups()
        .await
        .iter()
        .map(|l| l.credential_index)
        .collect();
    assert_eq!(used, vec![0, 1, 1]);
    assert_eq!(pool.cursor(), 1);
    assert_eq!(outcome.stats.rotations, 1);
    assert_eq!(outcome.stats.successes, 2);
}

#[tokio::test]
async fn test_pool_exhaustion_stops_after_one_attempt_per_key() {
    let lookup = MockCastLookup::new();
    for key in 0..3 {
        lookup.limit_credential(key).await;
    }

    let records = vec![
        fixtures::movie("Blocked", "2022"),
        fixtures::movie_with_cast("Done", "2021", &["Cast"]),
        fixtures::movie("Later", "2020"),
    ];
    let enricher = default_enricher(&lookup);
    let outcome = enricher.enrich(records, &mut fixtures::credential_pool(3)).await;

    assert_eq!(outcome.stop_reason, StopReason::PoolExhausted);
    assert_eq!(lookup.lookup_count().await, 3);
    assert_eq!(lookup.looked_up_titles().await, vec!["Blocked"; 3]);
    assert_eq!(titles(&outcome.records), vec!["Blocked", "Done", "Later"]);
    assert_eq!(outcome.records[1].cast(), Some(vec!["Cast".to_string()]));
    assert_eq!(outcome.records[2].cast(), Some(vec![]));
}

#[tokio::test]
async fn test_exhaustion_is_measured_from_the_current_key() {
    let lookup = MockCastLookup::new();
    lookup.limit_credential(0).await;
    lookup.set_cast("First", &["Actor"]).await;

    let enricher = default_enricher(&lookup);
    let mut pool = fixtures::credential_pool(3);

    // Key 0 is limited, key 1 answers and becomes current.
    let first = enricher.enrich(vec![fixtures::movie("First", "2022")], &mut pool).await;
    assert_eq!(first.stats.successes, 1);
    assert_eq!(pool.cursor(), 1);

    lookup.limit_credential(1).await;
    lookup.limit_credential(2).await;
    let outcome = enricher.enrich(vec![fixtures::movie("Second", "2021")], &mut pool).await;

    let used: Vec<usize> = lookup
        .recorded_lookups()
        .await
        .iter()
        .map(|l| l.credential_index)
        .collect();
    assert_eq!(used, vec![0, 1, 1, 2, 0]);
    assert_eq!(outcome.stop_reason, StopReason::PoolExhausted);
}

// =============================================================================
// Pacing
// =============================================================================

#[tokio::test]
async fn test_pauses_between_lookups_but_not_after_last() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let (enricher, pacer) = counting_enricher(&lookup, EnrichOptions::default());
    let outcome = enricher
        .enrich(fixtures::movies(4), &mut fixtures::credential_pool(1))
        .await;

    assert_eq!(outcome.stats.lookups, 4);
    assert_eq!(pacer.count(), 3);
}

#[tokio::test]
async fn test_no_pause_once_budget_is_spent() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let options = EnrichOptions {
        max_requests: Some(2),
        ..EnrichOptions::default()
    };
    let (enricher, pacer) = counting_enricher(&lookup, options);
    let outcome = enricher
        .enrich(fixtures::movies(4), &mut fixtures::credential_pool(1))
        .await;

    assert_eq!(outcome.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(pacer.count(), 1);
}

#[tokio::test]
async fn test_failed_lookups_also_pause() {
    let lookup = MockCastLookup::new();
    lookup.push_result("Miss", LookupResult::NotFound).await;
    lookup.push_result("Broken", LookupResult::TransientError).await;

    let records = vec![
        fixtures::movie("Miss", "2024"),
        fixtures::movie("Broken", "2023"),
        fixtures::movie("Last", "2022"),
    ];
    let (enricher, pacer) = counting_enricher(&lookup, EnrichOptions::default());
    enricher
        .enrich(records, &mut fixtures::credential_pool(1))
        .await;

    assert_eq!(pacer.count(), 2);
}

#[tokio::test]
async fn test_skipped_and_untitled_records_do_not_pause() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;

    let records = vec![
        fixtures::movie_with_cast("Has Cast", "2024", &["Someone"]),
        MovieRecord::new("  ", Some("2023"), None),
        fixtures::movie("First", "2022"),
        fixtures::movie("Second", "2021"),
    ];
    let (enricher, pacer) = counting_enricher(&lookup, EnrichOptions::default());
    let outcome = enricher
        .enrich(records, &mut fixtures::credential_pool(1))
        .await;

    assert_eq!(outcome.stats.skipped, 1);
    assert_eq!(outcome.stats.untitled, 1);
    assert_eq!(outcome.stats.lookups, 2);
    assert_eq!(pacer.count(), 1);
}

// =============================================================================
// Checkpointing and persistence
// =============================================================================

#[tokio::test]
async fn test_checkpoints_after_every_fifty_successes() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;
    let store = MockRecordStore::with_records(fixtures::movies(120));

    let enricher = fixtures::enricher(lookup.clone(), store.clone(), EnrichOptions::default());
    let report = assert_ok!(enricher.run(fixtures::credential_pool(2)).await);

    assert_eq!(report.stop_reason, StopReason::Completed);
    assert_eq!(report.stats.successes, 120);
    assert_eq!(report.stats.checkpoints, 2);
    assert!(report.persisted);

    let saves = store.saves().await;
    assert_eq!(saves.len(), 3);
    assert!(saves.iter().all(|s| s.len() == 120));
    assert_eq!(saves[0].iter().filter(|r| r.has_cast()).count(), 50);
    assert_eq!(saves[1].iter().filter(|r| r.has_cast()).count(), 100);
    assert_eq!(uncast_count(&saves[2]), 0);
}

#[tokio::test]
async fn test_no_checkpoint_when_last_record_hits_multiple() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;
    let store = MockRecordStore::with_records(fixtures::movies(100));

    let enricher = fixtures::enricher(lookup, store.clone(), EnrichOptions::default());
    let report = assert_ok!(enricher.run(fixtures::credential_pool(1)).await);

    assert_eq!(report.stats.checkpoints, 1);
    assert_eq!(store.save_count().await, 2);
}

#[tokio::test]
async fn test_no_checkpoint_when_budget_ends_on_multiple() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;
    let store = MockRecordStore::with_records(fixtures::movies(60));

    let options = EnrichOptions {
        max_requests: Some(50),
        ..EnrichOptions::default()
    };
    let enricher = fixtures::enricher(lookup, store.clone(), options);
    let report = assert_ok!(enricher.run(fixtures::credential_pool(1)).await);

    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.stats.checkpoints, 0);
    assert_eq!(store.save_count().await, 1);
}

#[tokio::test]
async fn test_checkpoint_failure_does_not_stop_the_run() {
    let lookup = MockCastLookup::new();
    lookup.set_fallback(LookupResult::Found(vec!["Actor".to_string()])).await;
    let store = MockRecordStore::with_records(fixtures::movies(6));
    store.fail_save(1).await;

    let options = EnrichOptions {
        checkpoint_every: 2,
        ..EnrichOptions::default()
    };
    let enricher = fixtures::enricher(lookup, store.clone(), options);
    let report = assert_ok!(enricher.run(fixtures::credential_pool(1)).await);

    assert_eq!(report.stats.successes, 6);
    assert_eq!(report.stats.checkpoint_failures, 1);
    assert_eq!(report.stats.checkpoints, 1);
    assert!(report.persisted);
    assert_eq!(store.save_count().await, 2);
}

#[tokio::test]
async fn test_pool_exhaustion_still_persists_progress() {
    let lookup = MockCastLookup::new();
    lookup.set_cast("Movie 0", &["Actor"]).await;
    lookup.set_cast("Movie 1", &["Actor"]).await;
    lookup.set_fallback(LookupResult::RateLimited).await;
    let store = MockRecordStore::with_records(fixtures::movies(5));

    let enricher = fixtures::enricher(lookup, store.clone(), EnrichOptions::default());
    let report = assert_ok!(enricher.run(fixtures::credential_pool(2)).await);

    assert_eq!(report.stop_reason, StopReason::PoolExhausted);
    assert!(report.persisted);

    let saved = store.last_save().await.unwrap();
    assert_eq!(saved.len(), 5);
    assert_eq!(saved.iter().filter(|r| r.has_cast()).count(), 2);
    assert_eq!(uncast_count(&saved), 3);
    assert!(saved.iter().all(|r| r.cast().is_some()));
}

#[tokio::test]
async fn test_load_failure_aborts_before_lookups() {
    let lookup = MockCastLookup::new();
    let store = MockRecordStore::with_records(fixtures::movies(3));
    store.fail_load().await;

    let enricher = fixtures::enricher(lookup.clone(), store.clone(), EnrichOptions::default());
    assert_err!(enricher.run(fixtures::credential_pool(1)).await);
    assert_eq!(lookup.lookup_count().await, 0);
    assert_eq!(store.save_count().await, 0);
}

#[tokio::test]
async fn test_final_write_failure_is_reported() {
    let lookup = MockCastLookup::new();
    let store = MockRecordStore::with_records(fixtures::movies(2));
    store.fail_save(1).await;

    let enricher = fixtures::enricher(lookup, store, EnrichOptions::default());
    let report = assert_ok!(enricher.run(fixtures::credential_pool(1)).await);

    assert!(!report.persisted);
    assert_eq!(report.total_records, 2);
}

#[tokio::test]
async fn test_run_against_json_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("movies.json");
    std::fs::write(
        &path,
        r#"[
  {"title": "Kaithi", "year": "2019", "director": "Lokesh Kanagaraj"},
  {"title": "Vikram", "year": "2022", "cast": ["Kamal Haasan"]}
]"#,
    )
    .unwrap();

    let lookup = MockCastLookup::new();
    lookup.set_cast("Kaithi", &["Karthi", "Narain"]).await;
    let store = MovieStore::in_place(&path);

    let enricher = fixtures::enricher(lookup, store.clone(), EnrichOptions::default());
    let report = assert_ok!(enricher.run(fixtures::credential_pool(1)).await);
    assert!(report.persisted);

    let reloaded = assert_ok!(store.load().await);
    assert_eq!(
        serde_json::to_string(&reloaded[0]).unwrap(),
        r#"{"title":"Kaithi","year":"2019","director":"Lokesh Kanagaraj","cast":["Karthi","Narain"]}"#
    );
    assert_eq!(reloaded[1].cast(), Some(vec!["Kamal Haasan".to_string()]));
}
