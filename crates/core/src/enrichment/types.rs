//! Types for movie records and enrichment results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A movie record as stored in the catalog file.
///
/// The record keeps the whole JSON object so unknown fields and key order
/// survive a load/save cycle untouched. Only `cast` is ever written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieRecord(Map<String, Value>);

impl MovieRecord {
    /// Build a record from a title, optional year and optional cast.
    pub fn new(title: &str, year: Option<&str>, cast: Option<Vec<String>>) -> Self {
        let mut object = Map::new();
        object.insert("title".to_string(), Value::String(title.to_string()));
        if let Some(y) = year {
            object.insert("year".to_string(), Value::String(y.to_string()));
        }
        let mut record = Self(object);
        if let Some(cast) = cast {
            record.set_cast(cast);
        }
        record
    }

    /// Title, or `None` when missing or blank.
    pub fn title(&self) -> Option<&str> {
        self.0
            .get("title")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Release year as a string. Numeric years are rendered as strings,
    /// empty strings count as missing.
    pub fn year(&self) -> Option<String> {
        match self.0.get("year")? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Cast members, if the field holds an array.
    pub fn cast(&self) -> Option<Vec<String>> {
        self.0.get("cast").and_then(Value::as_array).map(|members| {
            members
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
    }

    /// Whether the record already carries at least one cast member.
    pub fn has_cast(&self) -> bool {
        matches!(self.0.get("cast"), Some(Value::Array(members)) if !members.is_empty())
    }

    /// Replace the cast field.
    pub fn set_cast(&mut self, cast: Vec<String>) {
        let members = cast.into_iter().map(Value::String).collect();
        self.0.insert("cast".to_string(), Value::Array(members));
    }

    /// Set `cast` to an empty list unless the field already holds an array.
    ///
    /// A missing, null or non-array `cast` counts as absent. Returns `true`
    /// if the record was changed.
    pub fn ensure_cast(&mut self) -> bool {
        match self.0.get("cast") {
            Some(Value::Array(_)) => false,
            _ => {
                self.0.insert("cast".to_string(), Value::Array(Vec::new()));
                true
            }
        }
    }

    /// Access a field other than the well-known ones.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Why the enrichment loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every record was visited.
    Completed,
    /// The configured number of successful lookups was reached.
    BudgetExhausted,
    /// Every credential was rate limited for the same record.
    PoolExhausted,
}

/// Counters collected during one enrichment run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichStats {
    /// Lookups that returned a cast.
    pub successes: usize,
    /// Records skipped because they already had a cast.
    pub skipped: usize,
    /// Records without a usable title.
    pub untitled: usize,
    /// Lookups with no match.
    pub not_found: usize,
    /// Lookups that failed for network or parse reasons.
    pub transient_errors: usize,
    /// Credential rotations caused by rate limits.
    pub rotations: usize,
    /// Total calls made to the lookup backend.
    pub lookups: usize,
    /// Intermediate checkpoints written.
    pub checkpoints: usize,
    /// Intermediate checkpoints that failed.
    pub checkpoint_failures: usize,
}

/// Result of [`CastEnricher::enrich`](super::CastEnricher::enrich).
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    /// Records in their original input order.
    pub records: Vec<MovieRecord>,
    pub stop_reason: StopReason,
    pub stats: EnrichStats,
}
