//! Types shared by cast lookup clients.

/// Outcome of a single cast lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResult {
    /// The title was matched; cast members in billing order.
    Found(Vec<String>),
    /// The catalog has no match for the title/year.
    NotFound,
    /// The credential is over quota or was rejected.
    RateLimited,
    /// Network failure or malformed response.
    TransientError,
}

impl LookupResult {
    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            LookupResult::Found(_) => "found",
            LookupResult::NotFound => "not_found",
            LookupResult::RateLimited => "rate_limited",
            LookupResult::TransientError => "transient_error",
        }
    }
}

/// The credential a lookup should authenticate with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential<'a> {
    /// Position of the token in the pool.
    pub index: usize,
    /// Opaque API token.
    pub token: &'a str,
}

/// Split an OMDb-style comma separated actor list.
///
/// `"N/A"` and blank lists yield an empty vector.
pub fn split_cast(actors: &str) -> Vec<String> {
    let actors = actors.trim();
    if actors.is_empty() || actors.eq_ignore_ascii_case("n/a") {
        return Vec::new();
    }

    actors
        .split(',')
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(|a| a.to_string())
        .collect()
}
