//! Cast enrichment of movie catalog records.
//!
//! Records missing a cast are looked up newest-first through a
//! [`CastLookup`](crate::external_catalog::CastLookup) backend. Rate limited
//! credentials are rotated out of a [`CredentialPool`], and a run stops early
//! once every credential is exhausted or the request budget is spent. Partial
//! progress is checkpointed through a [`CheckpointSink`](crate::store::CheckpointSink).

mod credentials;
mod pacer;
mod runner;
mod types;

pub use credentials::{CredentialError, CredentialPool};
pub use pacer::{FixedDelay, RequestPacer};
pub use runner::{CastEnricher, EnrichOptions, EnrichReport};
pub use types::*;
