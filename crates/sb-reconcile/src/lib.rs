//! sb-reconcile
//!
//! Build-status reconciliation engine.
//!
//! Architectural decisions:
//! - One canonical status per build: Pending / Success / Failure
//! - Cache keyed by commit, not by job (two jobs on one commit share an entry)
//! - Cache hit with an equal status => no publish
//! - Publish failures are per-item; only job enumeration is pass-fatal
//! - Collaborators (job runner, hosting platform, cache) sit behind traits
//!
//! No network IO lives here. Adapters are in sb-jenkins, sb-github and sb-cache.

mod engine;
mod gateway;
mod normalizer;
mod report;
mod types;

pub use engine::{matches_prefix, ReconcileEngine};
pub use gateway::{
    BuildSource, CacheGateway, CacheReadError, CacheWriteError, PublishError, SourceUnavailable,
    StatusPublisher,
};
pub use normalizer::normalize;
pub use report::{CacheWrite, Disposition, Outcome, PassReport};
pub use types::*;
