//! Collaborator boundaries consumed by the engine.
//!
//! # Contracts
//!
//! - [`BuildSource::list_jobs`] failing is pass-fatal.
//! - [`BuildSource::latest_build`] returning `Ok(None)` means "no build yet" and
//!   the job is skipped silently.
//! - [`CacheGateway::get`] errors are treated exactly like a missing key.
//! - [`CacheGateway::set`] and [`StatusPublisher::write`] errors are per-item:
//!   logged, never propagated out of a pass.
//!
//! Production adapters live in their own crates. Test doubles live in
//! sb-testkit and sb-cache (`MemoryCache`).

use std::fmt;
use std::time::Duration;

use crate::{Build, Job, StatusRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// The job runner could not be reached or answered with something unusable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceUnavailable {
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SourceUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SOURCE_UNAVAILABLE: {}", self.reason)
    }
}

impl std::error::Error for SourceUnavailable {}

/// A status write was refused or never reached the hosting platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishError {
    /// Network or transport failure.
    Transport(String),
    /// Credentials were rejected (401/403).
    Auth(String),
    /// The platform answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The request could not be built, e.g. an empty commit SHA.
    InvalidRequest(String),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::Transport(msg) => write!(f, "publish transport error: {msg}"),
            PublishError::Auth(msg) => write!(f, "publish auth error: {msg}"),
            PublishError::Rejected { status, message } => {
                write!(f, "publish rejected status={status}: {message}")
            }
            PublishError::InvalidRequest(msg) => write!(f, "publish invalid request: {msg}"),
        }
    }
}

impl std::error::Error for PublishError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheReadError(pub String);

impl fmt::Display for CacheReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache read error: {}", self.0)
    }
}

impl std::error::Error for CacheReadError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheWriteError(pub String);

impl fmt::Display for CacheWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache write error: {}", self.0)
    }
}

impl std::error::Error for CacheWriteError {}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Job runner contract.
pub trait BuildSource {
    fn list_jobs(&self) -> Result<Vec<Job>, SourceUnavailable>;

    /// Most recent build of `job`, or `None` when the job has never run.
    fn latest_build(&self, job: &Job) -> Result<Option<Build>, SourceUnavailable>;
}

/// Key-value store with expiry.
pub trait CacheGateway {
    /// `Ok(None)` for a missing or expired key.
    fn get(&mut self, key: &str) -> Result<Option<String>, CacheReadError>;

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheWriteError>;
}

/// Commit-status write on the hosting platform.
pub trait StatusPublisher {
    fn write(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        record: &StatusRecord,
    ) -> Result<(), PublishError>;
}

impl<T: BuildSource + ?Sized> BuildSource for Box<T> {
    fn list_jobs(&self) -> Result<Vec<Job>, SourceUnavailable> {
        (**self).list_jobs()
    }

    fn latest_build(&self, job: &Job) -> Result<Option<Build>, SourceUnavailable> {
        (**self).latest_build(job)
    }
}

impl<T: CacheGateway + ?Sized> CacheGateway for Box<T> {
    fn get(&mut self, key: &str) -> Result<Option<String>, CacheReadError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheWriteError> {
        (**self).set(key, value, ttl)
    }
}

impl<T: StatusPublisher + ?Sized> StatusPublisher for Box<T> {
    fn write(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        record: &StatusRecord,
    ) -> Result<(), PublishError> {
        (**self).write(owner, repo, sha, record)
    }
}
