use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Namespace literal that prefixes every cache key written by the GitHub
/// integration. Existing cache state depends on it; do not change.
pub const DEFAULT_CACHE_NAMESPACE: &str = "github";

/// 14 days.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 14);

/// A CI job, identified by name only.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Job {
    pub name: String,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The most recent execution of a [`Job`] as reported by the job runner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Build {
    /// Revision that was built. May be empty when the runner recorded none.
    pub commit_sha: String,
    pub is_running: bool,
    /// Only meaningful when `is_running` is false.
    pub is_successful: bool,
    /// Build summary page, e.g. `http://ci/job/x/42/`.
    pub build_url: String,
}

impl Build {
    pub fn new(
        commit_sha: impl Into<String>,
        is_running: bool,
        is_successful: bool,
        build_url: impl Into<String>,
    ) -> Self {
        Self {
            commit_sha: commit_sha.into(),
            is_running,
            is_successful,
            build_url: build_url.into(),
        }
    }

    /// Console output page for this build.
    ///
    /// Published statuses link here rather than to the summary page.
    pub fn console_url(&self) -> String {
        if self.build_url.ends_with('/') {
            format!("{}console", self.build_url)
        } else {
            format!("{}/console", self.build_url)
        }
    }
}

/// Canonical commit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    Pending,
    Success,
    Failure,
}

impl Status {
    /// Wire form shared by the hosting platform and the cache.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Success => "success",
            Status::Failure => "failure",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit written to the hosting platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusRecord {
    pub state: Status,
    pub target_url: String,
}

impl StatusRecord {
    pub fn for_build(state: Status, build: &Build) -> Self {
        Self {
            state,
            target_url: build.console_url(),
        }
    }
}

/// `"<namespace>:<repo>:<sha>"`.
pub fn cache_key(namespace: &str, repo: &str, sha: &str) -> String {
    format!("{namespace}:{repo}:{sha}")
}

/// When the engine refreshes the cache relative to the publish outcome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheUpdatePolicy {
    /// Write the cache after every publish attempt, even a failed one.
    #[default]
    Always,
    /// Write the cache only after the hosting platform accepted the status.
    OnSuccess,
}

/// Immutable per-pass settings the engine needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileSettings {
    /// Repository owner every status is published to.
    pub owner: String,
    /// Repository name every status is published to. Also part of the cache key.
    pub repo: String,
    pub cache_namespace: String,
    /// Plain string prefix; jobs not starting with it are ignored.
    pub job_prefix: String,
    pub cache_ttl: Duration,
    pub cache_policy: CacheUpdatePolicy,
}

impl ReconcileSettings {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        job_prefix: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            job_prefix: job_prefix.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_policy: CacheUpdatePolicy::Always,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.cache_namespace = namespace.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_policy(mut self, policy: CacheUpdatePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn cache_key_for(&self, sha: &str) -> String {
        cache_key(&self.cache_namespace, &self.repo, sha)
    }
}
