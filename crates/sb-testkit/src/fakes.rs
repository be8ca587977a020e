use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use sb_cache::{Clock, MemoryCache};
use sb_reconcile::{
    Build, BuildSource, CacheGateway, CacheReadError, CacheWriteError, Job, PublishError,
    SourceUnavailable, StatusPublisher, StatusRecord,
};

// ---------------------------------------------------------------------------
// Build source
// ---------------------------------------------------------------------------

/// Scripted job runner. Records every `latest_build` call.
#[derive(Debug, Default)]
pub struct FakeBuildSource {
    jobs: Vec<Job>,
    builds: BTreeMap<String, Build>,
    unreadable: BTreeSet<String>,
    unavailable: bool,
    fetched: RefCell<Vec<String>>,
}

impl FakeBuildSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a job whose latest build is `build`.
    pub fn with_build(mut self, job: &str, build: Build) -> Self {
        self.jobs.push(Job::new(job));
        self.builds.insert(job.to_string(), build);
        self
    }

    /// Add a job that has never run.
    pub fn with_job_without_build(mut self, job: &str) -> Self {
        self.jobs.push(Job::new(job));
        self
    }

    /// Add a job whose build lookup errors.
    pub fn with_unreadable_job(mut self, job: &str) -> Self {
        self.jobs.push(Job::new(job));
        self.unreadable.insert(job.to_string());
        self
    }

    /// Make `list_jobs` fail.
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Replace the build reported for an existing job.
    pub fn set_build(&mut self, job: &str, build: Build) {
        self.builds.insert(job.to_string(), build);
    }

    /// Job names passed to `latest_build`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.borrow().clone()
    }
}

impl BuildSource for FakeBuildSource {
    fn list_jobs(&self) -> Result<Vec<Job>, SourceUnavailable> {
        if self.unavailable {
            return Err(SourceUnavailable::new("fake runner is down"));
        }
        Ok(self.jobs.clone())
    }

    fn latest_build(&self, job: &Job) -> Result<Option<Build>, SourceUnavailable> {
        self.fetched.borrow_mut().push(job.name.clone());
        if self.unreadable.contains(&job.name) {
            return Err(SourceUnavailable::new(format!("cannot read {}", job.name)));
        }
        Ok(self.builds.get(&job.name).cloned())
    }
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublishedStatus {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub record: StatusRecord,
}

/// Records every write attempt, including ones it was told to fail.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    attempts: Vec<PublishedStatus>,
    fail_shas: BTreeSet<String>,
    fail_all: bool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, sha: &str) -> Self {
        self.fail_shas.insert(sha.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub fn recover(&mut self) {
        self.fail_all = false;
        self.fail_shas.clear();
    }

    pub fn attempts(&self) -> &[PublishedStatus] {
        &self.attempts
    }

    pub fn attempts_for(&self, sha: &str) -> Vec<&PublishedStatus> {
        self.attempts.iter().filter(|p| p.sha == sha).collect()
    }
}

impl StatusPublisher for RecordingPublisher {
    fn write(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        record: &StatusRecord,
    ) -> Result<(), PublishError> {
        self.attempts.push(PublishedStatus {
            owner: owner.to_string(),
            repo: repo.to_string(),
            sha: sha.to_string(),
            record: record.clone(),
        });
        if self.fail_all || self.fail_shas.contains(sha) {
            return Err(PublishError::Rejected {
                status: 500,
                message: "fake platform failure".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// [`MemoryCache`] with switchable read and write failures.
#[derive(Debug)]
pub struct FlakyCache<K: Clock> {
    pub inner: MemoryCache<K>,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl<K: Clock> FlakyCache<K> {
    pub fn new(inner: MemoryCache<K>) -> Self {
        Self {
            inner,
            fail_reads: false,
            fail_writes: false,
        }
    }
}

impl<K: Clock> CacheGateway for FlakyCache<K> {
    fn get(&mut self, key: &str) -> Result<Option<String>, CacheReadError> {
        if self.fail_reads {
            return Err(CacheReadError("connection reset".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheWriteError> {
        if self.fail_writes {
            return Err(CacheWriteError("READONLY replica".to_string()));
        }
        self.inner.set(key, value, ttl)
    }
}
