use crate::Status;

/// What the engine did with one build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Cache already held this status; nothing written.
    CacheHit,
    /// Status was accepted by the hosting platform.
    Published,
    /// Publish was attempted and failed. The pass continued.
    PublishFailed { error: String },
}

/// Result of the cache refresh that follows a publish attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheWrite {
    /// No write was due (cache hit, or policy skipped it).
    Skipped,
    Written,
    Failed { error: String },
}

/// Per-build record of one reconciliation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub job: String,
    pub sha: String,
    pub status: Status,
    pub disposition: Disposition,
    pub cache_write: CacheWrite,
}

impl Outcome {
    pub fn is_cache_hit(&self) -> bool {
        matches!(self.disposition, Disposition::CacheHit)
    }

    pub fn is_published(&self) -> bool {
        matches!(self.disposition, Disposition::Published)
    }

    pub fn is_publish_failure(&self) -> bool {
        matches!(self.disposition, Disposition::PublishFailed { .. })
    }
}

/// Everything one pass produced. Outcomes are in job order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub outcomes: Vec<Outcome>,
    /// Jobs dropped by the name prefix filter.
    pub filtered: usize,
    /// Matching jobs without a (readable) build.
    pub skipped_no_build: usize,
}

impl PassReport {
    pub fn published(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_published()).count()
    }

    pub fn cache_hits(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_cache_hit()).count()
    }

    pub fn publish_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.is_publish_failure())
            .count()
    }

    pub fn cache_write_failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.cache_write, CacheWrite::Failed { .. }))
            .count()
    }

    pub fn has_publish_failures(&self) -> bool {
        self.publish_failures() > 0
    }
}
