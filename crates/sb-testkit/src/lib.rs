//! sb-testkit
//!
//! Deterministic in-memory collaborators for exercising the reconcile engine.
//! No network, no redis, no randomness.

mod fakes;

pub use fakes::{FakeBuildSource, FlakyCache, PublishedStatus, RecordingPublisher};

use chrono::{DateTime, Utc};
use sb_cache::{ManualClock, MemoryCache};
use sb_reconcile::{ReconcileEngine, ReconcileSettings};

pub const TEST_OWNER: &str = "revdotcom";
pub const TEST_REPO: &str = "repo";
pub const TEST_NAMESPACE: &str = "ns";
pub const TEST_PREFIX: &str = "Rev.com-build-feature_";

/// Settings whose cache keys read `ns:repo:<sha>`.
pub fn test_settings() -> ReconcileSettings {
    ReconcileSettings::new(TEST_OWNER, TEST_REPO, TEST_PREFIX).with_namespace(TEST_NAMESPACE)
}

/// Fixed epoch for manual clocks: 2023-11-14T22:13:20Z.
pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

pub type TestEngine = ReconcileEngine<FakeBuildSource, MemoryCache<ManualClock>, RecordingPublisher>;

/// Engine over the given source with an empty manual-clock cache and an
/// accepting publisher. Returns the clock handle for TTL tests.
pub fn test_engine(source: FakeBuildSource) -> (TestEngine, ManualClock) {
    let clock = ManualClock::new(test_epoch());
    let engine = ReconcileEngine::new(
        test_settings(),
        source,
        MemoryCache::with_clock(clock.clone()),
        RecordingPublisher::new(),
    );
    (engine, clock)
}
