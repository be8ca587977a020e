use std::time::Duration;

use sb_reconcile::{Build, CacheGateway, CacheWrite, Disposition, Status};
use sb_testkit::{test_engine, FakeBuildSource};

#[test]
fn scenario_cache_hit_skips_publish() {
    let source = FakeBuildSource::new().with_build(
        "Rev.com-build-feature_x",
        Build::new("deadbeef", false, true, "http://ci/42/"),
    );
    let (mut engine, _clock) = test_engine(source);
    engine
        .cache_mut()
        .set("ns:repo:deadbeef", "success", Duration::from_secs(3600))
        .unwrap();

    let report = engine.run_pass().unwrap();

    assert!(engine.publisher().attempts().is_empty());
    assert_eq!(report.outcomes.len(), 1);
    let o = &report.outcomes[0];
    assert!(o.is_cache_hit());
    assert_eq!(o.disposition, Disposition::CacheHit);
    assert_eq!(o.cache_write, CacheWrite::Skipped);
    assert_eq!(o.status, Status::Success);
    assert_eq!(report.cache_hits(), 1);
}

#[test]
fn scenario_cached_value_is_compared_as_exact_string() {
    let source = FakeBuildSource::new().with_build(
        "Rev.com-build-feature_x",
        Build::new("deadbeef", false, true, "http://ci/42/"),
    );
    let (mut engine, _clock) = test_engine(source);
    // A differently-cased value from some other writer is not a hit.
    engine
        .cache_mut()
        .set("ns:repo:deadbeef", "Success", Duration::from_secs(3600))
        .unwrap();

    let report = engine.run_pass().unwrap();

    assert_eq!(report.published(), 1);
    assert_eq!(engine.cache().peek("ns:repo:deadbeef"), Some("success"));
}
