use sb_reconcile::Build;
use sb_testkit::{test_engine, FakeBuildSource};

#[test]
fn scenario_source_unavailable_aborts_pass() {
    let source = FakeBuildSource::new()
        .with_build(
            "Rev.com-build-feature_x",
            Build::new("deadbeef", false, true, "http://ci/42/"),
        )
        .unavailable();
    let (mut engine, _clock) = test_engine(source);

    let err = engine.run_pass().unwrap_err();

    assert!(err.to_string().starts_with("SOURCE_UNAVAILABLE"));
    assert!(engine.source().fetched().is_empty());
    assert!(engine.publisher().attempts().is_empty());
    assert!(engine.cache().is_empty());
}
