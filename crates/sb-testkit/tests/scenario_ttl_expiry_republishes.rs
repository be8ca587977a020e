use sb_reconcile::Build;
use sb_testkit::{test_engine, FakeBuildSource};

#[test]
fn scenario_ttl_expiry_republishes() {
    let source = FakeBuildSource::new().with_build(
        "Rev.com-build-feature_x",
        Build::new("deadbeef", false, true, "http://ci/42/"),
    );
    let (mut engine, clock) = test_engine(source);

    engine.run_pass().unwrap();

    clock.advance(chrono::Duration::days(13));
    assert_eq!(engine.run_pass().unwrap().published(), 0);

    clock.advance(chrono::Duration::days(1));
    assert_eq!(engine.run_pass().unwrap().published(), 1);

    assert_eq!(engine.publisher().attempts().len(), 2);
}
