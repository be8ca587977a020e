use std::cell::RefCell;
use std::time::Duration;

use sb_reconcile::*;

#[test]
fn scenario_prefix_filter_is_plain_string() {
    assert!(matches_prefix("Rev.com-build-feature_x", "Rev.com-build-feature_"));
    assert!(!matches_prefix("unrelated-job", "Rev.com-build-feature_"));

    // '.' is a literal, not a wildcard.
    assert!(!matches_prefix("RevXcom-build-feature_x", "Rev.com-build-feature_"));
    // Case-sensitive.
    assert!(!matches_prefix("rev.com-build-feature_x", "Rev.com-build-feature_"));
    // Empty prefix admits everything.
    assert!(matches_prefix("anything", ""));
}

struct OneBuildSource {
    asked: RefCell<Vec<String>>,
}

impl BuildSource for OneBuildSource {
    fn list_jobs(&self) -> Result<Vec<Job>, SourceUnavailable> {
        Ok(vec![Job::new("unrelated-job"), Job::new("feat-a")])
    }

    fn latest_build(&self, job: &Job) -> Result<Option<Build>, SourceUnavailable> {
        self.asked.borrow_mut().push(job.name.clone());
        Ok(Some(Build::new("abc", true, false, "http://ci/1/")))
    }
}

struct NoCache;

impl CacheGateway for NoCache {
    fn get(&mut self, _key: &str) -> Result<Option<String>, CacheReadError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheWriteError> {
        Ok(())
    }
}

struct Accept;

impl StatusPublisher for Accept {
    fn write(&mut self, _: &str, _: &str, _: &str, _: &StatusRecord) -> Result<(), PublishError> {
        Ok(())
    }
}

#[test]
fn scenario_filtered_job_is_never_fetched() {
    let source = OneBuildSource {
        asked: RefCell::new(Vec::new()),
    };
    let mut engine =
        ReconcileEngine::new(ReconcileSettings::new("o", "r", "feat-"), source, NoCache, Accept);

    let report = engine.run_pass().unwrap();

    assert_eq!(report.filtered, 1);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].job, "feat-a");
    assert_eq!(report.outcomes[0].status, Status::Pending);
    assert_eq!(*engine.source().asked.borrow(), vec!["feat-a".to_string()]);
}
