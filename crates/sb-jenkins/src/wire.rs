//! Jenkins JSON payloads, trimmed to the fields the `tree` queries request.

use sb_reconcile::Build;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JobEntry {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildResponse {
    #[serde(default)]
    pub building: bool,
    /// `SUCCESS`, `FAILURE`, `UNSTABLE`, `ABORTED`, or null while running.
    pub result: Option<String>,
    pub url: String,
    // Jenkins pads this array with `{}` and null entries.
    #[serde(default)]
    pub actions: Vec<Option<BuildAction>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildAction {
    #[serde(rename = "lastBuiltRevision")]
    pub last_built_revision: Option<Revision>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Revision {
    #[serde(rename = "SHA1")]
    pub sha1: String,
}

impl BuildResponse {
    /// First git revision recorded on the build, or empty.
    fn revision(&self) -> String {
        self.actions
            .iter()
            .flatten()
            .find_map(|a| a.last_built_revision.as_ref())
            .map(|r| r.sha1.clone())
            .unwrap_or_default()
    }

    pub fn into_build(self) -> Build {
        let commit_sha = self.revision();
        let is_successful = !self.building && self.result.as_deref() == Some("SUCCESS");
        Build {
            commit_sha,
            is_running: self.building,
            is_successful,
            build_url: self.url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(v: serde_json::Value) -> Build {
        serde_json::from_value::<BuildResponse>(v).unwrap().into_build()
    }

    #[test]
    fn finished_success_with_revision() {
        let b = parse(serde_json::json!({
            "_class": "hudson.model.FreeStyleBuild",
            "building": false,
            "result": "SUCCESS",
            "url": "http://ci/job/x/42/",
            "actions": [
                {},
                null,
                { "_class": "hudson.plugins.git.util.BuildData",
                  "lastBuiltRevision": { "SHA1": "deadbeef" } }
            ]
        }));
        assert_eq!(b.commit_sha, "deadbeef");
        assert!(!b.is_running);
        assert!(b.is_successful);
        assert_eq!(b.console_url(), "http://ci/job/x/42/console");
    }

    #[test]
    fn running_build_has_null_result() {
        let b = parse(serde_json::json!({
            "building": true,
            "result": null,
            "url": "http://ci/job/x/43/",
            "actions": []
        }));
        assert!(b.is_running);
        assert!(!b.is_successful);
    }

    #[test]
    fn unstable_and_aborted_are_not_successful() {
        for result in ["UNSTABLE", "ABORTED", "FAILURE"] {
            let b = parse(serde_json::json!({
                "building": false,
                "result": result,
                "url": "http://ci/job/x/1/"
            }));
            assert!(!b.is_successful, "{result}");
        }
    }

    #[test]
    fn missing_revision_yields_empty_sha() {
        let b = parse(serde_json::json!({
            "building": false,
            "result": "SUCCESS",
            "url": "http://ci/job/x/1/",
            "actions": [{ "_class": "hudson.model.CauseAction" }]
        }));
        assert_eq!(b.commit_sha, "");
    }
}
