//! sb-jenkins
//!
//! [`BuildSource`] over the Jenkins JSON API.
//!
//! Endpoints used:
//! - `GET {base}/api/json?tree=jobs[name]`: job enumeration
//! - `GET {base}/job/{name}/lastBuild/api/json?tree=...`: latest build
//!
//! Credentials are supplied by the caller (resolved once at startup by
//! sb-config) and sent as HTTP basic auth. Never log them.

mod wire;

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use sb_reconcile::{Build, BuildSource, Job, SourceUnavailable};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::wire::{BuildResponse, JobsResponse};

const JOBS_TREE: &str = "jobs[name]";
const BUILD_TREE: &str = "building,result,url,actions[lastBuiltRevision[SHA1]]";

/// Blocking Jenkins client.
#[derive(Clone)]
pub struct JenkinsClient {
    base_url: Url,
    user: String,
    password: String,
    http: Client,
}

impl std::fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base_url", &self.base_url.as_str())
            .field("user", &"<REDACTED>")
            .field("password", &"<REDACTED>")
            .finish()
    }
}

impl JenkinsClient {
    pub fn new(base_url: &str, user: String, password: String, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("CONFIG_INVALID: jenkins url is not a url: {base_url}"))?;
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statusbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("jenkins http client build failed")?;
        Ok(Self {
            base_url,
            user,
            password,
            http,
        })
    }

    /// Prove the server is reachable and accepts our credentials.
    pub fn check_connection(&self) -> Result<(), SourceUnavailable> {
        let url = self.endpoint(&["api", "json"])?;
        match self.get_json::<serde_json::Value>(url, "mode")? {
            Some(_) => Ok(()),
            None => Err(SourceUnavailable::new(format!(
                "jenkins api not found at {}",
                self.base_url
            ))),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SourceUnavailable> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SourceUnavailable::new("jenkins url cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `Ok(None)` on 404.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        tree: &str,
    ) -> Result<Option<T>, SourceUnavailable> {
        debug!(url = %url, "jenkins GET");
        let resp = self
            .http
            .get(url.clone())
            .query(&[("tree", tree)])
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .map_err(|e| SourceUnavailable::new(format!("jenkins request failed: {e}")))?;

        let status = resp.status();
        match status {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(SourceUnavailable::new(format!(
                    "jenkins rejected credentials status={}",
                    status.as_u16()
                )))
            }
            s if !s.is_success() => {
                return Err(SourceUnavailable::new(format!(
                    "jenkins http error status={} url={}",
                    s.as_u16(),
                    url
                )))
            }
            _ => {}
        }

        resp.json::<T>()
            .map(Some)
            .map_err(|e| SourceUnavailable::new(format!("jenkins response decode failed: {e}")))
    }
}

impl BuildSource for JenkinsClient {
    fn list_jobs(&self) -> Result<Vec<Job>, SourceUnavailable> {
        let url = self.endpoint(&["api", "json"])?;
        let body: JobsResponse = self
            .get_json(url, JOBS_TREE)?
            .ok_or_else(|| SourceUnavailable::new("jenkins job list not found"))?;
        Ok(body.jobs.into_iter().map(|j| Job::new(j.name)).collect())
    }

    fn latest_build(&self, job: &Job) -> Result<Option<Build>, SourceUnavailable> {
        let url = self.endpoint(&["job", job.name.as_str(), "lastBuild", "api", "json"])?;
        let body: Option<BuildResponse> = self.get_json(url, BUILD_TREE)?;
        Ok(body.map(BuildResponse::into_build))
    }
}
