//! sb-github
//!
//! [`StatusPublisher`] over `POST /repos/{owner}/{repo}/statuses/{sha}`.
//!
//! The token is read by the caller (sb-config) and passed in; do not log it.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use sb_reconcile::{PublishError, StatusPublisher, StatusRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";

/// Blocking GitHub commit-status client.
#[derive(Clone)]
pub struct GitHubPublisher {
    api_url: String,
    token: String,
    context: Option<String>,
    http: Client,
}

impl std::fmt::Debug for GitHubPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubPublisher")
            .field("api_url", &self.api_url)
            .field("token", &"<REDACTED>")
            .field("context", &self.context)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    state: &'a str,
    target_url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GitHubPublisher {
    pub fn new(api_url: &str, token: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("statusbridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("github http client build failed")?;
        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            context: None,
            http,
        })
    }

    /// Status context label. GitHub uses `default` when none is sent.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context.filter(|c| !c.trim().is_empty());
        self
    }

    fn statuses_url(&self, owner: &str, repo: &str, sha: &str) -> String {
        format!("{}/repos/{}/{}/statuses/{}", self.api_url, owner, repo, sha)
    }
}

impl StatusPublisher for GitHubPublisher {
    fn write(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        record: &StatusRecord,
    ) -> Result<(), PublishError> {
        if sha.trim().is_empty() {
            return Err(PublishError::InvalidRequest(
                "empty commit sha".to_string(),
            ));
        }

        let url = self.statuses_url(owner, repo, sha);
        let body = StatusBody {
            state: record.state.as_str(),
            target_url: &record.target_url,
            context: self.context.as_deref(),
        };

        debug!(url = %url, state = body.state, "posting commit status");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| PublishError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = resp
            .json::<ErrorBody>()
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(PublishError::Auth(message)),
            _ => Err(PublishError::Rejected {
                status: status.as_u16(),
                message,
            }),
        }
    }
}
