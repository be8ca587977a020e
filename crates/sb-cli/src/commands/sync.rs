//! `statusbridge sync`: one reconciliation pass.
//!
//! Startup failures (config, secrets, Jenkins or Redis unreachable, job
//! enumeration) abort before anything is printed to stdout. Per-build publish
//! failures are reported and the pass exits 0 unless `--strict`.

use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use sb_cache::{MemoryCache, RedisCache};
use sb_config::secrets::{resolve_secrets, SecretOverrides};
use sb_github::GitHubPublisher;
use sb_jenkins::JenkinsClient;
use sb_reconcile::{
    CacheGateway, PassReport, PublishError, ReconcileEngine, StatusPublisher, StatusRecord,
};
use tracing::info;
use uuid::Uuid;

use crate::report::{render_outcome, Style};
use crate::SyncArgs;

/// Publisher for `--dry-run`: logs what would be written.
#[derive(Debug, Default)]
struct DryRunPublisher;

impl StatusPublisher for DryRunPublisher {
    fn write(
        &mut self,
        owner: &str,
        repo: &str,
        sha: &str,
        record: &StatusRecord,
    ) -> Result<(), PublishError> {
        info!(
            owner,
            repo,
            sha,
            state = %record.state,
            target_url = %record.target_url,
            "dry run: would publish"
        );
        Ok(())
    }
}

pub fn run(args: SyncArgs) -> Result<ExitCode> {
    let mut loaded = super::load_config(&args.config_paths)?;
    if let Some(prefix) = args.job_prefix.as_deref() {
        loaded = loaded.with_job_prefix(prefix)?;
    }
    let cfg = loaded.bridge.clone();

    let secrets = resolve_secrets(
        &cfg,
        SecretOverrides {
            github_token: args.token,
            jenkins_user: args.user,
            jenkins_password: args.password,
        },
        args.dry_run,
    )?;

    let pass_id = Uuid::new_v4();
    info!(
        %pass_id,
        config_hash = %loaded.config_hash,
        owner = %cfg.github.owner,
        repo = %cfg.github.repo,
        job_prefix = %cfg.jenkins.job_prefix,
        dry_run = args.dry_run,
        "starting reconciliation pass"
    );

    let jenkins = JenkinsClient::new(
        &cfg.jenkins.url,
        secrets.jenkins_user,
        secrets.jenkins_password,
        cfg.http_timeout(),
    )?;
    jenkins
        .check_connection()
        .context("can't connect to jenkins")?;

    let cache: Box<dyn CacheGateway>;
    let publisher: Box<dyn StatusPublisher>;
    if args.dry_run {
        cache = Box::new(MemoryCache::new());
        publisher = Box::new(DryRunPublisher);
    } else {
        let token = secrets
            .github_token
            .context("SECRETS_MISSING: github token")?;
        cache = Box::new(RedisCache::connect(&cfg.cache.url, cfg.http_timeout())?);
        publisher = Box::new(
            GitHubPublisher::new(&cfg.github.api_url, token, cfg.http_timeout())?
                .with_context(cfg.github.context.clone()),
        );
    }

    let mut engine = ReconcileEngine::new(cfg.reconcile_settings(), jenkins, cache, publisher);
    let report = engine.run_pass().context("can't fetch jobs")?;

    let style = Style::detect(args.no_color);
    let mut out = std::io::stdout().lock();
    for outcome in &report.outcomes {
        writeln!(out, "{}", render_outcome(outcome, style))?;
    }
    out.flush()?;

    info!(
        %pass_id,
        config_hash = %loaded.config_hash,
        published = report.published(),
        cache_hits = report.cache_hits(),
        publish_failures = report.publish_failures(),
        cache_write_failures = report.cache_write_failures(),
        skipped_no_build = report.skipped_no_build,
        filtered = report.filtered,
        "reconciliation pass complete"
    );

    Ok(ExitCode::from(exit_status(&report, args.strict)))
}

/// 0 for a completed pass, even with per-build publish failures; 2 for those
/// failures under `--strict`.
fn exit_status(report: &PassReport, strict: bool) -> u8 {
    if strict && report.has_publish_failures() {
        2
    } else {
        0
    }
}
