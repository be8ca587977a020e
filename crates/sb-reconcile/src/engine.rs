use tracing::{debug, info, warn};

use crate::{
    normalize, Build, BuildSource, CacheGateway, CacheUpdatePolicy, CacheWrite, Disposition, Job,
    Outcome, PassReport, ReconcileSettings, SourceUnavailable, Status, StatusPublisher,
    StatusRecord,
};

/// Plain prefix test. Not a pattern language.
pub fn matches_prefix(job_name: &str, prefix: &str) -> bool {
    job_name.starts_with(prefix)
}

/// Reconciles job-runner builds with hosting-platform commit statuses.
///
/// Owns its three collaborators for the lifetime of a pass. The engine holds no
/// state between passes; the cache is the only memory.
pub struct ReconcileEngine<S, C, P> {
    settings: ReconcileSettings,
    source: S,
    cache: C,
    publisher: P,
}

impl<S, C, P> ReconcileEngine<S, C, P>
where
    S: BuildSource,
    C: CacheGateway,
    P: StatusPublisher,
{
    pub fn new(settings: ReconcileSettings, source: S, cache: C, publisher: P) -> Self {
        Self {
            settings,
            source,
            cache,
            publisher,
        }
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn publisher_mut(&mut self) -> &mut P {
        &mut self.publisher
    }

    /// Enumerate jobs, then [`reconcile`](Self::reconcile) them.
    ///
    /// Only enumeration can fail the pass.
    pub fn run_pass(&mut self) -> Result<PassReport, SourceUnavailable> {
        let jobs = self.source.list_jobs()?;
        debug!(jobs = jobs.len(), "enumerated jobs");
        Ok(self.reconcile(&jobs))
    }

    /// One sequential pass over `jobs`, in the given order.
    ///
    /// Every matching job with a build yields exactly one [`Outcome`]. Filtered
    /// jobs never reach [`BuildSource::latest_build`].
    pub fn reconcile(&mut self, jobs: &[Job]) -> PassReport {
        let mut report = PassReport::default();

        for job in jobs {
            if !matches_prefix(&job.name, &self.settings.job_prefix) {
                report.filtered += 1;
                continue;
            }

            let build = match self.source.latest_build(job) {
                Ok(Some(build)) => build,
                Ok(None) => {
                    debug!(job = %job.name, "no build yet; skipping");
                    report.skipped_no_build += 1;
                    continue;
                }
                Err(err) => {
                    warn!(job = %job.name, error = %err, "latest build unreadable; skipping");
                    report.skipped_no_build += 1;
                    continue;
                }
            };

            report.outcomes.push(self.reconcile_build(job, &build));
        }

        report
    }

    fn reconcile_build(&mut self, job: &Job, build: &Build) -> Outcome {
        let status = normalize(build);
        let sha = build.commit_sha.as_str();
        let key = self.settings.cache_key_for(sha);

        // Read errors and missing keys are the same thing here.
        let cached = self.cache.get(&key).unwrap_or_else(|err| {
            warn!(key = %key, error = %err, "cache read failed; treating as miss");
            None
        });

        if cached.as_deref() == Some(status.as_str()) {
            debug!(job = %job.name, sha, %status, "cache hit");
            return Outcome {
                job: job.name.clone(),
                sha: sha.to_string(),
                status,
                disposition: Disposition::CacheHit,
                cache_write: CacheWrite::Skipped,
            };
        }

        let record = StatusRecord::for_build(status, build);
        let disposition = match self.publisher.write(
            &self.settings.owner,
            &self.settings.repo,
            sha,
            &record,
        ) {
            Ok(()) => {
                info!(job = %job.name, sha, %status, target_url = %record.target_url, "status published");
                Disposition::Published
            }
            Err(err) => {
                warn!(job = %job.name, sha, %status, error = %err, "status publish failed");
                Disposition::PublishFailed {
                    error: err.to_string(),
                }
            }
        };

        let cache_write = self.refresh_cache(&key, status, &disposition);

        Outcome {
            job: job.name.clone(),
            sha: sha.to_string(),
            status,
            disposition,
            cache_write,
        }
    }

    fn refresh_cache(
        &mut self,
        key: &str,
        status: Status,
        disposition: &Disposition,
    ) -> CacheWrite {
        let due = match self.settings.cache_policy {
            CacheUpdatePolicy::Always => true,
            CacheUpdatePolicy::OnSuccess => matches!(disposition, Disposition::Published),
        };
        if !due {
            return CacheWrite::Skipped;
        }

        match self.cache.set(key, status.as_str(), self.settings.cache_ttl) {
            Ok(()) => CacheWrite::Written,
            Err(err) => {
                warn!(key, error = %err, "cache write failed; continuing");
                CacheWrite::Failed {
                    error: err.to_string(),
                }
            }
        }
    }
}
