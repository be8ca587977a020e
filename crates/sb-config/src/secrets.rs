//! Runtime secret resolution.
//!
//! # Contract
//! - Config YAML stores only **env var NAMES** (e.g. `"GITHUB_TOKEN"`).
//! - Explicit values (CLI flags) win over the environment.
//! - Resolution happens once at startup; the returned [`ResolvedSecrets`] is
//!   passed into adapter constructors.
//! - `Debug` output is redacted.
//! - Error messages reference the env var **NAME**, never the value.
//!
//! # Requirements
//! | Pass      | Required                                        |
//! |-----------|-------------------------------------------------|
//! | normal    | github token, jenkins user, jenkins password    |
//! | dry run   | jenkins user, jenkins password                  |

use anyhow::{bail, Result};

use crate::BridgeConfig;

/// Explicit secret values, typically from command-line flags.
#[derive(Clone, Default)]
pub struct SecretOverrides {
    pub github_token: Option<String>,
    pub jenkins_user: Option<String>,
    pub jenkins_password: Option<String>,
}

impl std::fmt::Debug for SecretOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretOverrides")
            .field("github_token", &self.github_token.as_ref().map(|_| "<REDACTED>"))
            .field("jenkins_user", &self.jenkins_user.as_ref().map(|_| "<REDACTED>"))
            .field(
                "jenkins_password",
                &self.jenkins_password.as_ref().map(|_| "<REDACTED>"),
            )
            .finish()
    }
}

/// Credentials for one pass. **Values are redacted in `Debug` output.**
#[derive(Clone)]
pub struct ResolvedSecrets {
    /// `None` only for dry runs.
    pub github_token: Option<String>,
    pub jenkins_user: String,
    pub jenkins_password: String,
}

impl std::fmt::Debug for ResolvedSecrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecrets")
            .field("github_token", &self.github_token.as_ref().map(|_| "<REDACTED>"))
            .field("jenkins_user", &"<REDACTED>")
            .field("jenkins_password", &"<REDACTED>")
            .finish()
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Returns `None` if the variable is unset or blank.
fn resolve_env(var_name: &str) -> Option<String> {
    non_blank(std::env::var(var_name).ok())
}

fn pick(explicit: Option<String>, env_name: &str) -> Option<String> {
    non_blank(explicit).or_else(|| resolve_env(env_name))
}

/// Resolve credentials: explicit override first, then the env var named in config.
///
/// # Errors
/// `SECRETS_MISSING` naming the env var (and flag) of the first missing value.
pub fn resolve_secrets(
    cfg: &BridgeConfig,
    overrides: SecretOverrides,
    dry_run: bool,
) -> Result<ResolvedSecrets> {
    let github_token = pick(overrides.github_token, &cfg.github.token_env);
    let jenkins_user = pick(overrides.jenkins_user, &cfg.jenkins.user_env);
    let jenkins_password = pick(overrides.jenkins_password, &cfg.jenkins.password_env);

    if github_token.is_none() && !dry_run {
        bail!(
            "SECRETS_MISSING: github token not given (--token) and env var '{}' is not set or empty",
            cfg.github.token_env
        );
    }
    let Some(jenkins_user) = jenkins_user else {
        bail!(
            "SECRETS_MISSING: jenkins user not given (--user) and env var '{}' is not set or empty",
            cfg.jenkins.user_env
        );
    };
    let Some(jenkins_password) = jenkins_password else {
        bail!(
            "SECRETS_MISSING: jenkins password not given (--password) and env var '{}' is not set or empty",
            cfg.jenkins.password_env
        );
    };

    Ok(ResolvedSecrets {
        github_token,
        jenkins_user,
        jenkins_password,
    })
}
