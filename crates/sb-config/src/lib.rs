//! sb-config
//!
//! Layered YAML configuration for a reconciliation pass.
//!
//! # Contract
//! - Documents merge in order: earlier docs are base, later docs override.
//! - The merged document is checked for literal secrets, hashed (sha256 of the
//!   canonical JSON) for log correlation, then deserialized into [`BridgeConfig`].
//! - Unknown keys are rejected (`CONFIG_INVALID`).
//! - Credentials never live in YAML; only the NAMES of the env vars that hold
//!   them do. See [`secrets`].

pub mod secrets;

use std::fs;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sb_reconcile::{CacheUpdatePolicy, ReconcileSettings, DEFAULT_CACHE_NAMESPACE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// If any leaf string value in the effective config starts with one of these,
/// loading aborts with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "ghp_",        // GitHub PAT
    "gho_",        // GitHub OAuth
    "ghs_",        // GitHub app installation token
    "github_pat_", // GitHub fine-grained PAT
    "glpat-",      // GitLab PAT
    "xoxb-",       // Slack bot token
    "AKIA",        // AWS access key ID
    "-----BEGIN",  // PEM private keys
];

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GithubConfig {
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    /// Optional status context label.
    pub context: Option<String>,
    /// Env var holding the API token.
    pub token_env: String,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: "revdotcom".to_string(),
            repo: "revdotcom".to_string(),
            api_url: "https://api.github.com".to_string(),
            context: None,
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct JenkinsConfig {
    pub url: String,
    pub job_prefix: String,
    pub user_env: String,
    pub password_env: String,
}

impl Default for JenkinsConfig {
    fn default() -> Self {
        Self {
            url: "https://ci.rev.com".to_string(),
            job_prefix: "Rev.com-build-feature_".to_string(),
            user_env: "JENKINS_USER".to_string(),
            password_env: "JENKINS_PASSWORD".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CacheConfig {
    pub url: String,
    pub namespace: String,
    pub ttl_secs: u64,
    pub update_policy: CacheUpdatePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
            ttl_secs: sb_reconcile::DEFAULT_CACHE_TTL.as_secs(),
            update_policy: CacheUpdatePolicy::Always,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Everything a pass needs besides credentials. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BridgeConfig {
    pub github: GithubConfig,
    pub jenkins: JenkinsConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
}

impl BridgeConfig {
    pub fn from_json(v: &Value) -> Result<Self> {
        let cfg: BridgeConfig = serde_json::from_value(v.clone())
            .map_err(|e| anyhow::anyhow!("CONFIG_INVALID: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let required = [
            ("github.owner", &self.github.owner),
            ("github.repo", &self.github.repo),
            ("github.api_url", &self.github.api_url),
            ("github.token_env", &self.github.token_env),
            ("jenkins.url", &self.jenkins.url),
            ("jenkins.job_prefix", &self.jenkins.job_prefix),
            ("jenkins.user_env", &self.jenkins.user_env),
            ("jenkins.password_env", &self.jenkins.password_env),
            ("cache.url", &self.cache.url),
            ("cache.namespace", &self.cache.namespace),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                bail!("CONFIG_INVALID: {name} must not be empty");
            }
        }
        if self.cache.ttl_secs == 0 {
            bail!("CONFIG_INVALID: cache.ttl_secs must be > 0");
        }
        if self.http.timeout_secs == 0 {
            bail!("CONFIG_INVALID: http.timeout_secs must be > 0");
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Engine view of this config.
    pub fn reconcile_settings(&self) -> ReconcileSettings {
        ReconcileSettings::new(
            self.github.owner.clone(),
            self.github.repo.clone(),
            self.jenkins.job_prefix.clone(),
        )
        .with_namespace(self.cache.namespace.clone())
        .with_ttl(self.cache_ttl())
        .with_cache_policy(self.cache.update_policy)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
    pub bridge: BridgeConfig,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Zero docs yields the built-in defaults.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Defaults are the bottom layer so the hash covers the effective config.
    let mut merged =
        serde_json::to_value(BridgeConfig::default()).context("default config serialize failed")?;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses as null; it contributes nothing.
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    finish(merged)
}

impl LoadedConfig {
    /// Apply a command-line job prefix as the topmost layer.
    ///
    /// The hash is recomputed, so it always describes the effective config.
    pub fn with_job_prefix(self, prefix: &str) -> Result<Self> {
        let layer = serde_json::json!({ "jenkins": { "job_prefix": prefix } });
        finish(deep_merge(self.config_json, layer))
    }
}

fn finish(merged: Value) -> Result<LoadedConfig> {
    enforce_no_secret_literals(&merged)?;

    let bridge = BridgeConfig::from_json(&merged)?;
    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
        bridge,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // Key order follows the merge, which is deterministic for a given list of docs.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => out.push(prefix.to_string()),
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}
