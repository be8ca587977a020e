//! Command handler modules for statusbridge.
//!
//! Shared utilities used by multiple command paths live here.

pub mod sync;

use anyhow::Result;
use sb_config::LoadedConfig;

/// No paths means built-in defaults.
pub fn load_config(paths: &[String]) -> Result<LoadedConfig> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    sb_config::load_layered_yaml(&path_refs)
}
