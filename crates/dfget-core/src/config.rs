use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::RunContext;

/// Defaults loaded from `~/.config/dfget/config.toml`.
///
/// Every field is optional; values given on the command line take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DfgetConfig {
    /// Supernode addresses (`host` or `host:port`).
    #[serde(default)]
    pub node: Vec<String>,
    /// Download rate cap in bytes per second.
    #[serde(default)]
    pub local_limit: Option<u64>,
    /// Machine-wide rate cap in bytes per second.
    #[serde(default)]
    pub total_limit: Option<u64>,
    /// Download timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Download pattern: "p2p" or "cdn".
    #[serde(default)]
    pub pattern: Option<String>,
}

impl DfgetConfig {
    /// Fills context fields that are still at their defaults.
    ///
    /// Call before applying command-line flags so the flags win.
    pub fn apply(&self, ctx: &mut RunContext) {
        if ctx.node.is_empty() {
            ctx.node = self.node.clone();
        }
        if let Some(limit) = self.local_limit {
            ctx.local_limit = limit;
        }
        if let Some(limit) = self.total_limit {
            ctx.total_limit = limit;
        }
        if let Some(timeout) = self.timeout_secs {
            ctx.timeout = timeout;
        }
        if let Some(pattern) = &self.pattern {
            ctx.pattern = pattern.clone();
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dfget")?;
    Ok(xdg_dirs.get_config_home().join("dfget").join("config.toml"))
}

/// Load configuration from disk, or defaults if no file exists.
///
/// Never writes: startup must not touch the disk before validation passes.
pub fn load() -> Result<DfgetConfig> {
    let path = config_path()?;
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(DfgetConfig::default());
    }
    load_from(&path)
}

pub fn load_from(path: &Path) -> Result<DfgetConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: DfgetConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
