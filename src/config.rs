// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scoring::TopWindow;

pub const ENV_CONFIG_PATH: &str = "NOSCROLL_CONFIG_PATH";
pub const ENV_TASK_DELAY_SECS: &str = "NOSCROLL_TASK_DELAY_SECS";
pub const ENV_REDDIT_BASE_URL: &str = "NOSCROLL_REDDIT_BASE_URL";
pub const DEFAULT_CONFIG_PATH: &str = "config/noscroll.toml";

fn default_task_delay_secs() -> u64 {
    600
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_user_agent() -> String {
    "noscroll:1.0".to_string()
}
fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pause between background task runs.
    #[serde(default = "default_task_delay_secs")]
    pub task_delay_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_reddit_base_url")]
    pub reddit_base_url: String,
    /// Per-request timeout for upstream listing fetches.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            task_delay_secs: default_task_delay_secs(),
            user_agent: default_user_agent(),
            reddit_base_url: default_reddit_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            scoring: ScoringConfig::default(),
        }
    }
}

fn default_top_limit() -> usize {
    10
}
fn default_refresh_secs() -> u64 {
    24 * 3600
}

/// Baseline sampling and refresh cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub top_window: TopWindow,
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
    /// A baseline older than this is due for recomputation.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            top_window: TopWindow::default(),
            top_limit: default_top_limit(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl ScoringConfig {
    pub fn refresh_interval(&self) -> chrono::Duration {
        let secs = self.refresh_secs.min(i64::MAX as u64 / 1000) as i64;
        chrono::Duration::seconds(secs)
    }
}

/// Load configuration from an explicit TOML file.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let cfg: AppConfig =
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration using env var + fallbacks, then apply env overrides:
/// 1) $NOSCROLL_CONFIG_PATH
/// 2) config/noscroll.toml
/// 3) built-in defaults
pub fn load_default() -> Result<AppConfig> {
    let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        load_from(&pb)?
    } else {
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            load_from(&default_p)?
        } else {
            AppConfig::default()
        }
    };

    if let Ok(raw) = std::env::var(ENV_TASK_DELAY_SECS) {
        cfg.task_delay_secs = raw
            .trim()
            .parse()
            .with_context(|| format!("{ENV_TASK_DELAY_SECS} must be a number of seconds"))?;
    }
    if let Ok(url) = std::env::var(ENV_REDDIT_BASE_URL) {
        if !url.trim().is_empty() {
            cfg.reddit_base_url = url.trim().to_string();
        }
    }
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: AppConfig = toml::from_str(
            r#"
task_delay_secs = 60

[scoring]
top_window = "week"
"#,
        )
        .unwrap();
        assert_eq!(cfg.task_delay_secs, 60);
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.scoring.top_window, TopWindow::Week);
        assert_eq!(cfg.scoring.top_limit, 10);
        assert_eq!(cfg.scoring.refresh_interval(), chrono::Duration::days(1));
    }
}
