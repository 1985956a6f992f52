//! Configuration loader and validator for the sync dispatcher.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::model::Platform;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub sync: SyncSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub data_dir: String,
}

/// Dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncSettings {
    /// Queue name written on every job row.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Platforms run by `sync all`, in order.
    #[serde(default = "default_platforms")]
    pub platforms: Vec<Platform>,
    #[serde(default)]
    pub concurrent: bool,
    #[serde(default)]
    pub dedupe_pending: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            queue: default_queue(),
            platforms: default_platforms(),
            concurrent: false,
            dedupe_pending: false,
        }
    }
}

fn default_queue() -> String {
    "sync".to_string()
}

fn default_platforms() -> Vec<Platform> {
    Platform::DEFAULT_ORDER.to_vec()
}

impl App {
    /// `data_dir` with a leading `~/` expanded against `$HOME`.
    pub fn resolved_data_dir(&self) -> String {
        match (self.data_dir.strip_prefix("~/"), std::env::var("HOME")) {
            (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
            _ => self.data_dir.clone(),
        }
    }
}

impl Config {
    /// Ensure required directories exist (creates `app.data_dir` if missing).
    pub fn ensure_dirs(&self) -> Result<(), std::io::Error> {
        if self.app.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(self.app.resolved_data_dir())
    }

    /// `DATABASE_URL` if set, else a SQLite file inside `data_dir`.
    pub fn database_url(&self) -> String {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| {
            format!("sqlite://{}/platform_sync.db", self.app.resolved_data_dir())
        })
    }
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.data_dir.trim().is_empty() {
        return Err(ConfigError::Invalid("app.data_dir must be non-empty".into()));
    }
    if cfg.sync.queue.trim().is_empty() {
        return Err(ConfigError::Invalid("sync.queue must be non-empty".into()));
    }
    if cfg.sync.platforms.is_empty() {
        return Err(ConfigError::Invalid(
            "sync.platforms must list at least one platform".into(),
        ));
    }
    let mut seen = HashSet::new();
    for p in &cfg.sync.platforms {
        if !seen.insert(p) {
            return Err(ConfigError::Invalid(format!(
                "sync.platforms lists {p} more than once"
            )));
        }
    }
    Ok(())
}

pub fn example() -> &'static str {
    r#"app:
  data_dir: "./data"

sync:
  queue: "sync"
  platforms:
    - instagram
    - facebook
    - meta_ads
    - google_ads
    - tiktok_ads
  concurrent: false
  dedupe_pending: false
"#
}
