//! Application Configuration
//!
//! Defaults, then `decision_jar.json`, then environment, then CLI flags.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "decision_jar.json";
pub const ENV_DB: &str = "DECISION_JAR_DB";
pub const ENV_LOG_DIR: &str = "DECISION_JAR_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub app_name: String,
    pub busy_timeout_ms: u64,
    pub log_max_bytes: u64,
    pub log_max_files: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("decision_jar.db"),
            log_dir: PathBuf::from("logs"),
            app_name: "DecisionJar".to_string(),
            busy_timeout_ms: 5_000,
            log_max_bytes: 1024 * 1024,
            log_max_files: 3,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `decision_jar.json` in the
    /// working directory is read when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    log::debug!("{} not found, using defaults", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };
        config.apply_env(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let raw = read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&raw).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    /// Overlay environment variables; empty values are ignored
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(ENV_DB).filter(|v| !v.trim().is_empty()) {
            self.db_path = PathBuf::from(db);
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|v| !v.trim().is_empty()) {
            self.log_dir = PathBuf::from(dir);
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    pub fn logger_options(&self) -> rolling_logger::LoggerOptions {
        rolling_logger::LoggerOptions {
            max_bytes: self.log_max_bytes,
            max_files: self.log_max_files,
            ..Default::default()
        }
    }
}
