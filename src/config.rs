use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::corpus::LoadPolicy;

const MIN_FETCH_TIMEOUT_SECS: u64 = 1;
const MAX_FETCH_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_corpus")]
    pub corpus: String,
    #[serde(default)]
    pub load_policy: LoadPolicy,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_session_dir")]
    pub session_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_corpus() -> String {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("topicdeck")
        .join("questions.json")
        .to_string_lossy()
        .to_string()
}
fn default_fetch_timeout_secs() -> u64 {
    10
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_session_dir() -> String {
    // The runtime dir is wiped at logout, which bounds a session's lifetime.
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("topicdeck")
        .to_string_lossy()
        .to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: default_corpus(),
            load_policy: LoadPolicy::default(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            theme: default_theme(),
            session_dir: default_session_dir(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("topicdeck")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Clamp numeric fields and reset unknown names to their defaults.
    /// Call after deserialization to handle hand-edited files.
    pub fn validate(&mut self, valid_themes: &[&str]) {
        self.fetch_timeout_secs = self
            .fetch_timeout_secs
            .clamp(MIN_FETCH_TIMEOUT_SECS, MAX_FETCH_TIMEOUT_SECS);
        if self.corpus.trim().is_empty() {
            self.corpus = default_corpus();
        }
        if self.session_dir.trim().is_empty() {
            self.session_dir = default_session_dir();
        }
        if !valid_themes.is_empty() && !valid_themes.contains(&self.theme.as_str()) {
            self.theme = default_theme();
        }
    }
}
