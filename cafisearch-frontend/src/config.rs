use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Base URL of the search API, without the `/search` suffix
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Jump instead of flying when a place is selected
    #[serde(default)]
    pub reduced_motion: bool,
}

fn default_api_url() -> String {
    "http://localhost:5001/api".to_string()
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debounce_ms: default_debounce_ms(),
            log_level: default_log_level(),
            reduced_motion: false,
        }
    }
}

impl FrontendConfig {
    /// Read `path`, or fall back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {}: {}", path.display(), e))
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
