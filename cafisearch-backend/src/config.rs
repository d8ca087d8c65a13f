use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_GOOGLE_PLACES_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Checked-in seed dataset (required)
    #[serde(default = "default_seed_path")]
    pub seed_path: PathBuf,

    /// CSV-derived dataset, may be absent
    #[serde(default = "default_imported_path")]
    pub imported_path: PathBuf,

    /// SQLite file backing the store path; `None` skips the store entirely
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub use_google_places: bool,

    #[serde(default)]
    pub use_osm: bool,

    #[serde(default)]
    pub google_maps_api_key: Option<String>,

    #[serde(default = "default_google_places_url")]
    pub google_places_url: String,

    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// Timeout for outbound geocoding requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_seed_path() -> PathBuf {
    PathBuf::from("data/cafes.json")
}

fn default_imported_path() -> PathBuf {
    PathBuf::from("data/imported_cafes.json")
}

fn default_google_places_url() -> String {
    DEFAULT_GOOGLE_PLACES_URL.to_string()
}

fn default_nominatim_url() -> String {
    DEFAULT_NOMINATIM_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            seed_path: default_seed_path(),
            imported_path: default_imported_path(),
            database_path: None,
            use_google_places: false,
            use_osm: false,
            google_maps_api_key: None,
            google_places_url: default_google_places_url(),
            nominatim_url: default_nominatim_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: BackendConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file: {}", e))?;
        Ok(config)
    }

    /// Load `path` when it exists (defaults otherwise), then apply the
    /// process environment on top.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` returns the raw value for a variable name, which keeps this
    /// testable without touching the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HOST") {
            self.host = v;
        }
        if let Some(v) = lookup("PORT") {
            self.port = v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", v, e))?;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = lookup("SEED_PATH") {
            self.seed_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("IMPORTED_PATH") {
            self.imported_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("DATABASE_PATH") {
            self.database_path = non_empty(v).map(PathBuf::from);
        }
        if let Some(v) = lookup("USE_GOOGLE_PLACES") {
            self.use_google_places = parse_flag(&v);
        }
        if let Some(v) = lookup("USE_OSM") {
            self.use_osm = parse_flag(&v);
        }
        if let Some(v) = lookup("GOOGLE_MAPS_API_KEY") {
            self.google_maps_api_key = non_empty(v);
        }
        if let Some(v) = lookup("GOOGLE_PLACES_URL") {
            self.google_places_url = v;
        }
        if let Some(v) = lookup("NOMINATIM_URL") {
            self.nominatim_url = v;
        }
        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Feature flags are on only for the literal `true`
fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.port, 5000);
        assert!(!config.use_google_places);
        assert!(!config.use_osm);
        assert!(config.database_path.is_none());
        assert_eq!(config.server_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BackendConfig::default();
        config
            .apply_env(lookup_from(&[
                ("USE_GOOGLE_PLACES", "true"),
                ("USE_OSM", "yes"),
                ("GOOGLE_MAPS_API_KEY", "secret"),
                ("DATABASE_PATH", "cafes.db"),
                ("PORT", "5001"),
            ]))
            .unwrap();
        assert!(config.use_google_places);
        assert!(!config.use_osm);
        assert_eq!(config.google_maps_api_key.as_deref(), Some("secret"));
        assert_eq!(config.database_path, Some(PathBuf::from("cafes.db")));
        assert_eq!(config.port, 5001);
    }

    #[test]
    fn test_empty_env_values_mean_unset() {
        let mut config = BackendConfig::default();
        config.google_maps_api_key = Some("old".to_string());
        config
            .apply_env(lookup_from(&[("GOOGLE_MAPS_API_KEY", ""), ("DATABASE_PATH", " ")]))
            .unwrap();
        assert!(config.google_maps_api_key.is_none());
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = BackendConfig::default();
        assert!(config.apply_env(lookup_from(&[("PORT", "abc")])).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = 8080\nuse_osm = true\n").unwrap();
        let config = BackendConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.use_osm);
        assert_eq!(config.log_level, "info");
    }
}
