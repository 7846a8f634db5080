use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com";
pub const DEFAULT_IP_LOCATION_URL: &str = "https://ipinfo.io";

/// Base URLs of the three providers. Paths are appended by each client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub forecast: String,
    pub ip_location: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            forecast: DEFAULT_FORECAST_URL.to_string(),
            ip_location: DEFAULT_IP_LOCATION_URL.to_string(),
        }
    }
}

/// Request timeout and retry policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 5000,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Forecast response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,
    pub ttl_secs: u64,
    /// Overrides the platform cache directory.
    pub dir: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self { enabled: true, ttl_secs: 3600, dir: None }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// icons_dir = "/usr/share/meteo/icons"
///
/// [http]
/// timeout_secs = 5
///
/// [cache]
/// ttl_secs = 1800
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Directory holding the weather icon assets. Unset means icon ids only.
    pub icons_dir: Option<PathBuf>,
    pub endpoints: Endpoints,
    pub http: HttpSettings,
    pub cache: CacheSettings,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for cached forecast responses.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.cache_dir().join("responses")),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "meteo", "meteo")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
