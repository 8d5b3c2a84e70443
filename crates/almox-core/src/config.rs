use almox_api::endpoints::DEFAULT_API_BASE;
use almox_api::{Endpoints, InventoryClient, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Env var that overrides `api.base_url`
pub const API_URL_ENV: &str = "ALMOX_API_URL";

/// Main configuration structure
///
/// Loaded from the config file, then env vars, then CLI flags.
/// Priority: CLI > Env > File > Defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api.base_url = url;
            }
        }
    }

    /// XDG config dir on Unix, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        Ok(Self::dir(dirs::config_dir())?.join("config.toml"))
    }

    /// Where the session file and the TUI log live
    pub fn data_dir() -> crate::Result<PathBuf> {
        Self::dir(dirs::data_dir())
    }

    fn dir(base: Option<PathBuf>) -> crate::Result<PathBuf> {
        base.map(|dir| dir.join("almox"))
            .ok_or_else(|| crate::Error::Config("Could not find a home for almox files".into()))
    }

    pub fn build_client(&self) -> crate::Result<InventoryClient> {
        Ok(InventoryClient::with_options(
            self.api.base_url.clone(),
            self.api.endpoints.clone(),
            Duration::from_secs(self.api.timeout_secs),
            self.api.retry.clone(),
        )?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout; in-flight calls are abandoned after this
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub endpoints: Endpoints,

    /// Backoff for idempotent reads
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            endpoints: Endpoints::default(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Quiet time before the remote item search fires
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,

    /// Quiet time before the local list filter is recomputed
    #[serde(default = "default_filter_debounce")]
    pub filter_debounce_ms: u64,

    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,

    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,

    #[serde(default = "default_history_limit")]
    pub history_limit: u32,
}

fn default_search_debounce() -> u64 {
    300
}

fn default_filter_debounce() -> u64 {
    200
}

fn default_sync_interval() -> u64 {
    5 * 60
}

fn default_toast_duration() -> u64 {
    3000
}

fn default_history_limit() -> u32 {
    almox_api::client::DEFAULT_HISTORY_LIMIT
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce(),
            filter_debounce_ms: default_filter_debounce(),
            sync_interval_secs: default_sync_interval(),
            toast_duration_ms: default_toast_duration(),
            history_limit: default_history_limit(),
        }
    }
}

impl TimingConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn filter_debounce(&self) -> Duration {
        Duration::from_millis(self.filter_debounce_ms)
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms)
    }
}

/// Admin credentials for the settings pages.
///
/// There is no built-in account: with nothing configured every login is refused.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub admin_user: Option<String>,
    pub admin_password: Option<String>,
}
