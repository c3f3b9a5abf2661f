//! Application configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no
//! file) is a valid configuration. The API key is never read from the file;
//! it comes from `API_FOOTBALL_KEY` in the environment or `.env`.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use underdog_api::ApiConfig;
use underdog_core::{LeagueId, DEFAULT_LEAGUES};
use underdog_ledger::LedgerConfig;
use underdog_signal::SignalConfig;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_FOOTBALL_KEY";
/// Environment variable overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "API_BASE_URL";
/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "UNDERDOG_CONFIG";
/// Config file used when neither the CLI nor the environment names one.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub app: LoopSettings,
}

/// API-Football connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_bookmaker_id")]
    pub bookmaker_id: u32,
    /// Requests allowed per rolling minute.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Set from the environment only.
    #[serde(skip)]
    pub api_key: String,
}

fn default_base_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_bookmaker_id() -> u32 {
    8 // Bet365
}

fn default_rate_limit_per_minute() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            bookmaker_id: default_bookmaker_id(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
            timeout_secs: default_timeout_secs(),
            api_key: String::new(),
        }
    }
}

impl ApiSettings {
    pub fn to_api_config(&self) -> ApiConfig {
        ApiConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            ..ApiConfig::new(&self.base_url, &self.api_key, self.bookmaker_id)
        }
    }
}

/// Match tracking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// League ids to follow.
    #[serde(default = "default_leagues")]
    pub leagues: Vec<u32>,
    /// Tracked matches not seen for this long are dropped.
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_leagues() -> Vec<u32> {
    DEFAULT_LEAGUES.to_vec()
}

fn default_stale_after_secs() -> u64 {
    3 * 60 * 60
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            leagues: default_leagues(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl TrackerSettings {
    pub fn league_ids(&self) -> Vec<LeagueId> {
        self.leagues.iter().copied().map(LeagueId::new).collect()
    }
}

/// Main loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopSettings {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_stats_interval_secs() -> u64 {
    300
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

impl AppConfig {
    /// Config path: CLI argument > `UNDERDOG_CONFIG` > `config/default.toml`.
    pub fn resolve_path(cli_path: Option<String>) -> String {
        cli_path
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load, apply the environment and validate.
    ///
    /// A missing file falls back to defaults; an unreadable or invalid one
    /// is an error.
    pub fn load(path: &str) -> AppResult<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Read the API key (required) and base URL override through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        self.api.api_key = lookup(API_KEY_ENV)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AppError::Config(format!("{API_KEY_ENV} is not set")))?;

        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url;
        }
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        if self.api.rate_limit_per_minute == 0 {
            return Err(AppError::Config(
                "api.rate_limit_per_minute must be positive".to_string(),
            ));
        }

        if self.tracker.leagues.is_empty() {
            return Err(AppError::Config(
                "tracker.leagues must not be empty".to_string(),
            ));
        }

        if self.app.poll_interval_secs == 0 || self.app.stats_interval_secs == 0 {
            return Err(AppError::Config(
                "poll and stats intervals must be positive".to_string(),
            ));
        }

        self.signal.validate()?;
        self.ledger.validate()?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.app.poll_interval_secs)
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.app.stats_interval_secs)
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.tracker.stale_after_secs as i64)
    }
}
