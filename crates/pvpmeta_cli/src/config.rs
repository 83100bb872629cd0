//! Configuration file support for pvpmeta.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `PVPMETA_`, e.g., `PVPMETA_DATABASE_URL`)
//! 3. Config file (~/.config/pvpmeta/config.toml or ./pvpmeta.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to `sqlite://~/.local/state/pvpmeta/pvpmeta.db` on Linux
//! (using the XDG state directory) if not explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "postgres://localhost/pvpmeta"
//! max_connections = 10
//!
//! [blizzard]
//! token = "..."  # or use PVPMETA_BLIZZARD_TOKEN env var
//! rps = 95
//! hourly_quota = 36000
//!
//! [sync]
//! regions = ["us", "eu"]
//! concurrency = 10
//! batch_size = 50
//! log_path = "/var/log/pvpmeta/pvp_sync.log"
//!
//! [aggregation]
//! top_n = 1000
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use pvpmeta::blizzard::{DEFAULT_TIMEOUT_SECS, rate_limits};
use pvpmeta::policy::SYNC_REGIONS;
use pvpmeta::retry::DEFAULT_MAX_RETRIES;
use pvpmeta::sync::{
    DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_LEADERBOARD_CONCURRENCY,
    DEFAULT_META_CONCURRENCY, DEFAULT_POOL_LIMIT, DEFAULT_TOP_N,
};
use serde::Deserialize;

const APP_NAME: &str = "pvpmeta";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub blizzard: BlizzardConfig,
    pub sync: SyncConfig,
    pub aggregation: AggregationConfig,
}

/// Database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL.
    /// Supports sqlite:// and postgres:// schemes.
    pub url: Option<String>,
    /// Pool size. Sync concurrency is capped one below this.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_POOL_LIMIT as u32,
        }
    }
}

/// Game API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BlizzardConfig {
    /// OAuth access token.
    /// Can also be set via PVPMETA_BLIZZARD_TOKEN environment variable.
    pub token: Option<String>,
    /// Requests per second per region.
    pub rps: u32,
    /// Requests per hour per region.
    pub hourly_quota: u32,
    pub timeout_secs: u64,
    /// Retries after a 429.
    pub max_retries: usize,
}

impl Default for BlizzardConfig {
    fn default() -> Self {
        Self {
            token: None,
            rps: rate_limits::DEFAULT_RPS,
            hourly_quota: rate_limits::DEFAULT_HOURLY_QUOTA,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Default sync options.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub regions: Vec<String>,
    /// Concurrent character syncs within a batch.
    pub concurrency: usize,
    pub leaderboard_concurrency: usize,
    pub meta_concurrency: usize,
    pub batch_size: usize,
    /// Sync log file. Defaults to `pvp_sync.log` in the state directory.
    pub log_path: Option<PathBuf>,
    /// Whether to disable proactive rate limiting.
    pub no_rate_limit: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            regions: SYNC_REGIONS.iter().map(|r| r.to_string()).collect(),
            concurrency: DEFAULT_CONCURRENCY,
            leaderboard_concurrency: DEFAULT_LEADERBOARD_CONCURRENCY,
            meta_concurrency: DEFAULT_META_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            log_path: None,
            no_rate_limit: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Characters per (bracket, spec) counted by the popularity tables.
    pub top_n: usize,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/pvpmeta/config.toml)
    /// 3. Local config file (./pvpmeta.toml)
    /// 4. Environment variables with PVPMETA_ prefix
    /// 5. `PVP_META_TOP_N`, the name older deployments used for the cohort size
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("pvpmeta.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./pvpmeta.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // PVPMETA_BLIZZARD_TOKEN -> blizzard.token, PVPMETA_SYNC_REGIONS=us,eu -> sync.regions
        builder = builder.add_source(Self::environment());

        let config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.with_legacy_top_n(std::env::var("PVP_META_TOP_N").ok().as_deref())
    }

    fn with_legacy_top_n(mut self, value: Option<&str>) -> Self {
        match value.map(str::parse::<usize>) {
            Some(Ok(top_n)) => self.aggregation.top_n = top_n,
            Some(Err(e)) => tracing::warn!("Ignoring PVP_META_TOP_N: {}", e),
            None => {}
        }
        self
    }

    fn environment() -> Environment {
        Environment::with_prefix("PVPMETA")
            .separator("_")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sync.regions")
    }

    /// Get the database URL, falling back to the default state directory path.
    ///
    /// The `mode=rwc` parameter creates the SQLite file if it doesn't exist.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("pvpmeta.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// Where `pvp_sync` log lines are appended.
    pub fn sync_log_path(&self) -> Option<PathBuf> {
        self.sync
            .log_path
            .clone()
            .or_else(|| Self::default_state_dir().map(|dir| dir.join("pvp_sync.log")))
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the default state directory path.
    ///
    /// On Linux, this is `$XDG_STATE_HOME/pvpmeta` or `~/.local/state/pvpmeta`.
    /// On macOS/Windows, falls back to the data directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", APP_NAME).map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}
