//! # Back-end Configuration
//!
//! Settings for the salon back-end.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SALON_DB_PATH=/srv/salon/salon.db                                  │
//! │     SALON_UTC_OFFSET_MINUTES=-360                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/belleza/config.toml (Linux)                              │
//! │     ~/Library/Application Support/com.salon.belleza/config.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     platform data dir, Guatemala time (UTC−06:00)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/salon/salon.db"
//! max_connections = 5
//!
//! [business]
//! name = "Salon Belleza"
//! currency_symbol = "Q"
//! utc_offset_minutes = -360
//!
//! [logging]
//! filter = "info,salon=debug,sqlx=warn"
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, warn};

use salon_core::time::{business_offset, GUATEMALA_UTC_OFFSET_MINUTES};

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,salon=debug,sqlx=warn";

const CONFIG_FILE: &str = "config.toml";
const DATABASE_FILE: &str = "salon.db";

/// Largest offset any real timezone uses, in minutes.
const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

// =============================================================================
// Errors
// =============================================================================

/// Configuration load/save failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be written as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Config save failed: {0}")]
    SaveFailed(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. `None` means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// `[business]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// Name printed on order listings.
    #[serde(default = "default_business_name")]
    pub name: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Business timezone as a fixed offset from UTC.
    /// Default: -360 (America/Guatemala, no daylight saving)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,
}

fn default_business_name() -> String {
    "Salon Belleza".to_string()
}

fn default_currency_symbol() -> String {
    "Q".to_string()
}

fn default_utc_offset() -> i32 {
    GUATEMALA_UTC_OFFSET_MINUTES
}

impl Default for BusinessSettings {
    fn default() -> Self {
        BusinessSettings {
            name: default_business_name(),
            currency_symbol: default_currency_symbol(),
            utc_offset_minutes: default_utc_offset(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete back-end configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub business: BusinessSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.business.name.trim().is_empty() {
            return Err(ConfigError::Invalid("business.name is required".into()));
        }

        if self.business.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ConfigError::Invalid(format!(
                "business.utc_offset_minutes must be within ±{}, got {}",
                MAX_UTC_OFFSET_MINUTES, self.business.utc_offset_minutes
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SALON_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("SALON_BUSINESS_NAME") {
            self.business.name = name;
        }

        if let Some(offset) = lookup("SALON_UTC_OFFSET_MINUTES") {
            match offset.trim().parse::<i32>() {
                Ok(minutes) => {
                    debug!(minutes, "Overriding UTC offset from environment");
                    self.business.utc_offset_minutes = minutes;
                }
                Err(_) => warn!(offset = %offset, "Ignoring unparsable SALON_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(filter) = lookup("SALON_LOG") {
            self.logging.filter = filter;
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Resolved database file path.
    ///
    /// ## Platform-Specific Defaults
    /// - **macOS**: `~/Library/Application Support/com.salon.belleza/salon.db`
    /// - **Windows**: `%APPDATA%\salon\belleza\data\salon.db`
    /// - **Linux**: `~/.local/share/belleza/salon.db`
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
        })
    }

    /// The business timezone.
    pub fn business_offset(&self) -> FixedOffset {
        business_offset(self.business.utc_offset_minutes)
    }

    pub fn log_filter(&self) -> &str {
        &self.logging.filter
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "salon", "belleza")
}
