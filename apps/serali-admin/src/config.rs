//! # Admin Configuration
//!
//! Settings for the admin app itself (not the brand settings it edits).
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Defaults (AdminConfig::default)                                    │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  2. admin.toml (explicit path, or the platform config dir)             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  3. Environment overrides                                              │
//! │     SERALI_DB_PATH, SERALI_NOTICE_SECS,                                │
//! │     SERALI_LEGACY_DELIVERY_FEE, SERALI_LOG                             │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  4. validate()                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [database]
//! path = "/var/lib/serali/settings.db"
//! max_connections = 5
//!
//! [editor]
//! success_notice_secs = 3
//! write_legacy_delivery_fee = false
//!
//! [logging]
//! filter = "info,serali=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use serali_core::DocumentOptions;
use serali_db::DbConfig;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::state::EditorSettings;

/// Default tracing filter.
pub const DEFAULT_LOG_FILTER: &str = "info,serali=debug,sqlx=warn";

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to `settings.db` in the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,

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

/// `[editor]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// How long the "saved" notice stays up.
    #[serde(default = "default_success_notice_secs")]
    pub success_notice_secs: u64,

    /// Write `deliveryFee: 0` for readers that predate zone pricing.
    #[serde(default)]
    pub write_legacy_delivery_fee: bool,
}

fn default_success_notice_secs() -> u64 {
    3
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            success_notice_secs: default_success_notice_secs(),
            write_legacy_delivery_fee: false,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
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
// Admin Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AdminConfig {
    /// Loads the config file (if it exists), applies environment overrides
    /// and validates the result.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading admin config from file");
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

    /// Like [`AdminConfig::load`], falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load admin config: {}. Using defaults.", e);
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

        info!(?path, "Admin config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.editor.success_notice_secs == 0 {
            return Err(ConfigError::Invalid(
                "editor.success_notice_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`. Unparseable values are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SERALI_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(secs) = lookup("SERALI_NOTICE_SECS") {
            if let Ok(secs) = secs.parse::<u64>() {
                self.editor.success_notice_secs = secs;
            }
        }

        if let Some(flag) = lookup("SERALI_LEGACY_DELIVERY_FEE") {
            match flag.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.editor.write_legacy_delivery_fee = true,
                "0" | "false" | "no" => self.editor.write_legacy_delivery_fee = false,
                other => warn!(value = %other, "Ignoring SERALI_LEGACY_DELIVERY_FEE"),
            }
        }

        if let Some(filter) = lookup("SERALI_LOG") {
            self.logging.filter = filter;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "serali", "admin")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("admin.toml"))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// Resolves the database file, creating the data directory if needed.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }

        let dirs = Self::project_dirs()
            .ok_or_else(|| ConfigError::Invalid("Could not determine app data directory".into()))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;

        Ok(data_dir.join("settings.db"))
    }

    /// Pool configuration for the settings store.
    pub fn db_config(&self) -> ConfigResult<DbConfig> {
        Ok(DbConfig::new(self.database_path()?).max_connections(self.database.max_connections))
    }

    /// Session settings derived from the `[editor]` section.
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            success_notice: Duration::from_secs(self.editor.success_notice_secs),
            document: DocumentOptions {
                write_legacy_delivery_fee: self.editor.write_legacy_delivery_fee,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
