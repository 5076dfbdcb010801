//! Configuration types and parsing for kuppa.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "kuppa.yml";

/// Environment variable overriding the Supabase project URL.
pub const ENV_SUPABASE_URL: &str = "SUPABASE_URL";
/// Environment variable overriding the Supabase service key.
pub const ENV_SUPABASE_KEY: &str = "SUPABASE_KEY";
/// Environment variable overriding the application status.
pub const ENV_APP_STATUS: &str = "APP_STATUS";

/// Main project configuration from kuppa.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Application status (guards destructive migrations in production)
    #[serde(default)]
    pub app_status: AppStatus,

    /// Directory containing migration files, relative to the project root
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Deployment status of the application.
///
/// Destructive migration commands prompt for confirmation when the status
/// is `Production` and `--force` is not given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    #[default]
    Development,
    Production,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Whether database features are enabled at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Supabase project URL (overridden by SUPABASE_URL)
    #[serde(default)]
    pub url: Option<String>,

    /// Supabase service key (overridden by SUPABASE_KEY)
    #[serde(default)]
    pub key: Option<String>,

    /// Working schema for migrations and the wipe operation
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Name of the migration history table
    #[serde(default = "default_history_table")]
    pub history_table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            enabled: true,
            url: None,
            key: None,
            schema: default_schema(),
            history_table: default_history_table(),
        }
    }
}

/// Resolved Supabase credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub url: String,
    pub key: String,
}

impl Config {
    /// Load configuration from a specific file path, then apply
    /// environment overrides.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {e}", path.display()),
            })?;
        if config.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "project name must not be empty".to_string(),
            });
        }
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from `<dir>/kuppa.yml`.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE))
    }

    /// Load configuration from `<dir>/kuppa.yml`, falling back to defaults
    /// (plus environment overrides) when the file does not exist.
    ///
    /// Commands that only touch the local filesystem, like the migration
    /// generator, work without a config file.
    pub fn load_or_default(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("{} not found, using defaults", path.display());
            let mut config = Config {
                name: "kuppa-app".to_string(),
                app_status: AppStatus::default(),
                migrations_path: default_migrations_path(),
                database: DatabaseConfig::default(),
            };
            config.apply_env();
            Ok(config)
        }
    }

    /// Overlay SUPABASE_URL, SUPABASE_KEY, and APP_STATUS from the
    /// process environment. Environment always wins over file values.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_SUPABASE_URL) {
            if !url.is_empty() {
                self.database.url = Some(url);
            }
        }
        if let Ok(key) = std::env::var(ENV_SUPABASE_KEY) {
            if !key.is_empty() {
                self.database.key = Some(key);
            }
        }
        if let Ok(status) = std::env::var(ENV_APP_STATUS) {
            if status.eq_ignore_ascii_case("production") {
                self.app_status = AppStatus::Production;
            } else if !status.is_empty() {
                self.app_status = AppStatus::Development;
            }
        }
    }

    /// Whether the application is flagged as production.
    pub fn is_production(&self) -> bool {
        self.app_status == AppStatus::Production
    }
}

impl DatabaseConfig {
    /// Resolve credentials, or `None` when database features should be
    /// treated as disabled.
    ///
    /// Missing credentials are a degraded mode, not a fatal error: the
    /// caller is expected to warn and skip database work.
    pub fn credentials(&self) -> Option<Credentials> {
        if !self.enabled {
            return None;
        }
        match (&self.url, &self.key) {
            (Some(url), Some(key)) if !url.is_empty() && !key.is_empty() => Some(Credentials {
                url: url.clone(),
                key: key.clone(),
            }),
            _ => {
                log::warn!(
                    "SUPABASE_URL or SUPABASE_KEY is missing; database features are disabled"
                );
                None
            }
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_migrations_path() -> String {
    "app/migrations".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_history_table() -> String {
    "kuppa_migrations".to_string()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
