//! Configuration management for leiscope.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Every registry tunable is an injectable
//! value with a reference default rather than a constant in the client.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration.
///
/// This is loaded from `~/.config/leiscope/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Registry client settings
    pub registry: RegistryConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from the default location, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path.
    ///
    /// Unlike [`AppConfig::load`], a missing file is an error here.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Reads `path` when given, the default location otherwise, then applies:
    /// - `LEISCOPE_BASE_URL`: Override the registry base URL
    /// - `LEISCOPE_RATE_LIMIT`: Override the per-window request quota
    /// - `LEISCOPE_TIMEOUT_MS`: Override the per-request timeout
    /// - `LEISCOPE_BATCH_SIZE`: Override the batch chunk size
    ///
    /// The result is validated before it is returned.
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => Self::load()?,
        };

        if let Ok(val) = std::env::var("LEISCOPE_BASE_URL") {
            tracing::debug!("Override registry.base_url from env: {}", val);
            config.registry.base_url = val;
        }

        if let Ok(val) = std::env::var("LEISCOPE_RATE_LIMIT") {
            if let Ok(quota) = val.parse() {
                config.registry.rate_limit_quota = quota;
                tracing::debug!("Override registry.rate_limit_quota from env: {}", quota);
            }
        }

        if let Ok(val) = std::env::var("LEISCOPE_TIMEOUT_MS") {
            if let Ok(timeout) = val.parse() {
                config.registry.request_timeout_ms = timeout;
                tracing::debug!("Override registry.request_timeout_ms from env: {}", timeout);
            }
        }

        if let Ok(val) = std::env::var("LEISCOPE_BATCH_SIZE") {
            if let Ok(size) = val.parse() {
                config.registry.batch_chunk_size = size;
                tracing::debug!("Override registry.batch_chunk_size from env: {}", size);
            }
        }

        config.registry.validate()?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/leiscope/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("org", "leiscope", "leiscope").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Registry client settings.
///
/// Defaults match the public GLEIF API and its published fair-use quota.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the registry API, without trailing slash
    pub base_url: String,
    /// Requests allowed per rate-limit window
    pub rate_limit_quota: u32,
    /// Length of the rate-limit window in milliseconds
    pub rate_limit_window_ms: u64,
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Identifiers validated concurrently per batch chunk
    pub batch_chunk_size: usize,
    /// Pause between batch chunks in milliseconds
    pub batch_delay_ms: u64,
    /// Maximum number of direct children resolved per relationship lookup
    pub relationship_child_cap: usize,
    /// Default number of fuzzy candidates resolved when the caller gives no limit
    pub fuzzy_result_limit: usize,
    /// Field passed to the fuzzy completions endpoint
    pub fuzzy_field: String,
    /// Maximum hops walked when resolving an ultimate parent
    pub max_parent_depth: usize,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.gleif.org/api/v1".to_string(),
            rate_limit_quota: 60,
            rate_limit_window_ms: 60_000,
            request_timeout_ms: 30_000,
            batch_chunk_size: 10,
            batch_delay_ms: 1_000,
            relationship_child_cap: 10,
            fuzzy_result_limit: 10,
            fuzzy_field: "entity.legalName".to_string(),
            max_parent_depth: 10,
            user_agent: concat!("leiscope/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl RegistryConfig {
    /// Check that every value is usable by the client.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(invalid(
                "base_url",
                format!("must be an http(s) URL, got '{}'", self.base_url),
            ));
        }
        if self.rate_limit_quota == 0 {
            return Err(invalid("rate_limit_quota", "must be greater than zero"));
        }
        if self.rate_limit_window_ms == 0 {
            return Err(invalid("rate_limit_window_ms", "must be greater than zero"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be greater than zero"));
        }
        if self.batch_chunk_size == 0 {
            return Err(invalid("batch_chunk_size", "must be greater than zero"));
        }
        if self.relationship_child_cap == 0 {
            return Err(invalid("relationship_child_cap", "must be greater than zero"));
        }
        if self.fuzzy_result_limit == 0 {
            return Err(invalid("fuzzy_result_limit", "must be greater than zero"));
        }
        if self.fuzzy_field.trim().is_empty() {
            return Err(invalid("fuzzy_field", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field: format!("registry.{field}"),
        reason: reason.into(),
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info,leiscope=debug".to_string(),
        }
    }
}
