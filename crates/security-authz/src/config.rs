//! Authorization manager configuration.
//!
//! Configuration is loaded from environment variables with defaults
//! suitable for a single-farm installation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration of the authorization manager.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorizationConfig {
    /// Name of the user that bypasses every rule (case-insensitive).
    pub superadmin_name: String,

    /// Identifier of the main wiki, which is the farm root.
    pub main_wiki: String,

    /// Maximum number of entries per cache level.
    pub cache_capacity: usize,

    /// Whether the system starts in read-only mode.
    #[serde(default)]
    pub read_only: bool,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            superadmin_name: "superadmin".to_string(),
            main_wiki: "xwiki".to_string(),
            cache_capacity: 10_000,
            read_only: false,
        }
    }
}

impl AuthorizationConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SECURITY_SUPERADMIN_NAME`: super-admin user name (default: superadmin)
    /// - `SECURITY_MAIN_WIKI`: main wiki identifier (default: xwiki)
    /// - `SECURITY_CACHE_CAPACITY`: entries per cache level (default: 10000)
    /// - `SECURITY_READ_ONLY`: start in read-only mode (default: false)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            superadmin_name: std::env::var("SECURITY_SUPERADMIN_NAME").unwrap_or(default.superadmin_name),
            main_wiki: std::env::var("SECURITY_MAIN_WIKI").unwrap_or(default.main_wiki),
            cache_capacity: std::env::var("SECURITY_CACHE_CAPACITY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.cache_capacity),
            read_only: std::env::var("SECURITY_READ_ONLY")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.read_only),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.superadmin_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "superadmin_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.main_wiki.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "main_wiki".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cache_capacity".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
