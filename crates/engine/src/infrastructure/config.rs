//! Process configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which persistence backend to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(ConfigError::Invalid {
                key: "STORE",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store: StoreKind,
    pub database_url: String,
    pub image_root: PathBuf,
    pub server_host: String,
    pub server_port: u16,
    pub snapshot_ttl: Duration,
    /// Comma-separated origins, or `*`. Unset disables CORS.
    pub cors_allowed_origins: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Sqlite,
            database_url: "sqlite:gangbook.db?mode=rwc".to_string(),
            image_root: PathBuf::from("images"),
            server_host: "0.0.0.0".to_string(),
            server_port: 3000,
            snapshot_ttl: Duration::from_secs(30),
            cors_allowed_origins: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let store = lookup("STORE")
            .map(|v| v.parse())
            .transpose()?
            .unwrap_or(defaults.store);
        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "SERVER_PORT",
                value: v,
            })?,
            None => defaults.server_port,
        };
        let snapshot_ttl = match lookup("SNAPSHOT_TTL_SECS") {
            Some(v) => Duration::from_secs(v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "SNAPSHOT_TTL_SECS",
                value: v,
            })?),
            None => defaults.snapshot_ttl,
        };

        Ok(Self {
            store,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            image_root: lookup("IMAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.image_root),
            server_host: lookup("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            snapshot_ttl,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}
