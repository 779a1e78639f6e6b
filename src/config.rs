//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SEED_PATH: &str = "data/directory.json";
const DEFAULT_CACHE_TTL_SECS: u64 = 10 * 60;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    /// JSON file the in-memory directory is seeded from.
    pub seed_path: PathBuf,
    pub listing_cache_ttl: Duration,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            seed_path: PathBuf::from(DEFAULT_SEED_PATH),
            listing_cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            allowed_origins: split_origins(DEFAULT_ALLOWED_ORIGINS),
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment, loading `.env` first.
    /// Unset variables fall back to defaults; malformed values are errors.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "port number",
                value,
            })?,
            None => defaults.port,
        };

        let listing_cache_ttl = match lookup("LISTING_CACHE_TTL_SECS") {
            Some(value) => {
                let secs: u64 = value.trim().parse().map_err(|_| ConfigError::Invalid {
                    name: "LISTING_CACHE_TTL_SECS",
                    expected: "number of seconds",
                    value,
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.listing_cache_ttl,
        };

        let seed_path = lookup("DIRECTORY_SEED_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                log::warn!(
                    "DIRECTORY_SEED_PATH not set, using default path: {}",
                    DEFAULT_SEED_PATH
                );
                defaults.seed_path.clone()
            });

        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port,
            seed_path,
            listing_cache_ttl,
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|value| split_origins(&value))
                .unwrap_or(defaults.allowed_origins),
        })
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
