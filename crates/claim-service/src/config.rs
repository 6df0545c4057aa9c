//! Configuration management for the Claim Service
//!
//! Loads configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use fra_common::StatusVocabulary;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Where claims and officer profiles are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Redis,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "redis" => Ok(StorageBackend::Redis),
            other => anyhow::bail!("Unknown STORAGE_BACKEND (expected memory/redis): {}", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server host
    pub api_host: String,

    /// API server port
    pub api_port: u16,

    pub storage_backend: StorageBackend,

    /// Redis connection URL, used by the redis backend
    pub redis_url: String,

    /// JSON file with officers and claims loaded at startup
    pub seed_file: Option<PathBuf>,

    /// Extra status labels, `Alias=Canonical` pairs separated by commas
    pub status_aliases: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists (for local development)
        dotenvy::dotenv().ok();

        let config = Config {
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8086".to_string())
                .parse()
                .context("Invalid API_PORT")?,

            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,

            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),

            seed_file: env::var("SEED_FILE").ok().map(PathBuf::from),

            status_aliases: env::var("STATUS_ALIASES").unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.api_port == 0 {
            anyhow::bail!("API_PORT must be greater than 0");
        }

        if self.storage_backend == StorageBackend::Redis && self.redis_url.is_empty() {
            anyhow::bail!("REDIS_URL is required for the redis storage backend");
        }

        self.vocabulary()?;

        Ok(())
    }

    /// Get the API server address
    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Status vocabulary with the configured aliases applied
    pub fn vocabulary(&self) -> Result<StatusVocabulary> {
        StatusVocabulary::with_aliases(&self.status_aliases).context("Invalid STATUS_ALIASES")
    }
}
