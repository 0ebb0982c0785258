use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 5000;
const GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_TIMEOUT_SECS: u64 = 60;
const AI_MAX_ATTEMPTS: u32 = 3;
const AI_INITIAL_BACKOFF_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub gemini: GeminiConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// `None` keeps the server bootable; AI calls then fail and `/health` reports it.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },
    #[error("Invalid number for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be at least 1")]
    ZeroAttempts { name: &'static str },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. `from_env` is the production path.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| HOST.to_string());
        let port = parse_or_default(&lookup, "PORT", PORT)?;
        let environment = lookup("RUST_ENV").unwrap_or_else(|| "development".to_string());

        let api_key = lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        let model = lookup("GEMINI_MODEL").unwrap_or_else(|| GEMINI_MODEL.to_string());
        let raw_base_url = lookup("GEMINI_BASE_URL").unwrap_or_else(|| GEMINI_BASE_URL.to_string());
        let base_url = Url::parse(&raw_base_url).map_err(|_| ConfigError::InvalidUrl {
            name: "GEMINI_BASE_URL",
            value: raw_base_url.clone(),
        })?;
        let timeout_secs = parse_or_default(&lookup, "GEMINI_TIMEOUT_SECS", GEMINI_TIMEOUT_SECS)?;

        let max_attempts = parse_or_default(&lookup, "AI_MAX_ATTEMPTS", AI_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts {
                name: "AI_MAX_ATTEMPTS",
            });
        }
        let backoff_ms = parse_or_default(&lookup, "AI_INITIAL_BACKOFF_MS", AI_INITIAL_BACKOFF_MS)?;

        Ok(Self {
            host,
            port,
            environment,
            gemini: GeminiConfig {
                api_key,
                model,
                base_url,
                timeout: Duration::from_secs(timeout_secs),
            },
            retry: RetryConfig {
                max_attempts,
                initial_backoff: Duration::from_millis(backoff_ms),
            },
        })
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name: key, value }),
        None => Ok(default),
    }
}
