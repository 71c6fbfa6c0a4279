use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::http_client::{RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
use crate::llm_client::{DEFAULT_CHAT_URL, DEFAULT_MODEL};
use crate::search::client::DEFAULT_SEARCH_URL;

/// Application configuration loaded from environment variables.
/// Every value has a default. API keys are NOT configuration: callers send
/// their own with each request.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub search_api_url: String,
    pub chat_api_url: String,
    pub chat_model: String,
    pub retry_max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: u64,
    /// Run the extra web-search query variants (contact / role / mailto).
    pub extended_web_queries: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            search_api_url: DEFAULT_SEARCH_URL.to_string(),
            chat_api_url: DEFAULT_CHAT_URL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            retry_max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_base_delay_ms: DEFAULT_BASE_DELAY_MS,
            request_timeout_secs: 60,
            extended_web_queries: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: env_or("RUST_LOG", &defaults.rust_log),
            search_api_url: env_or("SEARCH_API_URL", &defaults.search_api_url),
            chat_api_url: env_or("CHAT_API_URL", &defaults.chat_api_url),
            chat_model: env_or("CHAT_MODEL", &defaults.chat_model),
            retry_max_attempts: parse_env("RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts)?,
            retry_base_delay_ms: parse_env("RETRY_BASE_DELAY_MS", defaults.retry_base_delay_ms)?,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs)?,
            extended_web_queries: parse_env("EXTENDED_WEB_QUERIES", defaults.extended_web_queries)?,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts.max(1),
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        _ => Ok(default),
    }
}
