/// HTTP client: the single retry-aware path for every upstream call in Hunter.
///
/// ARCHITECTURAL RULE: search and chat requests both go through `RetryClient`.
/// Neither upstream is called with a bare reqwest client.
///
/// Retry rules:
/// - 429: wait for the server's `Retry-After`, or `2^attempt * base_delay` when absent
/// - 401: fail immediately, the key is wrong and retrying cannot fix it
/// - 5xx: wait `2^attempt * base_delay`, then retry
/// - anything else: fail immediately with the upstream's message
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod testing;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Which upstream a request targets. Only used to label logs and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Search,
    Chat,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Search => f.write_str("search"),
            Upstream::Chat => f.write_str("chat"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid {upstream} API key. Please check your key in the configuration.")]
    InvalidCredentials { upstream: Upstream },

    #[error(
        "Rate limit reached. Please wait {} seconds before trying again.",
        .retry_after.as_secs_f64()
    )]
    RateLimited {
        upstream: Upstream,
        retry_after: Duration,
    },

    #[error("{upstream} API server error (status {status}). Please try again later.")]
    Server { upstream: Upstream, status: u16 },

    #[error("{message}")]
    Request {
        upstream: Upstream,
        status: Option<u16>,
        message: String,
    },

    #[error("{upstream} API request failed after multiple attempts.")]
    Exhausted { upstream: Upstream },
}

impl UpstreamError {
    pub fn upstream(&self) -> Upstream {
        match self {
            UpstreamError::InvalidCredentials { upstream }
            | UpstreamError::RateLimited { upstream, .. }
            | UpstreamError::Server { upstream, .. }
            | UpstreamError::Request { upstream, .. }
            | UpstreamError::Exhausted { upstream } => *upstream,
        }
    }

    /// HTTP status of the final failed attempt, when there was one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            UpstreamError::InvalidCredentials { .. } => Some(401),
            UpstreamError::RateLimited { .. } => Some(429),
            UpstreamError::Server { status, .. } => Some(*status),
            UpstreamError::Request { status, .. } => *status,
            UpstreamError::Exhausted { .. } => None,
        }
    }

    /// How long the caller should wait before trying again. Only set for rate limits.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            UpstreamError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Rate limits and server faults are transient; everything else is permanent.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UpstreamError::RateLimited { .. } | UpstreamError::Server { .. }
        )
    }
}

/// Attempt budget and backoff base for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// `2^attempt * base_delay`: 1s, 2s, 4s with the default base.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// A JSON POST ready to be sent to an upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl OutboundRequest {
    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Status, headers and raw body of one upstream response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// A request that never produced a complete response: connect, timeout or body read failures.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

/// The wire underneath `RetryClient`. Production uses reqwest; tests script responses.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .post(&request.url)
            .header("content-type", "application/json")
            .json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Wraps a `Transport` with the retry rules above.
#[derive(Clone)]
pub struct RetryClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RetryClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Sends `request` under the client's default policy and decodes the JSON body.
    pub async fn call<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        request: &OutboundRequest,
    ) -> Result<T, UpstreamError> {
        self.call_with_policy(upstream, request, self.policy).await
    }

    pub async fn call_with_policy<T: DeserializeOwned>(
        &self,
        upstream: Upstream,
        request: &OutboundRequest,
        policy: RetryPolicy,
    ) -> Result<T, UpstreamError> {
        for attempt in 0..policy.max_attempts {
            let is_last_attempt = attempt + 1 >= policy.max_attempts;

            let response = self.transport.send(request).await.map_err(|e| {
                UpstreamError::Request {
                    upstream,
                    status: e.status,
                    message: format!("{upstream} API request failed: {e}"),
                }
            })?;
            let status = response.status;

            if status.is_success() {
                debug!("{upstream} API call succeeded on attempt {}", attempt + 1);
                return serde_json::from_str(&response.body).map_err(|e| {
                    UpstreamError::Request {
                        upstream,
                        status: Some(status.as_u16()),
                        message: format!("Malformed {upstream} API response: {e}"),
                    }
                });
            }

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = retry_after_header(&response.headers)
                    .unwrap_or_else(|| policy.backoff(attempt));
                if is_last_attempt {
                    return Err(UpstreamError::RateLimited {
                        upstream,
                        retry_after,
                    });
                }
                warn!(
                    "{upstream} API rate limit reached. Retrying in {}s (attempt {}/{})",
                    retry_after.as_secs_f64(),
                    attempt + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(retry_after).await;
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                return Err(UpstreamError::InvalidCredentials { upstream });
            }

            if status.is_server_error() {
                if is_last_attempt {
                    return Err(UpstreamError::Server {
                        upstream,
                        status: status.as_u16(),
                    });
                }
                let delay = policy.backoff(attempt);
                warn!(
                    "{upstream} API returned {status}. Retrying in {}ms (attempt {}/{})",
                    delay.as_millis(),
                    attempt + 1,
                    policy.max_attempts
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let message = upstream_error_message(&response.body)
                .unwrap_or_else(|| format!("An error occurred with the {upstream} API."));
            return Err(UpstreamError::Request {
                upstream,
                status: Some(status.as_u16()),
                message,
            });
        }

        Err(UpstreamError::Exhausted { upstream })
    }
}

/// Reads `Retry-After` as a number of seconds. `HeaderMap` lookups are
/// case-insensitive, so `retry-after` and `Retry-After` are both covered.
/// Values a `Duration` cannot hold (negative, NaN, overflowing) count as absent.
fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
}

/// Pulls a human-readable message out of an upstream error body.
/// Accepts `{"error": {"message": ..}}`, `{"error": ".."}` and `{"message": ..}`.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let message = match value.get("error") {
        Some(Value::Object(error)) => error.get("message").and_then(Value::as_str),
        Some(Value::String(error)) => Some(error.as_str()),
        _ => None,
    }
    .or_else(|| value.get("message").and_then(Value::as_str))?;

    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}
