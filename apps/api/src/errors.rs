use std::time::Duration;

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::http_client::UpstreamError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The caller's upstream API key was rejected.
    #[error("{0}")]
    UpstreamUnauthorized(String),

    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<UpstreamError> for AppError {
    fn from(e: UpstreamError) -> Self {
        tracing::warn!(
            "{} API call failed (status {:?}, retryable: {}): {e}",
            e.upstream(),
            e.status_code(),
            e.is_retryable()
        );
        match e {
            UpstreamError::InvalidCredentials { .. } => AppError::UpstreamUnauthorized(e.to_string()),
            UpstreamError::RateLimited { .. } => AppError::RateLimited {
                retry_after: e.retry_after(),
                message: e.to_string(),
            },
            _ => AppError::Upstream(e.to_string()),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Upstream(upstream) => upstream.into(),
            other => AppError::Llm(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after_secs = None;

        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UpstreamUnauthorized(msg) => (
                StatusCode::UNAUTHORIZED,
                "UPSTREAM_UNAUTHORIZED",
                msg.clone(),
            ),
            AppError::RateLimited {
                message,
                retry_after,
            } => {
                retry_after_secs = retry_after.map(|d| d.as_secs_f64().ceil() as u64);
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message.clone())
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "The AI response could not be processed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after_secs {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::Upstream;

    #[test]
    fn test_invalid_key_maps_to_401() {
        let err: AppError = UpstreamError::InvalidCredentials {
            upstream: Upstream::Search,
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limit_maps_to_429_with_header() {
        let err: AppError = UpstreamError::RateLimited {
            upstream: Upstream::Chat,
            retry_after: Duration::from_millis(1500),
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[RETRY_AFTER], "2");
    }

    #[test]
    fn test_server_error_maps_to_502() {
        let err: AppError = LlmError::Upstream(UpstreamError::Server {
            upstream: Upstream::Chat,
            status: 503,
        })
        .into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_transport_and_exhausted_failures_map_to_502() {
        for upstream_err in [
            UpstreamError::Request {
                upstream: Upstream::Search,
                status: None,
                message: "search API request failed: timed out".to_string(),
            },
            UpstreamError::Exhausted {
                upstream: Upstream::Chat,
            },
        ] {
            let err: AppError = upstream_err.into();
            assert!(matches!(err, AppError::Upstream(_)));
            assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
        }
    }

    #[test]
    fn test_parse_failure_maps_to_llm_error() {
        let parse = serde_json::from_str::<Vec<u8>>("nope").unwrap_err();
        let err: AppError = LlmError::Parse(parse).into();
        assert!(matches!(err, AppError::Llm(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
