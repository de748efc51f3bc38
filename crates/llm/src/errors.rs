//! Provider errors - every way an insight request can fail as a whole

use crate::retry::RetryableError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider configuration error: {0}")]
    Configuration(String),

    #[error("{provider} API returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Provider call was cancelled")]
    Cancelled,

    #[error("Malformed provider response: {reason}")]
    MalformedResponse {
        reason: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("{provider} returned an empty response")]
    EmptyResponse { provider: String },

    #[error("Invalid insight request: {0}")]
    InvalidRequest(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
            source: None,
        }
    }

    pub fn transport(provider: &str, source: reqwest::Error) -> Self {
        Self::Transport {
            provider: provider.to_string(),
            source,
        }
    }
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        match self {
            // Rate limiting, request timeout and server errors are transient
            ProviderError::Http { status, .. } => {
                matches!(status, 408 | 429 | 500..=599)
            }
            ProviderError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            ProviderError::Timeout(_) => true,
            ProviderError::Configuration(_)
            | ProviderError::Cancelled
            | ProviderError::MalformedResponse { .. }
            | ProviderError::EmptyResponse { .. }
            | ProviderError::InvalidRequest(_) => false,
        }
    }

    fn error_type(&self) -> String {
        match self {
            ProviderError::Configuration(_) => "configuration",
            ProviderError::Http { status: 429, .. } => "rate_limit",
            ProviderError::Http { status: 401, .. } => "unauthorized",
            ProviderError::Http { status: 403, .. } => "forbidden",
            ProviderError::Http { status, .. } if *status >= 500 => "server_error",
            ProviderError::Http { .. } => "http",
            ProviderError::Transport { .. } => "network",
            ProviderError::Timeout(_) => "timeout",
            ProviderError::Cancelled => "cancelled",
            ProviderError::MalformedResponse { .. } => "malformed_response",
            ProviderError::EmptyResponse { .. } => "empty_response",
            ProviderError::InvalidRequest(_) => "invalid_request",
        }
        .to_string()
    }
}
