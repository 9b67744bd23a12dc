//! Error types shared across the crate.
//!
//! Every layer owns its own enum: [`ApiError`] for provider calls,
//! [`ScrapeError`] for now-playing sources, [`ConfigError`] for startup
//! settings and [`PipelineError`] for a polling cycle. The retry policy in
//! [`crate::spotify::RequestExecutor`] only ever inspects [`ApiError`].

use std::time::Duration;

use thiserror::Error;

/// Failures of a single provider request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The refresh credential could not be exchanged for an access token.
    #[error("token exchange failed with status {status}: {body}")]
    Auth { status: u16, body: String },

    /// The provider asked us to back off.
    #[error("rate limited by provider, retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    /// Any other non-2xx response.
    #[error("request failed with status {status}: {body}")]
    NotOk { status: u16, body: String },

    /// The task did not finish within its allotted time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The scheduler was closed and admits no more requests.
    #[error("request queue is closed")]
    QueueClosed,

    /// Connection, TLS or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected.
    #[error("unexpected response payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// Builds the error for a non-success status, keeping the raw body for the logs.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        ApiError::NotOk {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` if the executor may attempt the request again.
    ///
    /// A failed token exchange and a closed queue are final; everything else
    /// counts against the retry budget.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ApiError::Auth { .. } | ApiError::QueueClosed)
    }

    /// Returns `true` if the provider rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::NotOk { status: 401, .. })
    }
}

/// Failures while reading a now-playing source.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("failed to fetch now-playing source: {0}")]
    Http(#[from] reqwest::Error),

    #[error("now-playing source returned status {0}")]
    Status(u16),

    #[error("failed to parse now-playing payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read song file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed now-playing payload: {0}")]
    Malformed(String),
}

/// Invalid or missing startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Anything that can abort a polling cycle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("failed to write song log: {0}")]
    Record(#[from] std::io::Error),
}
