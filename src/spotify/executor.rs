use std::{future::Future, sync::Arc, time::Duration};

use reqwest::{Client, Method, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;

use super::{scheduler::RateLimitedScheduler, token::TokenManager};

/// Seconds to back off when a 429 carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 3;

/// A provider call, described before it is sent so it can be replayed.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: Some(body),
        }
    }
}

/// Sends provider requests through the scheduler and retries failures.
///
/// Each attempt is one scheduler task. Rate-limit answers pause the
/// scheduler for the advertised time, a 401 drops the cached token, and
/// every failure except a rejected token exchange is retried until
/// `max_retries` extra attempts have been spent.
pub struct RequestExecutor {
    http: Client,
    api_url: String,
    tokens: Arc<TokenManager>,
    scheduler: Arc<RateLimitedScheduler>,
    max_retries: u32,
}

impl RequestExecutor {
    pub fn new(
        http: Client,
        api_url: impl Into<String>,
        tokens: Arc<TokenManager>,
        scheduler: Arc<RateLimitedScheduler>,
        max_retries: u32,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tokens,
            scheduler,
            max_retries,
        }
    }

    /// Sends `request` and decodes the JSON answer into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.execute(|| self.send_once(request)).await
    }

    /// Runs the task produced by `task` through the scheduler, retrying per
    /// policy. The closure is called once per attempt.
    ///
    /// # Errors
    ///
    /// Returns the last error once `max_retries + 1` attempts have failed, or
    /// immediately for [`ApiError::Auth`].
    pub async fn execute<T, F, Fut>(&self, mut task: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let err = match self.scheduler.run(task()).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }

            if let ApiError::RateLimit { retry_after } = &err {
                self.scheduler.pause_for(Duration::from_secs(*retry_after));
            } else if err.is_unauthorized() {
                self.tokens.clear_access_token().await;
            }

            if attempt > self.max_retries {
                warn!(attempts = attempt, error = %err, "giving up on request");
                return Err(err);
            }

            warn!(attempt, error = %err, "request failed, retrying");
        }
    }

    async fn send_once<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        let token = self.tokens.access_token(false).await?;
        let url = self.resolve(&request.path);
        debug!(method = %request.method, %url, "provider request");

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .bearer_auth(token.as_str())
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body)?);
        }

        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ApiError::RateLimit { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Pagination cursors come back as absolute URLs; everything else is
    /// relative to the API base.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with(&self.api_url) || path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.api_url, path.trim_start_matches('/'))
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    pub fn scheduler(&self) -> &Arc<RateLimitedScheduler> {
        &self.scheduler
    }
}
