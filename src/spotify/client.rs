use std::{sync::Arc, time::Duration};

use reqwest::Client;

use crate::{config::Settings, error::ConfigError};

use super::{
    executor::RequestExecutor,
    pagination::Paginator,
    scheduler::RateLimitedScheduler,
    token::{Credentials, TokenManager},
};

/// One provider session: token cache, request scheduler and executor.
///
/// Nothing in here is global. Two clients never share a token or a pause
/// window, so tests and parallel pipelines stay isolated.
pub struct SpotifyClient {
    executor: RequestExecutor,
    page_delay: Duration,
}

impl SpotifyClient {
    pub fn new(executor: RequestExecutor, page_delay: Duration) -> Self {
        Self {
            executor,
            page_delay,
        }
    }

    /// Builds a session from the startup settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`] when no refresh credential is configured.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let http = Client::new();
        let credentials = Credentials {
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            refresh_token: settings.require_refresh_token()?.to_string(),
        };

        let tokens = Arc::new(TokenManager::new(
            http.clone(),
            settings.token_url.clone(),
            credentials,
        ));
        let scheduler = Arc::new(RateLimitedScheduler::new(
            settings.concurrency,
            settings.request_interval,
            settings.request_timeout,
        ));
        let executor = RequestExecutor::new(
            http,
            settings.api_url.clone(),
            tokens,
            scheduler,
            settings.max_retries,
        );

        Ok(Self::new(executor, settings.page_delay))
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn paginator(&self) -> Paginator<'_> {
        Paginator::new(&self.executor, self.page_delay)
    }

    pub fn tokens(&self) -> &Arc<TokenManager> {
        self.executor.tokens()
    }

    /// Forgets the cached access token; the next call refreshes.
    pub async fn clear_access_token(&self) {
        self.executor.tokens().clear_access_token().await;
    }
}
