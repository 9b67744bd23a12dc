use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{error::ApiError, types::TokenResponse};

/// Bearer token for provider calls.
///
/// No expiry is tracked: the pipeline invalidates the token at the start of
/// every cycle and a 401 invalidates it mid-cycle.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Client credentials plus the long-lived refresh credential.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

struct TokenState {
    token: Option<AccessToken>,
    refresh_token: String,
}

/// Caches the access token and refreshes it on demand.
///
/// The state lock is held across the credential exchange, so callers that
/// arrive while a refresh is in flight queue on the lock and pick up its
/// result instead of starting a second exchange.
pub struct TokenManager {
    http: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    state: Mutex<TokenState>,
    refreshes: AtomicU64,
}

impl TokenManager {
    pub fn new(http: Client, token_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            http,
            token_url: token_url.into(),
            client_id: credentials.client_id,
            client_secret: credentials.client_secret,
            state: Mutex::new(TokenState {
                token: None,
                refresh_token: credentials.refresh_token,
            }),
            refreshes: AtomicU64::new(0),
        }
    }

    /// Returns the cached token, exchanging the refresh credential first if
    /// nothing is cached or `force_refresh` is set.
    ///
    /// A forced refresh that had to wait for another caller's refresh reuses
    /// that fresh token.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] when the provider rejects the exchange,
    /// [`ApiError::Transport`] / [`ApiError::Decode`] when it cannot be reached
    /// or answers with garbage.
    pub async fn access_token(&self, force_refresh: bool) -> Result<AccessToken, ApiError> {
        let observed = self.refreshes.load(Ordering::Acquire);
        let mut state = self.state.lock().await;

        if let Some(token) = &state.token {
            let refreshed_while_waiting = self.refreshes.load(Ordering::Acquire) != observed;
            if !force_refresh || refreshed_while_waiting {
                return Ok(token.clone());
            }
        }

        let response = self.exchange(&state.refresh_token).await?;
        if let Some(rotated) = response.refresh_token.filter(|t| !t.is_empty()) {
            debug!("provider rotated the refresh credential");
            state.refresh_token = rotated;
        }

        let token = AccessToken::new(response.access_token);
        state.token = Some(token.clone());
        let count = self.refreshes.fetch_add(1, Ordering::AcqRel) + 1;
        info!(refreshes = count, "access token refreshed");

        Ok(token)
    }

    /// Drops the cached token so the next call refreshes. Idempotent.
    pub async fn clear_access_token(&self) {
        self.state.lock().await.token = None;
    }

    /// Number of successful exchanges since construction.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes.load(Ordering::Acquire)
    }

    async fn exchange(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        debug!(url = %self.token_url, "exchanging refresh credential");
        let res = self
            .http
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "token exchange rejected");
            return Err(ApiError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
