use std::{sync::Arc, time::Duration};

use reqwest::Client;
use tokio::{sync::Mutex, time::Instant};
use url::Url;

use crate::{
    config::Settings,
    error::ApiError,
    server::start_api_server,
    types::{AuthorizationState, TokenResponse},
    utils, warning,
};

/// Permissions requested from the user. Playlist access is all the pipeline
/// needs; the library scopes keep `whoami`-style tooling working.
pub const SCOPES: &[&str] = &[
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
    "playlist-read-private",
    "user-library-modify",
    "user-library-read",
    "user-top-read",
    "user-read-recently-played",
];

/// How long to wait for the browser round trip.
const AUTH_TIMEOUT: Duration = Duration::from_secs(120);

/// State shared between the authorization flow and the callback handler.
pub struct AuthSession {
    pub settings: Settings,
    pub pending: Mutex<Option<AuthorizationState>>,
}

/// Runs the one-time authorization-code flow and returns the provider's
/// token answer, which carries the long-lived refresh credential.
///
/// 1. Generates a random `state` value
/// 2. Starts the local callback server on `SERVER_ADDRESS`
/// 3. Opens the authorize URL in the default browser
/// 4. Waits for `/authorize` to receive and exchange the code
///
/// # Errors
///
/// Returns a message when the callback does not complete within two minutes.
pub async fn auth(settings: Settings) -> Result<TokenResponse, String> {
    let state = utils::generate_state();
    let auth_url = authorize_url(&settings, &state).map_err(|e| e.to_string())?;

    let session = Arc::new(AuthSession {
        settings,
        pending: Mutex::new(Some(AuthorizationState { state, token: None })),
    });

    let server_session = Arc::clone(&session);
    let server = tokio::spawn(async move { start_api_server(server_session).await });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(&session).await;
    server.abort();

    token.ok_or_else(|| "Authentication failed or timed out.".to_string())
}

/// Builds the provider authorize URL for the configured client.
pub fn authorize_url(settings: &Settings, state: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(&settings.auth_url)?;
    url.query_pairs_mut()
        .append_pair("client_id", &settings.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &settings.redirect_uri)
        .append_pair("state", state)
        .append_pair("scope", &SCOPES.join(" "));
    Ok(url)
}

/// Exchanges an authorization code for tokens using the client secret.
pub async fn exchange_code(settings: &Settings, code: &str) -> Result<TokenResponse, ApiError> {
    let res = Client::new()
        .post(&settings.token_url)
        .basic_auth(&settings.client_id, Some(&settings.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        return Err(ApiError::Auth {
            status: status.as_u16(),
            body,
        });
    }

    Ok(serde_json::from_str(&body)?)
}

async fn wait_for_token(session: &AuthSession) -> Option<TokenResponse> {
    let start = Instant::now();

    while start.elapsed() < AUTH_TIMEOUT {
        {
            let lock = session.pending.lock().await;
            if let Some(token) = lock.as_ref().and_then(|p| p.token.clone()) {
                return Some(token);
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}
