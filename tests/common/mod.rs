#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use nowplaylist::spotify::{Credentials, RateLimitedScheduler, RequestExecutor, SpotifyClient, TokenManager};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const TOKEN_PATH: &str = "/api/token";

pub fn credentials() -> Credentials {
    Credentials {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        refresh_token: "initial-refresh".to_string(),
    }
}

pub fn token_manager(server: &MockServer) -> TokenManager {
    TokenManager::new(
        reqwest::Client::new(),
        format!("{}{TOKEN_PATH}", server.uri()),
        credentials(),
    )
}

pub fn token_body(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
    })
}

/// Token endpoint that always hands out `access_token`, expected `times` times.
pub async fn mount_token(server: &MockServer, access_token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access_token)))
        .expect(times)
        .mount(server)
        .await;
}

pub fn executor_for(server: &MockServer, api_url: String, max_retries: u32) -> RequestExecutor {
    RequestExecutor::new(
        reqwest::Client::new(),
        api_url,
        Arc::new(token_manager(server)),
        Arc::new(RateLimitedScheduler::new(
            1,
            Duration::from_millis(1),
            Duration::from_secs(5),
        )),
        max_retries,
    )
}

/// Client talking to `server` for both the token and the API endpoints.
pub fn client_for(server: &MockServer, max_retries: u32, page_delay: Duration) -> SpotifyClient {
    let executor = executor_for(server, format!("{}/v1", server.uri()), max_retries);
    SpotifyClient::new(executor, page_delay)
}

pub fn track(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Track {id}"),
        "uri": format!("spotify:track:{id}"),
        "artists": [{ "name": "Someone" }],
    })
}

pub fn page(items: Vec<Value>, next: Option<String>) -> Value {
    let total = items.len();
    json!({ "items": items, "next": next, "total": total })
}

pub fn playlist_page(ids: &[&str]) -> Value {
    page(ids.iter().map(|id| json!({ "track": track(id) })).collect(), None)
}

pub fn search_result(ids: &[&str]) -> Value {
    json!({ "tracks": page(ids.iter().map(|id| track(id)).collect(), None) })
}
