use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{
    spotify::auth::{AuthSession, exchange_code},
    warning,
};

/// Receives the provider redirect, checks `state` and exchanges the code.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(session): Extension<Arc<AuthSession>>,
) -> Html<String> {
    if let Some(error) = params.get("error") {
        warning!("Authorization was denied: {}", error);
        return Html(format!("<h4>Authorization failed: {error}</h4>"));
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>".to_string());
    };

    let mut guard = session.pending.lock().await;
    let Some(pending) = guard.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>".to_string());
    };

    if params.get("state") != Some(&pending.state) {
        warning!("Authorization callback carried an unexpected state");
        return Html("<h4>State mismatch.</h4>".to_string());
    }

    match exchange_code(&session.settings, code).await {
        Ok(token) => {
            pending.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>Close this browser window.</p>".to_string())
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            Html("<h4>Login failed.</h4>".to_string())
        }
    }
}
