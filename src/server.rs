use axum::{Extension, Router, routing::get};
use std::sync::Arc;

use crate::{api, spotify::auth::AuthSession};

/// Serves the authorization callback until the surrounding task is aborted.
pub async fn start_api_server(session: Arc<AuthSession>) -> std::io::Result<()> {
    let addr = session.settings.server_addr;
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/authorize", get(api::callback).layer(Extension(session)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "callback server listening");
    axum::serve(listener, app).await
}
