use anyhow::Result;

use crate::{config::Settings, info, spotify, success};

/// Runs the authorization flow and prints the credentials for `.env`.
pub async fn auth(settings: Settings) -> Result<()> {
    info!(
        "Waiting for the authorization callback on http://{}/authorize",
        settings.server_addr
    );

    let token = spotify::auth::auth(settings)
        .await
        .map_err(anyhow::Error::msg)?;

    success!("Authentication successful!");
    println!();
    println!("SPOTIFY_REFRESH_TOKEN={}", token.refresh_token.unwrap_or_default());
    if let Some(scope) = token.scope {
        info!("Granted scopes: {}", scope);
    }
    Ok(())
}
