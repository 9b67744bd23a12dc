use anyhow::{Context, Result};
use tracing::info;

use crate::{
    config::Settings,
    management::SongLog,
    pipeline::PollingPipeline,
    scrape,
    spotify::SpotifyClient,
};

/// Polls the configured source every `INTERVAL` until Ctrl-C.
pub async fn run(settings: Settings) -> Result<()> {
    let (playlist_id, client) = session(&settings)?;
    let source = scrape::from_settings(&settings);

    info!(
        playlist_id = %playlist_id,
        source = %settings.source_url,
        interval_ms = settings.poll_interval.as_millis() as u64,
        "starting polling loop"
    );

    let pipeline = PollingPipeline::new(
        client,
        source,
        playlist_id,
        SongLog::new(&settings.songs_log),
        SongLog::new(&settings.mystery_log),
    );

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    pipeline.run(settings.poll_interval, shutdown).await;
    Ok(())
}

/// Shared by `run` and `import`: both need a playlist and a session.
pub(super) fn session(settings: &Settings) -> Result<(String, SpotifyClient)> {
    let playlist_id = settings.require_playlist_id()?.to_string();
    let client = SpotifyClient::from_settings(settings).context("cannot build Spotify session")?;
    Ok((playlist_id, client))
}
