use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    info,
    spotify::SpotifyClient,
    success,
    types::PlaylistTableRow,
    warning,
};

use super::run::session;

/// Prints the profile the refresh credential belongs to.
pub async fn whoami(settings: Settings) -> Result<()> {
    let client = SpotifyClient::from_settings(&settings)?;
    let me = client.current_user().await?;

    success!(
        "Authorized as {} ({})",
        me.display_name.as_deref().unwrap_or("<no display name>"),
        me.id
    );
    if let Some(product) = me.product {
        info!("Subscription: {}", product);
    }
    Ok(())
}

/// Lists the user's playlists so the right `SPOTIFY_PLAYLIST_ID` can be picked.
pub async fn playlists(settings: Settings) -> Result<()> {
    let client = SpotifyClient::from_settings(&settings)?;

    let pb = spinner("Fetching playlists...");
    let result = client.my_playlists().await;
    pb.finish_and_clear();

    let mut rows: Vec<PlaylistTableRow> = result?
        .into_iter()
        .map(|p| PlaylistTableRow {
            id: p.id,
            name: p.name,
        })
        .collect();
    rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    println!("{}", Table::new(rows));
    Ok(())
}

/// Prints the ids of the tracks in the configured playlist.
pub async fn playlist(settings: Settings) -> Result<()> {
    let (playlist_id, client) = session(&settings)?;

    let pb = spinner("Fetching playlist tracks...");
    let result = client.playlist_items(&playlist_id).await;
    pb.finish_and_clear();

    let items = result?;
    let mut local = 0;
    for item in &items {
        match item.track.as_ref().and_then(|t| t.id.as_deref()) {
            Some(id) => println!("{id}"),
            None => local += 1,
        }
    }

    success!("{} tracks in playlist {}", items.len(), playlist_id);
    if local > 0 {
        warning!("{} entries have no catalog id (local files or removed tracks)", local);
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
