use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{
    config::Settings,
    info,
    management::SongLog,
    pipeline::{PollingPipeline, QueryStyle},
    scrape::SongFile,
    success,
};

use super::run::session;

/// Backfills the playlist from a newline-delimited JSON file of songs.
///
/// Runs exactly one cycle with the stricter `track:"..."` query so older
/// logs with noisy titles produce fewer false matches.
pub async fn import(settings: Settings, file: PathBuf) -> Result<()> {
    let (playlist_id, client) = session(&settings)?;
    info!("Importing songs from {}", file.display());

    let mut pipeline = PollingPipeline::new(
        client,
        SongFile::new(&file),
        playlist_id,
        SongLog::new(&settings.songs_log),
        SongLog::new(&settings.mystery_log),
    )
    .with_query_style(QueryStyle::Strict);

    let report = pipeline
        .run_cycle()
        .await
        .with_context(|| format!("import from {} failed", file.display()))?;

    success!("Import finished: {}", report);
    Ok(())
}
