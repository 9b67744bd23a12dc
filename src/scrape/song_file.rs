use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::{error::ScrapeError, types::Song};

use super::NowPlayingSource;

/// Lines of the songs log as written by earlier versions: either a bare
/// song or `{ "song": {...}, "params": "..." }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum SongLine {
    Wrapped { song: Song },
    Bare(Song),
}

/// Newline-delimited JSON file of songs, used to backfill a playlist.
pub struct SongFile {
    path: PathBuf,
}

impl SongFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(content: &str) -> Vec<Song> {
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(idx, line)| match serde_json::from_str::<SongLine>(line) {
                Ok(SongLine::Wrapped { song }) | Ok(SongLine::Bare(song)) => Some(song),
                Err(e) => {
                    warn!(line = idx + 1, error = %e, "skipping unreadable song line");
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl NowPlayingSource for SongFile {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        let content = async_fs::read_to_string(&self.path).await?;
        Ok(Self::parse(&content))
    }
}
