use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::ScrapeError, types::Song, utils};

use super::NowPlayingSource;

#[derive(Debug, Deserialize)]
struct StatusDocument {
    icestats: IceStats,
}

#[derive(Debug, Deserialize)]
struct IceStats {
    source: Option<Mounts>,
}

/// Icecast reports a single mount as an object and several as an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Mounts {
    Many(Vec<Mount>),
    One(Mount),
}

#[derive(Debug, Deserialize)]
struct Mount {
    yp_currently_playing: Option<String>,
    title: Option<String>,
    metadata_updated: Option<String>,
}

/// Icecast `status-json.xsl` endpoint.
pub struct IcecastStatus {
    http: Client,
    url: String,
}

impl IcecastStatus {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Extracts the current song from a status document.
    ///
    /// The first mount that reports a `Artist - Title` string wins. A
    /// document without any yields an empty list, not an error.
    pub fn parse(document: &str) -> Result<Vec<Song>, ScrapeError> {
        let status: StatusDocument = serde_json::from_str(document)?;
        let mounts = match status.icestats.source {
            Some(Mounts::One(mount)) => vec![mount],
            Some(Mounts::Many(mounts)) => mounts,
            None => Vec::new(),
        };

        let song = mounts.into_iter().find_map(|mount| {
            let raw = mount.yp_currently_playing.or(mount.title)?;
            let (artist, title) = utils::split_artist_title(&raw)?;
            Some(Song {
                artist,
                title,
                played_at: mount
                    .metadata_updated
                    .as_deref()
                    .and_then(utils::parse_icecast_timestamp),
                scraped_at: Utc::now(),
            })
        });

        Ok(song.into_iter().collect())
    }
}

#[async_trait]
impl NowPlayingSource for IcecastStatus {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        let response = self
            .http
            .get(&self.url)
            .query(&[("_", utils::epoch_millis().to_string())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let songs = Self::parse(&body)?;
        debug!(url = %self.url, songs = songs.len(), "scraped icecast status");
        Ok(songs)
    }
}
