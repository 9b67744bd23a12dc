use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::{error::ScrapeError, types::Song, utils};

use super::NowPlayingSource;

/// HTML "recently played" widget: one table row per song, the second cell
/// holding `Artist - Title<br>played at 14:03`.
pub struct RecentlyPlayedWidget {
    http: Client,
    url: String,
}

impl RecentlyPlayedWidget {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub fn parse(html: &str) -> Result<Vec<Song>, ScrapeError> {
        let document = Html::parse_document(html);
        let rows = Selector::parse("table tr").map_err(|e| ScrapeError::Malformed(e.to_string()))?;
        let cells = Selector::parse("td").map_err(|e| ScrapeError::Malformed(e.to_string()))?;

        let scraped_at = Utc::now();
        let mut songs = Vec::new();

        for row in document.select(&rows) {
            let Some(cell) = row.select(&cells).nth(1) else {
                continue;
            };

            let inner = cell.inner_html();
            let mut fields = inner
                .split("<br>")
                .map(fragment_text)
                .filter(|field| !field.is_empty());

            let Some((artist, title)) = fields.next().as_deref().and_then(utils::split_artist_title)
            else {
                warn!(cell = %inner, "skipping widget row without artist and title");
                continue;
            };

            let played_at = fields
                .next()
                .and_then(|field| field.rsplit_once("at ").map(|(_, at)| at.trim().to_string()));

            songs.push(Song {
                artist,
                title,
                played_at,
                scraped_at,
            });
        }

        Ok(songs)
    }
}

/// Text content of one `<br>`-separated piece of a cell.
fn fragment_text(fragment: &str) -> String {
    Html::parse_fragment(fragment)
        .root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

#[async_trait]
impl NowPlayingSource for RecentlyPlayedWidget {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        let response = self.http.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(ScrapeError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let songs = Self::parse(&body)?;
        debug!(url = %self.url, songs = songs.len(), "scraped recently played widget");
        Ok(songs)
    }
}
