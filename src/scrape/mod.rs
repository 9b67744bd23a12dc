//! Now-playing sources.
//!
//! A source is asked for the songs it currently reports once per cycle. The
//! pipeline does not care where they come from, so the station-specific
//! parsing lives behind [`NowPlayingSource`].

mod icecast;
mod song_file;
mod widget;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{Settings, SourceKind},
    error::ScrapeError,
    types::Song,
};

pub use icecast::IcecastStatus;
pub use song_file::SongFile;
pub use widget::RecentlyPlayedWidget;

#[async_trait]
pub trait NowPlayingSource: Send + Sync {
    /// Songs the source reports right now, oldest first where it matters.
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError>;
}

/// Builds the source selected by `NOW_PLAYING_SOURCE`.
pub fn from_settings(settings: &Settings) -> Box<dyn NowPlayingSource> {
    let http = Client::new();
    match settings.source_kind {
        SourceKind::Icecast => Box::new(IcecastStatus::new(http, settings.source_url.clone())),
        SourceKind::Widget => Box::new(RecentlyPlayedWidget::new(http, settings.source_url.clone())),
    }
}

#[async_trait]
impl<S: NowPlayingSource + ?Sized> NowPlayingSource for Box<S> {
    async fn current_songs(&self) -> Result<Vec<Song>, ScrapeError> {
        (**self).current_songs().await
    }
}
