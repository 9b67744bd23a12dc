use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

/// Authorization in progress: the `state` we sent and, once the callback
/// exchanged the code, the provider's answer.
#[derive(Debug, Clone)]
pub struct AuthorizationState {
    pub state: String,
    pub token: Option<TokenResponse>,
}

/// One cursor-linked page of a provider listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// `None` for local files added to a playlist by hand.
    pub id: Option<String>,
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<Page<Track>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub public: Option<bool>,
    pub collaborative: bool,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: Option<String>,
    pub country: Option<String>,
    pub product: Option<String>,
}

/// A song as reported by a now-playing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    pub artist: String,
    pub title: String,
    #[serde(default)]
    pub played_at: Option<String>,
    #[serde(default = "Utc::now")]
    pub scraped_at: DateTime<Utc>,
}

impl Song {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            played_at: None,
            scraped_at: Utc::now(),
        }
    }
}

/// A [`Song`] after the substitution table and title cleanup were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSong {
    pub artist: String,
    pub title: String,
    pub played_at: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Line written to the mystery log when a search has no candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MysteryRecord {
    pub artist: String,
    pub title: String,
    pub params: String,
}

/// Line written to the songs log once a track was appended to the playlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub artist: String,
    pub title: String,
    pub played_at: Option<String>,
    pub scraped_at: DateTime<Utc>,
    pub track_id: String,
    pub track_uri: String,
    pub params: String,
}
