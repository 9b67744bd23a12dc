use tracing::debug;
use url::form_urlencoded;

use crate::{
    error::ApiError,
    types::{SearchResponse, Track},
};

use super::{client::SpotifyClient, executor::ApiRequest};

/// URL-encoded parameters of a track search, e.g. `type=track&q=...`.
///
/// Kept as a string so the exact query can be written to the mystery log.
pub fn track_search_params(query: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("type", "track")
        .append_pair("q", query)
        .finish()
}

impl SpotifyClient {
    /// Searches the catalog for tracks matching `query`.
    ///
    /// Returns the first page of candidates in provider order; a response
    /// without a `tracks` section yields an empty list.
    pub async fn search_tracks(&self, query: &str) -> Result<Vec<Track>, ApiError> {
        let params = track_search_params(query);
        let response: SearchResponse = self
            .executor()
            .fetch(&ApiRequest::get(format!("search?{params}")))
            .await?;

        let tracks = response.tracks.map(|page| page.items).unwrap_or_default();
        debug!(query, candidates = tracks.len(), "track search");
        Ok(tracks)
    }
}
