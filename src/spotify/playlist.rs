use tracing::info;

use crate::{
    error::ApiError,
    types::{AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, Playlist, PlaylistItem},
};

use super::{client::SpotifyClient, executor::ApiRequest};

impl SpotifyClient {
    /// Every entry of the playlist, walking all pages.
    pub async fn playlist_items(&self, playlist_id: &str) -> Result<Vec<PlaylistItem>, ApiError> {
        self.paginator()
            .collect(&format!("playlists/{playlist_id}/tracks"))
            .await
    }

    /// Appends `uris` to the end of the playlist.
    pub async fn add_tracks(
        &self,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<AddTrackToPlaylistResponse, ApiError> {
        let body = serde_json::to_value(AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        })?;
        let request = ApiRequest::post(format!("playlists/{playlist_id}/tracks"), body);
        let response: AddTrackToPlaylistResponse = self.executor().fetch(&request).await?;
        info!(playlist_id, tracks = uris.len(), snapshot_id = %response.snapshot_id, "added tracks");
        Ok(response)
    }

    /// Playlists owned or followed by the authorized user.
    pub async fn my_playlists(&self) -> Result<Vec<Playlist>, ApiError> {
        self.paginator().collect("me/playlists").await
    }
}
