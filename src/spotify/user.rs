use crate::{error::ApiError, types::UserProfile};

use super::{client::SpotifyClient, executor::ApiRequest};

impl SpotifyClient {
    /// Profile of the user the refresh credential belongs to.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.executor().fetch(&ApiRequest::get("me")).await
    }
}
