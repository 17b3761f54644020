//! Session host endpoints.

use async_trait::async_trait;
use url::Url;

use super::client::ApiClient;
use super::models::{FriendRecord, MatchInfo};
use super::{endpoint, read_json, ApiError, SessionApi};

/// [`SessionApi`] backed by the re-authenticating [`ApiClient`].
#[derive(Debug, Clone)]
pub struct SessionClient {
    client: ApiClient,
}

impl SessionClient {
    /// Wrap an API client. Requests go to the client's session base URL.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    fn base(&self) -> &Url {
        self.client.session_base()
    }
}

#[async_trait]
impl SessionApi for SessionClient {
    async fn fetch_match(&self, match_id: &str) -> Result<MatchInfo, ApiError> {
        let url = endpoint(self.base(), &["api", "v1", "match", match_id])?;
        let response = self.client.get(url).await?;
        read_json(response).await
    }

    async fn fetch_friends(&self, user_id: &str) -> Result<Vec<FriendRecord>, ApiError> {
        let url = endpoint(self.base(), &["api", "v1", "players", user_id, "friends"])?;
        let response = self.client.get(url).await?;
        read_json(response).await
    }
}
