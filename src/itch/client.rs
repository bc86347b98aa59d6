//! itch.io API and site client.

use super::models::{
    Collection, CollectionGame, CollectionGamesEnvelope, CollectionsEnvelope, Download,
    DownloadEnvelope, Game, GameEnvelope, Upload, UploadsEnvelope,
};
use super::probe::{extract_game_id, has_notice_link, notice_url};
use crate::base::neterror::NetError;
use crate::client::Client;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// Roots of the three itch.io surfaces the tool talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItchEndpoints {
    /// Public site, hosts the takedown notices.
    pub site_root: Url,
    /// Key-in-path API (`/api/1/<key>/...`).
    pub api_root: Url,
    /// Profile API (`?api_key=`).
    pub profile_api_root: Url,
}

impl Default for ItchEndpoints {
    fn default() -> Self {
        Self {
            site_root: Url::parse("https://itch.io").expect("static URL"),
            api_root: Url::parse("https://itch.io/api/1").expect("static URL"),
            profile_api_root: Url::parse("https://api.itch.io").expect("static URL"),
        }
    }
}

fn join(root: &Url, tail: &str) -> String {
    format!("{}/{}", root.as_str().trim_end_matches('/'), tail)
}

#[derive(Debug, Clone)]
pub struct ItchClient {
    http: Client,
    api_key: String,
    endpoints: ItchEndpoints,
}

impl ItchClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            endpoints: ItchEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: ItchEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn endpoints(&self) -> &ItchEndpoints {
        &self.endpoints
    }

    fn api_url(&self, tail: &str) -> String {
        join(&self.endpoints.api_root, &format!("{}/{}", self.api_key, tail))
    }

    async fn profile_get<T: serde::de::DeserializeOwned>(&self, tail: &str) -> Result<T, NetError> {
        self.http
            .get(join(&self.endpoints.profile_api_root, tail))
            .query("api_key", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Collections owned by the key's profile.
    pub async fn list_collections(&self) -> Result<Vec<Collection>, NetError> {
        let envelope: CollectionsEnvelope = self.profile_get("profile/collections").await?;
        Ok(envelope.collections)
    }

    pub async fn collection_games(
        &self,
        collection_id: u64,
    ) -> Result<Vec<CollectionGame>, NetError> {
        let envelope: CollectionGamesEnvelope = self
            .profile_get(&format!("collections/{collection_id}/collection-games"))
            .await?;
        Ok(envelope.collection_games)
    }

    /// Game metadata; `Ok(None)` when the API answers without a `game`.
    pub async fn game_by_id(&self, game_id: u64) -> Result<Option<Game>, NetError> {
        let envelope: GameEnvelope = self
            .http
            .get(self.api_url(&format!("game/{game_id}")))
            .send()
            .await?
            .json()
            .await?;
        Ok(envelope.game)
    }

    pub async fn game_uploads(&self, game_id: u64) -> Result<Vec<Upload>, NetError> {
        let envelope: UploadsEnvelope = self
            .http
            .get(self.api_url(&format!("game/{game_id}/uploads")))
            .send()
            .await?
            .json()
            .await?;
        envelope.uploads.ok_or(NetError::MissingField("uploads"))
    }

    pub async fn download_url(&self, upload_id: u64) -> Result<String, NetError> {
        let envelope: DownloadEnvelope = self
            .http
            .get(self.api_url(&format!("upload/{upload_id}/download")))
            .send()
            .await?
            .json()
            .await?;
        envelope.url.ok_or(NetError::MissingField("url"))
    }

    /// Uploads of a game with their download URLs resolved, in upload order.
    pub async fn game_downloads(&self, game_id: u64) -> Result<Vec<Download>, NetError> {
        let uploads = self.game_uploads(game_id).await?;
        let mut downloads = Vec::with_capacity(uploads.len());
        for upload in uploads {
            let url = self.download_url(upload.id).await?;
            downloads.push(Download::from_upload(upload, url));
        }
        Ok(downloads)
    }

    /// Canonical game id of a game page, `Ok(None)` when the page carries no
    /// `itch:path` tag.
    pub async fn game_id(&self, game_url: &str) -> Result<Option<u64>, NetError> {
        let html = self.http.get(game_url).send().await?.text().await?;
        Ok(extract_game_id(&html))
    }

    /// Whether the game was taken down.
    ///
    /// 1. A 404 on the notice URL settles it as not taken down.
    /// 2. Metadata that cannot be fetched, or has no canonical URL, counts as
    ///    taken down.
    /// 3. Otherwise the game page must link the notice. A failure fetching
    ///    the page counts as not confirmed.
    ///
    /// Only a transport failure of step 1 is returned as an error.
    pub async fn is_taken_down(&self, game_id: u64) -> Result<bool, NetError> {
        let notice = notice_url(&self.endpoints.site_root, game_id);

        let head = self.http.head(&notice).send().await?;
        if head.status() == StatusCode::NOT_FOUND {
            tracing::debug!(game_id, "no takedown notice");
            return Ok(false);
        }

        let game_url = match self.game_by_id(game_id).await {
            Ok(Some(Game { url: Some(url), .. })) => url,
            Ok(_) => {
                tracing::debug!(game_id, "metadata has no canonical URL");
                return Ok(true);
            }
            Err(e) => {
                tracing::debug!(game_id, error = %e, "metadata unavailable");
                return Ok(true);
            }
        };

        let page = match self.http.get(&game_url).send().await {
            Ok(resp) => resp.text().await,
            Err(e) => Err(e),
        };

        match page {
            Ok(html) => Ok(has_notice_link(&html, &notice)),
            Err(e) => {
                tracing::debug!(game_id, error = %e, "could not confirm takedown");
                Ok(false)
            }
        }
    }
}
