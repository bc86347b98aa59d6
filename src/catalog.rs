//! Paginated game catalog listing.

use crate::base::neterror::NetError;
use crate::client::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Games per catalog page.
pub const PAGE_SIZE: u64 = 50;

/// Last page holding games, for a listing of `total_games`.
pub fn terminal_page(total_games: u64) -> u64 {
    total_games.div_ceil(PAGE_SIZE)
}

/// One catalog entry, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogItem(Map<String, Value>);

impl CatalogItem {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Canonical itch.io page of the game.
    pub fn itch_url(&self) -> Option<&str> {
        self.0
            .get("itch_url")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn id(&self) -> Option<u64> {
        self.0.get("id").and_then(Value::as_u64)
    }

    /// The same item with `id` set.
    pub fn with_id(mut self, id: u64) -> Self {
        self.0.insert("id".to_string(), Value::from(id));
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CatalogItem {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// `GET /api/games?page=n` body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub games: Vec<CatalogItem>,
    #[serde(default, rename = "totalGames")]
    pub total_games: Option<u64>,
}

impl CatalogPage {
    pub fn terminal_page(&self) -> Option<u64> {
        self.total_games.map(terminal_page)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    root: Url,
}

impl CatalogClient {
    pub fn new(http: Client, root: Url) -> Self {
        Self { http, root }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    pub async fn fetch_page(&self, page: u64) -> Result<CatalogPage, NetError> {
        let url = format!("{}/api/games", self.root.as_str().trim_end_matches('/'));
        tracing::debug!(page, "fetching catalog page");
        self.http
            .get(url)
            .query("page", &page.to_string())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }
}
