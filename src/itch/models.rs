//! Response shapes of the itch.io APIs.
//!
//! Only the fields the tool reads are typed; everything else is kept in
//! `extra` so payloads pass through unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /api/1/<key>/game/<id>` → `{ "game": {...} }`
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct GameEnvelope {
    pub game: Option<Game>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct UploadsEnvelope {
    pub uploads: Option<Vec<Upload>>,
}

/// One uploaded file of a game.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Upload {
    pub id: u64,
    pub filename: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub demo: bool,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub p_windows: bool,
    #[serde(default)]
    pub p_linux: bool,
    #[serde(default)]
    pub p_osx: bool,
    #[serde(default)]
    pub p_android: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct DownloadEnvelope {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platforms {
    pub windows: bool,
    pub linux: bool,
    pub mac: bool,
    pub android: bool,
}

/// Download descriptor: an upload plus its resolved download URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    pub name: String,
    pub filename: String,
    pub demo: bool,
    pub platforms: Platforms,
    pub size: Option<u64>,
    pub id: u64,
    pub url: String,
}

impl Download {
    pub fn from_upload(upload: Upload, url: String) -> Self {
        let name = upload
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| upload.filename.clone());
        Self {
            name,
            filename: upload.filename,
            demo: upload.demo,
            platforms: Platforms {
                windows: upload.p_windows,
                linux: upload.p_linux,
                mac: upload.p_osx,
                android: upload.p_android,
            },
            size: upload.size,
            id: upload.id,
            url,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CollectionsEnvelope {
    #[serde(default)]
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub games_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CollectionGamesEnvelope {
    #[serde(default)]
    pub collection_games: Vec<CollectionGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionGame {
    #[serde(default)]
    pub game: Option<Game>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
