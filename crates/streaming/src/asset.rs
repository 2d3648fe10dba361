use foundation::ids::AssetId;
use serde::{Deserialize, Serialize};

/// Credit line the hosted service requires to be displayed with its data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub html: String,
    #[serde(default)]
    pub collapsible: bool,
}

/// Summary of a tileset's root `tileset.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetRoot {
    pub version: String,
    pub geometric_error: f64,
}

/// A resolved, renderable 3D tileset.
///
/// The render engine streams tiles from `url` itself; this is everything it
/// needs to do so.
#[derive(Debug, Clone, PartialEq)]
pub struct TilesetAsset {
    pub id: AssetId,
    pub url: String,
    /// Bearer token for tile requests; `None` for public or external tilesets.
    pub access_token: Option<String>,
    pub attributions: Vec<Attribution>,
    pub root: Option<TilesetRoot>,
}

impl TilesetAsset {
    pub fn new(id: AssetId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            access_token: None,
            attributions: Vec::new(),
            root: None,
        }
    }
}
