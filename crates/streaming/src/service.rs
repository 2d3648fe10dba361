use std::collections::BTreeMap;
use std::future::Future;

use foundation::ids::AssetId;

use crate::asset::TilesetAsset;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    NotFound(AssetId),
    Http { status: u16, url: String },
    Transport(String),
    Decode(String),
    UnsupportedType(String),
}

impl std::fmt::Display for AssetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetError::NotFound(id) => write!(f, "asset {id} not found"),
            AssetError::Http { status, url } => write!(f, "HTTP {status} from {url}"),
            AssetError::Transport(msg) => write!(f, "request failed: {msg}"),
            AssetError::Decode(msg) => write!(f, "malformed response: {msg}"),
            AssetError::UnsupportedType(kind) => write!(f, "unsupported asset type: {kind}"),
        }
    }
}

impl std::error::Error for AssetError {}

/// Fetch-by-identifier access to remote 3D assets.
///
/// Futures are not required to be `Send`: the viewer runs on a single thread
/// (browser event loop or a current-thread runtime).
pub trait AssetService {
    fn fetch_asset(&self, id: AssetId) -> impl Future<Output = Result<TilesetAsset, AssetError>>;
}

impl<S: AssetService + ?Sized> AssetService for &S {
    fn fetch_asset(&self, id: AssetId) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
        (**self).fetch_asset(id)
    }
}

/// Serves a fixed set of assets without touching the network.
///
/// Used for offline runs and tests. Unknown ids resolve to
/// [`AssetError::NotFound`].
#[derive(Debug, Default, Clone)]
pub struct StaticAssetService {
    entries: BTreeMap<AssetId, Result<TilesetAsset, AssetError>>,
}

impl StaticAssetService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every id in `ids` to a placeholder tileset URL.
    pub fn offline<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = AssetId>,
    {
        ids.into_iter().fold(Self::new(), |svc, id| {
            svc.with_asset(TilesetAsset::new(id, format!("offline://assets/{id}/tileset.json")))
        })
    }

    pub fn with_asset(mut self, asset: TilesetAsset) -> Self {
        self.entries.insert(asset.id, Ok(asset));
        self
    }

    pub fn with_failure(mut self, id: AssetId, err: AssetError) -> Self {
        self.entries.insert(id, Err(err));
        self
    }

    fn resolve(&self, id: AssetId) -> Result<TilesetAsset, AssetError> {
        self.entries
            .get(&id)
            .cloned()
            .unwrap_or(Err(AssetError::NotFound(id)))
    }
}

impl AssetService for StaticAssetService {
    fn fetch_asset(&self, id: AssetId) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
        std::future::ready(self.resolve(id))
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetError, AssetService, StaticAssetService};
    use crate::asset::TilesetAsset;
    use foundation::ids::AssetId;

    #[test]
    fn static_service_serves_assets_and_failures() {
        let svc = StaticAssetService::new()
            .with_asset(TilesetAsset::new(AssetId(1), "https://tiles.example/1/tileset.json"))
            .with_failure(AssetId(2), AssetError::Transport("offline".into()));

        let ok = pollster::block_on(svc.fetch_asset(AssetId(1))).expect("asset");
        assert_eq!(ok.url, "https://tiles.example/1/tileset.json");

        let failed = pollster::block_on(svc.fetch_asset(AssetId(2)));
        assert_eq!(failed, Err(AssetError::Transport("offline".into())));

        let missing = pollster::block_on(svc.fetch_asset(AssetId(3)));
        assert_eq!(missing, Err(AssetError::NotFound(AssetId(3))));
    }

    #[test]
    fn offline_service_resolves_every_id() {
        let svc = StaticAssetService::offline([AssetId(2275207), AssetId(2770811)]);
        let asset = pollster::block_on((&svc).fetch_asset(AssetId(2770811))).expect("asset");
        assert_eq!(asset.url, "offline://assets/2770811/tileset.json");
        assert!(asset.access_token.is_none());
    }

    #[test]
    fn errors_render_for_status_text() {
        assert_eq!(
            AssetError::Http {
                status: 401,
                url: "https://api.cesium.com/v1/assets/1/endpoint".into()
            }
            .to_string(),
            "HTTP 401 from https://api.cesium.com/v1/assets/1/endpoint"
        );
        assert_eq!(AssetError::NotFound(AssetId(9)).to_string(), "asset 9 not found");
    }
}
