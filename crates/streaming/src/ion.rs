//! Cesium ion REST client.
//!
//! Resolving an asset is a two-step exchange:
//! 1. `GET {api}/v1/assets/{id}/endpoint` (bearer: the account token) returns
//!    the tileset URL and a short-lived per-asset token.
//! 2. Optionally, `GET {url}` (bearer: the per-asset token) fetches the root
//!    `tileset.json` so a broken asset fails here rather than in the renderer.

use std::future::Future;

use foundation::ids::AssetId;
use serde::Deserialize;
use tracing::debug;

use crate::asset::{Attribution, TilesetAsset, TilesetRoot};
use crate::service::{AssetError, AssetService};

const TILES_TYPE: &str = "3DTILES";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub attributions: Vec<Attribution>,
    #[serde(default)]
    pub external_type: Option<String>,
    #[serde(default)]
    pub options: Option<ExternalOptions>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExternalOptions {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TilesetJson {
    asset: TilesetJsonAsset,
    geometric_error: f64,
}

#[derive(Debug, Deserialize)]
struct TilesetJsonAsset {
    version: String,
}

/// Turns an endpoint response into a renderable tileset.
pub fn resolve_endpoint(id: AssetId, resp: EndpointResponse) -> Result<TilesetAsset, AssetError> {
    if resp.kind != TILES_TYPE {
        return Err(AssetError::UnsupportedType(resp.kind));
    }

    let asset = match resp.external_type {
        Some(external) if external == TILES_TYPE => {
            let url = resp
                .options
                .and_then(|o| o.url)
                .ok_or_else(|| AssetError::Decode("external asset without options.url".into()))?;
            TilesetAsset::new(id, url)
        }
        Some(external) => return Err(AssetError::UnsupportedType(external)),
        None => {
            let url = resp
                .url
                .ok_or_else(|| AssetError::Decode("endpoint without url".into()))?;
            let mut asset = TilesetAsset::new(id, url);
            asset.access_token = resp.access_token;
            asset
        }
    };

    Ok(TilesetAsset {
        attributions: resp.attributions,
        ..asset
    })
}

pub fn parse_endpoint(text: &str) -> Result<EndpointResponse, AssetError> {
    serde_json::from_str(text).map_err(|e| AssetError::Decode(e.to_string()))
}

pub fn parse_tileset_root(text: &str) -> Result<TilesetRoot, AssetError> {
    let json: TilesetJson =
        serde_json::from_str(text).map_err(|e| AssetError::Decode(e.to_string()))?;
    Ok(TilesetRoot {
        version: json.asset.version,
        geometric_error: json.geometric_error,
    })
}

#[derive(Debug, Clone)]
pub struct IonClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
    probe_tileset: bool,
}

impl IonClient {
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
            access_token: access_token.into(),
            probe_tileset: false,
        }
    }

    pub fn with_probe_tileset(mut self, probe: bool) -> Self {
        self.probe_tileset = probe;
        self
    }

    pub fn endpoint_url(&self, id: AssetId) -> String {
        format!(
            "{}/v1/assets/{}/endpoint",
            self.api_url.trim_end_matches('/'),
            id
        )
    }

    async fn get_text(
        &self,
        url: &str,
        bearer: Option<&str>,
        id: AssetId,
    ) -> Result<String, AssetError> {
        let mut req = self.http.get(url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AssetError::NotFound(id));
        }
        if !status.is_success() {
            return Err(AssetError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        resp.text()
            .await
            .map_err(|e| AssetError::Transport(e.to_string()))
    }

    async fn fetch(&self, id: AssetId) -> Result<TilesetAsset, AssetError> {
        let endpoint = self.endpoint_url(id);
        debug!(asset = %id, url = %endpoint, "resolving ion endpoint");
        let text = self.get_text(&endpoint, Some(&self.access_token), id).await?;
        let mut asset = resolve_endpoint(id, parse_endpoint(&text)?)?;

        if self.probe_tileset {
            debug!(asset = %id, url = %asset.url, "probing tileset root");
            let text = self
                .get_text(&asset.url, asset.access_token.as_deref(), id)
                .await?;
            asset.root = Some(parse_tileset_root(&text)?);
        }

        Ok(asset)
    }
}

impl AssetService for IonClient {
    fn fetch_asset(&self, id: AssetId) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
        self.fetch(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{IonClient, parse_endpoint, parse_tileset_root, resolve_endpoint};
    use crate::asset::Attribution;
    use crate::service::AssetError;
    use foundation::ids::AssetId;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_url_joins_cleanly() {
        let client = IonClient::new("https://api.cesium.com/", "token");
        assert_eq!(
            client.endpoint_url(AssetId(2770811)),
            "https://api.cesium.com/v1/assets/2770811/endpoint"
        );
    }

    #[test]
    fn resolves_hosted_tileset() {
        let resp = parse_endpoint(
            r#"{
                "type": "3DTILES",
                "url": "https://assets.ion.cesium.com/us-east-1/2770811/tileset.json?v=1",
                "accessToken": "asset-token",
                "attributions": [{"html": "<span>Survey</span>", "collapsible": true}]
            }"#,
        )
        .expect("parse");

        let asset = resolve_endpoint(AssetId(2770811), resp).expect("asset");
        assert_eq!(
            asset.url,
            "https://assets.ion.cesium.com/us-east-1/2770811/tileset.json?v=1"
        );
        assert_eq!(asset.access_token.as_deref(), Some("asset-token"));
        assert_eq!(
            asset.attributions,
            vec![Attribution {
                html: "<span>Survey</span>".into(),
                collapsible: true,
            }]
        );
        assert!(asset.root.is_none());
    }

    #[test]
    fn resolves_external_tileset_without_token() {
        let resp = parse_endpoint(
            r#"{
                "type": "3DTILES",
                "externalType": "3DTILES",
                "options": {"url": "https://tile.example.com/v1/3dtiles/root.json?key=k"},
                "attributions": []
            }"#,
        )
        .expect("parse");

        let asset = resolve_endpoint(AssetId(2275207), resp).expect("asset");
        assert_eq!(asset.url, "https://tile.example.com/v1/3dtiles/root.json?key=k");
        assert!(asset.access_token.is_none());
    }

    #[test]
    fn rejects_non_tileset_assets() {
        let imagery = parse_endpoint(r#"{"type": "IMAGERY", "url": "https://x"}"#).expect("parse");
        assert_eq!(
            resolve_endpoint(AssetId(1), imagery),
            Err(AssetError::UnsupportedType("IMAGERY".into()))
        );

        let no_url = parse_endpoint(r#"{"type": "3DTILES"}"#).expect("parse");
        assert!(matches!(
            resolve_endpoint(AssetId(1), no_url),
            Err(AssetError::Decode(_))
        ));

        assert!(matches!(parse_endpoint("not json"), Err(AssetError::Decode(_))));
    }

    #[test]
    fn parses_tileset_root_summary() {
        let root = parse_tileset_root(
            r#"{"asset": {"version": "1.1"}, "geometricError": 512.0, "root": {}}"#,
        )
        .expect("root");
        assert_eq!(root.version, "1.1");
        assert_eq!(root.geometric_error, 512.0);

        assert!(parse_tileset_root(r#"{"asset": {}}"#).is_err());
    }
}
