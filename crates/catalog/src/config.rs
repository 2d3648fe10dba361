use std::path::Path;

use foundation::ids::AssetId;
use foundation::math::Vec3;
use serde::Deserialize;

use crate::ConfigError;
use crate::building::{BuildingRecord, IconPlacement, default_name};
use crate::icons::{DEFAULT_ICON_SCALE, IconKind, IconTable, IconTarget};

/// Environment variable that overrides `access_token`.
pub const ACCESS_TOKEN_ENV: &str = "CESIUM_ION_ACCESS_TOKEN";

pub const DEFAULT_ION_API_URL: &str = "https://api.cesium.com";
pub const DEFAULT_HITBOX_ALPHA: f32 = 0.01;
pub const DEFAULT_BILLBOARD_PICK_SIZE_M: f64 = 200.0;

/// Initial camera placement: ECEF destination plus heading/pitch/roll in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub destination: Vec3,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSettings {
    pub vertical_exaggeration: f64,
    pub sky_atmosphere: bool,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            vertical_exaggeration: 3.0,
            sky_atmosphere: true,
        }
    }
}

/// Validated viewer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub access_token: Option<String>,
    pub ion_api_url: String,
    /// Tileset loaded before any building (terrain, city mesh, ...).
    pub base_tileset: Option<AssetId>,
    pub camera: Option<CameraView>,
    pub scene: SceneSettings,
    /// Maximum number of asset fetches in flight during registration.
    pub parallelism: usize,
    pub hitbox_alpha: f32,
    /// Edge length of the world-space box used to pick a billboard at scale 1.
    pub billboard_pick_size_m: f64,
    /// Fetch each tileset's root document while resolving it.
    pub probe_tileset: bool,
    pub icons: IconTable,
    pub buildings: Vec<BuildingRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    ion_api_url: Option<String>,
    #[serde(default)]
    base_tileset: Option<u64>,
    #[serde(default)]
    camera: Option<RawCamera>,
    #[serde(default)]
    scene: Option<RawScene>,
    #[serde(default)]
    parallelism: Option<usize>,
    #[serde(default)]
    hitbox_alpha: Option<f32>,
    #[serde(default)]
    billboard_pick_size_m: Option<f64>,
    #[serde(default)]
    probe_tileset: bool,
    #[serde(default)]
    icons: IconTable,
    #[serde(default)]
    buildings: Vec<RawBuilding>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCamera {
    destination: [f64; 3],
    #[serde(default)]
    heading: f64,
    #[serde(default)]
    pitch: f64,
    #[serde(default)]
    roll: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScene {
    #[serde(default)]
    vertical_exaggeration: Option<f64>,
    #[serde(default)]
    sky_atmosphere: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBuilding {
    asset_id: u64,
    #[serde(default)]
    name: Option<String>,
    position: [f64; 3],
    dimensions: [f64; 3],
    overlay_url: String,
    #[serde(default)]
    icons: Vec<RawIcon>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIcon {
    #[serde(default)]
    offset: Option<[f64; 3]>,
    #[serde(default)]
    position: Option<[f64; 3]>,
    #[serde(default)]
    kind: Option<IconKind>,
}

impl ViewerConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    /// Overrides the access token from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ACCESS_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.access_token = Some(token);
        }
    }

    pub fn require_access_token(&self) -> Result<&str, ConfigError> {
        self.access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingAccessToken)
    }

    /// Every asset id the viewer will request, base tileset first.
    pub fn asset_ids(&self) -> Vec<AssetId> {
        self.base_tileset
            .into_iter()
            .chain(self.buildings.iter().map(|b| b.asset_id))
            .collect()
    }

    /// Re-runs validation; useful after editing a config in code.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.parallelism == 0 {
            return Err(ConfigError::InvalidParallelism);
        }
        check_alpha("hitbox_alpha", self.hitbox_alpha)?;
        check_size("billboard_pick_size_m", self.billboard_pick_size_m)?;
        for (kind, target) in self.icons.iter() {
            check_size(&format!("icons.{kind}.scale"), target.scale)?;
        }
        for b in &self.buildings {
            check_building(&b.name, b.position, b.dimensions)?;
            for icon in &b.icons {
                if !self.icons.contains(&icon.kind) {
                    return Err(ConfigError::UnknownIconKind {
                        building: b.name.clone(),
                        kind: icon.kind.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let buildings = raw
            .buildings
            .into_iter()
            .map(building_from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        let defaults = SceneSettings::default();
        let scene = raw
            .scene
            .map(|s| SceneSettings {
                vertical_exaggeration: s
                    .vertical_exaggeration
                    .unwrap_or(defaults.vertical_exaggeration),
                sky_atmosphere: s.sky_atmosphere.unwrap_or(defaults.sky_atmosphere),
            })
            .unwrap_or(defaults);

        let config = Self {
            access_token: raw.access_token.filter(|t| !t.trim().is_empty()),
            ion_api_url: raw
                .ion_api_url
                .unwrap_or_else(|| DEFAULT_ION_API_URL.to_string()),
            base_tileset: raw.base_tileset.map(AssetId),
            camera: raw.camera.map(|c| CameraView {
                destination: Vec3::from_array(c.destination),
                heading: c.heading,
                pitch: c.pitch,
                roll: c.roll,
            }),
            scene,
            parallelism: raw.parallelism.unwrap_or(1),
            hitbox_alpha: raw.hitbox_alpha.unwrap_or(DEFAULT_HITBOX_ALPHA),
            billboard_pick_size_m: raw
                .billboard_pick_size_m
                .unwrap_or(DEFAULT_BILLBOARD_PICK_SIZE_M),
            probe_tileset: raw.probe_tileset,
            icons: raw.icons,
            buildings,
        };
        config.validate()?;
        Ok(config)
    }

    /// Demo deployment: one building over a base city tileset.
    pub fn default_demo() -> Self {
        let position = Vec3::new(-2_213_992.200, -3_753_500.070, 4_643_615.175);
        let icon_anchor = Vec3::new(-2_214_143.982, -3_753_795.455, 4_643_989.822);

        let building = BuildingRecord::new(
            AssetId(2770811),
            position,
            Vec3::new(100.0, 100.0, 670.0),
            "https://my.matterport.com/show/?m=cJnnkSvYtEB",
        )
        .with_icon(icon_anchor - position, IconKind::nth(1));

        let icons = (1..=3).fold(IconTable::new(), |table, n| {
            // Two bundled images, cycled.
            let image = format!("assets/icons/icon{}.png", (n - 1) % 2 + 1);
            table.with(
                IconKind::nth(n),
                IconTarget {
                    url: format!("https://example.com/icon{n}-info"),
                    image,
                    scale: DEFAULT_ICON_SCALE,
                },
            )
        });

        Self {
            access_token: None,
            ion_api_url: DEFAULT_ION_API_URL.to_string(),
            base_tileset: Some(AssetId(2275207)),
            camera: Some(CameraView {
                destination: Vec3::new(-2_215_372.824, -3_754_338.187, 4_642_735.146),
                heading: 50.794_062_761_901_8,
                pitch: -0.302_934_097_429_847_56,
                roll: 0.000_918_709_819_198_504_4,
            }),
            scene: SceneSettings::default(),
            parallelism: 1,
            hitbox_alpha: DEFAULT_HITBOX_ALPHA,
            billboard_pick_size_m: DEFAULT_BILLBOARD_PICK_SIZE_M,
            probe_tileset: false,
            icons,
            buildings: vec![building],
        }
    }
}

fn building_from_raw(raw: RawBuilding) -> Result<BuildingRecord, ConfigError> {
    let asset_id = AssetId(raw.asset_id);
    let name = raw.name.unwrap_or_else(|| default_name(asset_id));
    let position = Vec3::from_array(raw.position);

    let icons = raw
        .icons
        .into_iter()
        .enumerate()
        .map(|(i, icon)| {
            let offset = match (icon.offset, icon.position) {
                (Some(offset), None) => Vec3::from_array(offset),
                (None, Some(abs)) => Vec3::from_array(abs) - position,
                _ => {
                    return Err(ConfigError::IconPlacement {
                        building: name.clone(),
                        index: i + 1,
                    });
                }
            };
            Ok(IconPlacement {
                offset,
                kind: icon.kind.unwrap_or_else(|| IconKind::nth(i + 1)),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BuildingRecord {
        asset_id,
        name,
        position,
        dimensions: Vec3::from_array(raw.dimensions),
        overlay_url: raw.overlay_url,
        icons,
    })
}

fn check_building(name: &str, position: Vec3, dimensions: Vec3) -> Result<(), ConfigError> {
    if !position.as_array().iter().all(|v| v.is_finite()) {
        return Err(ConfigError::InvalidPosition {
            building: name.to_string(),
        });
    }
    if !dimensions.as_array().iter().all(|v| v.is_finite() && *v > 0.0) {
        return Err(ConfigError::InvalidDimensions {
            building: name.to_string(),
        });
    }
    Ok(())
}

fn check_alpha(field: &str, alpha: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&alpha) {
        Ok(())
    } else {
        Err(ConfigError::InvalidAlpha(field.to_string()))
    }
}

fn check_size(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidSize(field.to_string()))
    }
}
