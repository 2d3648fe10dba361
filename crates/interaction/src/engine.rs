use catalog::{CameraView, SceneSettings};
use foundation::handles::Handle;
use foundation::math::{Ecef, Vec3, try_ecef_to_geodetic};
use scene::components::{Color, Material, VerticalOrigin};
use streaming::TilesetAsset;

/// Pixel coordinates on the render canvas, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Longitude/latitude in degrees, height in meters above the ellipsoid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geographic {
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub height_m: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BillboardStyle {
    pub scale: f64,
    pub color: Color,
    pub vertical_origin: VerticalOrigin,
    /// Keep the marker on top of streamed 3D tiles.
    pub clamp_to_tiles: bool,
}

impl BillboardStyle {
    pub fn marker(scale: f64) -> Self {
        Self {
            scale,
            color: Color::WHITE.with_alpha(0.8),
            vertical_origin: VerticalOrigin::Top,
            clamp_to_tiles: true,
        }
    }
}

/// The 3D rendering engine as seen by the viewer.
///
/// Handles returned by the engine are opaque; the pick dispatcher maps them to
/// domain entities.
pub trait RenderEngine {
    fn configure_scene(&mut self, settings: &SceneSettings);
    fn set_camera_view(&mut self, view: &CameraView);
    fn add_to_scene(&mut self, asset: TilesetAsset);
    fn add_pickable_volume(&mut self, position: Vec3, dimensions: Vec3, material: Material)
    -> Handle;
    fn add_billboard(&mut self, position: Vec3, image: &str, style: BillboardStyle) -> Handle;
    /// Object rendered at `point`, if any.
    fn pick(&self, point: ScreenPoint) -> Option<Handle>;
    fn camera_world_position(&self) -> Vec3;

    /// WGS84 conversion; `None` where the position has no geodetic meaning.
    fn world_to_geographic(&self, position: Vec3) -> Option<Geographic> {
        let geo = try_ecef_to_geodetic(Ecef::from(position))?;
        Some(Geographic {
            lon_deg: geo.lon_deg(),
            lat_deg: geo.lat_deg(),
            height_m: geo.alt_m,
        })
    }
}
