use std::collections::BTreeMap;

use catalog::{CameraView, DEFAULT_BILLBOARD_PICK_SIZE_M, SceneSettings};
use foundation::handles::Handle;
use foundation::math::Vec3;
use scene::World;
use scene::camera::{Camera, Viewport};
use scene::components::{ComponentBounds, Drawable3D, Material, Transform, Visibility};
use scene::entity::EntityId;
use scene::picking::{PickLayer, PickOptions, pick_screen};
use streaming::TilesetAsset;
use tracing::{debug, trace};

use crate::engine::{BillboardStyle, RenderEngine, ScreenPoint};

/// Render engine without a GPU: volumes and billboards live in a [`World`],
/// picking is ray casting through a perspective [`Camera`].
///
/// Billboards are picked as world-space cubes of `billboard_pick_size_m *
/// scale` and sit on the overlay layer, so they win over volumes behind or
/// around them.
#[derive(Debug)]
pub struct HeadlessEngine {
    world: World,
    camera: Camera,
    tilesets: Vec<TilesetAsset>,
    images: BTreeMap<Handle, String>,
    settings: SceneSettings,
    billboard_pick_size_m: f64,
}

impl HeadlessEngine {
    pub fn new(viewport: Viewport) -> Self {
        // Far above the equator at the prime meridian, looking straight down.
        let camera = Camera::from_heading_pitch_roll(
            Vec3::new(2.0e7, 0.0, 0.0),
            0.0,
            -std::f64::consts::FRAC_PI_2,
            0.0,
            viewport,
        );
        Self {
            world: World::new(),
            camera,
            tilesets: Vec::new(),
            images: BTreeMap::new(),
            settings: SceneSettings::default(),
            billboard_pick_size_m: DEFAULT_BILLBOARD_PICK_SIZE_M,
        }
    }

    pub fn with_billboard_pick_size(mut self, meters: f64) -> Self {
        self.billboard_pick_size_m = meters;
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn tilesets(&self) -> &[TilesetAsset] {
        &self.tilesets
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn billboard_image(&self, handle: Handle) -> Option<&str> {
        self.images.get(&handle).map(String::as_str)
    }

    /// Pixel position of a world point under the current camera.
    pub fn project(&self, position: Vec3) -> Option<ScreenPoint> {
        let [x, y] = self.camera.project(position)?;
        Some(ScreenPoint::new(x, y))
    }

    fn spawn_pickable(
        &mut self,
        position: Vec3,
        bounds: ComponentBounds,
        drawable: Drawable3D,
        layer: PickLayer,
    ) -> EntityId {
        let entity = self.world.spawn();
        self.world.set_transform(entity, Transform::at(position));
        self.world.set_bounds(entity, bounds);
        self.world.set_visibility(entity, Visibility::visible());
        self.world.set_drawable_3d(entity, drawable);
        self.world.set_pick_layer(entity, layer);
        entity
    }
}

impl RenderEngine for HeadlessEngine {
    fn configure_scene(&mut self, settings: &SceneSettings) {
        self.settings = *settings;
    }

    fn set_camera_view(&mut self, view: &CameraView) {
        self.camera = Camera::from_heading_pitch_roll(
            view.destination,
            view.heading,
            view.pitch,
            view.roll,
            self.camera.viewport,
        );
    }

    fn add_to_scene(&mut self, asset: TilesetAsset) {
        debug!(asset = %asset.id, url = %asset.url, "tileset added to scene");
        self.tilesets.push(asset);
    }

    fn add_pickable_volume(
        &mut self,
        position: Vec3,
        dimensions: Vec3,
        material: Material,
    ) -> Handle {
        let entity = self.spawn_pickable(
            position,
            ComponentBounds::enu_box(position, dimensions),
            Drawable3D::enu_box(dimensions, material.color),
            PickLayer::Scene,
        );
        entity.handle()
    }

    fn add_billboard(&mut self, position: Vec3, image: &str, style: BillboardStyle) -> Handle {
        let size = self.billboard_pick_size_m * style.scale;
        let entity = self.spawn_pickable(
            position,
            ComponentBounds::cube(position, size),
            Drawable3D::billboard(style.scale, style.vertical_origin, style.color),
            PickLayer::Overlay,
        );
        self.images.insert(entity.handle(), image.to_string());
        entity.handle()
    }

    fn pick(&self, point: ScreenPoint) -> Option<Handle> {
        let hit = pick_screen(
            &self.world,
            point.x,
            point.y,
            |x, y| self.camera.ray_through(x, y),
            PickOptions::default(),
        )?;
        trace!(entity = hit.entity.index(), distance = hit.distance, "pick hit");
        Some(hit.entity.handle())
    }

    fn camera_world_position(&self) -> Vec3 {
        self.camera.position
    }
}
