use std::future::Future;

use catalog::{CameraView, SceneSettings};
use foundation::handles::Handle;
use foundation::ids::AssetId;
use foundation::math::Vec3;
use interaction::{BillboardStyle, RenderEngine, ScreenPoint};
use js_sys::Promise;
use scene::components::{Material, VerticalOrigin};
use streaming::{AssetError, AssetService, TilesetAsset};
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

// Thin bridge to the global `Cesium` namespace loaded by the page. Entities
// created here are tagged with a dense index that doubles as the handle.
// Tilesets are loaded before they are added, keyed by asset id.
#[wasm_bindgen(inline_js = "
const __atlas_entities = [];
const __atlas_tilesets = new Map();

function __atlas_tag(entity) {
    __atlas_entities.push(entity);
    entity.__atlasHandle = __atlas_entities.length - 1;
    return entity.__atlasHandle;
}

export function atlas_cesium_create(container, token) {
    Cesium.Ion.defaultAccessToken = token;
    return new Cesium.Viewer(container, {
        timeline: false,
        animation: false,
        sceneModePicker: false,
        baseLayerPicker: false,
        geocoder: true,
        homeButton: false,
    });
}

export function atlas_cesium_configure(viewer, verticalExaggeration, skyAtmosphere) {
    viewer.scene.verticalExaggeration = verticalExaggeration;
    viewer.scene.skyAtmosphere.show = skyAtmosphere;
}

export function atlas_cesium_set_view(viewer, x, y, z, heading, pitch, roll) {
    viewer.camera.setView({
        destination: new Cesium.Cartesian3(x, y, z),
        orientation: { heading, pitch, roll },
    });
}

export function atlas_cesium_load_tileset(id, url, token) {
    const resource = token
        ? new Cesium.Resource({ url, headers: { Authorization: 'Bearer ' + token } })
        : url;
    return Cesium.Cesium3DTileset.fromUrl(resource).then((tileset) => {
        __atlas_tilesets.set(id, tileset);
    });
}

export function atlas_cesium_add_tileset(viewer, id) {
    const tileset = __atlas_tilesets.get(id);
    if (!tileset) {
        return false;
    }
    __atlas_tilesets.delete(id);
    viewer.scene.primitives.add(tileset);
    return true;
}

export function atlas_cesium_add_box(viewer, x, y, z, dx, dy, dz, r, g, b, a) {
    return __atlas_tag(viewer.entities.add({
        position: new Cesium.Cartesian3(x, y, z),
        box: {
            dimensions: new Cesium.Cartesian3(dx, dy, dz),
            material: new Cesium.Color(r, g, b, a),
        },
    }));
}

export function atlas_cesium_add_billboard(viewer, x, y, z, image, scale, r, g, b, a, verticalOrigin, clampToTiles) {
    return __atlas_tag(viewer.entities.add({
        position: new Cesium.Cartesian3(x, y, z),
        billboard: {
            image,
            scale,
            color: new Cesium.Color(r, g, b, a),
            verticalOrigin: Cesium.VerticalOrigin[verticalOrigin],
            heightReference: clampToTiles
                ? Cesium.HeightReference.CLAMP_TO_3D_TILE
                : Cesium.HeightReference.NONE,
        },
    }));
}

export function atlas_cesium_pick(viewer, x, y) {
    const picked = viewer.scene.pick(new Cesium.Cartesian2(x, y));
    if (!Cesium.defined(picked) || !picked.id || picked.id.__atlasHandle === undefined) {
        return undefined;
    }
    return picked.id.__atlasHandle;
}

export function atlas_cesium_camera_position(viewer) {
    const p = viewer.camera.positionWC;
    return new Float64Array([p.x, p.y, p.z]);
}

export function atlas_cesium_on_move_end(viewer, cb) {
    viewer.camera.moveEnd.addEventListener(() => cb());
}

export function atlas_cesium_on_left_click(viewer, cb) {
    const handler = new Cesium.ScreenSpaceEventHandler(viewer.scene.canvas);
    handler.setInputAction(
        (click) => cb(click.position.x, click.position.y),
        Cesium.ScreenSpaceEventType.LEFT_CLICK,
    );
}
")]
extern "C" {
    fn atlas_cesium_create(container: &str, token: &str) -> JsValue;
    fn atlas_cesium_configure(viewer: &JsValue, vertical_exaggeration: f64, sky_atmosphere: bool);
    fn atlas_cesium_set_view(
        viewer: &JsValue,
        x: f64,
        y: f64,
        z: f64,
        heading: f64,
        pitch: f64,
        roll: f64,
    );
    fn atlas_cesium_load_tileset(id: f64, url: &str, token: Option<String>) -> Promise;
    fn atlas_cesium_add_tileset(viewer: &JsValue, id: f64) -> bool;
    fn atlas_cesium_add_box(
        viewer: &JsValue,
        x: f64,
        y: f64,
        z: f64,
        dx: f64,
        dy: f64,
        dz: f64,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    ) -> u32;
    fn atlas_cesium_add_billboard(
        viewer: &JsValue,
        x: f64,
        y: f64,
        z: f64,
        image: &str,
        scale: f64,
        r: f32,
        g: f32,
        b: f32,
        a: f32,
        vertical_origin: &str,
        clamp_to_tiles: bool,
    ) -> u32;
    fn atlas_cesium_pick(viewer: &JsValue, x: f64, y: f64) -> Option<u32>;
    fn atlas_cesium_camera_position(viewer: &JsValue) -> Vec<f64>;
    fn atlas_cesium_on_move_end(viewer: &JsValue, cb: &Closure<dyn FnMut()>);
    fn atlas_cesium_on_left_click(viewer: &JsValue, cb: &Closure<dyn FnMut(f64, f64)>);
}

fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

/// Wraps an endpoint resolver so a fetch only succeeds once Cesium has loaded
/// the tileset itself. Broken or unauthorized tilesets fail the fetch, before
/// any hit volume exists.
#[derive(Debug)]
pub struct CesiumTilesetService<S> {
    inner: S,
}

impl<S: AssetService> CesiumTilesetService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    async fn load(&self, id: AssetId) -> Result<TilesetAsset, AssetError> {
        let asset = self.inner.fetch_asset(id).await?;
        let promise =
            atlas_cesium_load_tileset(id.get() as f64, &asset.url, asset.access_token.clone());
        JsFuture::from(promise)
            .await
            .map_err(|err| AssetError::Transport(js_error_text(&err)))?;
        Ok(asset)
    }
}

impl<S: AssetService> AssetService for CesiumTilesetService<S> {
    fn fetch_asset(&self, id: AssetId) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
        self.load(id)
    }
}

fn vertical_origin_name(origin: VerticalOrigin) -> &'static str {
    match origin {
        VerticalOrigin::Center => "CENTER",
        VerticalOrigin::Top => "TOP",
        VerticalOrigin::Bottom => "BOTTOM",
    }
}

/// [`RenderEngine`] backed by a CesiumJS viewer.
#[derive(Debug)]
pub struct CesiumEngine {
    viewer: JsValue,
}

impl CesiumEngine {
    pub fn new(container_id: &str, token: &str) -> Self {
        Self {
            viewer: atlas_cesium_create(container_id, token),
        }
    }

    pub fn on_camera_settled(&self, f: impl FnMut() + 'static) {
        let cb = Closure::<dyn FnMut()>::new(f);
        atlas_cesium_on_move_end(&self.viewer, &cb);
        cb.forget();
    }

    pub fn on_left_click(&self, f: impl FnMut(f64, f64) + 'static) {
        let cb = Closure::<dyn FnMut(f64, f64)>::new(f);
        atlas_cesium_on_left_click(&self.viewer, &cb);
        cb.forget();
    }
}

impl RenderEngine for CesiumEngine {
    fn configure_scene(&mut self, settings: &SceneSettings) {
        atlas_cesium_configure(
            &self.viewer,
            settings.vertical_exaggeration,
            settings.sky_atmosphere,
        );
    }

    fn set_camera_view(&mut self, view: &CameraView) {
        let d = view.destination;
        atlas_cesium_set_view(&self.viewer, d.x, d.y, d.z, view.heading, view.pitch, view.roll);
    }

    fn add_to_scene(&mut self, asset: TilesetAsset) {
        if atlas_cesium_add_tileset(&self.viewer, asset.id.get() as f64) {
            debug!(asset = %asset.id, url = %asset.url, "tileset added");
        } else {
            warn!(asset = %asset.id, "tileset was not preloaded; skipped");
        }
    }

    fn add_pickable_volume(
        &mut self,
        position: Vec3,
        dimensions: Vec3,
        material: Material,
    ) -> Handle {
        let [r, g, b, a] = material.color.as_array();
        let index = atlas_cesium_add_box(
            &self.viewer,
            position.x,
            position.y,
            position.z,
            dimensions.x,
            dimensions.y,
            dimensions.z,
            r,
            g,
            b,
            a,
        );
        Handle::new(index, 0)
    }

    fn add_billboard(&mut self, position: Vec3, image: &str, style: BillboardStyle) -> Handle {
        let [r, g, b, a] = style.color.as_array();
        let index = atlas_cesium_add_billboard(
            &self.viewer,
            position.x,
            position.y,
            position.z,
            image,
            style.scale,
            r,
            g,
            b,
            a,
            vertical_origin_name(style.vertical_origin),
            style.clamp_to_tiles,
        );
        Handle::new(index, 0)
    }

    fn pick(&self, point: ScreenPoint) -> Option<Handle> {
        atlas_cesium_pick(&self.viewer, point.x, point.y).map(|i| Handle::new(i, 0))
    }

    fn camera_world_position(&self) -> Vec3 {
        match atlas_cesium_camera_position(&self.viewer).as_slice() {
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => Vec3::ZERO,
        }
    }
}
