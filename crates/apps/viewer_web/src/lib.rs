use console_error_panic_hook::set_once;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use catalog::ViewerConfig;
use interaction::{PickOutcome, Region, ScreenPoint, Viewer, bootstrap};
use streaming::IonClient;
use tracing::{debug, info};

mod cesium;
mod dom;
mod logging;

use cesium::{CesiumEngine, CesiumTilesetService};
use dom::DomSurface;

type WebViewer = Viewer<CesiumEngine, DomSurface>;

thread_local! {
    static STATE: RefCell<Option<Rc<RefCell<WebViewer>>>> = const { RefCell::new(None) };
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Runs `f` against the booted viewer. Events that arrive before boot, or
/// while the viewer is mid-update, are dropped.
fn with_viewer<R>(f: impl FnOnce(&mut WebViewer) -> R) -> Option<R> {
    let viewer = STATE.with(|state| state.borrow().clone())?;
    let Ok(mut v) = viewer.try_borrow_mut() else {
        debug!("viewer busy; event dropped");
        return None;
    };
    Some(f(&mut v))
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    logging::init();
    Ok(())
}

/// Creates the Cesium viewer inside `container_id` and starts loading.
///
/// An empty `config_json` boots the bundled demo. `access_token` overrides the
/// token from the config.
#[wasm_bindgen]
pub fn boot(
    container_id: &str,
    config_json: &str,
    access_token: Option<String>,
) -> Result<(), JsValue> {
    let mut config = if config_json.trim().is_empty() {
        ViewerConfig::default_demo()
    } else {
        ViewerConfig::from_json_str(config_json).map_err(to_js)?
    };
    if access_token.is_some() {
        config.access_token = access_token;
    }
    let token = config.require_access_token().map_err(to_js)?.to_string();

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    dom::wire_close_button(&document, close_overlay)?;

    let engine = CesiumEngine::new(container_id, &token);
    engine.on_camera_settled(on_camera_settled);
    engine.on_left_click(|x, y| {
        on_left_click(x, y);
    });

    let viewer = Rc::new(RefCell::new(Viewer::new(
        engine,
        DomSurface::new(document),
        &config,
    )));
    STATE.with(|state| *state.borrow_mut() = Some(viewer.clone()));

    spawn_local(async move {
        let service = CesiumTilesetService::new(
            IonClient::new(config.ion_api_url.as_str(), token)
                .with_probe_tileset(config.probe_tileset),
        );
        let report = bootstrap(&*viewer, &service, &config).await;
        info!(
            resident = report.resident_count(),
            failed = report.failed_count(),
            "buildings loaded"
        );
    });
    Ok(())
}

#[wasm_bindgen]
pub fn on_camera_settled() {
    with_viewer(|v| v.camera_settled());
}

/// Returns the overlay URL opened by the click, if any.
#[wasm_bindgen]
pub fn on_left_click(x: f64, y: f64) -> Option<String> {
    match with_viewer(|v| v.click(ScreenPoint::new(x, y)))? {
        PickOutcome::Volume { url, .. } | PickOutcome::Icon { url, .. } => Some(url),
        PickOutcome::NoOverlay { .. } | PickOutcome::Inactive | PickOutcome::Miss => None,
    }
}

#[wasm_bindgen]
pub fn close_overlay() {
    with_viewer(|v| v.close_overlay());
}

#[wasm_bindgen]
pub fn show_overlay(url: &str) -> bool {
    with_viewer(|v| v.show_overlay(url)).unwrap_or(false)
}

/// DOM ids the page must provide, in a fixed order.
#[wasm_bindgen]
pub fn region_ids() -> Vec<String> {
    Region::ALL
        .iter()
        .map(|r| r.element_id().to_string())
        .collect()
}
