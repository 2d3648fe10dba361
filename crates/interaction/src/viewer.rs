use std::collections::BTreeMap;

use catalog::{IconTable, ViewerConfig};
use foundation::ids::AssetId;
use streaming::Residency;

use crate::dispatcher::{PickDispatcher, PickOutcome};
use crate::engine::{RenderEngine, ScreenPoint};
use crate::overlay;
use crate::readout::{CoordinateReadout, Readout};
use crate::state::AppState;
use crate::surface::Surface;

/// Everything the interaction layer owns for one page: the engine, the
/// surface, the shared view state and the event handlers.
///
/// Hosts keep it in a `RefCell` and forward engine/DOM events to
/// [`Viewer::click`], [`Viewer::camera_settled`] and [`Viewer::close_overlay`].
#[derive(Debug)]
pub struct Viewer<E, S> {
    pub engine: E,
    pub surface: S,
    pub(crate) state: AppState,
    pub(crate) dispatcher: PickDispatcher,
    pub(crate) readout: CoordinateReadout,
    pub(crate) icons: IconTable,
    pub(crate) hitbox_alpha: f32,
    /// Latest lifecycle state of every asset the registrar has asked for.
    pub(crate) loads: BTreeMap<AssetId, Residency>,
}

impl<E, S> Viewer<E, S>
where
    E: RenderEngine,
    S: Surface,
{
    pub fn new(engine: E, surface: S, config: &ViewerConfig) -> Self {
        Self {
            engine,
            surface,
            state: AppState::new(),
            dispatcher: PickDispatcher::new(),
            readout: CoordinateReadout::new(),
            icons: config.icons.clone(),
            hitbox_alpha: config.hitbox_alpha,
            loads: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatcher(&self) -> &PickDispatcher {
        &self.dispatcher
    }

    pub fn icons(&self) -> &IconTable {
        &self.icons
    }

    /// Load state of `asset`, or `None` if it was never requested.
    pub fn residency(&self, asset: AssetId) -> Option<&Residency> {
        self.loads.get(&asset)
    }

    pub fn is_wired(&self) -> bool {
        self.dispatcher.is_wired() && self.readout.is_wired()
    }

    /// Starts honouring clicks and camera events.
    pub fn wire(&mut self) {
        self.readout.wire();
        self.dispatcher.wire();
    }

    pub fn set_loading(&mut self, visible: bool) {
        self.state.set_loading(&mut self.surface, visible);
    }

    pub fn click(&mut self, point: ScreenPoint) -> PickOutcome {
        self.dispatcher.handle_click(
            &self.engine,
            &mut self.state,
            &mut self.surface,
            &self.icons,
            point,
        )
    }

    pub fn camera_settled(&mut self) -> Option<Readout> {
        self.readout.on_camera_settled(&self.engine, &mut self.surface)
    }

    pub fn show_overlay(&mut self, url: &str) -> bool {
        overlay::show(&mut self.state, &mut self.surface, url)
    }

    pub fn close_overlay(&mut self) {
        overlay::hide(&mut self.state, &mut self.surface);
    }
}
