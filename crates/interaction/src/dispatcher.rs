use std::collections::HashMap;

use catalog::{BuildingRecord, IconKind, IconTable};
use foundation::handles::Handle;
use foundation::ids::AssetId;
use tracing::{debug, warn};

use crate::engine::{RenderEngine, ScreenPoint};
use crate::overlay;
use crate::state::{AppState, VolumeId};
use crate::surface::Surface;

/// Interactive volume registered for a loaded building.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeEntry {
    pub id: VolumeId,
    pub handle: Handle,
    pub asset_id: AssetId,
    pub name: String,
    pub overlay_url: String,
}

/// What an engine handle stands for.
#[derive(Debug, Clone, PartialEq)]
pub enum PickTarget {
    Volume(VolumeId),
    Icon { kind: IconKind, parent: VolumeId },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// Click arrived before the dispatcher was wired.
    Inactive,
    Volume { volume: VolumeId, url: String },
    Icon { kind: IconKind, url: String },
    /// A volume or icon was hit but the page has no overlay to show `url` in.
    NoOverlay { url: String },
    /// Empty space or an object the viewer does not own.
    Miss,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DispatchPhase {
    #[default]
    Idle,
    Resolving,
}

/// Routes clicks to volumes and icons.
///
/// Owns the registry from engine handles to domain targets; the registrar adds
/// to it as buildings load. Clicks are resolved synchronously, so the
/// dispatcher is `Resolving` only for the duration of [`PickDispatcher::handle_click`].
#[derive(Debug, Default)]
pub struct PickDispatcher {
    targets: HashMap<Handle, PickTarget>,
    volumes: Vec<VolumeEntry>,
    phase: DispatchPhase,
    wired: bool,
}

impl PickDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire(&mut self) {
        self.wired = true;
    }

    pub fn is_wired(&self) -> bool {
        self.wired
    }

    pub fn phase(&self) -> DispatchPhase {
        self.phase
    }

    pub fn register_volume(&mut self, handle: Handle, record: &BuildingRecord) -> VolumeId {
        let id = VolumeId(self.volumes.len() as u32);
        self.volumes.push(VolumeEntry {
            id,
            handle,
            asset_id: record.asset_id,
            name: record.name.clone(),
            overlay_url: record.overlay_url.clone(),
        });
        self.targets.insert(handle, PickTarget::Volume(id));
        id
    }

    pub fn register_icon(&mut self, handle: Handle, kind: IconKind, parent: VolumeId) {
        self.targets.insert(handle, PickTarget::Icon { kind, parent });
    }

    pub fn volume(&self, id: VolumeId) -> Option<&VolumeEntry> {
        self.volumes.get(id.0 as usize)
    }

    pub fn volumes(&self) -> &[VolumeEntry] {
        &self.volumes
    }

    pub fn target(&self, handle: Handle) -> Option<&PickTarget> {
        self.targets.get(&handle)
    }

    pub fn icon_count(&self) -> usize {
        self.targets
            .values()
            .filter(|t| matches!(t, PickTarget::Icon { .. }))
            .count()
    }

    /// Picks at `point` and opens the overlay for whatever was hit.
    ///
    /// Icon hits show the icon's target without touching the selection; misses
    /// change nothing.
    pub fn handle_click<E, S>(
        &mut self,
        engine: &E,
        state: &mut AppState,
        surface: &mut S,
        icons: &IconTable,
        point: ScreenPoint,
    ) -> PickOutcome
    where
        E: RenderEngine,
        S: Surface,
    {
        if !self.wired || self.phase == DispatchPhase::Resolving {
            return PickOutcome::Inactive;
        }
        self.phase = DispatchPhase::Resolving;
        let outcome = self.resolve(engine, state, surface, icons, point);
        self.phase = DispatchPhase::Idle;
        debug!(x = point.x, y = point.y, ?outcome, "click resolved");
        outcome
    }

    fn resolve<E, S>(
        &self,
        engine: &E,
        state: &mut AppState,
        surface: &mut S,
        icons: &IconTable,
        point: ScreenPoint,
    ) -> PickOutcome
    where
        E: RenderEngine,
        S: Surface,
    {
        let Some(handle) = engine.pick(point) else {
            return PickOutcome::Miss;
        };
        match self.targets.get(&handle) {
            Some(PickTarget::Volume(id)) => {
                let Some(entry) = self.volume(*id) else {
                    return PickOutcome::Miss;
                };
                let url = entry.overlay_url.clone();
                if overlay::show_selected(state, surface, entry.id, &url) {
                    PickOutcome::Volume {
                        volume: entry.id,
                        url,
                    }
                } else {
                    PickOutcome::NoOverlay { url }
                }
            }
            Some(PickTarget::Icon { kind, .. }) => match icons.url(kind) {
                Some(url) if overlay::show(state, surface, url) => PickOutcome::Icon {
                    kind: kind.clone(),
                    url: url.to_string(),
                },
                Some(url) => PickOutcome::NoOverlay {
                    url: url.to_string(),
                },
                None => {
                    warn!(%kind, "icon kind has no target url");
                    PickOutcome::Miss
                }
            },
            None => PickOutcome::Miss,
        }
    }
}
