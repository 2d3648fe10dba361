use crate::surface::{Region, Surface};

/// Registration-order index of an interactive volume.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeId(pub u32);

/// Shared view state: the selected volume and the visibility of the overlay
/// and loading indicator.
///
/// Only the overlay operations (`show`/`hide`) and [`AppState::set_loading`]
/// mutate it. Invariant: a selection exists only while the overlay is visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    selection: Option<VolumeId>,
    overlay_visible: bool,
    loading_visible: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<VolumeId> {
        self.selection
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn loading_visible(&self) -> bool {
        self.loading_visible
    }

    /// Shows or hides the global loading indicator.
    pub fn set_loading<S: Surface>(&mut self, surface: &mut S, visible: bool) {
        surface.set_visible(Region::LoadingOverlay, visible);
        self.loading_visible = visible;
    }

    pub(crate) fn open_overlay(&mut self) {
        self.overlay_visible = true;
    }

    pub(crate) fn select(&mut self, volume: VolumeId) {
        debug_assert!(self.overlay_visible);
        self.selection = Some(volume);
    }

    pub(crate) fn close_overlay(&mut self) {
        self.overlay_visible = false;
        self.selection = None;
    }
}
