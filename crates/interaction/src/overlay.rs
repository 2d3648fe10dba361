//! Modal overlay that embeds an external page (virtual tour, info sheet) over
//! the 3D view.
//!
//! The overlay needs both its container and the embedded frame; if either is
//! missing from the surface, `show` does nothing.

use tracing::debug;

use crate::state::{AppState, VolumeId};
use crate::surface::{Region, Surface};

fn regions_present<S: Surface>(surface: &S) -> bool {
    surface.has_region(Region::IframeOverlay) && surface.has_region(Region::InfoIframe)
}

/// Loads `url` into the embedded frame and makes the overlay visible.
///
/// Returns whether the overlay was shown. A visible overlay is retargeted.
pub fn show<S: Surface>(state: &mut AppState, surface: &mut S, url: &str) -> bool {
    if !regions_present(surface) {
        debug!(url, "overlay regions missing; ignoring show");
        return false;
    }
    surface.set_embed_url(Region::InfoIframe, url);
    surface.set_visible(Region::IframeOverlay, true);
    state.open_overlay();
    true
}

/// Like [`show`], additionally recording `volume` as the selection.
pub fn show_selected<S: Surface>(
    state: &mut AppState,
    surface: &mut S,
    volume: VolumeId,
    url: &str,
) -> bool {
    let shown = show(state, surface, url);
    if shown {
        state.select(volume);
    }
    shown
}

/// Hides the overlay, unloads the embedded page and clears the selection.
pub fn hide<S: Surface>(state: &mut AppState, surface: &mut S) {
    if regions_present(surface) {
        surface.set_visible(Region::IframeOverlay, false);
        surface.set_embed_url(Region::InfoIframe, "");
    }
    state.close_overlay();
}

#[cfg(test)]
mod tests {
    use super::{hide, show, show_selected};
    use crate::state::{AppState, VolumeId};
    use crate::surface::{MemorySurface, Region};

    #[test]
    fn show_then_hide_round_trips_surface() {
        let mut state = AppState::new();
        let mut surface = MemorySurface::full();

        assert!(show_selected(&mut state, &mut surface, VolumeId(0), "https://a"));
        assert!(surface.is_visible(Region::IframeOverlay));
        assert_eq!(surface.embed_url(Region::InfoIframe), Some("https://a"));
        assert_eq!(state.selection(), Some(VolumeId(0)));

        hide(&mut state, &mut surface);
        assert!(!surface.is_visible(Region::IframeOverlay));
        assert_eq!(surface.embed_url(Region::InfoIframe), Some(""));
        assert_eq!(state.selection(), None);
        assert!(!state.overlay_visible());

        let hidden = surface.clone();
        hide(&mut state, &mut surface);
        assert_eq!(surface, hidden);
        assert_eq!(state.selection(), None);
    }

    #[test]
    fn show_retargets_visible_overlay() {
        let mut state = AppState::new();
        let mut surface = MemorySurface::full();
        show(&mut state, &mut surface, "https://a");
        show(&mut state, &mut surface, "https://b");
        assert_eq!(surface.embed_url(Region::InfoIframe), Some("https://b"));
        assert!(surface.is_visible(Region::IframeOverlay));
    }

    #[test]
    fn missing_regions_leave_state_untouched() {
        let mut state = AppState::new();
        let mut surface = MemorySurface::with_regions([Region::IframeOverlay]);
        let before = surface.clone();

        assert!(!show_selected(&mut state, &mut surface, VolumeId(1), "https://a"));
        assert_eq!(surface, before);
        assert_eq!(state.selection(), None);
        assert!(!state.overlay_visible());

        hide(&mut state, &mut surface);
        assert_eq!(surface, before);
    }
}
