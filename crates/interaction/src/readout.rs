use foundation::math::Vec3;
use tracing::trace;

use crate::engine::{Geographic, RenderEngine};
use crate::surface::{Region, Surface};

/// One rendered camera readout.
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub position: Vec3,
    pub geographic: Geographic,
    pub html: String,
}

/// Camera position display, refreshed whenever the camera settles.
///
/// Inert until [`CoordinateReadout::wire`] is called; the engine keeps emitting
/// camera events during startup and those are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinateReadout {
    wired: bool,
}

impl CoordinateReadout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire(&mut self) {
        self.wired = true;
    }

    pub fn is_wired(&self) -> bool {
        self.wired
    }

    /// Rewrites the coordinates region from the current camera position.
    ///
    /// Skipped (returns `None`) before wiring and when the position has no
    /// geographic equivalent.
    pub fn on_camera_settled<E, S>(&self, engine: &E, surface: &mut S) -> Option<Readout>
    where
        E: RenderEngine,
        S: Surface,
    {
        if !self.wired {
            return None;
        }
        let position = engine.camera_world_position();
        let Some(geographic) = engine.world_to_geographic(position) else {
            trace!(?position, "camera position has no geographic equivalent");
            return None;
        };
        let html = format_readout(position, geographic);
        surface.set_html(Region::CoordinatesDisplay, &html);
        Some(Readout {
            position,
            geographic,
            html,
        })
    }
}

/// Cartesian to 3 decimals, longitude/latitude to 6, height to 2.
pub fn format_readout(position: Vec3, geo: Geographic) -> String {
    format!(
        "<strong>Cartesian Coordinates:</strong><br>\
         X: {:.3}<br>Y: {:.3}<br>Z: {:.3}<br><br>\
         <strong>Geographic Coordinates:</strong><br>\
         Longitude: {:.6}°<br>Latitude: {:.6}°<br>Height: {:.2} meters",
        position.x, position.y, position.z, geo.lon_deg, geo.lat_deg, geo.height_m
    )
}

#[cfg(test)]
mod tests {
    use super::{CoordinateReadout, format_readout};
    use crate::engine::Geographic;
    use crate::headless::HeadlessEngine;
    use crate::surface::{MemorySurface, Region};
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::camera::Viewport;

    #[test]
    fn formats_fixed_precision() {
        let html = format_readout(
            Vec3::new(-2213992.2, -3753500.07, 4643615.175),
            Geographic {
                lon_deg: -120.534118,
                lat_deg: 47.010532,
                height_m: 1438.07,
            },
        );
        assert_eq!(
            html,
            "<strong>Cartesian Coordinates:</strong><br>\
             X: -2213992.200<br>Y: -3753500.070<br>Z: 4643615.175<br><br>\
             <strong>Geographic Coordinates:</strong><br>\
             Longitude: -120.534118°<br>Latitude: 47.010532°<br>Height: 1438.07 meters"
        );
    }

    #[test]
    fn missing_display_region_is_a_silent_no_op() {
        let engine = HeadlessEngine::new(Viewport::default());
        let mut readout = CoordinateReadout::new();
        readout.wire();

        let mut surface = MemorySurface::with_regions([Region::LoadingOverlay]);
        let before = surface.clone();
        let rendered = readout
            .on_camera_settled(&engine, &mut surface)
            .expect("readout still computed");
        assert!(rendered.html.starts_with("<strong>Cartesian Coordinates:</strong>"));
        assert_eq!(surface, before);

        let mut empty = MemorySurface::empty();
        assert!(readout.on_camera_settled(&engine, &mut empty).is_some());
        assert_eq!(empty, MemorySurface::empty());
    }
}
