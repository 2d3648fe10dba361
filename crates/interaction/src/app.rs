use std::cell::RefCell;

use catalog::ViewerConfig;
use streaming::AssetService;
use tracing::{Instrument, info, info_span};

use crate::engine::RenderEngine;
use crate::registrar::{RegistrationReport, load_base_tileset, register_all};
use crate::surface::Surface;
use crate::viewer::Viewer;

/// Brings a viewer up from configuration.
///
/// Order: scene and camera setup, base tileset, buildings, then click and
/// camera handlers are wired. Events that arrive before wiring are ignored.
pub async fn bootstrap<E, S, A>(
    viewer: &RefCell<Viewer<E, S>>,
    service: &A,
    config: &ViewerConfig,
) -> RegistrationReport
where
    E: RenderEngine,
    S: Surface,
    A: AssetService,
{
    async {
        {
            let mut v = viewer.borrow_mut();
            v.engine.configure_scene(&config.scene);
            if let Some(view) = &config.camera {
                v.engine.set_camera_view(view);
            }
        }

        let base = match config.base_tileset {
            Some(id) => Some(load_base_tileset(viewer, service, id).await),
            None => None,
        };
        let buildings =
            register_all(viewer, service, &config.buildings, config.parallelism).await;

        viewer.borrow_mut().wire();

        let report = RegistrationReport { base, buildings };
        info!(
            resident = report.resident_count(),
            failed = report.failed_count(),
            "viewer ready"
        );
        report
    }
    .instrument(info_span!("bootstrap", buildings = config.buildings.len()))
    .await
}
