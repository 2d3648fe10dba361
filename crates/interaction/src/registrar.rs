//! Loads building tilesets and registers their interactive volumes and icons.
//!
//! Fetches may overlap (bounded by the configured parallelism) but results are
//! installed strictly in configuration order, so volume ids and the final
//! status text do not depend on network timing. The viewer is only borrowed
//! between fetches, never across one.

use std::cell::RefCell;
use std::pin::pin;

use catalog::BuildingRecord;
use foundation::ids::AssetId;
use futures_util::stream::{self, StreamExt};
use scene::components::Material;
use streaming::{AssetError, AssetService, Residency, TilesetAsset};
use tracing::{error, info, warn};

use crate::engine::{BillboardStyle, RenderEngine};
use crate::state::VolumeId;
use crate::surface::{Region, Surface};
use crate::viewer::Viewer;

pub const LOAD_FAILED_STATUS: &str = "Failed to load tileset.";

#[derive(Debug, Clone, PartialEq)]
pub struct BuildingOutcome {
    pub asset_id: AssetId,
    pub name: String,
    pub residency: Residency,
    /// Set exactly when the tileset became resident.
    pub volume: Option<VolumeId>,
    pub icons: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationReport {
    /// Base tileset load, when one was configured.
    pub base: Option<Residency>,
    /// One entry per building, in configuration order.
    pub buildings: Vec<BuildingOutcome>,
}

impl RegistrationReport {
    pub fn resident_count(&self) -> usize {
        self.buildings
            .iter()
            .filter(|b| b.residency.is_resident())
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.buildings.len() - self.resident_count()
    }

    pub fn volumes(&self) -> impl Iterator<Item = VolumeId> + '_ {
        self.buildings.iter().filter_map(|b| b.volume)
    }
}

/// Adds a fetched building to the scene: tileset, hit volume, icons.
pub fn install_building<E, S>(
    viewer: &mut Viewer<E, S>,
    record: &BuildingRecord,
    asset: TilesetAsset,
) -> (VolumeId, usize)
where
    E: RenderEngine,
    S: Surface,
{
    viewer.engine.add_to_scene(asset);
    viewer.state.set_loading(&mut viewer.surface, false);

    let material = Material::hit_box(viewer.hitbox_alpha);
    let handle = viewer
        .engine
        .add_pickable_volume(record.position, record.dimensions, material);
    let volume = viewer.dispatcher.register_volume(handle, record);

    let mut icons = 0;
    for (anchor, kind) in record.icon_anchors() {
        let Some(target) = viewer.icons.get(kind) else {
            warn!(building = %record.name, %kind, "icon kind not in icon table; skipped");
            continue;
        };
        let handle =
            viewer
                .engine
                .add_billboard(anchor, &target.image, BillboardStyle::marker(target.scale));
        viewer.dispatcher.register_icon(handle, kind.clone(), volume);
        icons += 1;
    }

    info!(
        asset = %record.asset_id,
        building = %record.name,
        volume = volume.0,
        icons,
        "building registered"
    );
    (volume, icons)
}

/// Surfaces a failed load in the loading region.
pub fn report_failure<E, S>(viewer: &mut Viewer<E, S>, asset_id: AssetId, err: &AssetError)
where
    E: RenderEngine,
    S: Surface,
{
    error!(asset = %asset_id, error = %err, "failed to load tileset");
    viewer.surface.set_text(Region::LoadingOverlay, LOAD_FAILED_STATUS);
    viewer.state.set_loading(&mut viewer.surface, true);
}

/// Fetches `id`, publishing its `Loading` state before the request goes out.
async fn fetch_tracked<E, S, A>(
    viewer: &RefCell<Viewer<E, S>>,
    service: &A,
    id: AssetId,
) -> (Residency, Result<TilesetAsset, AssetError>)
where
    A: AssetService,
{
    let mut residency = Residency::new();
    residency.begin_loading();
    viewer.borrow_mut().loads.insert(id, residency.clone());
    let fetched = service.fetch_asset(id).await;
    (residency, fetched)
}

fn settle<E, S>(
    viewer: &RefCell<Viewer<E, S>>,
    record: &BuildingRecord,
    mut residency: Residency,
    fetched: Result<TilesetAsset, AssetError>,
) -> BuildingOutcome
where
    E: RenderEngine,
    S: Surface,
{
    let status = fetched.as_ref().map(|_| ()).map_err(AssetError::clone);
    let settled = residency.settle(status);
    debug_assert!(settled, "a fetch settles exactly once");

    let mut viewer = viewer.borrow_mut();
    let (volume, icons) = match fetched {
        Ok(asset) => {
            let (volume, icons) = install_building(&mut viewer, record, asset);
            (Some(volume), icons)
        }
        Err(err) => {
            report_failure(&mut viewer, record.asset_id, &err);
            (None, 0)
        }
    };
    viewer.loads.insert(record.asset_id, residency.clone());

    BuildingOutcome {
        asset_id: record.asset_id,
        name: record.name.clone(),
        residency,
        volume,
        icons,
    }
}

/// Fetches and installs a single building.
pub async fn register_building<E, S, A>(
    viewer: &RefCell<Viewer<E, S>>,
    service: &A,
    record: &BuildingRecord,
) -> BuildingOutcome
where
    E: RenderEngine,
    S: Surface,
    A: AssetService,
{
    let (residency, fetched) = fetch_tracked(viewer, service, record.asset_id).await;
    settle(viewer, record, residency, fetched)
}

/// Registers every building, with at most `parallelism` fetches in flight.
///
/// `parallelism <= 1` loads one building after the other. Failures never stop
/// the remaining buildings.
pub async fn register_all<E, S, A>(
    viewer: &RefCell<Viewer<E, S>>,
    service: &A,
    records: &[BuildingRecord],
    parallelism: usize,
) -> Vec<BuildingOutcome>
where
    E: RenderEngine,
    S: Surface,
    A: AssetService,
{
    if records.is_empty() {
        viewer.borrow_mut().set_loading(false);
        return Vec::new();
    }
    {
        let mut v = viewer.borrow_mut();
        v.set_loading(true);
        for record in records {
            v.loads.insert(record.asset_id, Residency::new());
        }
    }

    let mut fetches = pin!(
        stream::iter(records)
            .map(|record| async move {
                let (residency, fetched) = fetch_tracked(viewer, service, record.asset_id).await;
                (record, residency, fetched)
            })
            .buffered(parallelism.max(1))
    );

    let mut outcomes = Vec::with_capacity(records.len());
    while let Some((record, residency, fetched)) = fetches.next().await {
        outcomes.push(settle(viewer, record, residency, fetched));
    }
    outcomes
}

/// Loads the terrain/context tileset that buildings sit in. It gets no hit
/// volume; failures are reported like building failures.
pub async fn load_base_tileset<E, S, A>(
    viewer: &RefCell<Viewer<E, S>>,
    service: &A,
    asset_id: AssetId,
) -> Residency
where
    E: RenderEngine,
    S: Surface,
    A: AssetService,
{
    let (mut residency, fetched) = fetch_tracked(viewer, service, asset_id).await;

    let mut viewer = viewer.borrow_mut();
    let settled = match fetched {
        Ok(asset) => {
            viewer.engine.add_to_scene(asset);
            info!(asset = %asset_id, "base tileset added");
            residency.settle(Ok(()))
        }
        Err(err) => {
            report_failure(&mut viewer, asset_id, &err);
            residency.settle(Err(err))
        }
    };
    debug_assert!(settled, "a fetch settles exactly once");
    viewer.loads.insert(asset_id, residency.clone());
    residency
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::{LOAD_FAILED_STATUS, register_all, register_building};
    use crate::dispatcher::PickTarget;
    use crate::headless::HeadlessEngine;
    use crate::state::VolumeId;
    use crate::surface::{MemorySurface, Region};
    use crate::viewer::Viewer;
    use catalog::{BuildingRecord, IconKind, ViewerConfig};
    use foundation::ids::AssetId;
    use foundation::math::Vec3;
    use pretty_assertions::assert_eq;
    use scene::camera::Viewport;
    use streaming::{AssetError, AssetService, Residency, StaticAssetService, TilesetAsset};

    type TestViewer = Viewer<HeadlessEngine, MemorySurface>;

    fn viewer(config: &ViewerConfig) -> RefCell<TestViewer> {
        viewer_on(MemorySurface::full(), config)
    }

    fn viewer_on(surface: MemorySurface, config: &ViewerConfig) -> RefCell<TestViewer> {
        RefCell::new(Viewer::new(
            HeadlessEngine::new(Viewport::default()),
            surface,
            config,
        ))
    }

    fn building(id: u64) -> BuildingRecord {
        BuildingRecord::new(
            AssetId(id),
            Vec3::new(-2213992.2, -3753500.07, 4643615.175),
            Vec3::new(100.0, 100.0, 670.0),
            format!("https://tour.example.com/{id}"),
        )
    }

    #[test]
    fn success_adds_tileset_volume_and_icons() {
        let config = ViewerConfig::default_demo();
        let record = building(7)
            .with_icon(Vec3::new(0.0, 0.0, 50.0), IconKind::nth(1))
            .with_icon(Vec3::new(0.0, 0.0, 80.0), IconKind::nth(2));
        let viewer = viewer(&config);
        let service = StaticAssetService::offline([AssetId(7)]);

        let outcome = pollster::block_on(register_building(&viewer, &service, &record));
        assert_eq!(outcome.volume, Some(VolumeId(0)));
        assert_eq!(outcome.icons, 2);
        assert!(outcome.residency.is_resident());

        let v = viewer.borrow();
        assert_eq!(v.engine.tilesets().len(), 1);
        assert_eq!(v.engine.world().len(), 3);
        assert_eq!(v.dispatcher().volumes().len(), 1);
        assert_eq!(v.dispatcher().icon_count(), 2);
        assert!(!v.state().loading_visible());
        let volume_handle = v.dispatcher().volumes()[0].handle;
        assert_eq!(
            v.dispatcher().target(volume_handle),
            Some(&PickTarget::Volume(VolumeId(0)))
        );
    }

    #[test]
    fn failure_reports_and_does_not_stop_others() {
        let config = ViewerConfig::default_demo();
        let viewer = viewer(&config);
        let service = StaticAssetService::offline([AssetId(2)])
            .with_failure(AssetId(1), AssetError::NotFound(AssetId(1)));
        let records = [building(1), building(2)];

        let outcomes = pollster::block_on(register_all(&viewer, &service, &records, 1));
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].volume, None);
        assert_eq!(outcomes[0].icons, 0);
        assert!(!outcomes[0].residency.is_resident());
        assert_eq!(outcomes[1].volume, Some(VolumeId(0)));

        let v = viewer.borrow();
        assert_eq!(v.dispatcher().volumes().len(), 1);
        assert_eq!(v.surface.content(Region::LoadingOverlay), Some(LOAD_FAILED_STATUS));
        assert!(!v.surface.is_visible(Region::LoadingOverlay));
    }

    #[test]
    fn failure_last_leaves_status_visible() {
        let config = ViewerConfig::default_demo();
        let viewer = viewer(&config);
        let service = StaticAssetService::offline([AssetId(1)]);
        let records = [building(1), building(404)];

        pollster::block_on(register_all(&viewer, &service, &records, 1));
        let v = viewer.borrow();
        assert!(v.surface.is_visible(Region::LoadingOverlay));
        assert_eq!(v.surface.content(Region::LoadingOverlay), Some(LOAD_FAILED_STATUS));
    }

    #[test]
    fn failure_without_loading_region_is_silent() {
        let config = ViewerConfig::default_demo();
        let viewer = viewer_on(
            MemorySurface::with_regions([Region::CoordinatesDisplay]),
            &config,
        );
        let service = StaticAssetService::offline([AssetId(2)]);
        let records = [building(1), building(2)];

        let outcomes = pollster::block_on(register_all(&viewer, &service, &records, 1));
        assert_eq!(outcomes[0].volume, None);
        assert_eq!(outcomes[1].volume, Some(VolumeId(0)));

        let v = viewer.borrow();
        assert_eq!(
            v.surface,
            MemorySurface::with_regions([Region::CoordinatesDisplay])
        );

        let empty = viewer_on(MemorySurface::empty(), &config);
        pollster::block_on(register_all(&empty, &service, &[building(404)], 1));
        assert_eq!(empty.borrow().surface, MemorySurface::empty());
    }

    /// Records the viewer's view of both assets whenever a fetch starts.
    struct ObservingService<'a> {
        viewer: &'a RefCell<TestViewer>,
        seen: RefCell<Vec<(AssetId, [Option<Residency>; 2])>>,
    }

    impl AssetService for ObservingService<'_> {
        fn fetch_asset(
            &self,
            id: AssetId,
        ) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
            let snapshot = {
                let v = self.viewer.borrow();
                [AssetId(1), AssetId(2)].map(|a| v.residency(a).cloned())
            };
            self.seen.borrow_mut().push((id, snapshot));
            std::future::ready(Ok(TilesetAsset::new(id, format!("mem://{id}"))))
        }
    }

    #[test]
    fn residency_advances_around_each_fetch() {
        let config = ViewerConfig::default_demo();
        let viewer = viewer(&config);
        let service = ObservingService {
            viewer: &viewer,
            seen: RefCell::new(Vec::new()),
        };

        pollster::block_on(register_all(&viewer, &service, &[building(1), building(2)], 1));
        assert_eq!(
            service.seen.into_inner(),
            vec![
                (
                    AssetId(1),
                    [Some(Residency::Loading), Some(Residency::Requested)]
                ),
                (
                    AssetId(2),
                    [Some(Residency::Resident), Some(Residency::Loading)]
                ),
            ]
        );
        let v = viewer.borrow();
        assert_eq!(v.residency(AssetId(2)), Some(&Residency::Resident));
        assert_eq!(v.residency(AssetId(3)), None);
    }

    #[test]
    fn empty_list_hides_loading() {
        let config = ViewerConfig::default_demo();
        let viewer = viewer(&config);
        let outcomes = pollster::block_on(register_all(
            &viewer,
            &StaticAssetService::new(),
            &[],
            1,
        ));
        assert!(outcomes.is_empty());
        assert!(!viewer.borrow().state().loading_visible());
    }

    /// Completes after `self.0` more polls.
    struct YieldTimes(usize);

    impl Future for YieldTimes {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 == 0 {
                Poll::Ready(())
            } else {
                self.0 -= 1;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    /// Later ids finish first; tracks how many fetches overlap.
    #[derive(Default)]
    struct SlowService {
        in_flight: Cell<usize>,
        peak: Cell<usize>,
    }

    impl AssetService for SlowService {
        fn fetch_asset(
            &self,
            id: AssetId,
        ) -> impl Future<Output = Result<TilesetAsset, AssetError>> {
            async move {
                self.in_flight.set(self.in_flight.get() + 1);
                self.peak.set(self.peak.get().max(self.in_flight.get()));
                YieldTimes(10usize.saturating_sub(id.get() as usize * 3)).await;
                self.in_flight.set(self.in_flight.get() - 1);
                Ok(TilesetAsset::new(id, format!("mem://{id}")))
            }
        }
    }

    #[test]
    fn parallel_fetches_install_in_configuration_order() {
        let config = ViewerConfig::default_demo();
        let records = [building(1), building(2), building(3)];

        let sequential = SlowService::default();
        let seq_viewer = viewer(&config);
        pollster::block_on(register_all(&seq_viewer, &sequential, &records, 1));
        assert_eq!(sequential.peak.get(), 1);

        let parallel = SlowService::default();
        let par_viewer = viewer(&config);
        let outcomes = pollster::block_on(register_all(&par_viewer, &parallel, &records, 3));
        assert_eq!(parallel.peak.get(), 3);

        let order: Vec<(AssetId, Option<VolumeId>)> =
            outcomes.iter().map(|o| (o.asset_id, o.volume)).collect();
        assert_eq!(
            order,
            vec![
                (AssetId(1), Some(VolumeId(0))),
                (AssetId(2), Some(VolumeId(1))),
                (AssetId(3), Some(VolumeId(2))),
            ]
        );
        let installed: Vec<AssetId> = par_viewer
            .borrow()
            .engine
            .tilesets()
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(installed, vec![AssetId(1), AssetId(2), AssetId(3)]);
    }
}
