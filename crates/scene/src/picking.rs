use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::entity::EntityId;
use crate::spatial::{Bvh, Item as BvhItem};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Draw layer used to order picks. Overlay objects (billboards) are drawn on top
/// of scene geometry, so they win over any scene hit regardless of distance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PickLayer {
    Scene,
    Overlay,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub layer: PickLayer,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

/// Deterministic ray picking over the world's pickable entities.
///
/// Ordering contract:
/// - A hit on a higher [`PickLayer`] wins.
/// - Within a layer, the closest hit along the (normalized) ray wins.
/// - Equal distances tie-break on the lower `EntityId::index()`.
///
/// Entities without explicit bounds or hidden entities are ignored.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;

    let items: Vec<BvhItem> = world
        .pickables()
        .into_iter()
        .map(|(entity, _, bounds)| BvhItem {
            entity,
            bounds: bounds.into(),
        })
        .collect();
    if items.is_empty() {
        return None;
    }

    let (layer, hit) = Bvh::build(items)
        .query_ray(ray.origin, dir, opts.max_distance)
        .into_iter()
        .filter_map(|hit| Some((world.pick_layer(hit.entity)?, hit)))
        .min_by(|(la, a), (lb, b)| {
            lb.cmp(la)
                .then_with(|| stable_total_cmp_f64(a.t, b.t))
                .then_with(|| a.entity.index().cmp(&b.entity.index()))
        })?;

    Some(PickHit {
        entity: hit.entity,
        layer,
        distance: hit.t,
        point: Ray::new(ray.origin, dir).at(hit.t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies a deterministic screen->ray mapping via `make_ray`.
pub fn pick_screen<F>(
    world: &World,
    x_px: f64,
    y_px: f64,
    mut make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(world, ray, opts)
}
