//! Bounding volume hierarchy over entity bounds, built per pick.
//!
//! Nodes live in one flat array: an interior node's left child directly
//! follows it, the right child index is stored. Leaves reference a contiguous
//! run of the (reordered) item array.

use foundation::bounds::Aabb3;
use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::entity::EntityId;

const LEAF_SIZE: usize = 4;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Item {
    pub entity: EntityId,
    pub bounds: Aabb3,
}

/// An entity whose bounds a ray crosses, with the ray parameter at which it
/// enters them (0 when the origin is already inside).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    pub t: f64,
}

#[derive(Debug, Copy, Clone)]
enum NodeKind {
    Leaf { start: usize, len: usize },
    Interior { right: usize },
}

#[derive(Debug, Copy, Clone)]
struct Node {
    bounds: Aabb3,
    kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
pub struct Bvh {
    nodes: Vec<Node>,
    items: Vec<Item>,
}

impl Bvh {
    pub fn build(mut items: Vec<Item>) -> Self {
        let mut nodes = Vec::new();
        if !items.is_empty() {
            let end = items.len();
            split(&mut nodes, &mut items, 0, end);
        }
        Self { nodes, items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Every entity whose bounds the ray enters within `[0, max_t]`, ascending
    /// by entity index.
    pub fn query_ray(&self, origin: Vec3, dir: Vec3, max_t: f64) -> Vec<RayHit> {
        let mut hits = Vec::new();
        if self.nodes.is_empty() {
            return hits;
        }

        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            let node = self.nodes[i];
            if ray_entry(origin, dir, &node.bounds, max_t).is_none() {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, len } => {
                    for item in &self.items[start..start + len] {
                        if let Some(t) = ray_entry(origin, dir, &item.bounds, max_t) {
                            hits.push(RayHit {
                                entity: item.entity,
                                t,
                            });
                        }
                    }
                }
                NodeKind::Interior { right } => {
                    stack.push(right);
                    stack.push(i + 1);
                }
            }
        }

        hits.sort_by_key(|h| h.entity.index());
        hits
    }
}

/// Builds the subtree over `items[start..end]` and returns its node index.
fn split(nodes: &mut Vec<Node>, items: &mut [Item], start: usize, end: usize) -> usize {
    let run = &mut items[start..end];
    let bounds = run[1..]
        .iter()
        .fold(run[0].bounds, |acc, item| acc.union(&item.bounds));

    let index = nodes.len();
    if run.len() <= LEAF_SIZE {
        nodes.push(Node {
            bounds,
            kind: NodeKind::Leaf {
                start,
                len: run.len(),
            },
        });
        return index;
    }

    // Median split on the longest axis; entity index keeps equal centres stable.
    let axis = longest_axis(&bounds);
    run.sort_by(|a, b| {
        stable_total_cmp_f64(a.bounds.center()[axis], b.bounds.center()[axis])
            .then_with(|| a.entity.index().cmp(&b.entity.index()))
    });

    nodes.push(Node {
        bounds,
        kind: NodeKind::Interior { right: 0 },
    });
    let mid = start + (end - start) / 2;
    split(nodes, items, start, mid);
    let right = split(nodes, items, mid, end);
    nodes[index].kind = NodeKind::Interior { right };
    index
}

fn longest_axis(bounds: &Aabb3) -> usize {
    let extent = |axis: usize| bounds.max[axis] - bounds.min[axis];
    // Ties go to the lower axis.
    (1..3).fold(0, |best, axis| {
        if extent(axis) > extent(best) {
            axis
        } else {
            best
        }
    })
}

/// Slab test: where the ray enters `bounds` within `[0, max_t]`, if it does.
pub fn ray_entry(origin: Vec3, dir: Vec3, bounds: &Aabb3, max_t: f64) -> Option<f64> {
    let o = origin.as_array();
    let d = dir.as_array();
    let mut near = 0.0_f64;
    let mut far = max_t;

    for axis in 0..3 {
        if d[axis].abs() < 1e-12 {
            if o[axis] < bounds.min[axis] || o[axis] > bounds.max[axis] {
                return None;
            }
            continue;
        }
        let inv = d[axis].recip();
        let a = (bounds.min[axis] - o[axis]) * inv;
        let b = (bounds.max[axis] - o[axis]) * inv;
        near = near.max(a.min(b));
        far = far.min(a.max(b));
        if far < near {
            return None;
        }
    }
    Some(near)
}

#[cfg(test)]
mod tests {
    use super::{Bvh, Item, ray_entry};
    use crate::entity::EntityId;
    use foundation::bounds::Aabb3;
    use foundation::handles::Handle;
    use foundation::math::Vec3;

    fn e(idx: u32) -> EntityId {
        EntityId(Handle::new(idx, 0))
    }

    fn row(n: u32) -> Vec<Item> {
        (0..n)
            .map(|i| Item {
                entity: e(i),
                bounds: Aabb3::new(
                    [i as f64 * 10.0, 0.0, 0.0],
                    [i as f64 * 10.0 + 1.0, 1.0, 1.0],
                ),
            })
            .collect()
    }

    #[test]
    fn ray_query_reports_crossed_items_with_entry_distance() {
        let bvh = Bvh::build(row(20));
        assert_eq!(bvh.len(), 20);

        let along_x = bvh.query_ray(Vec3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0), 1.0e9);
        assert_eq!(along_x.len(), 20);
        assert_eq!(along_x[0].t, 5.0);
        assert_eq!(along_x[19].t, 195.0);

        let vertical = bvh.query_ray(Vec3::new(30.5, -5.0, 0.5), Vec3::new(0.0, 1.0, 0.0), 1.0e9);
        assert_eq!(vertical.len(), 1);
        assert_eq!(vertical[0].entity, e(3));

        let too_short = bvh.query_ray(Vec3::new(30.5, -5.0, 0.5), Vec3::new(0.0, 1.0, 0.0), 2.0);
        assert!(too_short.is_empty());
    }

    #[test]
    fn results_do_not_depend_on_input_order() {
        let mut reversed = row(13);
        reversed.reverse();
        let origin = Vec3::new(-1.0, 0.5, 0.5);
        let dir = Vec3::new(1.0, 0.0, 0.0);

        let a = Bvh::build(row(13)).query_ray(origin, dir, 55.0);
        let b = Bvh::build(reversed).query_ray(origin, dir, 55.0);
        assert_eq!(a, b);
        let ids: Vec<u32> = a.iter().map(|h| h.entity.index()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn origin_inside_box_enters_at_zero() {
        let b = Aabb3::new([-1.0, -1.0, -1.0], [1.0, 1.0, 1.0]);
        assert_eq!(ray_entry(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), &b, 10.0), Some(0.0));
        assert_eq!(
            ray_entry(Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, 0.0, 1.0), &b, 10.0),
            None
        );
        assert!(Bvh::build(Vec::new()).is_empty());
    }
}
