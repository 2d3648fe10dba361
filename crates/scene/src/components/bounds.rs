use foundation::bounds::Aabb3;
use foundation::math::{Ecef, EnuBasis, Vec3, enu_basis, try_ecef_to_geodetic};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ComponentBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ComponentBounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Axis-aligned cube of edge `size` centred on `center`.
    pub fn cube(center: Vec3, size: f64) -> Self {
        let h = Vec3::new(size, size, size) * 0.5;
        Self::new(center - h, center + h)
    }

    /// World-space bounds of a box centred on `center` whose edges follow the
    /// local east-north-up axes with lengths `dimensions` (east, north, up).
    ///
    /// Falls back to world axes when `center` has no geodetic frame.
    pub fn enu_box(center: Vec3, dimensions: Vec3) -> Self {
        let basis = try_ecef_to_geodetic(Ecef::from(center))
            .map(enu_basis)
            .unwrap_or(EnuBasis {
                east: Vec3::new(1.0, 0.0, 0.0),
                north: Vec3::new(0.0, 1.0, 0.0),
                up: Vec3::new(0.0, 0.0, 1.0),
            });

        let h = dimensions * 0.5;
        let corners = [-1.0, 1.0].into_iter().flat_map(|se| {
            [-1.0, 1.0].into_iter().flat_map(move |sn| {
                [-1.0, 1.0].into_iter().map(move |su| {
                    let p = center
                        + basis.east * (se * h.x)
                        + basis.north * (sn * h.y)
                        + basis.up * (su * h.z);
                    p.as_array()
                })
            })
        });

        // Eight corners are always present.
        let b = Aabb3::from_points(corners)
            .unwrap_or(Aabb3::new(center.as_array(), center.as_array()));
        Self::from(b)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

impl From<Aabb3> for ComponentBounds {
    fn from(b: Aabb3) -> Self {
        Self::new(Vec3::from_array(b.min), Vec3::from_array(b.max))
    }
}

impl From<ComponentBounds> for Aabb3 {
    fn from(b: ComponentBounds) -> Self {
        Aabb3::new(b.min.as_array(), b.max.as_array())
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentBounds;
    use foundation::math::{Ecef, Vec3, enu_basis, try_ecef_to_geodetic};

    #[test]
    fn contains_point_inside() {
        let bounds = ComponentBounds::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        assert!(bounds.contains(Vec3::new(0.5, 0.0, -0.5)));
        assert!(!bounds.contains(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn enu_box_encloses_every_corner() {
        let center = Vec3::new(-2_213_992.2, -3_753_500.07, 4_643_615.175);
        let dims = Vec3::new(100.0, 100.0, 670.0);
        let b = ComponentBounds::enu_box(center, dims);

        let geo = try_ecef_to_geodetic(Ecef::from(center)).expect("geodetic");
        let basis = enu_basis(geo);
        for se in [-0.5, 0.5] {
            for sn in [-0.5, 0.5] {
                for su in [-0.5, 0.5] {
                    let corner = center
                        + basis.east * (se * dims.x)
                        + basis.north * (sn * dims.y)
                        + basis.up * (su * dims.z);
                    assert!(b.contains(corner), "corner {corner:?} outside {b:?}");
                }
            }
        }
        assert!(b.contains(center));
        // A tall box is never smaller than its height along the dominant axis.
        let extent = b.max - b.min;
        assert!(extent.length() >= 670.0);
    }

    #[test]
    fn cube_is_centred() {
        let b = ComponentBounds::cube(Vec3::new(10.0, 0.0, 0.0), 4.0);
        assert_eq!(b.min, Vec3::new(8.0, -2.0, -2.0));
        assert_eq!(b.max, Vec3::new(12.0, 2.0, 2.0));
        assert_eq!(b.center(), Vec3::new(10.0, 0.0, 0.0));
    }
}
