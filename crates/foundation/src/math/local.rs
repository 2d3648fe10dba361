use super::{Ecef, Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Unit east, north and up axes of the local tangent frame at `origin`, in ECEF.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EnuBasis {
    pub east: Vec3,
    pub north: Vec3,
    pub up: Vec3,
}

pub fn enu_basis(origin: Geodetic) -> EnuBasis {
    let sin_lat = origin.lat_rad.sin();
    let cos_lat = origin.lat_rad.cos();
    let sin_lon = origin.lon_rad.sin();
    let cos_lon = origin.lon_rad.cos();

    EnuBasis {
        east: Vec3::new(-sin_lon, cos_lon, 0.0),
        north: Vec3::new(-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat),
        up: Vec3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat),
    }
}

pub fn ecef_to_enu(point: Ecef, origin: Geodetic) -> Enu {
    let origin_ecef = geodetic_to_ecef(origin);
    let d = Vec3::from(point) - Vec3::from(origin_ecef);
    let basis = enu_basis(origin);

    Enu::new(d.dot(basis.east), d.dot(basis.north), d.dot(basis.up))
}

pub fn enu_to_ecef(enu: Enu, origin: Geodetic) -> Ecef {
    let origin_ecef = geodetic_to_ecef(origin);
    let basis = enu_basis(origin);
    let d = basis.east * enu.east + basis.north * enu.north + basis.up * enu.up;

    (Vec3::from(origin_ecef) + d).into()
}
