use super::Ecef;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Points closer than this to the Earth's centre have no meaningful geodetic position.
const CENTER_TOLERANCE_M: f64 = 1_000.0;

/// Geodetic coordinates in radians and meters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let sin_lat = geo.lat_rad.sin();
    let cos_lat = geo.lat_rad.cos();
    let sin_lon = geo.lon_rad.sin();
    let cos_lon = geo.lon_rad.cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let x = (n + geo.alt_m) * cos_lat * cos_lon;
    let y = (n + geo.alt_m) * cos_lat * sin_lon;
    let z = (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat;

    Ecef::new(x, y, z)
}

/// Bowring's closed-form ECEF → geodetic conversion.
///
/// Undefined on the polar axis and at the Earth's centre; use
/// [`try_ecef_to_geodetic`] when the input is not known to be well-formed.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta * sin_theta * sin_theta)
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let alt = p / lat.cos() - n;

    Geodetic::new(lat, lon, alt)
}

/// Like [`ecef_to_geodetic`], but returns `None` near the Earth's centre or for
/// non-finite input, and handles points on the polar axis.
pub fn try_ecef_to_geodetic(ecef: Ecef) -> Option<Geodetic> {
    let [x, y, z] = ecef.as_array();
    if !(x.is_finite() && y.is_finite() && z.is_finite()) {
        return None;
    }
    let r = (x * x + y * y + z * z).sqrt();
    if r < CENTER_TOLERANCE_M {
        return None;
    }

    let p = (x * x + y * y).sqrt();
    if p < 1e-6 {
        let lat = std::f64::consts::FRAC_PI_2.copysign(z);
        return Some(Geodetic::new(lat, 0.0, z.abs() - WGS84_B));
    }

    Some(ecef_to_geodetic(ecef))
}

#[cfg(test)]
mod tests {
    use super::{
        Geodetic, WGS84_A, WGS84_B, ecef_to_geodetic, geodetic_to_ecef, try_ecef_to_geodetic,
    };
    use crate::math::Ecef;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let geo = Geodetic::new(0.0, 0.0, 0.0);
        let ecef = geodetic_to_ecef(geo);
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef() {
        let geo = Geodetic::new(
            std::f64::consts::FRAC_PI_6,
            -std::f64::consts::FRAC_PI_3,
            120.0,
        );
        let ecef = geodetic_to_ecef(geo);
        let geo_rt = ecef_to_geodetic(ecef);
        assert_close(geo_rt.lat_rad, geo.lat_rad, 1e-9);
        assert_close(geo_rt.lon_rad, geo.lon_rad, 1e-9);
        assert_close(geo_rt.alt_m, geo.alt_m, 1e-6);
    }

    #[test]
    fn known_point_in_central_washington() {
        let geo = ecef_to_geodetic(Ecef::new(-2_213_992.2, -3_753_500.07, 4_643_615.175));
        assert_close(geo.lon_deg(), -120.534118, 1e-6);
        assert_close(geo.lat_deg(), 47.010532, 1e-6);
        assert_close(geo.alt_m, 1438.07, 1e-2);
    }

    #[test]
    fn checked_conversion_rejects_centre_and_handles_poles() {
        assert!(try_ecef_to_geodetic(Ecef::new(0.0, 0.0, 0.0)).is_none());
        assert!(try_ecef_to_geodetic(Ecef::new(f64::NAN, 0.0, 0.0)).is_none());

        let north = try_ecef_to_geodetic(Ecef::new(0.0, 0.0, WGS84_B + 10.0)).expect("pole");
        assert_close(north.lat_deg(), 90.0, 1e-12);
        assert_close(north.alt_m, 10.0, 1e-6);

        let south = try_ecef_to_geodetic(Ecef::new(0.0, 0.0, -WGS84_B)).expect("pole");
        assert_close(south.lat_deg(), -90.0, 1e-12);
    }
}
