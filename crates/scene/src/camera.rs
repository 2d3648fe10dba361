use foundation::math::{Ecef, EnuBasis, Vec3, enu_basis, try_ecef_to_geodetic};

use crate::picking::Ray;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    pub fn aspect(&self) -> f64 {
        if self.height_px <= 0.0 {
            1.0
        } else {
            (self.width_px / self.height_px).max(1e-6)
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}

/// Perspective camera in ECEF world space.
///
/// `direction`, `up` and `right` are kept orthonormal. Screen coordinates are
/// pixels with the origin at the top-left corner, y growing downwards.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    direction: Vec3,
    up: Vec3,
    right: Vec3,
    pub fov_y_rad: f64,
    pub viewport: Viewport,
}

impl Camera {
    pub const DEFAULT_FOV_Y_RAD: f64 = std::f64::consts::FRAC_PI_3;

    /// Camera at `position` oriented by heading (clockwise from north), pitch
    /// (positive above the local horizon) and roll, all in radians, measured in
    /// the local east-north-up frame.
    pub fn from_heading_pitch_roll(
        position: Vec3,
        heading: f64,
        pitch: f64,
        roll: f64,
        viewport: Viewport,
    ) -> Self {
        let enu = local_frame(position);
        let (sh, ch) = heading.sin_cos();
        let (sp, cp) = pitch.sin_cos();

        let direction = enu.east * (sh * cp) + enu.north * (ch * cp) + enu.up * sp;
        let level_up = enu.east * (-sh * sp) + enu.north * (-ch * sp) + enu.up * cp;
        let level_right = direction.cross(level_up);

        let (sr, cr) = roll.sin_cos();
        let up = level_up * cr - level_right * sr;
        let right = direction.cross(up);

        Self {
            position,
            direction,
            up,
            right,
            fov_y_rad: Self::DEFAULT_FOV_Y_RAD,
            viewport,
        }
    }

    /// Camera at `eye` looking at `target`, keeping the local vertical up.
    ///
    /// Returns `None` when `eye == target`.
    pub fn look_at(eye: Vec3, target: Vec3, viewport: Viewport) -> Option<Self> {
        let direction = (target - eye).normalized()?;
        let vertical = local_frame(eye).up;
        let right = direction
            .cross(vertical)
            .normalized()
            .or_else(|| direction.cross(Vec3::new(1.0, 0.0, 0.0)).normalized())?;
        let up = right.cross(direction);

        Some(Self {
            position: eye,
            direction,
            up,
            right,
            fov_y_rad: Self::DEFAULT_FOV_Y_RAD,
            viewport,
        })
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    fn half_extents(&self) -> (f64, f64) {
        let tan_y = (0.5 * self.fov_y_rad).tan();
        (tan_y * self.viewport.aspect(), tan_y)
    }

    /// World-space ray through the given pixel.
    pub fn ray_through(&self, x_px: f64, y_px: f64) -> Option<Ray> {
        if self.viewport.width_px <= 0.0 || self.viewport.height_px <= 0.0 {
            return None;
        }
        let ndc_x = 2.0 * x_px / self.viewport.width_px - 1.0;
        let ndc_y = 1.0 - 2.0 * y_px / self.viewport.height_px;
        let (tan_x, tan_y) = self.half_extents();

        let dir = self.direction + self.right * (ndc_x * tan_x) + self.up * (ndc_y * tan_y);
        Some(Ray::new(self.position, dir.normalized()?))
    }

    /// Pixel position of a world point, or `None` if it is behind the camera.
    ///
    /// Points outside the viewport still project; callers decide whether to clip.
    pub fn project(&self, world: Vec3) -> Option<[f64; 2]> {
        let d = world - self.position;
        let z = d.dot(self.direction);
        if z <= 0.0 {
            return None;
        }
        let (tan_x, tan_y) = self.half_extents();
        let ndc_x = d.dot(self.right) / (z * tan_x);
        let ndc_y = d.dot(self.up) / (z * tan_y);

        Some([
            (ndc_x + 1.0) * 0.5 * self.viewport.width_px,
            (1.0 - ndc_y) * 0.5 * self.viewport.height_px,
        ])
    }
}

fn local_frame(position: Vec3) -> EnuBasis {
    try_ecef_to_geodetic(Ecef::from(position))
        .map(enu_basis)
        .unwrap_or(EnuBasis {
            east: Vec3::new(1.0, 0.0, 0.0),
            north: Vec3::new(0.0, 1.0, 0.0),
            up: Vec3::new(0.0, 0.0, 1.0),
        })
}
