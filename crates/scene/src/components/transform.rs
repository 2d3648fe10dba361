use foundation::math::Vec3;

/// World-space anchor of an entity (ECEF meters).
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Transform {
    pub position: Vec3,
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position }
    }
}
