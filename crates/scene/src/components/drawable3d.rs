use foundation::math::Vec3;

use super::Color;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VerticalOrigin {
    Center,
    Top,
    Bottom,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape3D {
    /// Box oriented in the local east-north-up frame at the entity position.
    Box { dimensions: Vec3 },
    /// Camera-facing image anchored at the entity position.
    Billboard {
        scale: f64,
        vertical_origin: VerticalOrigin,
    },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Drawable3D {
    pub shape: Shape3D,
    pub color: Color,
}

impl Drawable3D {
    pub fn enu_box(dimensions: Vec3, color: Color) -> Self {
        Self {
            shape: Shape3D::Box { dimensions },
            color,
        }
    }

    pub fn billboard(scale: f64, vertical_origin: VerticalOrigin, color: Color) -> Self {
        Self {
            shape: Shape3D::Billboard {
                scale,
                vertical_origin,
            },
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Drawable3D, Shape3D, VerticalOrigin};
    use crate::components::Color;

    #[test]
    fn create_billboard_drawable() {
        let drawable = Drawable3D::billboard(0.1, VerticalOrigin::Top, Color::WHITE);
        assert!(matches!(drawable.shape, Shape3D::Billboard { .. }));
    }
}
