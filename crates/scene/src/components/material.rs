/// Linear RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn as_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Surface appearance of a box volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
}

impl Material {
    pub fn solid(color: Color) -> Self {
        Self { color }
    }

    /// Near-invisible fill used for hit-test volumes.
    pub fn hit_box(alpha: f32) -> Self {
        Self::solid(Color::WHITE.with_alpha(alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::{Color, Material};

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(2.0).a, 1.0);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a, 0.0);
        assert_eq!(Material::hit_box(0.01).color.a, 0.01);
        assert_eq!(Material::hit_box(0.01).color.r, 1.0);
    }
}
