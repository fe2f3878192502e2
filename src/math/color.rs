use cgmath::Vector3;

/// A RGBA `Color`. Each component is a floating point value usually ranged
/// from 0 to 1, but HDR light intensities are allowed to exceed it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Creates an opaque `Color` with the same value in every RGB channel.
    #[inline]
    pub fn splat(v: f32) -> Self {
        Color::new(v, v, v, 1.0)
    }

    /// Clip to [0.0, 1.0] range.
    pub fn clip(&self) -> Self {
        Color::new(
            self.r.max(0.0).min(1.0),
            self.g.max(0.0).min(1.0),
            self.b.max(0.0).min(1.0),
            self.a.max(0.0).min(1.0),
        )
    }

    /// Truncate alpha channel.
    #[inline]
    pub fn rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn rgba(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn white() -> Self {
        Color::splat(1.0)
    }

    pub fn gray() -> Self {
        Color::splat(0.5)
    }

    pub fn black() -> Self {
        Color::splat(0.0)
    }
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

impl From<[f32; 3]> for Color {
    fn from(v: [f32; 3]) -> Self {
        Color::new(v[0], v[1], v[2], 1.0)
    }
}

impl Into<Vector3<f32>> for Color {
    fn into(self) -> Vector3<f32> {
        Vector3::new(self.r, self.g, self.b)
    }
}

impl From<[u8; 4]> for Color {
    fn from(v: [u8; 4]) -> Self {
        let max = 255.0;
        Color::new(
            f32::from(v[0]) / max,
            f32::from(v[1]) / max,
            f32::from(v[2]) / max,
            f32::from(v[3]) / max,
        )
    }
}

impl Into<[u8; 4]> for Color {
    fn into(self) -> [u8; 4] {
        let v = self.clip();
        let max = 255.0;
        [
            (v.r * max) as u8,
            (v.g * max) as u8,
            (v.b * max) as u8,
            (v.a * max) as u8,
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clip() {
        let c = Color::new(1.5, -0.5, 0.5, 2.0).clip();
        assert_eq!(c, Color::new(1.0, 0.0, 0.5, 1.0));

        let bytes: [u8; 4] = Color::white().into();
        assert_eq!(bytes, [255, 255, 255, 255]);
        assert_eq!(Color::from([0u8, 0, 0, 255]), Color::black());
    }
}
