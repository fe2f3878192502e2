use lumen::math::prelude::{Color, Vector3};

/// The role of a material texture. Each kind is bound to its own texture unit
/// and sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub const ALL: [TextureKind; 4] = [
        TextureKind::Diffuse,
        TextureKind::Specular,
        TextureKind::Normal,
        TextureKind::Height,
    ];

    /// The texture unit this kind is bound to.
    #[inline]
    pub fn unit(self) -> u32 {
        match self {
            TextureKind::Diffuse => 0,
            TextureKind::Specular => 1,
            TextureKind::Normal => 2,
            TextureKind::Height => 3,
        }
    }

    /// The name of the sampler uniform reading this kind.
    #[inline]
    pub fn sampler(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "u_DiffuseTexture",
            TextureKind::Specular => "u_SpecularTexture",
            TextureKind::Normal => "u_NormalTexture",
            TextureKind::Height => "u_HeightTexture",
        }
    }
}

/// Surface parameters of a mesh, multiplied with its textures when shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    pub shininess: f32,
    /// The flat color of unlit objects.
    pub base_color: Color,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(0.5, 0.5, 0.5),
            shininess: 32.0,
            base_color: Color::new(0.0, 1.0, 0.0, 1.0),
        }
    }
}

impl Material {
    /// The warm material of the built-in cube.
    pub fn cube() -> Self {
        Material {
            diffuse: Vector3::new(1.2, 0.7, 0.64),
            specular: Vector3::new(1.73, 1.73, 1.73),
            shininess: 64.0,
            ..Default::default()
        }
    }
}
