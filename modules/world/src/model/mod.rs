//! Models are ordered collections of GPU meshes, each with its material and
//! textures.
//!
//! Loading is split in two phases. `ModelLoader::parse` decodes files into plain
//! `ModelData` and can run on any thread; `ModelLoader::upload` turns that data
//! into GPU resources on the thread owning the context. Textures are shared
//! between models through the loader's `TextureCache`.

pub mod importer;
pub mod loader;
pub mod material;
pub mod obj;
pub mod primitives;
pub mod texture_cache;

pub mod prelude {
    pub use super::importer::{AssetGraph, AssetImporter, ImageData, MaterialData, MeshData, NodeData};
    pub use super::loader::{ModelData, ModelLoader};
    pub use super::material::{Material, TextureKind};
    pub use super::obj::ObjImporter;
    pub use super::primitives::Shape;
    pub use super::texture_cache::{EvictionPolicy, TextureCache};
    pub use super::{Model, ModelMesh, ModelSource, ModelVertex};
}

use std::path::PathBuf;
use std::rc::Rc;

use lumen::errors::*;
use lumen::video::assets::mesh::Mesh;
use lumen::video::assets::shader::Shader;
use lumen::video::assets::texture::Texture;

use self::material::{Material, TextureKind};
use self::primitives::Shape;

impl_vertex! {
    ModelVertex {
        position => [Position; Float; 3; false],
        normal => [Normal; Float; 3; false],
        texcoord => [Texcoord0; Float; 2; false],
        tangent => [Tangent; Float; 3; false],
        bitangent => [Bitangent; Float; 3; false],
    }
}

/// Where the geometry of a model comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelSource {
    /// A model file decoded by an `AssetImporter`.
    File(PathBuf),
    /// A built-in shape.
    Shape(Shape),
}

impl ::std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match *self {
            ModelSource::File(ref path) => write!(f, "{}", path.display()),
            ModelSource::Shape(shape) => write!(f, "{:?}", shape),
        }
    }
}

/// A mesh of a model with the surface it is shaded with.
#[derive(Debug)]
pub struct ModelMesh {
    pub mesh: Mesh,
    pub material: Material,
    /// At most one texture per kind.
    pub textures: Vec<(TextureKind, Rc<Texture>)>,
}

impl ModelMesh {
    #[inline]
    pub fn texture(&self, kind: TextureKind) -> Option<&Rc<Texture>> {
        self.textures
            .iter()
            .find(|v| v.0 == kind)
            .map(|v| &v.1)
    }

    /// Binds every texture kind, substituting `fallback` for missing ones, and
    /// writes the uniforms of `material`, or of the mesh's own one if `None`.
    pub fn bind(&self, shader: &Shader, fallback: &Texture, material: Option<&Material>) -> Result<()> {
        for &kind in &TextureKind::ALL {
            match self.texture(kind) {
                Some(texture) => texture.bind(kind.unit())?,
                None => fallback.bind(kind.unit())?,
            }

            shader.set_uniform(kind.sampler(), kind.unit() as i32)?;
        }

        shader.set_uniform("u_UseNormalMap", self.texture(TextureKind::Normal).is_some())?;

        let material = material.unwrap_or(&self.material);
        shader.set_uniform("u_Diffuse", material.diffuse)?;
        shader.set_uniform("u_Specular", material.specular)?;
        shader.set_uniform("u_Shininess", material.shininess)?;
        shader.set_uniform("u_BaseColor", material.base_color)
    }
}

/// An immutable model. Objects share it through `Rc<Model>`; its meshes and
/// textures are released with the last reference.
#[derive(Debug)]
pub struct Model {
    source: ModelSource,
    meshes: Vec<ModelMesh>,
}

impl Model {
    /// Creates a model out of its meshes. A model needs at least one mesh.
    pub fn new(source: ModelSource, meshes: Vec<ModelMesh>) -> Result<Self> {
        if meshes.is_empty() {
            return Err(Error::ResourceLoad {
                path: source.to_string().into(),
                reason: "model has no meshes.".into(),
            });
        }

        Ok(Model { source, meshes })
    }

    #[inline]
    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    #[inline]
    pub fn meshes(&self) -> &[ModelMesh] {
        &self.meshes
    }

    /// Iterates every texture reference of every mesh.
    pub fn textures(&self) -> impl Iterator<Item = &Rc<Texture>> {
        self.meshes
            .iter()
            .flat_map(|v| v.textures.iter().map(|v| &v.1))
    }

    /// Draws every mesh with `shader`, which must be bound already. Each mesh
    /// layout is checked against the shader inputs before anything is submitted.
    pub fn draw(&self, shader: &Shader, fallback: &Texture, material: Option<&Material>) -> Result<()> {
        for v in &self.meshes {
            shader.accepts(v.mesh.layout())?;
        }

        for v in &self.meshes {
            v.bind(shader, fallback, material)?;
            v.mesh.draw()?;
        }

        Ok(())
    }
}
