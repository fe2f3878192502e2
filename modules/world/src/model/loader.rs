use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use lumen::errors::*;
use lumen::video::assets::mesh::{Mesh, Primitive};
use lumen::video::assets::texture::{Texture, TextureParams};
use lumen::video::command::RenderingCommand;

use super::importer::{AssetImporter, ImageData, MaterialData, MeshData};
use super::material::TextureKind;
use super::primitives::Shape;
use super::texture_cache::{self, EvictionPolicy, TextureCache};
use super::{Model, ModelMesh, ModelSource, ModelVertex};

/// A model decoded on the CPU, ready to be uploaded.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub source: ModelSource,
    /// Meshes in traversal order with the material each one is shaded with.
    pub meshes: Vec<(MeshData, MaterialData)>,
    /// Decoded images by path. Paths the cache already held at parse time are not
    /// decoded again.
    pub images: HashMap<PathBuf, ImageData>,
}

fn load_error<P: Into<PathBuf>, T: ::std::fmt::Display>(path: P, reason: T) -> Error {
    Error::ResourceLoad {
        path: path.into(),
        reason: format!("{}", reason),
    }
}

fn vertices(mesh: &MeshData) -> Vec<ModelVertex> {
    let zero3 = [0.0; 3];
    (0..mesh.positions.len())
        .map(|i| {
            ModelVertex::new(
                mesh.positions[i],
                mesh.normals.get(i).cloned().unwrap_or(zero3),
                mesh.texcoords.get(i).cloned().unwrap_or([0.0; 2]),
                mesh.tangents.get(i).cloned().unwrap_or(zero3),
                mesh.bitangents.get(i).cloned().unwrap_or(zero3),
            )
        })
        .collect()
}

/// Builds models and keeps the cache of the textures they share.
pub struct ModelLoader {
    command: RenderingCommand,
    importer: Box<dyn AssetImporter + Sync>,
    cache: TextureCache,
}

impl ModelLoader {
    pub fn new(
        command: &RenderingCommand,
        importer: Box<dyn AssetImporter + Sync>,
        policy: EvictionPolicy,
    ) -> Self {
        ModelLoader {
            command: command.clone(),
            importer,
            cache: TextureCache::new(policy),
        }
    }

    #[inline]
    pub fn importer(&self) -> &(dyn AssetImporter + Sync) {
        &*self.importer
    }

    #[inline]
    pub fn cache(&self) -> &TextureCache {
        &self.cache
    }

    #[inline]
    pub fn cache_mut(&mut self) -> &mut TextureCache {
        &mut self.cache
    }

    /// Returns the paths of every cached texture, to be skipped by `parse`.
    pub fn cached_paths(&self) -> HashSet<PathBuf> {
        self.cache.paths().cloned().collect()
    }

    /// Loads a model from `source`.
    pub fn load(&mut self, source: &ModelSource) -> Result<Rc<Model>> {
        match *source {
            ModelSource::File(ref path) => self.load_model(path),
            ModelSource::Shape(shape) => self.load_shape(shape),
        }
    }

    /// Parses and uploads the model at `path`. Nothing is kept if any mesh or
    /// texture fails.
    pub fn load_model<P: AsRef<Path>>(&mut self, path: P) -> Result<Rc<Model>> {
        let path = path.as_ref();
        let data = Self::parse(&*self.importer, path, &self.cached_paths())?;
        let model = self.upload(data)?;

        info!(
            "Loaded model {:?} with {} meshes.",
            path,
            model.meshes().len()
        );

        Ok(Rc::new(model))
    }

    /// Builds a model out of a built-in shape.
    pub fn load_shape(&mut self, shape: Shape) -> Result<Rc<Model>> {
        let data = ModelData {
            source: ModelSource::Shape(shape),
            meshes: vec![shape.data()],
            images: HashMap::new(),
        };

        Ok(Rc::new(self.upload(data)?))
    }

    /// Decodes the model at `path` and every image its materials reference,
    /// except those in `skip`. Touches no GPU state.
    pub fn parse(
        importer: &(dyn AssetImporter + Sync),
        path: &Path,
        skip: &HashSet<PathBuf>,
    ) -> Result<ModelData> {
        let graph = importer.import(path)?;
        let nodes = graph.traverse().map_err(|err| load_error(path, err))?;

        if nodes.is_empty() {
            return Err(load_error(path, "model has no meshes."));
        }

        let mut meshes = Vec::with_capacity(nodes.len());
        let mut images = HashMap::new();

        for mesh in nodes {
            mesh.validate().map_err(|err| load_error(path, err))?;

            let mut material = match mesh.material {
                Some(index) => graph
                    .materials
                    .get(index)
                    .cloned()
                    .ok_or_else(|| load_error(path, format!("material {} is missing.", index)))?,
                None => MaterialData::default(),
            };

            for (_, file) in &mut material.textures {
                *file = texture_cache::normalize(&*file);
            }

            for (_, file) in &material.textures {
                if skip.contains(file) || images.contains_key(file) {
                    continue;
                }

                let image = importer.load_image(file)?;
                images.insert(file.clone(), image);
            }

            meshes.push((mesh.clone(), material));
        }

        Ok(ModelData {
            source: ModelSource::File(path.to_owned()),
            meshes,
            images,
        })
    }

    /// Uploads decoded model data. Textures are looked up in the cache first; the
    /// ones uploaded here join the cache only if the whole model succeeds.
    pub fn upload(&mut self, data: ModelData) -> Result<Model> {
        let ModelData {
            source,
            meshes,
            mut images,
        } = data;

        let path = match source {
            ModelSource::File(ref path) => path.clone(),
            ModelSource::Shape(shape) => PathBuf::from(format!("{:?}", shape)),
        };

        let mut staged = HashMap::new();
        let mut uploaded = Vec::with_capacity(meshes.len());

        for (mesh, material) in meshes {
            let textures = self.load_material_textures(&material, &mut images, &mut staged)?;

            let verts = vertices(&mesh);
            let gpu = Mesh::new(
                &self.command,
                ModelVertex::layout(),
                Primitive::Triangles,
                ModelVertex::as_bytes(&verts),
                Some(&mesh.indices[..]),
            )
            .map_err(|err| load_error(path.as_path(), err))?;

            debug!("Uploaded mesh '{}' of {:?}.", mesh.name, path);

            uploaded.push(ModelMesh {
                mesh: gpu,
                material: material.material,
                textures,
            });
        }

        let model = Model::new(source, uploaded)?;
        self.cache.commit(staged);
        Ok(model)
    }

    /// Resolves the textures of `material`, reusing cached and staged ones before
    /// uploading anything.
    pub fn load_material_textures(
        &self,
        material: &MaterialData,
        images: &mut HashMap<PathBuf, ImageData>,
        staged: &mut HashMap<PathBuf, Rc<Texture>>,
    ) -> Result<Vec<(TextureKind, Rc<Texture>)>> {
        let mut textures: Vec<(TextureKind, Rc<Texture>)> = Vec::new();

        for (kind, file) in &material.textures {
            if textures.iter().any(|v| v.0 == *kind) {
                continue;
            }

            let file = &texture_cache::normalize(file);

            if let Some(texture) = self.cache.get(file).or_else(|| staged.get(file).cloned()) {
                textures.push((*kind, texture));
                continue;
            }

            let image = match images.remove(file) {
                Some(image) => image,
                None => self.importer.load_image(file)?,
            };

            let mut params = TextureParams::default();
            params.format = image.format;
            params.dimensions = image.dimensions;

            let texture = Texture::new(&self.command, params, Some(&image.pixels))
                .map_err(|err| load_error(file.as_path(), err))?;

            debug!("Uploaded texture {:?}.", file);

            let texture = Rc::new(texture);
            staged.insert(file.clone(), texture.clone());
            textures.push((*kind, texture));
        }

        Ok(textures)
    }
}

#[cfg(test)]
mod test {
    use super::super::importer::{AssetGraph, NodeData};
    use super::*;
    use lumen::math::prelude::Vector2;
    use lumen::video::assets::texture::TextureFormat;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemoryImporter {
        images: AtomicUsize,
    }

    impl AssetImporter for MemoryImporter {
        fn import(&self, path: &Path) -> Result<AssetGraph> {
            if path.ends_with("missing.obj") {
                return Err(load_error(path, "not found"));
            }

            let (mut mesh, mut material) = Shape::Quad.data();
            mesh.material = Some(0);
            material.textures = vec![
                (TextureKind::Diffuse, PathBuf::from("shared.png")),
                (TextureKind::Specular, PathBuf::from("shared.png")),
            ];

            if path.ends_with("nested.obj") {
                material.textures = vec![(
                    TextureKind::Diffuse,
                    PathBuf::from("textures/./../shared.png"),
                )];
            }

            if path.ends_with("broken.obj") {
                if let Some(last) = mesh.indices.last_mut() {
                    *last = 99;
                }
            }

            Ok(AssetGraph {
                meshes: vec![mesh],
                materials: vec![material],
                root: NodeData {
                    name: "root".into(),
                    meshes: vec![0],
                    children: Vec::new(),
                },
            })
        }

        fn load_image(&self, _: &Path) -> Result<ImageData> {
            self.images.fetch_add(1, Ordering::SeqCst);
            Ok(ImageData {
                dimensions: Vector2::new(1, 1),
                format: TextureFormat::RGBA8,
                pixels: vec![255; 4],
            })
        }
    }

    fn loader(command: &RenderingCommand) -> ModelLoader {
        let importer = MemoryImporter {
            images: AtomicUsize::new(0),
        };

        ModelLoader::new(command, Box::new(importer), EvictionPolicy::Never)
    }

    #[test]
    fn shared_textures() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);

        let a = loader.load_model("a.obj").unwrap();
        let b = loader.load_model("b.obj").unwrap();
        assert_eq!(command.statistics().texture_uploads, 1);
        assert_eq!(loader.cache().len(), 1);

        let ta = a.meshes()[0].texture(TextureKind::Diffuse).unwrap();
        let tb = b.meshes()[0].texture(TextureKind::Specular).unwrap();
        assert!(Rc::ptr_eq(ta, tb));
    }

    #[test]
    fn equivalent_paths_share_texture() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);

        let a = loader.load_model("a.obj").unwrap();
        let nested = loader.load_model("nested.obj").unwrap();
        assert_eq!(command.statistics().texture_uploads, 1);
        assert_eq!(loader.cache().len(), 1);
        assert!(loader.cache().contains("shared.png"));

        let ta = a.meshes()[0].texture(TextureKind::Diffuse).unwrap();
        let tn = nested.meshes()[0].texture(TextureKind::Diffuse).unwrap();
        assert!(Rc::ptr_eq(ta, tn));
    }

    #[test]
    fn failures_keep_nothing() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);

        match loader.load_model("missing.obj") {
            Err(Error::ResourceLoad { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }

        match loader.load_model("broken.obj") {
            Err(Error::ResourceLoad { reason, .. }) => assert!(reason.contains("99")),
            other => panic!("unexpected {:?}", other),
        }

        let stats = command.statistics();
        assert_eq!(stats.vertex_buffer_uploads, 0);
        assert_eq!(stats.alive_textures, 0);
        assert!(loader.cache().is_empty());
    }

    #[test]
    fn parse_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ModelData>();

        let command = RenderingCommand::headless();
        let loader = loader(&command);
        let data = ModelLoader::parse(loader.importer(), Path::new("a.obj"), &HashSet::new()).unwrap();
        assert_eq!(data.meshes.len(), 1);
        assert_eq!(data.images.len(), 1);

        let mut skip = HashSet::new();
        skip.insert(PathBuf::from("shared.png"));
        let data = ModelLoader::parse(loader.importer(), Path::new("a.obj"), &skip).unwrap();
        assert!(data.images.is_empty());
    }

    #[test]
    fn shapes() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);

        let cube = loader.load(&ModelSource::Shape(Shape::Cube)).unwrap();
        assert_eq!(cube.meshes().len(), 1);
        assert_eq!(cube.meshes()[0].mesh.num_indices(), 36);
        assert_eq!(cube.textures().count(), 0);

        drop(cube);
        assert_eq!(command.statistics().alive_buffers, 0);
    }
}
