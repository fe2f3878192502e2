//! Wavefront OBJ models and their images, decoded with `tobj` and `image`.

use std::path::{Path, PathBuf};

use lumen::errors::*;
use lumen::math::prelude::{Vector2, Vector3};
use lumen::video::assets::texture::TextureFormat;

use super::importer::{AssetGraph, AssetImporter, ImageData, MaterialData, MeshData, NodeData};
use super::material::{Material, TextureKind};

fn load_error<T: ::std::fmt::Display>(path: &Path, err: T) -> Error {
    Error::ResourceLoad {
        path: path.to_owned(),
        reason: format!("{}", err),
    }
}

/// Imports `.obj` files. Faces are triangulated and vertices deduplicated into a
/// single index stream; tangent frames are computed from the texture coordinates.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjImporter {
    /// Flips the vertical texture coordinate of meshes and the rows of images.
    pub flip_v: bool,
}

impl ObjImporter {
    pub fn new() -> Self {
        ObjImporter { flip_v: true }
    }

    fn material(root: &Path, v: &tobj::Material) -> MaterialData {
        let mut material = Material::default();
        if let Some(diffuse) = v.diffuse {
            material.diffuse = Vector3::from(diffuse);
        }

        if let Some(specular) = v.specular {
            material.specular = Vector3::from(specular);
        }

        if let Some(shininess) = v.shininess {
            material.shininess = shininess.max(1.0);
        }

        let declared = [
            (TextureKind::Diffuse, &v.diffuse_texture),
            (TextureKind::Specular, &v.specular_texture),
            (TextureKind::Normal, &v.normal_texture),
            (TextureKind::Height, &v.ambient_texture),
        ];

        let textures = declared
            .iter()
            .filter_map(|&(kind, file)| {
                file.as_ref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (kind, root.join(v.trim())))
            })
            .collect();

        MaterialData {
            name: v.name.clone(),
            material,
            textures,
        }
    }

    fn mesh(&self, v: &tobj::Model) -> MeshData {
        let m = &v.mesh;
        let n = m.positions.len() / 3;

        let positions = m
            .positions
            .chunks(3)
            .take(n)
            .map(|v| [v[0], v[1], v[2]])
            .collect();

        let normals = if m.normals.len() == n * 3 {
            m.normals.chunks(3).map(|v| [v[0], v[1], v[2]]).collect()
        } else {
            Vec::new()
        };

        let texcoords = if m.texcoords.len() == n * 2 {
            m.texcoords
                .chunks(2)
                .map(|v| {
                    if self.flip_v {
                        [v[0], 1.0 - v[1]]
                    } else {
                        [v[0], v[1]]
                    }
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut mesh = MeshData {
            name: v.name.clone(),
            positions,
            normals,
            texcoords,
            tangents: Vec::new(),
            bitangents: Vec::new(),
            indices: m.indices.clone(),
            material: m.material_id,
        };

        mesh.compute_tangents();
        mesh
    }
}

impl AssetImporter for ObjImporter {
    fn import(&self, path: &Path) -> Result<AssetGraph> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };

        let (models, materials) = tobj::load_obj(path, &options).map_err(|err| load_error(path, err))?;

        let root = path.parent().map(Path::to_path_buf).unwrap_or_else(PathBuf::new);
        let materials = match materials {
            Ok(materials) => materials.iter().map(|v| Self::material(&root, v)).collect(),
            Err(err) => {
                warn!("Model {:?} has no usable material library. {}", path, err);
                Vec::new()
            }
        };

        let meshes: Vec<MeshData> = models.iter().map(|v| self.mesh(v)).collect();
        let root = NodeData {
            name: path
                .file_stem()
                .map(|v| v.to_string_lossy().into_owned())
                .unwrap_or_default(),
            meshes: (0..meshes.len()).collect(),
            children: Vec::new(),
        };

        Ok(AssetGraph {
            meshes,
            materials,
            root,
        })
    }

    fn load_image(&self, path: &Path) -> Result<ImageData> {
        let image = image::open(path).map_err(|err| load_error(path, err))?;
        let image = if self.flip_v { image.flipv() } else { image };
        let image = image.to_rgba8();

        Ok(ImageData {
            dimensions: Vector2::new(image.width(), image.height()),
            format: TextureFormat::RGBA8,
            pixels: image.into_raw(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_files() {
        let importer = ObjImporter::new();
        match importer.import(Path::new("does/not/exist.obj")) {
            Err(Error::ResourceLoad { path, .. }) => assert_eq!(path, Path::new("does/not/exist.obj")),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }

        assert!(importer.load_image(Path::new("does/not/exist.png")).is_err());
    }

    #[test]
    fn material_paths() {
        let mut v = tobj::Material::default();
        v.name = "brick".into();
        v.diffuse = Some([0.5, 0.5, 0.5]);
        v.diffuse_texture = Some("brick.png".into());
        v.specular_texture = Some("  ".into());

        let material = ObjImporter::material(Path::new("assets"), &v);
        assert_eq!(material.material.diffuse, Vector3::new(0.5, 0.5, 0.5));
        assert_eq!(
            material.textures,
            vec![(TextureKind::Diffuse, Path::new("assets").join("brick.png"))]
        );
    }
}
