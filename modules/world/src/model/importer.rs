//! The contract between model loading and the libraries decoding asset files.

use std::path::{Path, PathBuf};

use lumen::errors::*;
use lumen::math::prelude::{InnerSpace, Vector2, Vector3, Zero};
use lumen::video::assets::texture::TextureFormat;

use super::material::{Material, TextureKind};

/// Decodes asset files into plain CPU data. Importers never touch the GPU, so they
/// can run on any thread.
pub trait AssetImporter {
    /// Parses the model at `path` into its node graph.
    fn import(&self, path: &Path) -> Result<AssetGraph>;

    /// Decodes the image at `path`.
    fn load_image(&self, path: &Path) -> Result<ImageData>;
}

/// The geometry of one mesh. Every per-vertex array other than `positions` is
/// either empty or as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub texcoords: Vec<[f32; 2]>,
    pub tangents: Vec<[f32; 3]>,
    pub bitangents: Vec<[f32; 3]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Index into `AssetGraph::materials`.
    pub material: Option<usize>,
}

impl MeshData {
    /// Checks the mesh can be uploaded as-is.
    pub fn validate(&self) -> ::std::result::Result<(), String> {
        let n = self.positions.len();
        if n == 0 || self.indices.is_empty() {
            return Err(format!("mesh '{}' is empty.", self.name));
        }

        if self.indices.len() % 3 != 0 {
            return Err(format!(
                "mesh '{}' has {} indices, which is not a triangle list.",
                self.name,
                self.indices.len()
            ));
        }

        if let Some(v) = self.indices.iter().find(|&&v| v as usize >= n) {
            return Err(format!(
                "mesh '{}' indexes vertex {} out of {}.",
                self.name, v, n
            ));
        }

        let lens = [
            ("normals", self.normals.len()),
            ("texcoords", self.texcoords.len()),
            ("tangents", self.tangents.len()),
            ("bitangents", self.bitangents.len()),
        ];

        for &(name, len) in &lens {
            if len != 0 && len != n {
                return Err(format!(
                    "mesh '{}' has {} {} for {} vertices.",
                    self.name, len, name, n
                ));
            }
        }

        Ok(())
    }

    /// Fills `tangents` and `bitangents` from the texture coordinates, averaging the
    /// contribution of every triangle sharing a vertex. Meshes without texture
    /// coordinates get zeroed tangent frames.
    pub fn compute_tangents(&mut self) {
        let n = self.positions.len();
        let mut tangents = vec![Vector3::<f32>::zero(); n];
        let mut bitangents = vec![Vector3::<f32>::zero(); n];
        let mut triangles = vec![0u32; n];

        if self.texcoords.len() == n {
            for c in self.indices.chunks(3) {
                if c.len() < 3 || c.iter().any(|&v| v as usize >= n) {
                    continue;
                }

                let (i0, i1, i2) = (c[0] as usize, c[1] as usize, c[2] as usize);
                let p0 = Vector3::from(self.positions[i0]);
                let p1 = Vector3::from(self.positions[i1]);
                let p2 = Vector3::from(self.positions[i2]);
                let uv0 = Vector2::from(self.texcoords[i0]);
                let uv1 = Vector2::from(self.texcoords[i1]);
                let uv2 = Vector2::from(self.texcoords[i2]);

                let dp1 = p1 - p0;
                let dp2 = p2 - p0;
                let duv1 = uv1 - uv0;
                let duv2 = uv2 - uv0;

                let det = duv1.x * duv2.y - duv1.y * duv2.x;
                if det.abs() <= ::std::f32::EPSILON {
                    continue;
                }

                let r = 1.0 / det;
                let tangent = (dp1 * duv2.y - dp2 * duv1.y) * r;
                let bitangent = (dp2 * duv1.x - dp1 * duv2.x) * r;

                for &i in &[i0, i1, i2] {
                    tangents[i] += tangent;
                    bitangents[i] += bitangent;
                    triangles[i] += 1;
                }
            }
        }

        let average = |v: Vector3<f32>, count: u32| -> [f32; 3] {
            if count == 0 || v.magnitude2() <= ::std::f32::EPSILON {
                [0.0; 3]
            } else {
                (v / count as f32).normalize().into()
            }
        };

        self.tangents = tangents
            .iter()
            .zip(triangles.iter())
            .map(|(&v, &count)| average(v, count))
            .collect();

        self.bitangents = bitangents
            .iter()
            .zip(triangles.iter())
            .map(|(&v, &count)| average(v, count))
            .collect();
    }
}

/// A material as declared by the asset file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub material: Material,
    /// Texture files in declaration order, relative paths already resolved against
    /// the directory of the asset.
    pub textures: Vec<(TextureKind, PathBuf)>,
}

/// A node of the asset hierarchy, referencing meshes by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub meshes: Vec<usize>,
    pub children: Vec<NodeData>,
}

/// Everything an importer extracts from one model file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetGraph {
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
    pub root: NodeData,
}

impl AssetGraph {
    /// Collects the meshes of the hierarchy depth-first, parents before children.
    pub fn traverse(&self) -> ::std::result::Result<Vec<&MeshData>, String> {
        let mut meshes = Vec::new();
        let mut stack = vec![&self.root];

        while let Some(node) = stack.pop() {
            for &index in &node.meshes {
                match self.meshes.get(index) {
                    Some(mesh) => meshes.push(mesh),
                    None => return Err(format!("node '{}' references missing mesh {}.", node.name, index)),
                }
            }

            stack.extend(node.children.iter().rev());
        }

        Ok(meshes)
    }
}

/// Decoded pixels, tightly packed, first row at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub dimensions: Vector2<u32>,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
}
