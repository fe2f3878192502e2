//! Built-in geometry that needs no importer.

use lumen::math::prelude::Vector2;

use super::importer::{MaterialData, MeshData};
use super::material::Material;

impl_vertex! {
    GridVertex {
        position => [Position; Float; 3; false],
    }
}

impl_vertex! {
    ScreenVertex {
        position => [Position; Float; 2; false],
        texcoord => [Texcoord0; Float; 2; false],
    }
}

/// Shapes a scene object can use in place of a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    /// A unit cube centered at the origin.
    Cube,
    /// A unit quad in the XY plane, facing +Z.
    Quad,
}

impl Shape {
    /// Builds the CPU geometry and material of this shape.
    pub fn data(self) -> (MeshData, MaterialData) {
        let mut mesh = match self {
            Shape::Cube => cube(),
            Shape::Quad => quad(),
        };

        mesh.compute_tangents();

        let material = MaterialData {
            name: format!("{:?}", self),
            material: match self {
                Shape::Cube => Material::cube(),
                Shape::Quad => Material::default(),
            },
            textures: Vec::new(),
        };

        (mesh, material)
    }
}

fn quad() -> MeshData {
    MeshData {
        name: "Quad".into(),
        positions: vec![
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [0.5, 0.5, 0.0],
            [-0.5, 0.5, 0.0],
        ],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        texcoords: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        indices: vec![0, 1, 2, 0, 2, 3],
        ..Default::default()
    }
}

fn cube() -> MeshData {
    let texcoords = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

    let points = [
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
    ];

    // Corners of each face, counter-clockwise seen from outside.
    let faces: [([usize; 4], [f32; 3]); 6] = [
        ([0, 1, 2, 3], [0.0, 0.0, 1.0]),
        ([1, 5, 6, 2], [1.0, 0.0, 0.0]),
        ([5, 4, 7, 6], [0.0, 0.0, -1.0]),
        ([4, 0, 3, 7], [-1.0, 0.0, 0.0]),
        ([3, 2, 6, 7], [0.0, 1.0, 0.0]),
        ([4, 5, 1, 0], [0.0, -1.0, 0.0]),
    ];

    let mut mesh = MeshData {
        name: "Cube".into(),
        ..Default::default()
    };

    for (i, &(corners, normal)) in faces.iter().enumerate() {
        for (j, &corner) in corners.iter().enumerate() {
            mesh.positions.push(points[corner]);
            mesh.normals.push(normal);
            mesh.texcoords.push(texcoords[j]);
        }

        let base = (i * 4) as u32;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    mesh
}

/// Lines on the XZ plane covering `[-half_extent, half_extent]` on both axes,
/// one every `spacing` units.
pub fn grid(half_extent: f32, spacing: f32) -> Vec<GridVertex> {
    let spacing = if spacing > 0.0 { spacing } else { 1.0 };
    let half_extent = half_extent.abs();
    let steps = (half_extent / spacing).floor() as i32;

    let mut vertices = Vec::with_capacity((steps as usize * 2 + 1) * 4);
    for i in -steps..=steps {
        let v = i as f32 * spacing;
        vertices.push(GridVertex::new([v, 0.0, -half_extent]));
        vertices.push(GridVertex::new([v, 0.0, half_extent]));
        vertices.push(GridVertex::new([-half_extent, 0.0, v]));
        vertices.push(GridVertex::new([half_extent, 0.0, v]));
    }

    vertices
}

/// A full screen quad in normalized device coordinates, as a triangle strip.
pub fn screen_quad() -> [ScreenVertex; 4] {
    let corner = |x: f32, y: f32| {
        let uv = Vector2::new((x + 1.0) * 0.5, (y + 1.0) * 0.5);
        ScreenVertex::new([x, y], uv.into())
    };

    [
        corner(-1.0, -1.0),
        corner(1.0, -1.0),
        corner(-1.0, 1.0),
        corner(1.0, 1.0),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shapes() {
        let (cube, material) = Shape::Cube.data();
        assert!(cube.validate().is_ok());
        assert_eq!(cube.positions.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        assert_eq!(cube.tangents.len(), 24);
        assert_eq!(material.material, Material::cube());

        let (quad, _) = Shape::Quad.data();
        assert!(quad.validate().is_ok());
        assert_eq!(quad.tangents[0], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn grid_lines() {
        let vertices = grid(100.0, 10.0);
        assert_eq!(vertices.len(), 21 * 4);
        assert!(vertices.iter().all(|v| v.position[1] == 0.0));
        assert!(grid(1.0, 0.0).len() > 0);
    }
}
