//! Immutable vertex and index data.

use crate::errors::*;

use super::super::api::{ElementBufferHandle, VertexArrayHandle, VertexBufferHandle};
use super::super::command::RenderingCommand;
use super::vertex::VertexLayout;

/// Defines how the input vertex data is used to assemble primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl Primitive {
    /// Returns the number of triangles assembled from `indices` vertices.
    pub fn assemble_triangles(self, indices: u32) -> u32 {
        match self {
            Primitive::Points | Primitive::Lines | Primitive::LineStrip => 0,
            Primitive::Triangles => indices / 3,
            Primitive::TriangleStrip => indices.saturating_sub(2),
        }
    }
}

/// Static geometry living on the GPU: a vertex buffer, an optional element buffer
/// and the vertex array binding them to a layout.
///
/// Buffers are allocated once in `Mesh::new` and never modified afterwards. Every
/// native object is released when the mesh is dropped.
pub struct Mesh {
    command: RenderingCommand,
    vbo: VertexBufferHandle,
    ebo: Option<ElementBufferHandle>,
    vao: VertexArrayHandle,
    layout: VertexLayout,
    primitive: Primitive,
    num_vertices: u32,
    num_indices: u32,
}

impl Mesh {
    /// Validates and uploads `vertices` (and `indices` if any). Every index must
    /// address one of the vertices.
    pub fn new(
        command: &RenderingCommand,
        layout: VertexLayout,
        primitive: Primitive,
        vertices: &[u8],
        indices: Option<&[u32]>,
    ) -> Result<Self> {
        let num_vertices = layout.num_vertices(vertices.len())?;
        if num_vertices == 0 {
            return Err(Error::VertexLayout("mesh has no vertices.".into()));
        }

        if let Some(indices) = indices {
            if indices.is_empty() {
                return Err(Error::VertexLayout("mesh has an empty index buffer.".into()));
            }

            if let Some(v) = indices.iter().find(|&&v| v as usize >= num_vertices) {
                return Err(Error::VertexLayout(format!(
                    "index {} is out of {} vertices.",
                    v, num_vertices
                )));
            }
        }

        let vbo = command.init_vertex_buffer(vertices, &layout)?;

        let ebo = match indices.map(|v| command.init_element_buffer(v)) {
            Some(Err(err)) => {
                let _ = command.delete_vertex_buffer(vbo);
                return Err(err);
            }
            Some(Ok(ebo)) => Some(ebo),
            None => None,
        };

        let vao = match command.init_vertex_array(vbo, ebo, &layout) {
            Ok(vao) => vao,
            Err(err) => {
                let _ = command.delete_vertex_buffer(vbo);
                if let Some(ebo) = ebo {
                    let _ = command.delete_element_buffer(ebo);
                }

                return Err(err);
            }
        };

        Ok(Mesh {
            command: command.clone(),
            vbo,
            ebo,
            vao,
            layout,
            primitive,
            num_vertices: num_vertices as u32,
            num_indices: indices.map(|v| v.len() as u32).unwrap_or(0),
        })
    }

    #[inline]
    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }

    #[inline]
    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    #[inline]
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vao
    }

    #[inline]
    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    /// Returns the number of indices, or zero if the mesh is drawn without them.
    #[inline]
    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    /// Submits the whole mesh with the program and textures currently bound.
    pub fn draw(&self) -> Result<()> {
        if self.ebo.is_some() {
            self.command
                .draw_elements(self.vao, self.primitive, self.num_indices)
        } else {
            self.command
                .draw_arrays(self.vao, self.primitive, 0, self.num_vertices)
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        let mut result = self
            .command
            .delete_vertex_array(self.vao)
            .and_then(|_| self.command.delete_vertex_buffer(self.vbo));

        if let Some(ebo) = self.ebo {
            result = result.and_then(|_| self.command.delete_element_buffer(ebo));
        }

        if let Err(err) = result {
            warn!("Failed to release mesh {}. {}", self.vao, err);
        }
    }
}

impl ::std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Mesh")
            .field("vao", &self.vao)
            .field("primitive", &self.primitive)
            .field("num_vertices", &self.num_vertices)
            .field("num_indices", &self.num_indices)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::super::shader::{Shader, ShaderParams};
    use super::super::vertex::{as_bytes, Attribute, VertexFormat};
    use super::*;

    const VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }";
    const FS: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }";

    fn layout() -> VertexLayout {
        VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish()
    }

    #[test]
    fn indexed() {
        let command = RenderingCommand::headless();
        let vertices = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::new(
            &command,
            layout(),
            Primitive::Triangles,
            as_bytes(&vertices),
            Some(&[0, 1, 2]),
        )
        .unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert_eq!(mesh.num_indices(), 3);

        match mesh.draw() {
            Err(Error::Backend(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        let shader = Shader::new(&command, ShaderParams::default(), VS, FS).unwrap();
        shader.bind().unwrap();
        assert!(mesh.draw().is_ok());

        let stats = command.statistics();
        assert_eq!(stats.draw_calls, 1);
        assert_eq!(stats.triangles, 1);
        assert_eq!(stats.alive_buffers, 2);

        drop(mesh);
        let stats = command.statistics();
        assert_eq!(stats.alive_buffers, 0);
        assert_eq!(stats.alive_vertex_arrays, 0);
    }

    #[test]
    fn index_out_of_range() {
        let command = RenderingCommand::headless();
        let vertices = [0.0f32; 6];
        let err = Mesh::new(
            &command,
            layout(),
            Primitive::Lines,
            as_bytes(&vertices),
            Some(&[0, 2]),
        )
        .unwrap_err();

        match err {
            Error::VertexLayout(_) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(command.statistics().vertex_buffer_uploads, 0);
    }

    #[test]
    fn empty() {
        let command = RenderingCommand::headless();
        assert!(Mesh::new(&command, layout(), Primitive::Points, &[], None).is_err());
        assert!(Mesh::new(&command, layout(), Primitive::Points, &[0; 7], None).is_err());
    }
}
