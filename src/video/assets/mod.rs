//! GPU resource owners. Each type holds a `RenderingCommand` and releases its
//! native objects deterministically when dropped.

#[macro_use]
pub mod vertex;
pub mod framebuffer;
pub mod mesh;
pub mod shader;
pub mod texture;

pub mod prelude {
    pub use super::framebuffer::{Framebuffer, FramebufferAttachments};
    pub use super::mesh::{Mesh, Primitive};
    pub use super::shader::{
        BlendFactor, BlendValue, Comparison, CullFace, Equation, RenderState, Shader,
        ShaderParams, UniformVariable,
    };
    pub use super::texture::{Texture, TextureFilter, TextureFormat, TextureParams, TextureWrap};
    pub use super::vertex::{
        as_bytes, Attribute, AttributeLayout, VertexAttribute, VertexFormat, VertexLayout,
        MAX_VERTEX_ATTRIBUTES,
    };
}
