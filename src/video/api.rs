//! The backend-agnostic contract every native graphics API implementation fulfils.

use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

use super::assets::prelude::*;

impl_handle!(VertexBufferHandle);
impl_handle!(ElementBufferHandle);
impl_handle!(VertexArrayHandle);
impl_handle!(ShaderStageHandle);
impl_handle!(ShaderProgramHandle);
impl_handle!(TextureHandle);
impl_handle!(FramebufferHandle);

/// How polygons are rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolygonMode {
    Points,
    Lines,
    Fill,
}

impl Default for PolygonMode {
    fn default() -> Self {
        PolygonMode::Fill
    }
}

/// Represents the capabilities of the installed backend. These values never change
/// during the lifetime of a context.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCapabilities {
    /// Human readable name and version of the native API.
    pub name: String,
    /// Maximum number of textures that can be bound at the same time.
    pub max_texture_units: u32,
    /// Maximum number of color attachments of a framebuffer.
    pub max_color_attachments: u32,
    /// Maximum width and height of a viewport.
    pub max_viewport_dims: Vector2<u32>,
}

/// Counters of the work submitted to a backend. Upload and draw counters are
/// cumulative since the backend was created, `alive_*` are current object counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Statistics {
    pub draw_calls: u64,
    pub triangles: u64,
    pub vertex_buffer_uploads: u64,
    pub element_buffer_uploads: u64,
    pub texture_uploads: u64,
    pub shader_programs_linked: u64,
    pub framebuffer_allocations: u64,
    pub framebuffer_releases: u64,

    pub alive_buffers: usize,
    pub alive_vertex_arrays: usize,
    pub alive_shader_programs: usize,
    pub alive_textures: usize,
    pub alive_framebuffers: usize,
}

/// Primitive GPU operations over one native graphics API.
///
/// Every object created through this trait is named by a typed handle owned by the
/// caller; the implementation only maps handles to native objects. State setters are
/// idempotent: applying the state that is already current is free.
pub trait RenderingApi {
    fn capabilities(&self) -> ApiCapabilities;

    fn statistics(&self) -> Statistics;

    /// Uploads immutable vertex data described by `layout`.
    fn init_vertex_buffer(
        &mut self,
        data: &[u8],
        layout: &VertexLayout,
    ) -> Result<VertexBufferHandle>;

    /// Uploads immutable index data.
    fn init_element_buffer(&mut self, indices: &[u32]) -> Result<ElementBufferHandle>;

    /// Binds a vertex buffer, an optional element buffer and the attribute layout into
    /// one drawable object.
    fn init_vertex_array(
        &mut self,
        vbo: VertexBufferHandle,
        ebo: Option<ElementBufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle>;

    /// Configures how the bytes of the currently bound vertex buffer map to shader inputs.
    /// The `i`-th element of `layout` feeds input location `i`.
    fn init_vertex_attributes(&mut self, layout: &VertexLayout) -> Result<()>;

    fn delete_vertex_buffer(&mut self, handle: VertexBufferHandle) -> Result<()>;

    fn delete_element_buffer(&mut self, handle: ElementBufferHandle) -> Result<()>;

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()>;

    fn init_vertex_shader(&mut self, source: &str) -> Result<ShaderStageHandle>;

    fn init_fragment_shader(&mut self, source: &str) -> Result<ShaderStageHandle>;

    /// Links compiled stages into a program. Fails with `Error::Link` carrying the
    /// backend diagnostics, in which case no handle is returned.
    fn init_shader_program(
        &mut self,
        vs: ShaderStageHandle,
        fs: ShaderStageHandle,
    ) -> Result<ShaderProgramHandle>;

    fn delete_shader_stage(&mut self, handle: ShaderStageHandle) -> Result<()>;

    fn delete_shader_program(&mut self, handle: ShaderProgramHandle) -> Result<()>;

    fn use_program(&mut self, handle: ShaderProgramHandle) -> Result<()>;

    /// Writes a uniform of `program`. Uniforms the program does not declare are ignored.
    fn set_uniform(
        &mut self,
        program: ShaderProgramHandle,
        name: &str,
        variable: UniformVariable,
    ) -> Result<()>;

    fn init_texture(&mut self, params: &TextureParams, data: Option<&[u8]>)
        -> Result<TextureHandle>;

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle) -> Result<()>;

    /// Allocates an off-screen render target. Resizing is done by allocating a new
    /// target and deleting the old one.
    fn init_frame_buffer(
        &mut self,
        dimensions: Vector2<u32>,
        attachments: &FramebufferAttachments,
    ) -> Result<FramebufferHandle>;

    /// Returns the texture backing the color attachment of `handle`. It is owned by
    /// the framebuffer and released with it.
    fn framebuffer_color_attachment(&self, handle: FramebufferHandle) -> Result<TextureHandle>;

    fn framebuffer_dimensions(&self, handle: FramebufferHandle) -> Result<Vector2<u32>>;

    fn delete_frame_buffer(&mut self, handle: FramebufferHandle) -> Result<()>;

    /// Binds `handle` as the render target, or the default framebuffer with `None`.
    fn bind_frame_buffer(&mut self, handle: Option<FramebufferHandle>) -> Result<()>;

    fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()>;

    fn set_clear_color(&mut self, color: Color) -> Result<()>;

    fn clear(&mut self, color: bool, depth: bool) -> Result<()>;

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()>;

    /// Enables or disables writing into the depth buffer and sets the comparison.
    /// `None` disables the depth test.
    fn set_depth_test(&mut self, write: bool, comparison: Option<Comparison>) -> Result<()>;

    fn set_blend(&mut self, blend: Option<(Equation, BlendFactor, BlendFactor)>) -> Result<()>;

    fn set_cull_face(&mut self, face: CullFace) -> Result<()>;

    fn draw_elements(
        &mut self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        count: u32,
    ) -> Result<()>;

    fn draw_arrays(
        &mut self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        first: u32,
        count: u32,
    ) -> Result<()>;

    /// Applies all the toggles of `state`.
    fn apply_render_state(&mut self, state: &RenderState) -> Result<()> {
        self.set_cull_face(state.cull_face)?;
        self.set_depth_test(state.depth_write, state.depth_test)?;
        self.set_blend(state.color_blend)
    }
}
