//! The single call-site through which the engine reaches the installed backend.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use crate::errors::*;
use crate::math::prelude::{Color, Vector2};

use super::api::*;
use super::assets::prelude::*;

/// A dispatch facade over the one `RenderingApi` installed at startup.
///
/// `RenderingCommand` is cheap to clone; every clone forwards to the same backend
/// instance. It is handed explicitly to the renderer, the scene manager, the model
/// loader and every GPU resource owner. Swapping backends only means constructing it
/// with another `RenderingApi`. It is neither `Send` nor `Sync`, so all submission
/// happens on the thread owning the current context.
#[derive(Clone)]
pub struct RenderingCommand {
    api: Rc<RefCell<Box<dyn RenderingApi>>>,
}

impl RenderingCommand {
    pub fn new(api: Box<dyn RenderingApi>) -> Self {
        RenderingCommand {
            api: Rc::new(RefCell::new(api)),
        }
    }

    /// Creates a facade over a headless backend, which is useful for tests and tools
    /// that do not need a native context.
    pub fn headless() -> Self {
        RenderingCommand::new(super::backends::new_headless())
    }

    #[inline]
    fn api(&self) -> RefMut<Box<dyn RenderingApi>> {
        self.api.borrow_mut()
    }

    /// Returns true if both facades dispatch to the same backend.
    #[inline]
    pub fn same_backend(&self, rhs: &RenderingCommand) -> bool {
        Rc::ptr_eq(&self.api, &rhs.api)
    }

    #[inline]
    pub fn capabilities(&self) -> ApiCapabilities {
        self.api.borrow().capabilities()
    }

    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.api.borrow().statistics()
    }

    #[inline]
    pub fn init_vertex_buffer(
        &self,
        data: &[u8],
        layout: &VertexLayout,
    ) -> Result<VertexBufferHandle> {
        self.api().init_vertex_buffer(data, layout)
    }

    #[inline]
    pub fn init_element_buffer(&self, indices: &[u32]) -> Result<ElementBufferHandle> {
        self.api().init_element_buffer(indices)
    }

    #[inline]
    pub fn init_vertex_array(
        &self,
        vbo: VertexBufferHandle,
        ebo: Option<ElementBufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        self.api().init_vertex_array(vbo, ebo, layout)
    }

    #[inline]
    pub fn init_vertex_attributes(&self, layout: &VertexLayout) -> Result<()> {
        self.api().init_vertex_attributes(layout)
    }

    #[inline]
    pub fn delete_vertex_buffer(&self, handle: VertexBufferHandle) -> Result<()> {
        self.api().delete_vertex_buffer(handle)
    }

    #[inline]
    pub fn delete_element_buffer(&self, handle: ElementBufferHandle) -> Result<()> {
        self.api().delete_element_buffer(handle)
    }

    #[inline]
    pub fn delete_vertex_array(&self, handle: VertexArrayHandle) -> Result<()> {
        self.api().delete_vertex_array(handle)
    }

    #[inline]
    pub fn init_vertex_shader(&self, source: &str) -> Result<ShaderStageHandle> {
        self.api().init_vertex_shader(source)
    }

    #[inline]
    pub fn init_fragment_shader(&self, source: &str) -> Result<ShaderStageHandle> {
        self.api().init_fragment_shader(source)
    }

    #[inline]
    pub fn init_shader_program(
        &self,
        vs: ShaderStageHandle,
        fs: ShaderStageHandle,
    ) -> Result<ShaderProgramHandle> {
        self.api().init_shader_program(vs, fs)
    }

    #[inline]
    pub fn delete_shader_stage(&self, handle: ShaderStageHandle) -> Result<()> {
        self.api().delete_shader_stage(handle)
    }

    #[inline]
    pub fn delete_shader_program(&self, handle: ShaderProgramHandle) -> Result<()> {
        self.api().delete_shader_program(handle)
    }

    #[inline]
    pub fn use_program(&self, handle: ShaderProgramHandle) -> Result<()> {
        self.api().use_program(handle)
    }

    #[inline]
    pub fn set_uniform<T: Into<UniformVariable>>(
        &self,
        program: ShaderProgramHandle,
        name: &str,
        variable: T,
    ) -> Result<()> {
        self.api().set_uniform(program, name, variable.into())
    }

    #[inline]
    pub fn init_texture(&self, params: &TextureParams, data: Option<&[u8]>) -> Result<TextureHandle> {
        self.api().init_texture(params, data)
    }

    #[inline]
    pub fn delete_texture(&self, handle: TextureHandle) -> Result<()> {
        self.api().delete_texture(handle)
    }

    #[inline]
    pub fn bind_texture(&self, unit: u32, handle: TextureHandle) -> Result<()> {
        self.api().bind_texture(unit, handle)
    }

    #[inline]
    pub fn init_frame_buffer(
        &self,
        dimensions: Vector2<u32>,
        attachments: &FramebufferAttachments,
    ) -> Result<FramebufferHandle> {
        self.api().init_frame_buffer(dimensions, attachments)
    }

    #[inline]
    pub fn framebuffer_color_attachment(&self, handle: FramebufferHandle) -> Result<TextureHandle> {
        self.api.borrow().framebuffer_color_attachment(handle)
    }

    #[inline]
    pub fn framebuffer_dimensions(&self, handle: FramebufferHandle) -> Result<Vector2<u32>> {
        self.api.borrow().framebuffer_dimensions(handle)
    }

    #[inline]
    pub fn delete_frame_buffer(&self, handle: FramebufferHandle) -> Result<()> {
        self.api().delete_frame_buffer(handle)
    }

    #[inline]
    pub fn bind_frame_buffer(&self, handle: Option<FramebufferHandle>) -> Result<()> {
        self.api().bind_frame_buffer(handle)
    }

    #[inline]
    pub fn set_viewport(&self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()> {
        self.api().set_viewport(position, size)
    }

    #[inline]
    pub fn set_clear_color(&self, color: Color) -> Result<()> {
        self.api().set_clear_color(color)
    }

    #[inline]
    pub fn clear(&self, color: bool, depth: bool) -> Result<()> {
        self.api().clear(color, depth)
    }

    #[inline]
    pub fn set_polygon_mode(&self, mode: PolygonMode) -> Result<()> {
        self.api().set_polygon_mode(mode)
    }

    #[inline]
    pub fn set_depth_test(&self, write: bool, comparison: Option<Comparison>) -> Result<()> {
        self.api().set_depth_test(write, comparison)
    }

    #[inline]
    pub fn set_blend(&self, blend: Option<(Equation, BlendFactor, BlendFactor)>) -> Result<()> {
        self.api().set_blend(blend)
    }

    #[inline]
    pub fn set_cull_face(&self, face: CullFace) -> Result<()> {
        self.api().set_cull_face(face)
    }

    #[inline]
    pub fn apply_render_state(&self, state: &RenderState) -> Result<()> {
        self.api().apply_render_state(state)
    }

    #[inline]
    pub fn draw_elements(
        &self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        count: u32,
    ) -> Result<()> {
        self.api().draw_elements(vao, primitive, count)
    }

    #[inline]
    pub fn draw_arrays(
        &self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        first: u32,
        count: u32,
    ) -> Result<()> {
        self.api().draw_arrays(vao, primitive, first, count)
    }
}
