//! A backend without a native context. It validates every call the way a driver
//! would and keeps statistics, so the upper layers can be exercised anywhere.

use crate::errors::*;
use crate::math::prelude::{Color, Vector2};
use crate::utils::object_pool::ObjectPool;

use super::super::api::*;
use super::super::assets::prelude::*;

struct VertexArray {
    vbo: VertexBufferHandle,
    ebo: Option<ElementBufferHandle>,
}

struct Framebuffer {
    dimensions: Vector2<u32>,
    color: TextureHandle,
}

/// Shader sources that are empty or contain an `#error` directive fail to compile,
/// with the directive echoed into the log.
pub struct HeadlessApi {
    vbos: ObjectPool<VertexBufferHandle, usize>,
    ebos: ObjectPool<ElementBufferHandle, usize>,
    vaos: ObjectPool<VertexArrayHandle, VertexArray>,
    stages: ObjectPool<ShaderStageHandle, ()>,
    programs: ObjectPool<ShaderProgramHandle, ()>,
    textures: ObjectPool<TextureHandle, TextureParams>,
    framebuffers: ObjectPool<FramebufferHandle, Framebuffer>,
    program: Option<ShaderProgramHandle>,
    stats: Statistics,
}

impl HeadlessApi {
    pub fn new() -> Self {
        HeadlessApi {
            vbos: ObjectPool::new(),
            ebos: ObjectPool::new(),
            vaos: ObjectPool::new(),
            stages: ObjectPool::new(),
            programs: ObjectPool::new(),
            textures: ObjectPool::new(),
            framebuffers: ObjectPool::new(),
            program: None,
            stats: Statistics::default(),
        }
    }

    fn compile(&mut self, source: &str) -> ::std::result::Result<ShaderStageHandle, String> {
        if source.trim().is_empty() {
            return Err("empty shader source.".into());
        }

        if let Some(line) = source
            .lines()
            .map(|v| v.trim())
            .find(|v| v.starts_with("#error"))
        {
            return Err(format!("0:0: {}", line));
        }

        Ok(self.stages.create(()))
    }

    fn count_draw(&mut self, primitive: Primitive, count: u32) {
        self.stats.draw_calls += 1;
        self.stats.triangles += u64::from(primitive.assemble_triangles(count));
    }
}

impl Default for HeadlessApi {
    fn default() -> Self {
        HeadlessApi::new()
    }
}

impl RenderingApi for HeadlessApi {
    fn capabilities(&self) -> ApiCapabilities {
        ApiCapabilities {
            name: "Headless".into(),
            max_texture_units: 16,
            max_color_attachments: 8,
            max_viewport_dims: Vector2::new(16384, 16384),
        }
    }

    fn statistics(&self) -> Statistics {
        let mut stats = self.stats;
        stats.alive_buffers = self.vbos.len() + self.ebos.len();
        stats.alive_vertex_arrays = self.vaos.len();
        stats.alive_shader_programs = self.programs.len();
        stats.alive_framebuffers = self.framebuffers.len();
        stats.alive_textures = self.textures.len();
        stats
    }

    fn init_vertex_buffer(&mut self, data: &[u8], layout: &VertexLayout) -> Result<VertexBufferHandle> {
        let num = layout.num_vertices(data.len())?;
        self.stats.vertex_buffer_uploads += 1;
        Ok(self.vbos.create(num))
    }

    fn init_element_buffer(&mut self, indices: &[u32]) -> Result<ElementBufferHandle> {
        self.stats.element_buffer_uploads += 1;
        Ok(self.ebos.create(indices.len()))
    }

    fn init_vertex_array(
        &mut self,
        vbo: VertexBufferHandle,
        ebo: Option<ElementBufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        if !self.vbos.is_alive(vbo) {
            return Err(Error::invalid(vbo));
        }

        if let Some(ebo) = ebo {
            if !self.ebos.is_alive(ebo) {
                return Err(Error::invalid(ebo));
            }
        }

        self.init_vertex_attributes(layout)?;
        Ok(self.vaos.create(VertexArray { vbo, ebo }))
    }

    fn init_vertex_attributes(&mut self, layout: &VertexLayout) -> Result<()> {
        if layout.is_empty() {
            return Err(Error::VertexLayout("the layout has no attributes.".into()));
        }

        if layout.len() > MAX_VERTEX_ATTRIBUTES {
            return Err(Error::VertexLayout(format!(
                "{} attributes exceed the limit of {}.",
                layout.len(),
                MAX_VERTEX_ATTRIBUTES
            )));
        }

        Ok(())
    }

    fn delete_vertex_buffer(&mut self, handle: VertexBufferHandle) -> Result<()> {
        self.vbos.free(handle).map(|_| ()).ok_or_else(|| Error::invalid(handle))
    }

    fn delete_element_buffer(&mut self, handle: ElementBufferHandle) -> Result<()> {
        self.ebos.free(handle).map(|_| ()).ok_or_else(|| Error::invalid(handle))
    }

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()> {
        self.vaos.free(handle).map(|_| ()).ok_or_else(|| Error::invalid(handle))
    }

    fn init_vertex_shader(&mut self, source: &str) -> Result<ShaderStageHandle> {
        self.compile(source).map_err(|log| Error::Compile {
            stage: ShaderStage::Vertex,
            log,
        })
    }

    fn init_fragment_shader(&mut self, source: &str) -> Result<ShaderStageHandle> {
        self.compile(source).map_err(|log| Error::Compile {
            stage: ShaderStage::Fragment,
            log,
        })
    }

    fn init_shader_program(
        &mut self,
        vs: ShaderStageHandle,
        fs: ShaderStageHandle,
    ) -> Result<ShaderProgramHandle> {
        for &stage in &[vs, fs] {
            if !self.stages.is_alive(stage) {
                return Err(Error::Link(format!("{} is not a compiled stage.", stage)));
            }
        }

        self.stats.shader_programs_linked += 1;
        Ok(self.programs.create(()))
    }

    fn delete_shader_stage(&mut self, handle: ShaderStageHandle) -> Result<()> {
        self.stages.free(handle).ok_or_else(|| Error::invalid(handle))
    }

    fn delete_shader_program(&mut self, handle: ShaderProgramHandle) -> Result<()> {
        if self.program == Some(handle) {
            self.program = None;
        }

        self.programs.free(handle).ok_or_else(|| Error::invalid(handle))
    }

    fn use_program(&mut self, handle: ShaderProgramHandle) -> Result<()> {
        if !self.programs.is_alive(handle) {
            return Err(Error::invalid(handle));
        }

        self.program = Some(handle);
        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: ShaderProgramHandle,
        _: &str,
        _: UniformVariable,
    ) -> Result<()> {
        if self.program != Some(program) {
            return Err(Error::Backend(format!("{} is not in use.", program)));
        }

        Ok(())
    }

    fn init_texture(&mut self, params: &TextureParams, data: Option<&[u8]>) -> Result<TextureHandle> {
        params.validate(data)?;
        self.stats.texture_uploads += 1;
        Ok(self.textures.create(*params))
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if self.framebuffers.values().any(|v| v.color == handle) {
            return Err(Error::Backend(format!(
                "{} is owned by a framebuffer.",
                handle
            )));
        }

        self.textures.free(handle).map(|_| ()).ok_or_else(|| Error::invalid(handle))
    }

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle) -> Result<()> {
        if unit >= self.capabilities().max_texture_units {
            return Err(Error::Backend(format!("texture unit {} is out of range.", unit)));
        }

        if !self.textures.is_alive(handle) {
            return Err(Error::invalid(handle));
        }

        Ok(())
    }

    fn init_frame_buffer(
        &mut self,
        dimensions: Vector2<u32>,
        attachments: &FramebufferAttachments,
    ) -> Result<FramebufferHandle> {
        let params = TextureParams {
            format: attachments.color,
            wrap: attachments.wrap,
            filter: attachments.filter,
            dimensions,
            mipmap: false,
        };

        params.validate(None)?;
        let color = self.textures.create(params);
        self.stats.framebuffer_allocations += 1;

        Ok(self.framebuffers.create(Framebuffer { dimensions, color }))
    }

    fn framebuffer_color_attachment(&self, handle: FramebufferHandle) -> Result<TextureHandle> {
        self.framebuffers
            .get(handle)
            .map(|v| v.color)
            .ok_or_else(|| Error::invalid(handle))
    }

    fn framebuffer_dimensions(&self, handle: FramebufferHandle) -> Result<Vector2<u32>> {
        self.framebuffers
            .get(handle)
            .map(|v| v.dimensions)
            .ok_or_else(|| Error::invalid(handle))
    }

    fn delete_frame_buffer(&mut self, handle: FramebufferHandle) -> Result<()> {
        let fb = self
            .framebuffers
            .free(handle)
            .ok_or_else(|| Error::invalid(handle))?;

        self.textures.free(fb.color);
        self.stats.framebuffer_releases += 1;
        Ok(())
    }

    fn bind_frame_buffer(&mut self, handle: Option<FramebufferHandle>) -> Result<()> {
        match handle {
            Some(fb) if !self.framebuffers.is_alive(fb) => Err(Error::invalid(fb)),
            _ => Ok(()),
        }
    }

    fn set_viewport(&mut self, _: Vector2<i32>, size: Vector2<u32>) -> Result<()> {
        let max = self.capabilities().max_viewport_dims;
        if size.x > max.x || size.y > max.y {
            return Err(Error::Backend(format!(
                "viewport {}x{} exceeds {}x{}.",
                size.x, size.y, max.x, max.y
            )));
        }

        Ok(())
    }

    fn set_clear_color(&mut self, _: Color) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self, _: bool, _: bool) -> Result<()> {
        Ok(())
    }

    fn set_polygon_mode(&mut self, _: PolygonMode) -> Result<()> {
        Ok(())
    }

    fn set_depth_test(&mut self, _: bool, _: Option<Comparison>) -> Result<()> {
        Ok(())
    }

    fn set_blend(&mut self, _: Option<(Equation, BlendFactor, BlendFactor)>) -> Result<()> {
        Ok(())
    }

    fn set_cull_face(&mut self, _: CullFace) -> Result<()> {
        Ok(())
    }

    fn draw_elements(
        &mut self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        count: u32,
    ) -> Result<()> {
        if self.program.is_none() {
            return Err(Error::Backend("no shader program in use.".into()));
        }

        let ebo = self
            .vaos
            .get(vao)
            .ok_or_else(|| Error::invalid(vao))?
            .ebo
            .ok_or_else(|| Error::Backend(format!("{} has no element buffer.", vao)))?;

        let len = *self.ebos.get(ebo).ok_or_else(|| Error::invalid(ebo))?;
        if count as usize > len {
            return Err(Error::Backend(format!(
                "drawing {} indices out of {}.",
                count, len
            )));
        }

        self.count_draw(primitive, count);
        Ok(())
    }

    fn draw_arrays(
        &mut self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        first: u32,
        count: u32,
    ) -> Result<()> {
        if self.program.is_none() {
            return Err(Error::Backend("no shader program in use.".into()));
        }

        let vbo = self.vaos.get(vao).ok_or_else(|| Error::invalid(vao))?.vbo;
        let len = *self.vbos.get(vbo).ok_or_else(|| Error::invalid(vbo))?;
        let end = first.checked_add(count).map(|v| v as usize);
        if end.map_or(true, |v| v > len) {
            return Err(Error::Backend(format!(
                "drawing {} vertices from {} out of {}.",
                count, first, len
            )));
        }

        self.count_draw(primitive, count);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn compile() {
        let mut api = HeadlessApi::new();
        assert!(api.init_vertex_shader("void main() {}").is_ok());
        assert!(api.init_vertex_shader("  \n").is_err());

        match api.init_fragment_shader("#version 330\n  #error nope\n") {
            Err(Error::Compile { stage, log }) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("#error nope"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn stale_handles() {
        let mut api = HeadlessApi::new();
        let params = TextureParams {
            dimensions: Vector2::new(1, 1),
            ..Default::default()
        };

        let texture = api.init_texture(&params, None).unwrap();
        assert!(api.bind_texture(0, texture).is_ok());
        assert!(api.bind_texture(64, texture).is_err());
        api.delete_texture(texture).unwrap();

        assert!(api.bind_texture(0, texture).is_err());
        assert!(api.delete_texture(texture).is_err());
    }

    #[test]
    fn framebuffer_owns_attachment() {
        let mut api = HeadlessApi::new();
        let fb = api
            .init_frame_buffer(Vector2::new(4, 4), &FramebufferAttachments::default())
            .unwrap();

        let color = api.framebuffer_color_attachment(fb).unwrap();
        assert!(api.delete_texture(color).is_err());
        assert_eq!(api.statistics().alive_textures, 1);

        api.delete_frame_buffer(fb).unwrap();
        assert_eq!(api.statistics().alive_textures, 0);
        assert!(api.bind_frame_buffer(Some(fb)).is_err());
        assert!(api.bind_frame_buffer(None).is_ok());
    }

    #[test]
    fn draw_requires_program() {
        let mut api = HeadlessApi::new();
        let layout = VertexLayout::build()
            .with(Attribute::Position, VertexFormat::Float, 3, false)
            .finish();

        let vbo = api.init_vertex_buffer(&[0; 36], &layout).unwrap();
        let vao = api.init_vertex_array(vbo, None, &layout).unwrap();
        assert!(api.draw_arrays(vao, Primitive::Triangles, 0, 3).is_err());

        let vs = api.init_vertex_shader("void main() {}").unwrap();
        let fs = api.init_fragment_shader("void main() {}").unwrap();
        let program = api.init_shader_program(vs, fs).unwrap();
        api.use_program(program).unwrap();

        assert!(api.draw_arrays(vao, Primitive::Triangles, 0, 3).is_ok());
        assert!(api.draw_arrays(vao, Primitive::Triangles, 1, 3).is_err());
        assert!(api.draw_arrays(vao, Primitive::Triangles, 1, u32::max_value()).is_err());
        assert!(api.draw_arrays(vao, Primitive::Triangles, u32::max_value(), 3).is_err());
        assert!(api.draw_elements(vao, Primitive::Triangles, 3).is_err());
        assert_eq!(api.statistics().draw_calls, 1);
        assert_eq!(api.statistics().triangles, 1);
    }
}
