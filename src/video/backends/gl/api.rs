use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::math::prelude::{Color, Vector2};
use crate::utils::object_pool::ObjectPool;

use super::super::super::api::*;
use super::super::super::assets::prelude::*;
use super::capabilities::{Capabilities, Version};
use super::types;

#[derive(Debug, Clone, Copy)]
struct GLBuffer {
    id: GLuint,
    len: usize,
}

#[derive(Debug, Clone, Copy)]
struct GLVertexArray {
    id: GLuint,
    vbo: VertexBufferHandle,
    ebo: Option<ElementBufferHandle>,
}

#[derive(Debug)]
struct GLProgram {
    id: GLuint,
    uniforms: RefCell<HashMap<String, GLint>>,
}

impl GLProgram {
    unsafe fn uniform_location(&self, name: &str) -> Result<GLint> {
        if let Some(&location) = self.uniforms.borrow().get(name) {
            return Ok(location);
        }

        let c_name = CString::new(name.as_bytes())
            .map_err(|_| Error::Backend(format!("uniform name {:?} contains nul.", name)))?;
        let location = gl::GetUniformLocation(self.id, c_name.as_ptr());
        check()?;

        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }
}

#[derive(Debug, Clone, Copy)]
struct GLTexture {
    id: GLuint,
    params: TextureParams,
    attachment: bool,
}

#[derive(Debug, Clone, Copy)]
struct GLFramebuffer {
    id: GLuint,
    color: TextureHandle,
    depth: Option<GLuint>,
    dimensions: Vector2<u32>,
}

struct GLMutableState {
    render_state: RenderState,
    polygon_mode: PolygonMode,
    viewport: Option<(Vector2<i32>, Vector2<u32>)>,
    clear_color: Option<Color>,
    program: Option<ShaderProgramHandle>,
    vao: Option<GLuint>,
    framebuffer: Option<FramebufferHandle>,
    textures: Vec<Option<TextureHandle>>,
}

/// `RenderingApi` over a desktop OpenGL 3.3 core context.
///
/// The context must be current on the calling thread for the lifetime of this
/// object, and every native object it creates is named by a handle from its pools.
pub struct GLRenderingApi {
    state: GLMutableState,
    capabilities: Capabilities,
    vbos: ObjectPool<VertexBufferHandle, GLBuffer>,
    ebos: ObjectPool<ElementBufferHandle, GLBuffer>,
    vaos: ObjectPool<VertexArrayHandle, GLVertexArray>,
    stages: ObjectPool<ShaderStageHandle, GLuint>,
    programs: ObjectPool<ShaderProgramHandle, GLProgram>,
    textures: ObjectPool<TextureHandle, GLTexture>,
    framebuffers: ObjectPool<FramebufferHandle, GLFramebuffer>,
    stats: Statistics,
}

impl GLRenderingApi {
    /// # Unsafe
    ///
    /// The GL functions must have been loaded for a context that is current on the
    /// calling thread.
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLRenderingApi {:#?}", capabilities);
        check_capabilities(&capabilities)?;

        let units = capabilities.max_combined_texture_image_units as usize;
        let state = GLMutableState {
            render_state: RenderState::default(),
            polygon_mode: PolygonMode::Fill,
            viewport: None,
            clear_color: None,
            program: None,
            vao: None,
            framebuffer: None,
            textures: vec![None; units],
        };

        let mut api = GLRenderingApi {
            state,
            capabilities,
            vbos: ObjectPool::new(),
            ebos: ObjectPool::new(),
            vaos: ObjectPool::new(),
            stages: ObjectPool::new(),
            programs: ObjectPool::new(),
            textures: ObjectPool::new(),
            framebuffers: ObjectPool::new(),
            stats: Statistics::default(),
        };

        api.reset_render_state()?;
        Ok(api)
    }

    unsafe fn reset_render_state(&mut self) -> Result<()> {
        gl::Disable(gl::CULL_FACE);
        gl::FrontFace(gl::CCW);
        gl::Disable(gl::DEPTH_TEST);
        gl::DepthMask(gl::FALSE);
        gl::DepthFunc(gl::ALWAYS);
        gl::Disable(gl::BLEND);
        gl::PolygonMode(gl::FRONT_AND_BACK, gl::FILL);
        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        self.state.render_state = RenderState::default();
        self.state.polygon_mode = PolygonMode::Fill;
        check()
    }

    unsafe fn bind_vertex_array(&mut self, id: GLuint) {
        if self.state.vao != Some(id) {
            gl::BindVertexArray(id);
            self.state.vao = Some(id);
        }
    }

    unsafe fn unbind_vertex_array(&mut self) {
        if self.state.vao.is_some() {
            gl::BindVertexArray(0);
            self.state.vao = None;
        }
    }

    unsafe fn create_buffer(&mut self, tp: GLenum, data: &[u8]) -> Result<GLuint> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);
        if id == 0 {
            return Err(Error::Backend("failed to generate buffer object.".into()));
        }

        gl::BindBuffer(tp, id);
        gl::BufferData(
            tp,
            data.len() as isize,
            data.as_ptr() as *const c_void,
            gl::STATIC_DRAW,
        );

        if let Err(err) = check() {
            gl::DeleteBuffers(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn compile(&mut self, tp: GLenum, stage: ShaderStage, src: &str) -> Result<ShaderStageHandle> {
        let c_str = CString::new(src.as_bytes()).map_err(|_| Error::Compile {
            stage,
            log: "source contains nul.".into(),
        })?;

        let shader = gl::CreateShader(tp);
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(shader, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
            gl::DeleteShader(shader);

            return Err(Error::Compile {
                stage,
                log: info_log(buf),
            });
        }

        Ok(self.stages.create(shader))
    }

    unsafe fn create_texture(&mut self, params: &TextureParams, data: Option<&[u8]>) -> Result<GLuint> {
        let mut id = 0;
        gl::GenTextures(1, &mut id);
        if id == 0 {
            return Err(Error::Backend("failed to generate texture object.".into()));
        }

        gl::ActiveTexture(gl::TEXTURE0);
        gl::BindTexture(gl::TEXTURE_2D, id);
        if let Some(slot) = self.state.textures.get_mut(0) {
            *slot = None;
        }

        let levels = types::mipmap_levels(params);
        bind_texture_params(params.wrap, params.filter, levels);

        let (internal, format, tp) = types::texture_format(params.format);
        let value = match data {
            Some(v) if !v.is_empty() => v.as_ptr() as *const c_void,
            _ => ptr::null(),
        };

        gl::TexImage2D(
            gl::TEXTURE_2D,
            0,
            internal as GLint,
            params.dimensions.x as GLsizei,
            params.dimensions.y as GLsizei,
            0,
            format,
            tp,
            value,
        );

        if levels > 1 && data.is_some() {
            gl::GenerateMipmap(gl::TEXTURE_2D);
        }

        if let Err(err) = check() {
            gl::DeleteTextures(1, &id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn bind_framebuffer_id(&mut self, handle: Option<FramebufferHandle>) -> Result<()> {
        let id = match handle {
            Some(fb) => self.framebuffers.get(fb).ok_or_else(|| Error::invalid(fb))?.id,
            None => 0,
        };

        gl::BindFramebuffer(gl::FRAMEBUFFER, id);
        self.state.framebuffer = handle;
        check()
    }

    fn program(&self, handle: ShaderProgramHandle) -> Result<&GLProgram> {
        self.programs.get(handle).ok_or_else(|| Error::invalid(handle))
    }

    fn vertex_array(&self, handle: VertexArrayHandle) -> Result<GLVertexArray> {
        self.vaos.get(handle).cloned().ok_or_else(|| Error::invalid(handle))
    }

    fn count_draw(&mut self, primitive: Primitive, count: u32) {
        self.stats.draw_calls += 1;
        self.stats.triangles += u64::from(primitive.assemble_triangles(count));
    }
}

impl RenderingApi for GLRenderingApi {
    fn capabilities(&self) -> ApiCapabilities {
        let caps = &self.capabilities;
        ApiCapabilities {
            name: format!("OpenGL {:?} ({}, {})", caps.version, caps.vendor, caps.renderer),
            max_texture_units: caps.max_combined_texture_image_units,
            max_color_attachments: caps.max_color_attachments,
            max_viewport_dims: Vector2::new(caps.max_viewport_dims.0, caps.max_viewport_dims.1),
        }
    }

    fn statistics(&self) -> Statistics {
        let mut stats = self.stats;
        stats.alive_buffers = self.vbos.len() + self.ebos.len();
        stats.alive_vertex_arrays = self.vaos.len();
        stats.alive_shader_programs = self.programs.len();
        stats.alive_textures = self.textures.len();
        stats.alive_framebuffers = self.framebuffers.len();
        stats
    }

    fn init_vertex_buffer(&mut self, data: &[u8], layout: &VertexLayout) -> Result<VertexBufferHandle> {
        let len = layout.num_vertices(data.len())?;
        let id = unsafe { self.create_buffer(gl::ARRAY_BUFFER, data)? };
        self.stats.vertex_buffer_uploads += 1;
        Ok(self.vbos.create(GLBuffer { id, len }))
    }

    fn init_element_buffer(&mut self, indices: &[u32]) -> Result<ElementBufferHandle> {
        // Buffer objects are typeless, and uploading through the array target keeps
        // the element binding of the current vertex array untouched.
        let id = unsafe { self.create_buffer(gl::ARRAY_BUFFER, as_bytes(indices))? };
        self.stats.element_buffer_uploads += 1;
        Ok(self.ebos.create(GLBuffer {
            id,
            len: indices.len(),
        }))
    }

    fn init_vertex_array(
        &mut self,
        vbo: VertexBufferHandle,
        ebo: Option<ElementBufferHandle>,
        layout: &VertexLayout,
    ) -> Result<VertexArrayHandle> {
        let vbo_id = self.vbos.get(vbo).ok_or_else(|| Error::invalid(vbo))?.id;
        let ebo_id = match ebo {
            Some(ebo) => Some(self.ebos.get(ebo).ok_or_else(|| Error::invalid(ebo))?.id),
            None => None,
        };

        unsafe {
            let mut id = 0;
            gl::GenVertexArrays(1, &mut id);
            if id == 0 {
                return Err(Error::Backend("failed to generate vertex array.".into()));
            }

            self.bind_vertex_array(id);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo_id);
            if let Some(ebo_id) = ebo_id {
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo_id);
            }

            let result = self.init_vertex_attributes(layout).and_then(|_| check());
            self.unbind_vertex_array();

            if let Err(err) = result {
                gl::DeleteVertexArrays(1, &id);
                return Err(err);
            }

            Ok(self.vaos.create(GLVertexArray { id, vbo, ebo }))
        }
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

        unsafe {
            for (location, element) in layout.iter().enumerate() {
                gl::EnableVertexAttribArray(location as GLuint);
                gl::VertexAttribPointer(
                    location as GLuint,
                    GLint::from(element.size),
                    element.format.into(),
                    element.normalized as u8,
                    GLsizei::from(layout.stride()),
                    element.offset as usize as *const c_void,
                );
            }

            check()
        }
    }

    fn delete_vertex_buffer(&mut self, handle: VertexBufferHandle) -> Result<()> {
        let buffer = self.vbos.free(handle).ok_or_else(|| Error::invalid(handle))?;
        unsafe {
            gl::DeleteBuffers(1, &buffer.id);
            check()
        }
    }

    fn delete_element_buffer(&mut self, handle: ElementBufferHandle) -> Result<()> {
        let buffer = self.ebos.free(handle).ok_or_else(|| Error::invalid(handle))?;
        unsafe {
            gl::DeleteBuffers(1, &buffer.id);
            check()
        }
    }

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()> {
        let vao = self.vaos.free(handle).ok_or_else(|| Error::invalid(handle))?;
        unsafe {
            if self.state.vao == Some(vao.id) {
                self.unbind_vertex_array();
            }

            gl::DeleteVertexArrays(1, &vao.id);
            check()
        }
    }

    fn init_vertex_shader(&mut self, source: &str) -> Result<ShaderStageHandle> {
        unsafe { self.compile(gl::VERTEX_SHADER, ShaderStage::Vertex, source) }
    }

    fn init_fragment_shader(&mut self, source: &str) -> Result<ShaderStageHandle> {
        unsafe { self.compile(gl::FRAGMENT_SHADER, ShaderStage::Fragment, source) }
    }

    fn init_shader_program(
        &mut self,
        vs: ShaderStageHandle,
        fs: ShaderStageHandle,
    ) -> Result<ShaderProgramHandle> {
        let vs = *self
            .stages
            .get(vs)
            .ok_or_else(|| Error::Link(format!("{} is not a compiled stage.", vs)))?;
        let fs = *self
            .stages
            .get(fs)
            .ok_or_else(|| Error::Link(format!("{} is not a compiled stage.", fs)))?;

        unsafe {
            let program = gl::CreateProgram();
            gl::AttachShader(program, vs);
            gl::AttachShader(program, fs);
            gl::LinkProgram(program);

            let mut status = GLint::from(gl::FALSE);
            gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

            if status != GLint::from(gl::TRUE) {
                let mut len: GLint = 0;
                gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
                let mut buf = vec![0u8; len.max(1) as usize];
                gl::GetProgramInfoLog(program, len, ptr::null_mut(), buf.as_mut_ptr() as *mut GLchar);
                gl::DeleteProgram(program);
                return Err(Error::Link(info_log(buf)));
            }

            gl::DetachShader(program, vs);
            gl::DetachShader(program, fs);
            check()?;

            self.stats.shader_programs_linked += 1;
            Ok(self.programs.create(GLProgram {
                id: program,
                uniforms: RefCell::new(HashMap::new()),
            }))
        }
    }

    fn delete_shader_stage(&mut self, handle: ShaderStageHandle) -> Result<()> {
        let id = self.stages.free(handle).ok_or_else(|| Error::invalid(handle))?;
        unsafe {
            gl::DeleteShader(id);
            check()
        }
    }

    fn delete_shader_program(&mut self, handle: ShaderProgramHandle) -> Result<()> {
        let program = self.programs.free(handle).ok_or_else(|| Error::invalid(handle))?;
        unsafe {
            if self.state.program == Some(handle) {
                gl::UseProgram(0);
                self.state.program = None;
            }

            gl::DeleteProgram(program.id);
            check()
        }
    }

    fn use_program(&mut self, handle: ShaderProgramHandle) -> Result<()> {
        if self.state.program == Some(handle) {
            return Ok(());
        }

        let id = self.program(handle)?.id;
        unsafe {
            gl::UseProgram(id);
            self.state.program = Some(handle);
            check()
        }
    }

    fn set_uniform(
        &mut self,
        program: ShaderProgramHandle,
        name: &str,
        variable: UniformVariable,
    ) -> Result<()> {
        self.use_program(program)?;

        unsafe {
            let location = self.program(program)?.uniform_location(name)?;
            if location == -1 {
                return Ok(());
            }

            match variable {
                UniformVariable::I32(v) => gl::Uniform1i(location, v),
                UniformVariable::F32(v) => gl::Uniform1f(location, v),
                UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
                UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
                UniformVariable::Vector4f(v) => gl::Uniform4f(location, v[0], v[1], v[2], v[3]),
                UniformVariable::Matrix3f(v) => {
                    gl::UniformMatrix3fv(location, 1, gl::FALSE, v[0].as_ptr())
                }
                UniformVariable::Matrix4f(v) => {
                    gl::UniformMatrix4fv(location, 1, gl::FALSE, v[0].as_ptr())
                }
            }

            check()
        }
    }

    fn init_texture(&mut self, params: &TextureParams, data: Option<&[u8]>) -> Result<TextureHandle> {
        params.validate(data)?;

        let id = unsafe { self.create_texture(params, data)? };
        self.stats.texture_uploads += 1;
        Ok(self.textures.create(GLTexture {
            id,
            params: *params,
            attachment: false,
        }))
    }

    fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        match self.textures.get(handle) {
            Some(v) if v.attachment => {
                return Err(Error::Backend(format!("{} is owned by a framebuffer.", handle)));
            }
            Some(_) => {}
            None => return Err(Error::invalid(handle)),
        }

        let texture = self.textures.free(handle).ok_or_else(|| Error::invalid(handle))?;
        for slot in &mut self.state.textures {
            if *slot == Some(handle) {
                *slot = None;
            }
        }

        unsafe {
            gl::DeleteTextures(1, &texture.id);
            check()
        }
    }

    fn bind_texture(&mut self, unit: u32, handle: TextureHandle) -> Result<()> {
        if unit as usize >= self.state.textures.len() {
            return Err(Error::Backend(format!("texture unit {} is out of range.", unit)));
        }

        if self.state.textures[unit as usize] == Some(handle) {
            return Ok(());
        }

        let id = self.textures.get(handle).ok_or_else(|| Error::invalid(handle))?.id;
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit);
            gl::BindTexture(gl::TEXTURE_2D, id);
            self.state.textures[unit as usize] = Some(handle);
            check()
        }
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

        unsafe {
            let texture = self.create_texture(&params, None)?;

            let mut id = 0;
            gl::GenFramebuffers(1, &mut id);
            gl::BindFramebuffer(gl::FRAMEBUFFER, id);
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                gl::COLOR_ATTACHMENT0,
                gl::TEXTURE_2D,
                texture,
                0,
            );

            let depth = if attachments.depth {
                let mut rbo = 0;
                gl::GenRenderbuffers(1, &mut rbo);
                gl::BindRenderbuffer(gl::RENDERBUFFER, rbo);
                gl::RenderbufferStorage(
                    gl::RENDERBUFFER,
                    gl::DEPTH24_STENCIL8,
                    dimensions.x as GLsizei,
                    dimensions.y as GLsizei,
                );
                gl::FramebufferRenderbuffer(
                    gl::FRAMEBUFFER,
                    gl::DEPTH_STENCIL_ATTACHMENT,
                    gl::RENDERBUFFER,
                    rbo,
                );
                gl::BindRenderbuffer(gl::RENDERBUFFER, 0);
                Some(rbo)
            } else {
                None
            };

            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            let result = check().and_then(|_| {
                if status == gl::FRAMEBUFFER_COMPLETE {
                    Ok(())
                } else {
                    Err(Error::Backend(format!("framebuffer is incomplete (0x{:x}).", status)))
                }
            });

            // Restores the target that was bound before the allocation.
            let prev = self
                .state
                .framebuffer
                .and_then(|v| self.framebuffers.get(v))
                .map(|v| v.id)
                .unwrap_or(0);
            gl::BindFramebuffer(gl::FRAMEBUFFER, prev);

            if let Err(err) = result {
                gl::DeleteFramebuffers(1, &id);
                gl::DeleteTextures(1, &texture);
                if let Some(rbo) = depth {
                    gl::DeleteRenderbuffers(1, &rbo);
                }

                return Err(err);
            }

            let color = self.textures.create(GLTexture {
                id: texture,
                params,
                attachment: true,
            });

            self.stats.framebuffer_allocations += 1;
            Ok(self.framebuffers.create(GLFramebuffer {
                id,
                color,
                depth,
                dimensions,
            }))
        }
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
        let fb = self.framebuffers.free(handle).ok_or_else(|| Error::invalid(handle))?;

        unsafe {
            if self.state.framebuffer == Some(handle) {
                gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
                self.state.framebuffer = None;
            }

            gl::DeleteFramebuffers(1, &fb.id);
            if let Some(rbo) = fb.depth {
                gl::DeleteRenderbuffers(1, &rbo);
            }

            if let Some(texture) = self.textures.free(fb.color) {
                for slot in &mut self.state.textures {
                    if *slot == Some(fb.color) {
                        *slot = None;
                    }
                }

                gl::DeleteTextures(1, &texture.id);
            }

            self.stats.framebuffer_releases += 1;
            check()
        }
    }

    fn bind_frame_buffer(&mut self, handle: Option<FramebufferHandle>) -> Result<()> {
        if self.state.framebuffer == handle {
            return Ok(());
        }

        unsafe { self.bind_framebuffer_id(handle) }
    }

    fn set_viewport(&mut self, position: Vector2<i32>, size: Vector2<u32>) -> Result<()> {
        if self.state.viewport == Some((position, size)) {
            return Ok(());
        }

        let max = self.capabilities.max_viewport_dims;
        if size.x > max.0 || size.y > max.1 {
            return Err(Error::Backend(format!(
                "viewport {}x{} exceeds {}x{}.",
                size.x, size.y, max.0, max.1
            )));
        }

        unsafe {
            gl::Viewport(position.x, position.y, size.x as GLsizei, size.y as GLsizei);
            self.state.viewport = Some((position, size));
            check()
        }
    }

    fn set_clear_color(&mut self, color: Color) -> Result<()> {
        if self.state.clear_color == Some(color) {
            return Ok(());
        }

        unsafe {
            gl::ClearColor(color.r, color.g, color.b, color.a);
            self.state.clear_color = Some(color);
            check()
        }
    }

    fn clear(&mut self, color: bool, depth: bool) -> Result<()> {
        let mut bits = 0;
        if color {
            bits |= gl::COLOR_BUFFER_BIT;
        }

        if depth {
            bits |= gl::DEPTH_BUFFER_BIT;
        }

        if bits == 0 {
            return Ok(());
        }

        unsafe {
            // Depth writes must be enabled for the depth buffer to be cleared.
            if depth && !self.state.render_state.depth_write {
                gl::DepthMask(gl::TRUE);
                gl::Clear(bits);
                gl::DepthMask(gl::FALSE);
            } else {
                gl::Clear(bits);
            }

            check()
        }
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) -> Result<()> {
        if self.state.polygon_mode == mode {
            return Ok(());
        }

        unsafe {
            gl::PolygonMode(gl::FRONT_AND_BACK, mode.into());
            self.state.polygon_mode = mode;
            check()
        }
    }

    fn set_depth_test(&mut self, write: bool, comparison: Option<Comparison>) -> Result<()> {
        let rs = &mut self.state.render_state;

        unsafe {
            // The depth buffer is not updated if the depth test is disabled, even if the
            // depth mask is set.
            let enable = comparison.is_some() || write;
            let last_enable = rs.depth_test.is_some() || rs.depth_write;
            if enable != last_enable {
                if enable {
                    gl::Enable(gl::DEPTH_TEST);
                } else {
                    gl::Disable(gl::DEPTH_TEST);
                }
            }

            if rs.depth_write != write {
                gl::DepthMask(if write { gl::TRUE } else { gl::FALSE });
                rs.depth_write = write;
            }

            if rs.depth_test != comparison {
                gl::DepthFunc(comparison.unwrap_or(Comparison::Always).into());
                rs.depth_test = comparison;
            }

            check()
        }
    }

    fn set_blend(&mut self, blend: Option<(Equation, BlendFactor, BlendFactor)>) -> Result<()> {
        let rs = &mut self.state.render_state;
        if rs.color_blend == blend {
            return Ok(());
        }

        unsafe {
            if let Some((equation, src, dst)) = blend {
                if rs.color_blend.is_none() {
                    gl::Enable(gl::BLEND);
                }

                gl::BlendFunc(src.into(), dst.into());
                gl::BlendEquation(equation.into());
            } else {
                gl::Disable(gl::BLEND);
            }

            rs.color_blend = blend;
            check()
        }
    }

    fn set_cull_face(&mut self, face: CullFace) -> Result<()> {
        let rs = &mut self.state.render_state;
        if rs.cull_face == face {
            return Ok(());
        }

        unsafe {
            match face {
                CullFace::Nothing => gl::Disable(gl::CULL_FACE),
                CullFace::Front => {
                    gl::Enable(gl::CULL_FACE);
                    gl::CullFace(gl::FRONT);
                }
                CullFace::Back => {
                    gl::Enable(gl::CULL_FACE);
                    gl::CullFace(gl::BACK);
                }
            }

            rs.cull_face = face;
            check()
        }
    }

    fn draw_elements(
        &mut self,
        vao: VertexArrayHandle,
        primitive: Primitive,
        count: u32,
    ) -> Result<()> {
        if self.state.program.is_none() {
            return Err(Error::Backend("no shader program in use.".into()));
        }

        let va = self.vertex_array(vao)?;
        let ebo = va
            .ebo
            .ok_or_else(|| Error::Backend(format!("{} has no element buffer.", vao)))?;
        let len = self.ebos.get(ebo).ok_or_else(|| Error::invalid(ebo))?.len;
        if count as usize > len {
            return Err(Error::Backend(format!("drawing {} indices out of {}.", count, len)));
        }

        unsafe {
            self.bind_vertex_array(va.id);
            gl::DrawElements(
                primitive.into(),
                count as GLsizei,
                gl::UNSIGNED_INT,
                ptr::null(),
            );
            check()?;
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
        if self.state.program.is_none() {
            return Err(Error::Backend("no shader program in use.".into()));
        }

        let va = self.vertex_array(vao)?;
        let len = self.vbos.get(va.vbo).ok_or_else(|| Error::invalid(va.vbo))?.len;
        let end = first.checked_add(count).map(|v| v as usize);
        if end.map_or(true, |v| v > len) {
            return Err(Error::Backend(format!(
                "drawing {} vertices from {} out of {}.",
                count, first, len
            )));
        }

        unsafe {
            self.bind_vertex_array(va.id);
            gl::DrawArrays(primitive.into(), first as GLint, count as GLsizei);
            check()?;
        }

        self.count_draw(primitive, count);
        Ok(())
    }
}

impl Drop for GLRenderingApi {
    fn drop(&mut self) {
        let leaked = self.vbos.len()
            + self.ebos.len()
            + self.vaos.len()
            + self.programs.len()
            + self.textures.len()
            + self.framebuffers.len();

        if leaked > 0 {
            warn!("{} native objects are still alive when dropping the GL backend.", leaked);
        }
    }
}

unsafe fn bind_texture_params(wrap: TextureWrap, filter: TextureFilter, levels: u32) {
    let wrap: GLenum = wrap.into();
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, wrap as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, wrap as GLint);

    if wrap == gl::CLAMP_TO_BORDER {
        let border = [0.0f32; 4];
        gl::TexParameterfv(gl::TEXTURE_2D, gl::TEXTURE_BORDER_COLOR, border.as_ptr());
    }

    let (min_filter, mag_filter) = match filter {
        TextureFilter::Nearest if levels > 1 => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
        TextureFilter::Nearest => (gl::NEAREST, gl::NEAREST),
        TextureFilter::Linear if levels > 1 => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
        TextureFilter::Linear => (gl::LINEAR, gl::LINEAR),
    };

    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, min_filter as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, mag_filter as GLint);

    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_BASE_LEVEL, 0);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAX_LEVEL, (levels - 1) as GLint);
}

fn info_log(mut buf: Vec<u8>) -> String {
    while buf.last() == Some(&0) {
        buf.pop();
    }

    String::from_utf8_lossy(&buf).into_owned()
}

fn check_capabilities(caps: &Capabilities) -> Result<()> {
    if caps.version < Version::GL(3, 3) && caps.version < Version::ES(3, 0) {
        return Err(Error::Context(format!(
            "OpenGL 3.3 is required, the context provides {:?}.",
            caps.version
        )));
    }

    if caps.max_color_attachments < 1 {
        return Err(Error::Context(
            "the OpenGL implementation does not support framebuffer objects.".into(),
        ));
    }

    Ok(())
}

unsafe fn check() -> Result<()> {
    let msg = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "an unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "a numeric argument is out of range.",
        gl::INVALID_OPERATION => "the specified operation is not allowed in the current state.",
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "the command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "there is not enough memory left to execute the command.",
        _ => "unknown OpenGL error.",
    };

    Err(Error::Backend(format!("[GL] {}", msg)))
}
