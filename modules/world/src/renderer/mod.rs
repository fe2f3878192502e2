//! The frame renderer.
//!
//! Every frame walks the same stages:
//!
//! ```text
//! Idle -> ActiveCameraResolved -> FramebufferBound -> SceneDrawn -> Presented
//! ```
//!
//! The scene is drawn into an off-screen framebuffer which is reallocated on
//! resize. Its color attachment is exposed to whoever composes the final image,
//! and `present` optionally copies it to the window before swapping buffers.
//!
//! A failing object is logged and left out of the frame; it never aborts the frame
//! for the others. Failing to allocate the framebuffer is a context error.

pub mod builtins;

pub mod prelude {
    pub use super::{FrameInfo, FrameStage, Renderer, RendererParams};
}

use std::rc::Rc;

use uuid::Uuid;

use lumen::errors::*;
use lumen::math::prelude::*;
use lumen::video::api::{PolygonMode, TextureHandle};
use lumen::video::assets::framebuffer::{Framebuffer, FramebufferAttachments};
use lumen::video::assets::mesh::Mesh;
use lumen::video::assets::shader::Shader;
use lumen::video::assets::texture::Texture;
use lumen::video::command::RenderingCommand;
use lumen::window::events::Event;
use lumen::window::GraphicsContext;

use crate::lighting::Lighting;
use crate::manager::SceneManager;
use crate::model::Model;
use crate::scene::camera::Camera;
use crate::scene::object::{SceneObject, Shading};
use crate::scene::Scene;

use self::builtins::Shaders;

/// The stages of a frame, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Idle,
    ActiveCameraResolved,
    FramebufferBound,
    SceneDrawn,
    Presented,
}

impl FrameStage {
    pub fn name(self) -> &'static str {
        match self {
            FrameStage::Idle => "Idle",
            FrameStage::ActiveCameraResolved => "ActiveCameraResolved",
            FrameStage::FramebufferBound => "FramebufferBound",
            FrameStage::SceneDrawn => "SceneDrawn",
            FrameStage::Presented => "Presented",
        }
    }

    /// A new frame may start once the previous one has been drawn. Presenting it is
    /// optional.
    #[inline]
    fn accepts_new_frame(self) -> bool {
        match self {
            FrameStage::Idle | FrameStage::SceneDrawn | FrameStage::Presented => true,
            _ => false,
        }
    }
}

/// What the draw pass of a frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameInfo {
    /// Draw calls submitted, the grid included.
    pub draw_calls: u32,
    /// Objects drawn.
    pub drawn: usize,
    /// Inactive objects and objects without a model.
    pub skipped: usize,
    /// Objects which failed to draw.
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererParams {
    /// Clears the frame when no scene is active.
    pub clear_color: Color,
    pub grid_half_extent: f32,
    pub grid_spacing: f32,
    pub grid_color: Color,
    pub polygon_mode: PolygonMode,
    /// Copies the framebuffer to the window in `present`. Turn it off when the
    /// color attachment is composed by someone else, an editor overlay for
    /// instance.
    pub present_to_screen: bool,
    pub attachments: FramebufferAttachments,
}

impl Default for RendererParams {
    fn default() -> Self {
        RendererParams {
            clear_color: Color::new(0.15, 0.15, 0.15, 1.0),
            grid_half_extent: 100.0,
            grid_spacing: 10.0,
            grid_color: Color::new(0.5, 0.5, 0.5, 0.6),
            polygon_mode: PolygonMode::Fill,
            present_to_screen: true,
            attachments: FramebufferAttachments::default(),
        }
    }
}

/// Per-frame uniforms, written into a shader the first time the frame uses it.
struct FramePass {
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    eye: Vector3<f32>,
    lit: bool,
    unlit: bool,
}

pub struct Renderer {
    command: RenderingCommand,
    params: RendererParams,

    shaders: Shaders,
    grid: Mesh,
    quad: Mesh,
    white: Texture,

    framebuffer: Option<Framebuffer>,
    viewport: Vector2<u32>,
    resized: bool,

    camera: Camera,
    default_camera: bool,
    scene: Option<Uuid>,
    idle: Rc<Scene>,

    stage: FrameStage,
    info: FrameInfo,
}

impl Renderer {
    /// Creates the renderer with its built-in shaders and meshes. The framebuffer
    /// is allocated on the first frame, sized to `viewport`.
    pub fn new(
        command: &RenderingCommand,
        params: RendererParams,
        viewport: Vector2<u32>,
    ) -> Result<Self> {
        let shaders = Shaders::new(command)?;
        let grid = builtins::grid(command, params.grid_half_extent, params.grid_spacing)?;
        let quad = builtins::screen_quad(command)?;
        let white = Texture::white(command)?;

        let mut idle = Scene::new(0, Lighting::with_capacity(0));
        idle.name = "idle".into();
        idle.set_grid_enabled(false);
        idle.set_background(params.clear_color);

        info!("Created renderer with a {}x{} viewport.", viewport.x, viewport.y);

        Ok(Renderer {
            command: command.clone(),
            params,
            shaders,
            grid,
            quad,
            white,
            framebuffer: None,
            viewport,
            resized: false,
            camera: Camera::default(),
            default_camera: true,
            scene: None,
            idle: Rc::new(idle),
            stage: FrameStage::Idle,
            info: FrameInfo::default(),
        })
    }

    #[inline]
    pub fn params(&self) -> &RendererParams {
        &self.params
    }

    #[inline]
    pub fn stage(&self) -> FrameStage {
        self.stage
    }

    /// The camera resolved for the current frame.
    #[inline]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns true if the current frame uses the default camera because the
    /// scene declares no active one.
    #[inline]
    pub fn is_default_camera(&self) -> bool {
        self.default_camera
    }

    /// The result of the last draw pass.
    #[inline]
    pub fn last_frame(&self) -> FrameInfo {
        self.info
    }

    #[inline]
    pub fn viewport(&self) -> Vector2<u32> {
        self.viewport
    }

    /// The color target of the scene and its dimensions, once the first frame
    /// allocated it.
    pub fn color_attachment(&self) -> Option<(TextureHandle, Vector2<u32>)> {
        self.framebuffer
            .as_ref()
            .map(|v| (v.color_attachment(), v.dimensions()))
    }

    /// Switches between wireframe, point and filled rendering of scene objects.
    pub fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.params.polygon_mode = mode;
    }

    /// Changes the viewport. The framebuffer is reallocated at the next frame.
    /// Empty viewports, as with minimized windows, are ignored.
    pub fn resize(&mut self, dimensions: Vector2<u32>) {
        if dimensions.x == 0 || dimensions.y == 0 {
            debug!("Ignored resizing the viewport to {}x{}.", dimensions.x, dimensions.y);
            return;
        }

        if dimensions != self.viewport {
            self.viewport = dimensions;
            self.resized = true;
        }
    }

    /// Reacts to window events. Returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        match *event {
            Event::Resized(width, height) => {
                self.resize(Vector2::new(width, height));
                true
            }
            _ => false,
        }
    }

    fn expect_stage(&self, expected: FrameStage) -> Result<()> {
        if self.stage != expected {
            return Err(Error::FrameStage {
                expected: expected.name(),
                actual: self.stage.name(),
            });
        }

        Ok(())
    }

    /// Sends the frame back to `Idle` if a step failed, so the next frame can start.
    fn rewind_on_err<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.stage = FrameStage::Idle;
        }

        result
    }

    /// Runs the setup steps of a frame for `scene` without drawing it, and leaves
    /// the renderer ready for the next frame.
    pub fn prepare(&mut self, scene: &Scene) -> Result<()> {
        self.initialize_active_camera(scene)?;
        self.initialize_framebuffer()?;
        self.initialize_scene(scene)?;
        self.stage = FrameStage::Idle;
        Ok(())
    }

    /// Resolves the camera of the frame. Falls back to the default camera if
    /// `scene` declares no active one, in which case false is returned.
    pub fn initialize_active_camera(&mut self, scene: &Scene) -> Result<bool> {
        if !self.stage.accepts_new_frame() {
            return Err(Error::FrameStage {
                expected: FrameStage::Idle.name(),
                actual: self.stage.name(),
            });
        }

        let resolved = match scene.active_camera() {
            Some(camera) => {
                self.camera = *camera;
                true
            }
            None => {
                if !self.default_camera || self.scene != Some(scene.id()) {
                    warn!(
                        "Scene '{}' has no active camera, drawing with the default one.",
                        scene.name
                    );
                }

                self.camera = Camera::default();
                false
            }
        };

        self.default_camera = !resolved;
        self.stage = FrameStage::ActiveCameraResolved;
        Ok(resolved)
    }

    /// Allocates the framebuffer on the first frame, reallocates it after a resize
    /// and binds it.
    pub fn initialize_framebuffer(&mut self) -> Result<()> {
        self.expect_stage(FrameStage::ActiveCameraResolved)?;

        if let Err(err) = self.bind_framebuffer() {
            self.stage = FrameStage::Idle;
            return Err(match err {
                Error::Context(_) => err,
                other => Error::Context(format!("failed to set up the framebuffer. {}", other)),
            });
        }

        self.stage = FrameStage::FramebufferBound;
        Ok(())
    }

    fn bind_framebuffer(&mut self) -> Result<()> {
        match self.framebuffer {
            Some(ref mut fb) => {
                if self.resized {
                    fb.resize(self.viewport)?;
                }
            }
            None => {
                let fb = Framebuffer::new(&self.command, self.viewport, self.params.attachments)?;
                info!(
                    "Allocated framebuffer {} with {}x{} pixels.",
                    fb.handle(),
                    self.viewport.x,
                    self.viewport.y
                );

                self.framebuffer = Some(fb);
            }
        }

        self.resized = false;
        match self.framebuffer {
            Some(ref fb) => fb.bind(),
            None => Err(Error::Context("framebuffer is missing.".into())),
        }
    }

    /// Primes the per-scene state the first time `scene` is drawn. Returns true if
    /// it did anything.
    pub fn initialize_scene(&mut self, scene: &Scene) -> Result<bool> {
        self.expect_stage(FrameStage::FramebufferBound)?;

        if self.scene == Some(scene.id()) {
            return Ok(false);
        }

        let cleared = self
            .command
            .set_clear_color(scene.background())
            .and_then(|_| self.command.clear(true, true));
        self.rewind_on_err(cleared)?;
        self.scene = Some(scene.id());

        info!(
            "Initialized scene '{}' with {} objects and {} lights.",
            scene.name,
            scene.len(),
            scene.lighting().len()
        );

        Ok(true)
    }

    /// Clears the framebuffer and draws every active object of `scene` in order,
    /// followed by the grid.
    pub fn draw_scene(&mut self, scene: &Scene) -> Result<FrameInfo> {
        self.expect_stage(FrameStage::FramebufferBound)?;

        let before = self.command.statistics().draw_calls;
        let cleared = self
            .command
            .set_polygon_mode(self.params.polygon_mode)
            .and_then(|_| self.command.set_clear_color(scene.background()))
            .and_then(|_| self.command.clear(true, true));
        self.rewind_on_err(cleared)?;

        let aspect = self.viewport.x as f32 / self.viewport.y as f32;
        let mut pass = FramePass {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect),
            eye: self.camera.position,
            lit: false,
            unlit: false,
        };

        let mut info = FrameInfo::default();
        for (handle, object) in scene.objects() {
            let model = match object.drawable() {
                Some(model) => model,
                None => {
                    info.skipped += 1;
                    continue;
                }
            };

            match self.draw_object(scene, object, model, &mut pass) {
                Ok(_) => info.drawn += 1,
                Err(err) => {
                    warn!("Failed to draw {} '{}'. {}", handle, object.name, err);
                    info.failed += 1;
                }
            }
        }

        if scene.grid_enabled() {
            if let Err(err) = self.draw_grid(&pass) {
                warn!("Failed to draw the grid. {}", err);
            }
        }

        info.draw_calls = (self.command.statistics().draw_calls - before) as u32;
        self.info = info;
        self.stage = FrameStage::SceneDrawn;
        Ok(info)
    }

    fn draw_object(
        &self,
        scene: &Scene,
        object: &SceneObject,
        model: &Model,
        pass: &mut FramePass,
    ) -> Result<()> {
        let shader = match object.shading {
            Shading::Lit => &self.shaders.lit,
            Shading::Unlit => &self.shaders.unlit,
        };

        shader.bind()?;

        // Lights go into the lit program before its first draw of the frame.
        let prepared = match object.shading {
            Shading::Lit => &mut pass.lit,
            Shading::Unlit => &mut pass.unlit,
        };

        if !*prepared {
            if object.shading == Shading::Lit {
                scene.lighting().upload_to_shader(shader)?;
                shader.set_uniform("u_ViewPos", pass.eye)?;
            }

            shader.set_uniform("u_View", pass.view)?;
            shader.set_uniform("u_Projection", pass.projection)?;
            *prepared = true;
        }

        shader.set_uniform("u_Model", object.transform.matrix())?;
        shader.set_uniform("u_NormalMatrix", object.transform.normal_matrix())?;
        model.draw(shader, &self.white, object.material.as_ref())
    }

    fn draw_grid(&self, pass: &FramePass) -> Result<()> {
        let shader: &Shader = &self.shaders.grid;
        shader.bind()?;
        shader.set_uniform("u_View", pass.view)?;
        shader.set_uniform("u_Projection", pass.projection)?;
        shader.set_uniform("u_Color", self.params.grid_color)?;
        shader.set_uniform("u_Extent", self.params.grid_half_extent)?;
        self.grid.draw()
    }

    /// Finishes the frame: copies the scene to the window if configured to, and
    /// swaps the buffers of `context`.
    pub fn present(&mut self, context: &GraphicsContext) -> Result<()> {
        self.expect_stage(FrameStage::SceneDrawn)?;

        if self.params.present_to_screen {
            if let Err(err) = self.blit(context.dimensions()) {
                warn!("Failed to copy the framebuffer to the screen. {}", err);
            }
        }

        if let Err(err) = context.present() {
            self.stage = FrameStage::Idle;
            return Err(err);
        }

        self.stage = FrameStage::Presented;
        Ok(())
    }

    fn blit(&self, dimensions: Vector2<u32>) -> Result<()> {
        let color = match self.framebuffer {
            Some(ref fb) => fb.color_attachment(),
            None => return Ok(()),
        };

        self.command.bind_frame_buffer(None)?;
        self.command.set_viewport(Vector2::new(0, 0), dimensions)?;
        self.command.set_polygon_mode(PolygonMode::Fill)?;
        self.command.set_clear_color(self.params.clear_color)?;
        self.command.clear(true, true)?;

        let shader = &self.shaders.screen;
        shader.bind()?;
        self.command.bind_texture(0, color)?;
        shader.set_uniform("u_Texture", 0)?;
        self.quad.draw()
    }

    /// Draws `scene` into the framebuffer, walking every stage up to `SceneDrawn`.
    pub fn render(&mut self, scene: &Scene) -> Result<FrameInfo> {
        self.initialize_active_camera(scene)?;
        self.initialize_framebuffer()?;
        self.initialize_scene(scene)?;
        self.draw_scene(scene)
    }

    /// Draws the active scene of `manager`, or just clears the frame if there is
    /// none.
    pub fn render_frame(&mut self, manager: &SceneManager) -> Result<FrameInfo> {
        match manager.active_scene() {
            Some(scene) => self.render(scene),
            None => {
                let idle = self.idle.clone();
                self.render(&idle)
            }
        }
    }
}

impl ::std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Renderer")
            .field("stage", &self.stage)
            .field("viewport", &self.viewport)
            .field("scene", &self.scene)
            .field("info", &self.info)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::loader::ModelLoader;
    use crate::model::obj::ObjImporter;
    use crate::model::primitives::Shape;
    use crate::model::texture_cache::EvictionPolicy;

    fn scene(command: &RenderingCommand) -> Scene {
        let mut loader =
            ModelLoader::new(command, Box::new(ObjImporter::new()), EvictionPolicy::Never);
        let cube = loader.load_shape(Shape::Cube).unwrap();

        let mut scene = Scene::default();
        scene.add_camera("main", Camera::default());
        scene.add_object(SceneObject::new("a", cube.clone())).unwrap();
        scene
            .add_object(SceneObject::new("b", cube).with_shading(Shading::Unlit))
            .unwrap();
        scene
    }

    #[test]
    fn stages() {
        let command = RenderingCommand::headless();
        let context = GraphicsContext::headless(Vector2::new(64, 64));
        let mut renderer = Renderer::new(&command, Default::default(), context.dimensions()).unwrap();
        let scene = scene(&command);

        match renderer.draw_scene(&scene) {
            Err(Error::FrameStage { expected, actual }) => {
                assert_eq!(expected, "FramebufferBound");
                assert_eq!(actual, "Idle");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(renderer.present(&context).is_err());
        assert!(renderer.initialize_framebuffer().is_err());

        assert!(renderer.initialize_active_camera(&scene).unwrap());
        assert_eq!(renderer.stage(), FrameStage::ActiveCameraResolved);
        assert!(renderer.initialize_active_camera(&scene).is_err());

        renderer.initialize_framebuffer().unwrap();
        assert!(renderer.initialize_scene(&scene).unwrap());
        assert!(!renderer.initialize_scene(&scene).unwrap());

        let info = renderer.draw_scene(&scene).unwrap();
        assert_eq!(info.drawn, 2);
        assert_eq!(info.draw_calls, 3);
        assert_eq!(renderer.stage(), FrameStage::SceneDrawn);

        renderer.present(&context).unwrap();
        assert_eq!(renderer.stage(), FrameStage::Presented);

        let info = renderer.render(&scene).unwrap();
        assert_eq!(info.drawn, 2);
    }

    #[test]
    fn default_camera() {
        let command = RenderingCommand::headless();
        let mut renderer = Renderer::new(&command, Default::default(), Vector2::new(32, 32)).unwrap();

        let mut scene = scene(&command);
        scene.remove_camera("main");
        scene.set_grid_enabled(false);

        let info = renderer.render(&scene).unwrap();
        assert!(renderer.is_default_camera());
        assert_eq!(renderer.camera(), &Camera::default());
        assert_eq!(info.draw_calls, 2);
    }

    #[test]
    fn resize() {
        let command = RenderingCommand::headless();
        let mut renderer = Renderer::new(&command, Default::default(), Vector2::new(32, 32)).unwrap();
        let scene = Scene::default();
        assert!(renderer.color_attachment().is_none());

        renderer.render(&scene).unwrap();
        assert_eq!(renderer.color_attachment().unwrap().1, Vector2::new(32, 32));

        assert!(renderer.handle_event(&Event::Resized(80, 40)));
        assert!(!renderer.handle_event(&Event::GainFocus));
        renderer.resize(Vector2::new(0, 40));

        renderer.render(&scene).unwrap();
        let (color, dimensions) = renderer.color_attachment().unwrap();
        assert_eq!(dimensions, Vector2::new(80, 40));
        assert!(command.bind_texture(0, color).is_ok());

        let stats = command.statistics();
        assert_eq!(stats.framebuffer_allocations, 2);
        assert_eq!(stats.framebuffer_releases, 1);
    }
}
