//! Owns the active scene and replaces it atomically.

use lumen::errors::*;
use lumen::math::prelude::Vector3;

use crate::lighting::light::{Attenuation, Light};
use crate::lighting::Lighting;
use crate::model::loader::ModelLoader;
use crate::renderer::Renderer;
use crate::scene::camera::Camera;
use crate::scene::descriptor::SceneDescriptor;
use crate::scene::Scene;
use crate::settings::{LightingParams, SceneParams};

/// Holds zero or one active scene together with the loader its models come from.
///
/// A new scene is built completely before it replaces the active one. If building
/// fails, the active scene is left untouched.
pub struct SceneManager {
    loader: ModelLoader,
    active: Option<Scene>,
    generation: u64,
    scene: SceneParams,
    lighting: LightingParams,
}

impl SceneManager {
    pub fn new(loader: ModelLoader, scene: SceneParams, lighting: LightingParams) -> Self {
        SceneManager {
            loader,
            active: None,
            generation: 0,
            scene,
            lighting,
        }
    }

    #[inline]
    pub fn loader(&self) -> &ModelLoader {
        &self.loader
    }

    #[inline]
    pub fn loader_mut(&mut self) -> &mut ModelLoader {
        &mut self.loader
    }

    #[inline]
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    /// Edits go through the returned borrow, so they can not interleave with a
    /// frame being drawn.
    #[inline]
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut()
    }

    /// Increased every time the active scene is replaced or unloaded.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Builds a scene out of `descriptor` and makes it the active one. The previous
    /// scene is released only after the new one is complete.
    pub fn load_scene(&mut self, descriptor: &SceneDescriptor) -> Result<()> {
        let scene = Scene::from_descriptor(
            descriptor,
            &mut self.loader,
            self.scene.max_objects,
            self.lighting.capacity,
        )
        .map_err(|err| {
            warn!("Failed to load scene '{}'. {}", descriptor.name, err);
            Error::SceneSwap(format!("scene '{}' is not loaded. {}", descriptor.name, err))
        })?;

        self.install(scene);
        Ok(())
    }

    /// Makes a minimal scene active: no objects, one point light, the default
    /// camera and the grid.
    pub fn load_default_scene(&mut self) -> Result<()> {
        let mut lighting = Lighting::with_capacity(self.lighting.capacity);
        let light = Light::point(
            "default",
            Vector3::new(3.3, 1.3, 0.3),
            Attenuation::new(0.1, 0.09, 0.032),
        )
        .with_colors(
            Vector3::new(0.2, 0.2, 0.2),
            Vector3::new(2.0, 2.0, 2.0),
            Vector3::new(2.0, 2.0, 2.0),
        );

        lighting
            .add_light(light)
            .map_err(|err| Error::SceneSwap(format!("default scene is not loaded. {}", err)))?;

        let mut scene = Scene::new(self.scene.max_objects, lighting);
        scene.name = "default".into();
        scene.add_camera("main", Camera::default());
        scene.set_grid_enabled(true);

        self.install(scene);
        Ok(())
    }

    /// Drops the active scene. Returns false if there was none.
    pub fn unload_scene(&mut self) -> bool {
        match self.active.take() {
            Some(scene) => {
                info!("Unloaded scene '{}'.", scene.name);
                drop(scene);

                self.generation += 1;
                self.on_scene_unload();
                true
            }
            None => false,
        }
    }

    /// Describes the active scene.
    pub fn save_scene(&self) -> Option<SceneDescriptor> {
        self.active.as_ref().map(|v| v.to_descriptor())
    }

    /// Resolves the camera and sizes the framebuffer of `renderer` for the active
    /// scene, priming its per-scene state if the scene is new to it.
    pub fn initialize_scene_renderer(&self, renderer: &mut Renderer) -> Result<()> {
        let scene = self
            .active
            .as_ref()
            .ok_or_else(|| Error::SceneSwap("no scene is active.".into()))?;

        renderer.prepare(scene)
    }

    fn install(&mut self, scene: Scene) {
        info!(
            "Activated scene '{}' with {} objects and {} lights.",
            scene.name,
            scene.len(),
            scene.lighting().len()
        );

        let prev = ::std::mem::replace(&mut self.active, Some(scene));
        drop(prev);

        self.generation += 1;
        self.on_scene_unload();
    }

    fn on_scene_unload(&mut self) {
        self.loader.cache_mut().on_scene_unload();
    }
}

impl ::std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("active", &self.active)
            .field("generation", &self.generation)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::obj::ObjImporter;
    use crate::model::texture_cache::EvictionPolicy;
    use lumen::video::command::RenderingCommand;

    fn manager(command: &RenderingCommand) -> SceneManager {
        let loader = ModelLoader::new(command, Box::new(ObjImporter::new()), EvictionPolicy::Never);
        SceneManager::new(loader, SceneParams::default(), LightingParams::default())
    }

    #[test]
    fn default_scene() {
        let command = RenderingCommand::headless();
        let mut manager = manager(&command);
        assert!(manager.active_scene().is_none());
        assert!(manager.save_scene().is_none());

        manager.load_default_scene().unwrap();
        let scene = manager.active_scene().unwrap();
        assert!(scene.is_empty());
        assert!(scene.grid_enabled());
        assert_eq!(scene.lighting().len(), 1);
        assert_eq!(scene.active_camera(), Some(&Camera::default()));
        assert!(scene.lighting().get("default").unwrap().attenuation().is_some());
        assert_eq!(manager.generation(), 1);

        assert!(manager.unload_scene());
        assert!(!manager.unload_scene());
        assert_eq!(manager.generation(), 2);
    }

    #[test]
    fn failed_swap() {
        let command = RenderingCommand::headless();
        let mut manager = manager(&command);
        manager.load_default_scene().unwrap();
        let id = manager.active_scene().unwrap().id();

        let mut desc = SceneDescriptor::default();
        desc.active_camera = Some("missing".into());

        match manager.load_scene(&desc) {
            Err(Error::SceneSwap(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(manager.active_scene().unwrap().id(), id);
        assert_eq!(manager.generation(), 1);
    }
}
