//! Scenes, lighting, models and the frame renderer of `lumen`.
//!
//! A `SceneManager` owns the active `Scene`, built from a `SceneDescriptor` with
//! models uploaded through a `ModelLoader`. Every frame, the `Renderer` resolves
//! the active camera, binds its off-screen framebuffer and draws the scene into
//! it, before presenting it through the `GraphicsContext`.
//!
//! All of it runs on the thread owning the graphics context. The only exception is
//! `ModelLoader::parse`, which decodes model files on any thread.

#[macro_use]
extern crate lumen;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

extern crate bincode;
extern crate image;
extern crate inlinable_string;
extern crate serde_json;
extern crate tobj;
extern crate uuid;

pub mod lighting;
pub mod manager;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod transform;

pub mod prelude {
    pub use super::lighting::prelude::*;
    pub use super::manager::SceneManager;
    pub use super::model::prelude::*;
    pub use super::renderer::prelude::*;
    pub use super::scene::prelude::*;
    pub use super::settings::{LightingParams, ResourceParams, SceneParams, Settings};
    pub use super::transform::Transform;
}
