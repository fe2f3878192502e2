//! # Lumen
//!
//! A small real-time 3D rendering core. This crate provides the hardware
//! abstraction: the window and its OpenGL context, a pluggable `RenderingApi`
//! backend, the `RenderingCommand` facade every subsystem submits through, and
//! RAII owners for shaders, meshes, textures and framebuffers.
//!
//! Scenes, lighting and the frame renderer live in `lumen-world`.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub extern crate cgmath;
extern crate gl;
#[cfg(feature = "glutin-window")]
extern crate glutin;
extern crate serde_json;
extern crate smallvec;

pub mod errors;
pub mod math;
#[macro_use]
pub mod utils;
pub mod video;
pub mod window;

pub mod prelude {
    pub use crate::errors::*;
    pub use crate::math::prelude::*;
    pub use crate::utils::prelude::*;
    pub use crate::video::prelude::*;
    pub use crate::window::prelude::*;
}
