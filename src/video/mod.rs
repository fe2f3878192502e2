//! The low level rendering layer: a backend-agnostic `RenderingApi`, the
//! `RenderingCommand` facade dispatching to it, and RAII owners of GPU resources.

pub mod api;
pub mod assets;
pub mod backends;
pub mod command;

pub mod prelude {
    pub use super::api::{
        ApiCapabilities, ElementBufferHandle, FramebufferHandle, PolygonMode, RenderingApi,
        ShaderProgramHandle, ShaderStageHandle, Statistics, TextureHandle, VertexArrayHandle,
        VertexBufferHandle,
    };
    pub use super::assets::prelude::*;
    pub use super::backends::BackendKind;
    pub use super::command::RenderingCommand;
}
