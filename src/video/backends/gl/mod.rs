pub mod api;
pub mod capabilities;
pub mod types;

pub use self::api::GLRenderingApi;
