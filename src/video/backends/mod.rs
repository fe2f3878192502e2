//! Implementations of `RenderingApi`. Exactly one of them is installed into the
//! `RenderingCommand` at startup.

pub mod gl;
pub mod headless;

use crate::errors::*;
use crate::window::GraphicsContext;

use super::api::RenderingApi;

/// Selects the backend installed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackendKind {
    OpenGL,
    Headless,
}

impl Default for BackendKind {
    fn default() -> Self {
        BackendKind::OpenGL
    }
}

/// Creates the backend of `kind` for `context`.
pub fn new(kind: BackendKind, context: &GraphicsContext) -> Result<Box<dyn RenderingApi>> {
    match kind {
        BackendKind::OpenGL => new_gl(context),
        BackendKind::Headless => Ok(new_headless()),
    }
}

pub fn new_headless() -> Box<dyn RenderingApi> {
    Box::new(self::headless::HeadlessApi::new())
}

/// Creates an OpenGL backend. The native context of `context` must be current on
/// this thread, with its entry points loaded.
pub fn new_gl(context: &GraphicsContext) -> Result<Box<dyn RenderingApi>> {
    if context.is_headless() {
        return Err(Error::Context(
            "an OpenGL backend requires a native context.".into(),
        ));
    }

    if !context.is_current() {
        return Err(Error::Context("the OpenGL context is not current.".into()));
    }

    let api = unsafe { self::gl::GLRenderingApi::new()? };
    Ok(Box::new(api))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::math::prelude::Vector2;

    #[test]
    fn requires_native_context() {
        let context = GraphicsContext::headless(Vector2::new(64, 64));
        assert!(new_gl(&context).is_err());
        match new(BackendKind::OpenGL, &context) {
            Err(err) => assert!(err.is_fatal()),
            Ok(_) => panic!("created an OpenGL backend without a native context."),
        }

        let api = new(BackendKind::Headless, &context).unwrap();
        assert_eq!(api.capabilities().name, "Headless");
    }
}
