mod headless;

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::events::Event;

/// The native window and context of a `GraphicsContext`.
pub trait Visitor {
    fn show(&self);
    fn hide(&self);
    fn dimensions(&self) -> Vector2<u32>;
    fn device_pixel_ratio(&self) -> f32;
    fn resize(&mut self, dimensions: Vector2<u32>);
    fn poll_events(&mut self, events: &mut Vec<Event>);
    fn is_current(&self) -> bool;
    fn make_current(&self) -> Result<()>;
    fn swap_buffers(&self) -> Result<()>;
}

pub fn new_headless(dimensions: Vector2<u32>) -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new(dimensions))
}

#[cfg(feature = "glutin-window")]
mod glutin;
#[cfg(feature = "glutin-window")]
pub use self::glutin::new;
