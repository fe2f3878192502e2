use crate::errors::*;
use crate::math::prelude::Vector2;

use super::super::events::Event;
use super::Visitor;

/// A context without any native window. Resizing it queues a `Resized` event
/// which is delivered by the next `poll_events`.
pub struct HeadlessVisitor {
    dimensions: Vector2<u32>,
    events: Vec<Event>,
}

impl HeadlessVisitor {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        HeadlessVisitor {
            dimensions,
            events: Vec::new(),
        }
    }
}

impl Visitor for HeadlessVisitor {
    #[inline]
    fn show(&self) {}

    #[inline]
    fn hide(&self) {}

    #[inline]
    fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    fn resize(&mut self, dimensions: Vector2<u32>) {
        if self.dimensions != dimensions {
            self.dimensions = dimensions;
            self.events
                .push(Event::Resized(dimensions.x, dimensions.y));
        }
    }

    #[inline]
    fn poll_events(&mut self, events: &mut Vec<Event>) {
        events.extend(self.events.drain(..));
    }

    #[inline]
    fn is_current(&self) -> bool {
        true
    }

    #[inline]
    fn make_current(&self) -> Result<()> {
        Ok(())
    }

    #[inline]
    fn swap_buffers(&self) -> Result<()> {
        Ok(())
    }
}
