//! Represents an OpenGL context and the window or environment around it.
//!
//! A `GraphicsContext` is created together with its window and destroyed with it.
//! Exactly one context is current per thread; every rendering call must be issued
//! from the thread owning the current context.

pub mod events;

pub mod prelude {
    pub use super::events::Event;
    pub use super::{GraphicsContext, WindowParams};
}

mod backends;

use std::marker::PhantomData;

use crate::errors::*;
use crate::math::prelude::Vector2;

use self::backends::Visitor;
use self::events::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request. A value of 0 indicates that
    /// multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "lumen".to_owned(),
            size: Vector2::new(1280, 720),
            multisample: 0,
            vsync: true,
        }
    }
}

/// Owns the native drawing surface and its rendering context.
pub struct GraphicsContext {
    visitor: Box<dyn Visitor>,
    headless: bool,
    pushed: Vec<Event>,
    // Native contexts are bound to the thread that created them.
    _unsend: PhantomData<*const ()>,
}

impl GraphicsContext {
    /// Creates a native window together with an OpenGL context, makes the context
    /// current and loads the GL entry points.
    #[cfg(feature = "glutin-window")]
    pub fn new(params: &WindowParams) -> Result<Self> {
        let visitor = backends::new(params)?;
        Ok(GraphicsContext {
            visitor,
            headless: false,
            pushed: Vec::new(),
            _unsend: PhantomData,
        })
    }

    /// Creates a context which has no native window. Presenting is a no-op and
    /// `resize` emits a `Resized` event on the next poll.
    pub fn headless<T: Into<Vector2<u32>>>(dimensions: T) -> Self {
        GraphicsContext {
            visitor: backends::new_headless(dimensions.into()),
            headless: true,
            pushed: Vec::new(),
            _unsend: PhantomData,
        }
    }

    #[inline]
    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Sets the context as the active context in this thread.
    #[inline]
    pub fn make_current(&self) -> Result<()> {
        self.visitor.make_current()
    }

    /// Returns true if this context is the current one in this thread.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.visitor.is_current()
    }

    /// Swaps the buffers in case of double or triple buffering.
    ///
    /// **Warning**: if you enabled vsync, this function will block until the next time the screen
    /// is refreshed. However drivers can choose to override your vsync settings, which means that
    /// you can't know in advance whether `present` will block or not.
    #[inline]
    pub fn present(&self) -> Result<()> {
        self.visitor.swap_buffers()
    }

    /// Collects the events emitted since the last poll. Pushed events come first.
    pub fn poll_events(&mut self) -> Vec<Event> {
        let mut events: Vec<_> = self.pushed.drain(..).collect();
        self.visitor.poll_events(&mut events);
        events
    }

    /// Queues an event to be delivered by the next `poll_events`, as if the window
    /// had emitted it.
    pub fn push_event(&mut self, event: Event) {
        self.pushed.push(event);
    }

    /// Returns the size in pixels of the drawable area.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.visitor.dimensions()
    }

    /// Returns the ratio between the backing framebuffer resolution and the window size in
    /// screen pixels. This is typically one for a normal display and two for a retina display.
    #[inline]
    pub fn device_pixel_ratio(&self) -> f32 {
        self.visitor.device_pixel_ratio()
    }

    /// Resizes the drawable area, in pixels.
    #[inline]
    pub fn resize<T: Into<Vector2<u32>>>(&mut self, dimensions: T) {
        self.visitor.resize(dimensions.into());
    }

    /// Shows the window if it was hidden.
    #[inline]
    pub fn show(&self) {
        self.visitor.show();
    }

    /// Hides the window if it was visible.
    #[inline]
    pub fn hide(&self) {
        self.visitor.hide();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn headless() {
        let mut ctx = GraphicsContext::headless(Vector2::new(64, 32));
        assert!(ctx.is_headless());
        assert!(ctx.is_current());
        assert_eq!(ctx.dimensions(), Vector2::new(64, 32));
        assert!(ctx.poll_events().is_empty());

        ctx.resize(Vector2::new(128, 64));
        ctx.resize(Vector2::new(128, 64));
        assert_eq!(ctx.poll_events(), vec![Event::Resized(128, 64)]);
        assert!(ctx.poll_events().is_empty());
        assert!(ctx.present().is_ok());

        ctx.push_event(Event::Closed);
        ctx.resize(Vector2::new(32, 32));
        assert_eq!(
            ctx.poll_events(),
            vec![Event::Closed, Event::Resized(32, 32)]
        );
    }
}
