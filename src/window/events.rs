/// Events emitted by the window that owns a graphics context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The window has been resumed.
    Resumed,
    /// The window has been suspended.
    Suspended,
    /// The window has been closed.
    Closed,
    /// The window gained focus of user input.
    GainFocus,
    /// The window lost focus of user input.
    LostFocus,
    /// The size of the drawable area has changed, in pixels.
    Resized(u32, u32),
    /// The position of window has changed.
    Moved(i32, i32),
}
