use glutin;

use super::super::super::events::Event;

pub fn from_event(source: glutin::Event, dpr: f64) -> Option<Event> {
    match source {
        glutin::Event::WindowEvent { event, .. } => from_window_event(&event, dpr),

        glutin::Event::Suspended(v) => {
            if v {
                Some(Event::Suspended)
            } else {
                Some(Event::Resumed)
            }
        }

        _ => None,
    }
}

fn from_window_event(source: &glutin::WindowEvent, dpr: f64) -> Option<Event> {
    match *source {
        glutin::WindowEvent::CloseRequested => Some(Event::Closed),

        glutin::WindowEvent::Focused(v) => {
            if v {
                Some(Event::GainFocus)
            } else {
                Some(Event::LostFocus)
            }
        }

        // Framebuffers are sized in physical pixels.
        glutin::WindowEvent::Resized(size) => {
            let size = size.to_physical(dpr);
            Some(Event::Resized(size.width as u32, size.height as u32))
        }

        glutin::WindowEvent::Moved(pos) => Some(Event::Moved(pos.x as i32, pos.y as i32)),

        _ => None,
    }
}
