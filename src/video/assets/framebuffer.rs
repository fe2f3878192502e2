//! Off-screen render targets.

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::super::api::{FramebufferHandle, TextureHandle};
use super::super::command::RenderingCommand;
use super::texture::{TextureFilter, TextureFormat, TextureWrap};

/// Describes the attachments of a framebuffer.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct FramebufferAttachments {
    /// Format of the color attachment, which can be sampled as a texture.
    pub color: TextureFormat,
    pub filter: TextureFilter,
    pub wrap: TextureWrap,
    /// Attaches a depth buffer.
    pub depth: bool,
}

impl Default for FramebufferAttachments {
    fn default() -> Self {
        FramebufferAttachments {
            color: TextureFormat::RGBA8,
            filter: TextureFilter::Linear,
            wrap: TextureWrap::Border,
            depth: true,
        }
    }
}

/// An off-screen target with a sampleable color attachment.
///
/// Resizing reallocates the native object: the new target is created first and the
/// previous one, attachments included, is released once that succeeded.
pub struct Framebuffer {
    command: RenderingCommand,
    handle: FramebufferHandle,
    color: TextureHandle,
    dimensions: Vector2<u32>,
    attachments: FramebufferAttachments,
}

impl Framebuffer {
    pub fn new(
        command: &RenderingCommand,
        dimensions: Vector2<u32>,
        attachments: FramebufferAttachments,
    ) -> Result<Self> {
        let (handle, color) = Self::allocate(command, dimensions, &attachments)?;

        Ok(Framebuffer {
            command: command.clone(),
            handle,
            color,
            dimensions,
            attachments,
        })
    }

    fn allocate(
        command: &RenderingCommand,
        dimensions: Vector2<u32>,
        attachments: &FramebufferAttachments,
    ) -> Result<(FramebufferHandle, TextureHandle)> {
        if dimensions.x == 0 || dimensions.y == 0 {
            return Err(Error::Context(format!(
                "can not allocate a {}x{} framebuffer.",
                dimensions.x, dimensions.y
            )));
        }

        let handle = command.init_frame_buffer(dimensions, attachments)?;
        match command.framebuffer_color_attachment(handle) {
            Ok(color) => Ok((handle, color)),
            Err(err) => {
                let _ = command.delete_frame_buffer(handle);
                Err(err)
            }
        }
    }

    /// Reallocates this framebuffer with new dimensions. Does nothing if the
    /// dimensions are unchanged.
    pub fn resize(&mut self, dimensions: Vector2<u32>) -> Result<()> {
        if dimensions == self.dimensions {
            return Ok(());
        }

        let (handle, color) = Self::allocate(&self.command, dimensions, &self.attachments)?;
        let prev = ::std::mem::replace(&mut self.handle, handle);
        self.color = color;
        self.dimensions = dimensions;

        info!(
            "Reallocated framebuffer {} as {} with {}x{} pixels.",
            prev, handle, dimensions.x, dimensions.y
        );

        self.command.delete_frame_buffer(prev)
    }

    #[inline]
    pub fn handle(&self) -> FramebufferHandle {
        self.handle
    }

    /// The texture backing the color attachment.
    #[inline]
    pub fn color_attachment(&self) -> TextureHandle {
        self.color
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    /// Binds this framebuffer and sets the viewport to cover all of it.
    pub fn bind(&self) -> Result<()> {
        self.command.bind_frame_buffer(Some(self.handle))?;
        self.command.set_viewport(Vector2::new(0, 0), self.dimensions)
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        if let Err(err) = self.command.delete_frame_buffer(self.handle) {
            warn!("Failed to release framebuffer {}. {}", self.handle, err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resize() {
        let command = RenderingCommand::headless();
        let mut fb =
            Framebuffer::new(&command, Vector2::new(32, 32), FramebufferAttachments::default())
                .unwrap();
        assert!(fb.bind().is_ok());

        let prev = fb.handle();
        fb.resize(Vector2::new(64, 16)).unwrap();
        assert_ne!(prev, fb.handle());
        assert_eq!(fb.dimensions(), Vector2::new(64, 16));
        assert_eq!(
            command.framebuffer_dimensions(fb.handle()).unwrap(),
            Vector2::new(64, 16)
        );
        assert!(command.framebuffer_dimensions(prev).is_err());

        fb.resize(Vector2::new(64, 16)).unwrap();
        let stats = command.statistics();
        assert_eq!(stats.framebuffer_allocations, 2);
        assert_eq!(stats.framebuffer_releases, 1);
        assert_eq!(stats.alive_framebuffers, 1);
    }

    #[test]
    fn zero_sized() {
        let command = RenderingCommand::headless();
        let mut fb =
            Framebuffer::new(&command, Vector2::new(8, 8), FramebufferAttachments::default())
                .unwrap();

        assert!(fb.resize(Vector2::new(0, 8)).is_err());
        assert_eq!(fb.dimensions(), Vector2::new(8, 8));
        assert!(Framebuffer::new(&command, Vector2::new(0, 0), Default::default()).is_err());
    }
}
