//! GPU images and their sampling parameters.

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::super::api::TextureHandle;
use super::super::command::RenderingCommand;

/// List of all the possible formats of uncompressed texture data.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureFormat {
    R8,
    RG8,
    RGB8,
    RGBA8,
}

impl TextureFormat {
    /// Returns the number of bytes of a single pixel.
    pub fn size(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RG8 => 2,
            TextureFormat::RGB8 => 3,
            TextureFormat::RGBA8 => 4,
        }
    }

    /// Picks the format of an image with `components` channels.
    pub fn from_components(components: usize) -> Option<Self> {
        match components {
            1 => Some(TextureFormat::R8),
            2 => Some(TextureFormat::RG8),
            3 => Some(TextureFormat::RGB8),
            4 => Some(TextureFormat::RGBA8),
            _ => None,
        }
    }
}

/// Sets the wrap parameter for texture.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureWrap {
    Repeat,
    Mirror,
    Clamp,
    /// Coordinates outside of the texture sample a transparent border.
    Border,
}

/// Sets the filter parameter for texture.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct TextureParams {
    pub format: TextureFormat,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub dimensions: Vector2<u32>,
    /// Generates the full mipmap chain after upload.
    pub mipmap: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            format: TextureFormat::RGBA8,
            wrap: TextureWrap::Repeat,
            filter: TextureFilter::Linear,
            dimensions: Vector2::new(0, 0),
            mipmap: true,
        }
    }
}

impl TextureParams {
    /// Returns the expected length of tightly packed pixel data.
    #[inline]
    pub fn len(&self) -> usize {
        self.dimensions.x as usize * self.dimensions.y as usize * self.format.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        if self.dimensions.x == 0 || self.dimensions.y == 0 {
            return Err(Error::Backend(format!(
                "texture dimensions {}x{} are empty.",
                self.dimensions.x, self.dimensions.y
            )));
        }

        if let Some(bytes) = data {
            if bytes.len() != self.len() {
                return Err(Error::Backend(format!(
                    "texture expects {} bytes of pixel data, got {}.",
                    self.len(),
                    bytes.len()
                )));
            }
        }

        Ok(())
    }
}

/// An uploaded GPU image. The native texture is released when this is dropped;
/// share it between models with `Rc<Texture>`.
pub struct Texture {
    command: RenderingCommand,
    handle: TextureHandle,
    params: TextureParams,
}

impl Texture {
    pub fn new(command: &RenderingCommand, params: TextureParams, data: Option<&[u8]>) -> Result<Self> {
        params.validate(data)?;
        let handle = command.init_texture(&params, data)?;

        Ok(Texture {
            command: command.clone(),
            handle,
            params,
        })
    }

    /// A 1x1 opaque white texture, bound in place of missing material textures.
    pub fn white(command: &RenderingCommand) -> Result<Self> {
        let mut params = TextureParams::default();
        params.dimensions = Vector2::new(1, 1);
        params.mipmap = false;
        Self::new(command, params, Some(&[255, 255, 255, 255]))
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[inline]
    pub fn params(&self) -> &TextureParams {
        &self.params
    }

    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.params.dimensions
    }

    #[inline]
    pub fn bind(&self, unit: u32) -> Result<()> {
        self.command.bind_texture(unit, self.handle)
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Err(err) = self.command.delete_texture(self.handle) {
            warn!("Failed to release texture {}. {}", self.handle, err);
        }
    }
}

impl ::std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Texture")
            .field("handle", &self.handle)
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn validate() {
        let mut params = TextureParams::default();
        assert!(params.validate(None).is_err());

        params.dimensions = Vector2::new(2, 2);
        params.format = TextureFormat::RGB8;
        assert_eq!(params.len(), 12);
        assert!(params.validate(Some(&[0; 12])).is_ok());
        assert!(params.validate(Some(&[0; 16])).is_err());
        assert!(params.validate(None).is_ok());
    }

    #[test]
    fn lifetime() {
        let command = RenderingCommand::headless();
        let texture = Texture::white(&command).unwrap();
        assert_eq!(texture.dimensions(), Vector2::new(1, 1));
        assert!(texture.bind(0).is_ok());

        let stats = command.statistics();
        assert_eq!(stats.texture_uploads, 1);
        assert_eq!(stats.alive_textures, 1);

        drop(texture);
        assert_eq!(command.statistics().alive_textures, 0);
    }
}
