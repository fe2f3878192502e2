use gl;
use gl::types::*;
use std::cmp;
use std::ffi;

use crate::errors::*;

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    /// The context uses only future-compatible functions and definitions.
    Core,
    /// The context includes all immediate mode functions and definitions.
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version of the same API, so both
/// `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >= Version::GL(3, 0)`
/// are `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        match (*self, *other) {
            (Version::GL(a0, b0), Version::GL(a1, b1)) => Some((a0, b0).cmp(&(a1, b1))),
            (Version::ES(a0, b0), Version::ES(a1, b1)) => Some((a0, b0).cmp(&(a1, b1))),
            _ => None,
        }
    }
}

impl Version {
    /// Parses the string returned by `glGetString(GL_VERSION)`, e.g. `4.1 Metal - 76.3`
    /// or `OpenGL ES 3.0 Mesa 20.0`.
    pub fn parse_str(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else {
            (false, desc)
        };

        let malformed = || Error::Backend(format!("version string {:?} is malformed.", desc));

        let mut iter = desc
            .split(' ')
            .next()
            .ok_or_else(malformed)?
            .split('.');

        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// The loaded functions must belong to the current context.
    pub unsafe fn parse() -> Result<Version> {
        Version::parse_str(&read_str(gl::VERSION)?)
    }
}

macro_rules! extensions {
    ($($string:expr => $field:ident,)+) => {
        /// Contains data about the list of extensions.
        #[derive(Debug, Clone, Copy, Default)]
        pub struct Extensions {
            $(
                pub $field: bool,
            )+
        }

        impl Extensions {
            /// Returns the list of extensions supported by the current context.
            pub unsafe fn parse(version: Version) -> Result<Extensions> {
                let mut strings = Vec::new();
                if version >= Version::GL(3, 0) || version >= Version::ES(3, 0) {
                    let mut num = 0;
                    gl::GetIntegerv(gl::NUM_EXTENSIONS, &mut num);
                    for i in 0..num {
                        let ext = gl::GetStringi(gl::EXTENSIONS, i as GLuint);
                        if !ext.is_null() {
                            let ext = ffi::CStr::from_ptr(ext as *const _);
                            strings.push(ext.to_string_lossy().into_owned());
                        }
                    }
                } else {
                    let list = read_str(gl::EXTENSIONS)?;
                    strings.extend(list.split(' ').map(|e| e.to_owned()));
                }

                let mut extensions = Extensions::default();
                for extension in strings {
                    match &extension[..] {
                        $(
                            $string => extensions.$field = true,
                        )+
                        _ => ()
                    }
                }

                Ok(extensions)
            }
        }
    }
}

extensions! {
    "GL_ARB_vertex_array_object" => gl_arb_vertex_array_object,
    "GL_ARB_framebuffer_object" => gl_arb_framebuffer_object,
    "GL_EXT_framebuffer_object" => gl_ext_framebuffer_object,
    "GL_ARB_texture_border_clamp" => gl_arb_texture_border_clamp,
    "GL_KHR_debug" => gl_khr_debug,
}

/// Represents the capabilities of the context. These values never change.
#[derive(Debug)]
pub struct Capabilities {
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    pub extensions: Extensions,
    /// The name of the renderer, typically specific to a hardware configuration.
    pub renderer: String,
    /// Available from OpenGL 3.2 onwards.
    pub profile: Option<Profile>,
    pub debug: bool,
    pub forward_compatible: bool,
    pub max_viewport_dims: (u32, u32),
    pub max_combined_texture_image_units: u32,
    pub max_color_attachments: u32,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;
        let extensions = Extensions::parse(version)?;

        let (debug, forward_compatible) = if version >= Version::GL(3, 0) {
            let val = get_integer(gl::CONTEXT_FLAGS) as GLenum;
            (
                (val & gl::CONTEXT_FLAG_DEBUG_BIT) != 0,
                (val & gl::CONTEXT_FLAG_FORWARD_COMPATIBLE_BIT) != 0,
            )
        } else {
            (false, false)
        };

        let mut dims: [GLint; 2] = [0, 0];
        gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, dims.as_mut_ptr());

        Ok(Capabilities {
            version,
            extensions,
            vendor: read_str(gl::VENDOR)?,
            renderer: read_str(gl::RENDERER)?,
            profile: Capabilities::parse_profile(version),
            debug,
            forward_compatible,
            max_viewport_dims: (dims[0] as u32, dims[1] as u32),
            max_combined_texture_image_units: get_integer(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
                as u32,
            max_color_attachments: Capabilities::parse_color_attachments(version, &extensions),
        })
    }

    unsafe fn parse_profile(version: Version) -> Option<Profile> {
        if version >= Version::GL(3, 2) {
            let val = get_integer(gl::CONTEXT_PROFILE_MASK) as GLenum;
            if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
                Some(Profile::Compatibility)
            } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
                Some(Profile::Core)
            } else {
                None
            }
        } else {
            None
        }
    }

    unsafe fn parse_color_attachments(version: Version, exts: &Extensions) -> u32 {
        if version >= Version::GL(3, 0)
            || version >= Version::ES(3, 0)
            || exts.gl_arb_framebuffer_object
            || exts.gl_ext_framebuffer_object
        {
            get_integer(gl::MAX_COLOR_ATTACHMENTS) as u32
        } else {
            1
        }
    }
}

unsafe fn get_integer(name: GLenum) -> GLint {
    let mut val = 0;
    gl::GetIntegerv(name, &mut val);
    val
}

unsafe fn read_str(name: GLenum) -> Result<String> {
    let s = gl::GetString(name);
    if s.is_null() {
        return Err(Error::Backend(format!("string 0x{:x} is null.", name)));
    }

    Ok(ffi::CStr::from_ptr(s as *const _)
        .to_string_lossy()
        .into_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn version() {
        assert_eq!(Version::parse_str("3.3.0 NVIDIA 390.77").unwrap(), Version::GL(3, 3));
        assert_eq!(Version::parse_str("4.1 Metal - 76.3").unwrap(), Version::GL(4, 1));
        assert_eq!(
            Version::parse_str("OpenGL ES 3.0 Mesa 20.0.8").unwrap(),
            Version::ES(3, 0)
        );
        assert!(Version::parse_str("garbage").is_err());

        assert!(Version::GL(3, 3) > Version::GL(3, 2));
        assert!(Version::GL(4, 0) > Version::GL(3, 3));
        assert!(!(Version::GL(3, 0) >= Version::ES(3, 0)));
        assert!(!(Version::ES(3, 0) >= Version::GL(3, 0)));
    }
}
