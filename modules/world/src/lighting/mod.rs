//! The lights of a scene and their upload into shader uniforms.

pub mod light;

pub mod prelude {
    pub use super::light::{Attenuation, Light, LightSource};
    pub use super::{Lighting, MAX_LIGHTS};
}

use lumen::errors::*;
use lumen::video::assets::shader::Shader;

use self::light::{Light, LightSource};

/// The size of the light uniform arrays declared by the built-in shaders. Both
/// the directional and the positional array hold this many slots.
pub const MAX_LIGHTS: usize = 16;

struct DirLightUniforms {
    direction: String,
    ambient: String,
    diffuse: String,
    specular: String,
}

struct PointLightUniforms {
    position: String,
    ambient: String,
    diffuse: String,
    specular: String,
    constant: String,
    linear: String,
    quadratic: String,
}

/// Uniform names of every slot, built once per `Lighting`.
struct LightUniforms {
    dirs: Vec<DirLightUniforms>,
    points: Vec<PointLightUniforms>,
}

impl LightUniforms {
    fn new() -> Self {
        let dirs = (0..MAX_LIGHTS)
            .map(|i| DirLightUniforms {
                direction: format!("u_DirLights[{}].direction", i),
                ambient: format!("u_DirLights[{}].ambient", i),
                diffuse: format!("u_DirLights[{}].diffuse", i),
                specular: format!("u_DirLights[{}].specular", i),
            })
            .collect();

        let points = (0..MAX_LIGHTS)
            .map(|i| PointLightUniforms {
                position: format!("u_PointLights[{}].position", i),
                ambient: format!("u_PointLights[{}].ambient", i),
                diffuse: format!("u_PointLights[{}].diffuse", i),
                specular: format!("u_PointLights[{}].specular", i),
                constant: format!("u_PointLights[{}].constant", i),
                linear: format!("u_PointLights[{}].linear", i),
                quadratic: format!("u_PointLights[{}].quadratic", i),
            })
            .collect();

        LightUniforms { dirs, points }
    }
}

/// An insertion ordered set of lights keyed by name, bounded by a hard capacity.
pub struct Lighting {
    lights: Vec<Light>,
    capacity: usize,
    uniforms: LightUniforms,
}

impl Default for Lighting {
    fn default() -> Self {
        Lighting::new()
    }
}

impl Clone for Lighting {
    fn clone(&self) -> Self {
        let mut lighting = Lighting::with_capacity(self.capacity);
        lighting.lights = self.lights.clone();
        lighting
    }
}

impl ::std::fmt::Debug for Lighting {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Lighting")
            .field("lights", &self.lights)
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Lighting {
    pub fn new() -> Self {
        Lighting::with_capacity(MAX_LIGHTS)
    }

    /// Creates an empty set holding at most `capacity` lights. The capacity is
    /// clamped to `MAX_LIGHTS`, the size of the shader arrays.
    pub fn with_capacity(capacity: usize) -> Self {
        Lighting {
            lights: Vec::new(),
            capacity: capacity.min(MAX_LIGHTS),
            uniforms: LightUniforms::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts `light`, replacing and returning the light with the same key. Adding
    /// a new key to a full set fails with `CapacityExceeded`, and the light is not
    /// added.
    pub fn add_light(&mut self, light: Light) -> Result<Option<Light>> {
        if let Some(v) = self.lights.iter_mut().find(|v| v.key == light.key) {
            return Ok(Some(::std::mem::replace(v, light)));
        }

        if self.lights.len() >= self.capacity {
            return Err(Error::CapacityExceeded {
                what: "lights",
                limit: self.capacity,
            });
        }

        self.lights.push(light);
        Ok(None)
    }

    /// Removes the light with `key`. Does nothing if there is none.
    pub fn remove_light(&mut self, key: &str) -> Option<Light> {
        let index = self.lights.iter().position(|v| &*v.key == key)?;
        Some(self.lights.remove(index))
    }

    /// Toggles a light without removing it. Returns false if there is no light
    /// with `key`.
    pub fn set_active(&mut self, key: &str, active: bool) -> bool {
        match self.get_mut(key) {
            Some(light) => {
                light.active = active;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Light> {
        self.lights.iter().find(|v| &*v.key == key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Light> {
        self.lights.iter_mut().find(|v| &*v.key == key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Iterates the lights in insertion order.
    #[inline]
    pub fn iter(&self) -> ::std::slice::Iter<Light> {
        self.lights.iter()
    }

    /// Returns the number of active directional and positional lights.
    pub fn active_counts(&self) -> (usize, usize) {
        self.lights
            .iter()
            .filter(|v| v.active)
            .fold((0, 0), |(dirs, points), v| {
                if v.is_directional() {
                    (dirs + 1, points)
                } else {
                    (dirs, points + 1)
                }
            })
    }

    /// Writes every active light into the light arrays of `shader`, directional and
    /// positional lights into their own arrays, followed by the number of used
    /// slots of each. Must run before the first lit draw of a frame.
    pub fn upload_to_shader(&self, shader: &Shader) -> Result<()> {
        let mut dirs = 0;
        let mut points = 0;

        for light in self.lights.iter().filter(|v| v.active) {
            match light.source {
                LightSource::Directional { direction } => {
                    let names = &self.uniforms.dirs[dirs];
                    shader.set_uniform(&names.direction, direction)?;
                    shader.set_uniform(&names.ambient, light.ambient)?;
                    shader.set_uniform(&names.diffuse, light.diffuse)?;
                    shader.set_uniform(&names.specular, light.specular)?;
                    dirs += 1;
                }
                LightSource::Point {
                    position,
                    attenuation,
                } => {
                    let names = &self.uniforms.points[points];
                    shader.set_uniform(&names.position, position)?;
                    shader.set_uniform(&names.ambient, light.ambient)?;
                    shader.set_uniform(&names.diffuse, light.diffuse)?;
                    shader.set_uniform(&names.specular, light.specular)?;
                    shader.set_uniform(&names.constant, attenuation.constant)?;
                    shader.set_uniform(&names.linear, attenuation.linear)?;
                    shader.set_uniform(&names.quadratic, attenuation.quadratic)?;
                    points += 1;
                }
            }
        }

        shader.set_uniform("u_DirLightCount", dirs as i32)?;
        shader.set_uniform("u_PointLightCount", points as i32)
    }
}
