//! Functions for loading the configuration of the rendering core.

use std::path::Path;

use lumen::errors::*;
use lumen::video::backends::BackendKind;
use lumen::window::WindowParams;

use crate::lighting::MAX_LIGHTS;
use crate::model::texture_cache::EvictionPolicy;
use crate::renderer::RendererParams;
use crate::scene::MAX_OBJECTS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingParams {
    /// The number of lights a scene may hold, at most `MAX_LIGHTS`.
    pub capacity: usize,
}

impl Default for LightingParams {
    fn default() -> Self {
        LightingParams {
            capacity: MAX_LIGHTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub max_objects: usize,
}

impl Default for SceneParams {
    fn default() -> Self {
        SceneParams {
            max_objects: MAX_OBJECTS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceParams {
    /// When cached textures nobody references anymore are dropped.
    pub eviction: EvictionPolicy,
}

/// A structure containing configuration data for the rendering core, which are
/// used to create the window and size the renderer, scenes and caches.
///
/// Every field has a default, so configuration files only need to name what they
/// change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowParams,
    pub renderer: RendererParams,
    pub lighting: LightingParams,
    pub scene: SceneParams,
    pub resources: ResourceParams,
    pub backend: BackendKind,
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = ::std::fs::read_to_string(path).map_err(|err| Error::ResourceLoad {
            path: path.to_owned(),
            reason: format!("{}", err),
        })?;

        let settings = Self::from_json(&json)?;
        info!("Loaded settings from {:?}.", path);
        Ok(settings)
    }
}
