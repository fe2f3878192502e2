//! The persisted form of a scene, and its conversion to and from live scenes.

use std::collections::HashMap;
use std::rc::Rc;

use lumen::errors::*;
use lumen::math::prelude::Color;

use crate::lighting::light::Light;
use crate::lighting::Lighting;
use crate::model::loader::ModelLoader;
use crate::model::material::Material;
use crate::model::{Model, ModelSource};
use crate::transform::Transform;

use super::camera::Camera;
use super::object::{SceneObject, Shading};
use super::Scene;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectDescriptor {
    pub name: String,
    /// Objects without a source are kept as inactive placeholders.
    pub source: Option<ModelSource>,
    pub transform: Transform,
    pub shading: Shading,
    pub material: Option<Material>,
    pub active: bool,
}

impl Default for ObjectDescriptor {
    fn default() -> Self {
        ObjectDescriptor {
            name: String::new(),
            source: None,
            transform: Transform::default(),
            shading: Shading::Lit,
            material: None,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDescriptor {
    pub name: String,
    pub camera: Camera,
}

/// Everything needed to rebuild a scene: its objects in draw order, lights,
/// named cameras and scene toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDescriptor {
    pub name: String,
    pub objects: Vec<ObjectDescriptor>,
    pub lights: Vec<Light>,
    pub cameras: Vec<CameraDescriptor>,
    pub active_camera: Option<String>,
    pub grid: bool,
    pub background: Color,
}

impl Default for SceneDescriptor {
    fn default() -> Self {
        SceneDescriptor {
            name: String::new(),
            objects: Vec::new(),
            lights: Vec::new(),
            cameras: Vec::new(),
            active_camera: None,
            grid: true,
            background: Color::new(0.15, 0.15, 0.15, 1.0),
        }
    }
}

impl SceneDescriptor {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes the compact binary form written by `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|err| Error::Descriptor(format!("{}", err)))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|err| Error::Descriptor(format!("{}", err)))
    }
}

impl Scene {
    /// Builds a scene out of `descriptor`, loading every referenced model through
    /// `loader`. Objects sharing a source share one model.
    ///
    /// Objects whose model fails to load are kept inactive without a model. Any
    /// other inconsistency fails the whole conversion, and nothing built so far
    /// survives it.
    pub fn from_descriptor(
        descriptor: &SceneDescriptor,
        loader: &mut ModelLoader,
        max_objects: usize,
        max_lights: usize,
    ) -> Result<Scene> {
        if descriptor.objects.len() > max_objects {
            return Err(Error::CapacityExceeded {
                what: "scene objects",
                limit: max_objects,
            });
        }

        let mut lighting = Lighting::with_capacity(max_lights);
        for light in &descriptor.lights {
            if lighting.get(&light.key).is_some() {
                return Err(Error::Descriptor(format!(
                    "light '{}' is declared twice.",
                    light.key
                )));
            }

            lighting.add_light(light.clone())?;
        }

        let mut scene = Scene::new(max_objects, lighting);
        scene.name = descriptor.name.clone();
        scene.grid = descriptor.grid;
        scene.background = descriptor.background;

        for v in &descriptor.cameras {
            if scene.add_camera(v.name.as_str(), v.camera).is_some() {
                return Err(Error::Descriptor(format!(
                    "camera '{}' is declared twice.",
                    v.name
                )));
            }
        }

        scene.active_camera = None;
        if let Some(ref name) = descriptor.active_camera {
            if !scene.set_active_camera(name) {
                return Err(Error::Descriptor(format!(
                    "active camera '{}' is not declared.",
                    name
                )));
            }
        } else if let Some(v) = descriptor.cameras.first() {
            scene.set_active_camera(&v.name);
        }

        let mut models: HashMap<ModelSource, Option<Rc<Model>>> = HashMap::new();
        for v in &descriptor.objects {
            let model = match v.source {
                Some(ref source) => models
                    .entry(source.clone())
                    .or_insert_with(|| match loader.load(source) {
                        Ok(model) => Some(model),
                        Err(err) => {
                            warn!("Object '{}' is disabled, failed to load {}. {}", v.name, source, err);
                            None
                        }
                    })
                    .clone(),
                None => None,
            };

            let mut object = match model {
                Some(model) => SceneObject::new(v.name.as_str(), model),
                None => SceneObject::unloaded(v.name.as_str(), v.source.clone()),
            };

            object.transform = v.transform;
            object.shading = v.shading;
            object.material = v.material;
            object.set_active(v.active);

            scene.add_object(object)?;
        }

        Ok(scene)
    }

    /// Describes this scene. Objects that failed to load are written with their
    /// source, so saving never loses them.
    pub fn to_descriptor(&self) -> SceneDescriptor {
        let objects = self
            .objects()
            .map(|(_, v)| ObjectDescriptor {
                name: v.name.to_string(),
                source: v.source().cloned(),
                transform: v.transform,
                shading: v.shading,
                material: v.material,
                active: v.is_active() || v.model().is_none(),
            })
            .collect();

        let cameras = self
            .cameras()
            .map(|(name, camera)| CameraDescriptor {
                name: name.to_owned(),
                camera: *camera,
            })
            .collect();

        SceneDescriptor {
            name: self.name.clone(),
            objects,
            lights: self.lighting().iter().cloned().collect(),
            cameras,
            active_camera: self.active_camera_name().map(|v| v.to_owned()),
            grid: self.grid,
            background: self.background,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lighting::light::Attenuation;
    use crate::model::obj::ObjImporter;
    use crate::model::primitives::Shape;
    use crate::model::texture_cache::EvictionPolicy;
    use lumen::math::prelude::Vector3;
    use lumen::video::command::RenderingCommand;

    fn descriptor() -> SceneDescriptor {
        let mut desc = SceneDescriptor::default();
        desc.name = "test".into();
        desc.cameras.push(CameraDescriptor {
            name: "main".into(),
            camera: Camera::default(),
        });
        desc.active_camera = Some("main".into());

        desc.lights.push(Light::point(
            "lamp",
            Vector3::new(3.3, 1.3, 0.3),
            Attenuation::default(),
        ));

        for name in &["a", "b"] {
            desc.objects.push(ObjectDescriptor {
                name: (*name).into(),
                source: Some(ModelSource::Shape(Shape::Cube)),
                ..Default::default()
            });
        }

        desc.objects.push(ObjectDescriptor {
            name: "missing".into(),
            source: Some(ModelSource::File("does/not/exist.obj".into())),
            ..Default::default()
        });

        desc
    }

    fn loader(command: &RenderingCommand) -> ModelLoader {
        ModelLoader::new(command, Box::new(ObjImporter::new()), EvictionPolicy::Never)
    }

    #[test]
    fn build() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);
        let scene = Scene::from_descriptor(&descriptor(), &mut loader, 16, 16).unwrap();

        assert_eq!(scene.len(), 3);
        assert_eq!(scene.active_camera_name(), Some("main"));
        assert_eq!(scene.lighting().len(), 1);

        // Both cubes share one model.
        assert_eq!(command.statistics().vertex_buffer_uploads, 1);

        let missing = scene.object(scene.find("missing").unwrap()).unwrap();
        assert!(!missing.is_active());
        assert!(missing.model().is_none());

        let desc = scene.to_descriptor();
        assert_eq!(desc, descriptor());
    }

    #[test]
    fn all_or_nothing() {
        let command = RenderingCommand::headless();
        let mut loader = loader(&command);

        let mut desc = descriptor();
        desc.active_camera = Some("nowhere".into());
        match Scene::from_descriptor(&desc, &mut loader, 16, 16) {
            Err(Error::Descriptor(_)) => {}
            other => panic!("unexpected {:?}", other),
        }

        let desc = descriptor();
        match Scene::from_descriptor(&desc, &mut loader, 2, 16) {
            Err(Error::CapacityExceeded { .. }) => {}
            other => panic!("unexpected {:?}", other),
        }

        let mut desc = descriptor();
        desc.lights.push(desc.lights[0].clone());
        assert!(Scene::from_descriptor(&desc, &mut loader, 16, 16).is_err());

        let stats = command.statistics();
        assert_eq!(stats.alive_buffers, 0);
        assert_eq!(stats.alive_vertex_arrays, 0);
    }

    #[test]
    fn formats() {
        let desc = descriptor();
        assert_eq!(SceneDescriptor::from_json(&desc.to_json().unwrap()).unwrap(), desc);
        assert_eq!(SceneDescriptor::from_bytes(&desc.to_bytes().unwrap()).unwrap(), desc);

        let partial = SceneDescriptor::from_json(r#"{ "name": "partial", "grid": false }"#).unwrap();
        assert_eq!(partial.name, "partial");
        assert!(!partial.grid);
        assert!(partial.objects.is_empty());

        assert!(SceneDescriptor::from_json("{ \"objects\": 3 }").is_err());
        assert!(SceneDescriptor::from_bytes(&[1, 2, 3]).is_err());
    }
}
