//! Scenes: the objects, lights and cameras of one renderable world.

pub mod camera;
pub mod descriptor;
pub mod object;

pub mod prelude {
    pub use super::camera::{Camera, Movement};
    pub use super::descriptor::{CameraDescriptor, ObjectDescriptor, SceneDescriptor};
    pub use super::object::{ObjectHandle, SceneObject, Shading};
    pub use super::Scene;
}

use inlinable_string::InlinableString;
use uuid::Uuid;

use lumen::errors::*;
use lumen::math::prelude::Color;
use lumen::utils::prelude::ObjectPool;

use crate::lighting::Lighting;

use self::camera::Camera;
use self::object::{ObjectHandle, SceneObject};

/// The upper bound of objects in a scene, unless configured otherwise.
pub const MAX_OBJECTS: usize = 4096;

/// A flat collection of objects together with the lights and cameras viewing
/// them.
///
/// Objects live in an arena: their handles stay valid while other objects are
/// added or removed, and a removed object's handle never resolves again. The draw
/// order is kept separately and is the order objects were added in.
pub struct Scene {
    id: Uuid,
    pub name: String,
    objects: ObjectPool<ObjectHandle, SceneObject>,
    order: Vec<ObjectHandle>,
    max_objects: usize,
    lighting: Lighting,
    cameras: Vec<(InlinableString, Camera)>,
    active_camera: Option<InlinableString>,
    grid: bool,
    background: Color,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(MAX_OBJECTS, Lighting::new())
    }
}

impl Scene {
    /// Creates an empty scene holding at most `max_objects` objects.
    pub fn new(max_objects: usize, lighting: Lighting) -> Self {
        Scene {
            id: Uuid::new_v4(),
            name: String::new(),
            objects: ObjectPool::new(),
            order: Vec::new(),
            max_objects,
            lighting,
            cameras: Vec::new(),
            active_camera: None,
            grid: true,
            background: Color::new(0.15, 0.15, 0.15, 1.0),
        }
    }

    /// Returns the id of this scene, unique per constructed scene.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn max_objects(&self) -> usize {
        self.max_objects
    }

    /// Adds an object at the end of the draw order.
    pub fn add_object(&mut self, object: SceneObject) -> Result<ObjectHandle> {
        if self.objects.len() >= self.max_objects {
            return Err(Error::CapacityExceeded {
                what: "scene objects",
                limit: self.max_objects,
            });
        }

        let handle = self.objects.create(object);
        self.order.push(handle);
        Ok(handle)
    }

    /// Removes an object from the scene, returning it if the handle was alive.
    pub fn remove_object(&mut self, handle: ObjectHandle) -> Option<SceneObject> {
        let object = self.objects.free(handle)?;
        self.order.retain(|&v| v != handle);
        Some(object)
    }

    #[inline]
    pub fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(handle)
    }

    #[inline]
    pub fn object_mut(&mut self, handle: ObjectHandle) -> Option<&mut SceneObject> {
        self.objects.get_mut(handle)
    }

    /// Returns the first object named `name` in draw order.
    pub fn find(&self, name: &str) -> Option<ObjectHandle> {
        self.objects()
            .find(|(_, v)| &*v.name == name)
            .map(|(h, _)| h)
    }

    /// Toggles an object. Returns false if the handle is stale or the object has
    /// no model to be drawn with.
    pub fn set_active(&mut self, handle: ObjectHandle, active: bool) -> bool {
        self.objects
            .get_mut(handle)
            .map(|v| v.set_active(active))
            .unwrap_or(false)
    }

    /// Returns the number of objects, active or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterates all objects in draw order.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectHandle, &SceneObject)> {
        let objects = &self.objects;
        self.order
            .iter()
            .filter_map(move |&h| objects.get(h).map(|v| (h, v)))
    }

    #[inline]
    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    #[inline]
    pub fn lighting_mut(&mut self) -> &mut Lighting {
        &mut self.lighting
    }

    /// Adds or replaces the camera named `name`. The first camera added becomes
    /// the active one.
    pub fn add_camera<T: Into<InlinableString>>(&mut self, name: T, camera: Camera) -> Option<Camera> {
        let name = name.into();
        if self.active_camera.is_none() {
            self.active_camera = Some(name.clone());
        }

        if let Some(v) = self.cameras.iter_mut().find(|v| v.0 == name) {
            return Some(::std::mem::replace(&mut v.1, camera));
        }

        self.cameras.push((name, camera));
        None
    }

    /// Removes the camera named `name`, clearing the active reference if it
    /// pointed at it.
    pub fn remove_camera(&mut self, name: &str) -> Option<Camera> {
        let index = self.cameras.iter().position(|v| &*v.0 == name)?;
        if self.active_camera.as_ref().map(|v| &**v == name).unwrap_or(false) {
            self.active_camera = None;
        }

        Some(self.cameras.remove(index).1)
    }

    #[inline]
    pub fn camera(&self, name: &str) -> Option<&Camera> {
        self.cameras.iter().find(|v| &*v.0 == name).map(|v| &v.1)
    }

    #[inline]
    pub fn camera_mut(&mut self, name: &str) -> Option<&mut Camera> {
        self.cameras
            .iter_mut()
            .find(|v| &*v.0 == name)
            .map(|v| &mut v.1)
    }

    /// Iterates the named cameras in insertion order.
    pub fn cameras(&self) -> impl Iterator<Item = (&str, &Camera)> {
        self.cameras.iter().map(|v| (&*v.0, &v.1))
    }

    /// Makes the camera named `name` the active one. Returns false if there is
    /// no such camera.
    pub fn set_active_camera(&mut self, name: &str) -> bool {
        if self.camera(name).is_none() {
            return false;
        }

        self.active_camera = Some(name.into());
        true
    }

    #[inline]
    pub fn active_camera_name(&self) -> Option<&str> {
        self.active_camera.as_ref().map(|v| &**v)
    }

    /// Returns the active camera, if the scene declares one.
    pub fn active_camera(&self) -> Option<&Camera> {
        self.active_camera_name().and_then(|v| self.camera(v))
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut Camera> {
        let name = self.active_camera.clone()?;
        self.camera_mut(&name)
    }

    #[inline]
    pub fn grid_enabled(&self) -> bool {
        self.grid
    }

    #[inline]
    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid = enabled;
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.background
    }

    #[inline]
    pub fn set_background<T: Into<Color>>(&mut self, color: T) {
        self.background = color.into();
    }
}

impl ::std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("objects", &self.order.len())
            .field("lights", &self.lighting.len())
            .field("active_camera", &self.active_camera)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::primitives::Shape;
    use crate::model::ModelSource;

    fn placeholder(name: &str) -> SceneObject {
        SceneObject::unloaded(name, Some(ModelSource::Shape(Shape::Cube)))
    }

    #[test]
    fn arena() {
        let mut scene = Scene::default();
        let a = scene.add_object(placeholder("a")).unwrap();
        let b = scene.add_object(placeholder("b")).unwrap();
        let c = scene.add_object(placeholder("c")).unwrap();

        assert!(scene.remove_object(b).is_some());
        assert!(scene.remove_object(b).is_none());

        let d = scene.add_object(placeholder("d")).unwrap();
        assert!(scene.object(b).is_none());
        assert_eq!(&*scene.object(a).unwrap().name, "a");
        assert_eq!(&*scene.object(c).unwrap().name, "c");
        assert_eq!(scene.find("d"), Some(d));

        let names: Vec<_> = scene.objects().map(|(_, v)| v.name.to_string()).collect();
        assert_eq!(names, vec!["a", "c", "d"]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn capacity() {
        let mut scene = Scene::new(2, Lighting::new());
        scene.add_object(placeholder("a")).unwrap();
        scene.add_object(placeholder("b")).unwrap();

        match scene.add_object(placeholder("c")) {
            Err(Error::CapacityExceeded { limit, .. }) => assert_eq!(limit, 2),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn cameras() {
        let mut scene = Scene::default();
        assert!(scene.active_camera().is_none());

        scene.add_camera("main", Camera::default());
        scene.add_camera("top", Camera::new(lumen::math::prelude::Vector3::new(0.0, 50.0, 0.0)));
        assert_eq!(scene.active_camera_name(), Some("main"));

        assert!(scene.set_active_camera("top"));
        assert!(!scene.set_active_camera("missing"));
        assert_eq!(scene.active_camera().unwrap().position.y, 50.0);

        assert!(scene.remove_camera("top").is_some());
        assert!(scene.active_camera().is_none());
        assert_eq!(scene.cameras().count(), 1);
        assert_ne!(scene.id(), Scene::default().id());
    }
}
