use std::rc::Rc;

use inlinable_string::InlinableString;

use crate::model::material::Material;
use crate::model::{Model, ModelSource};
use crate::transform::Transform;

impl_handle!(ObjectHandle);

/// How an object is shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shading {
    /// Phong shading with the scene lights.
    Lit,
    /// The flat base color of its material.
    Unlit,
}

impl Default for Shading {
    fn default() -> Self {
        Shading::Lit
    }
}

/// A placed instance of a model.
///
/// An object without a model never draws: it is created inactive and can not be
/// activated until a model is assigned.
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: InlinableString,
    pub transform: Transform,
    pub shading: Shading,
    /// Overrides the materials of the model for every mesh.
    pub material: Option<Material>,
    source: Option<ModelSource>,
    model: Option<Rc<Model>>,
    active: bool,
}

impl SceneObject {
    /// Creates an active object drawing `model`.
    pub fn new<T: Into<InlinableString>>(name: T, model: Rc<Model>) -> Self {
        SceneObject {
            name: name.into(),
            transform: Transform::default(),
            shading: Shading::Lit,
            material: None,
            source: Some(model.source().clone()),
            model: Some(model),
            active: true,
        }
    }

    /// Creates an inactive placeholder for an object whose model could not be
    /// loaded. It keeps its source so the scene can be saved unchanged.
    pub fn unloaded<T: Into<InlinableString>>(name: T, source: Option<ModelSource>) -> Self {
        SceneObject {
            name: name.into(),
            transform: Transform::default(),
            shading: Shading::Lit,
            material: None,
            source,
            model: None,
            active: false,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    #[inline]
    pub fn source(&self) -> Option<&ModelSource> {
        self.source.as_ref()
    }

    #[inline]
    pub fn model(&self) -> Option<&Rc<Model>> {
        self.model.as_ref()
    }

    /// Replaces the model and activates the object.
    pub fn set_model(&mut self, model: Rc<Model>) {
        self.source = Some(model.source().clone());
        self.model = Some(model);
        self.active = true;
    }

    /// Drops the model and deactivates the object.
    pub fn take_model(&mut self) -> Option<Rc<Model>> {
        self.active = false;
        self.model.take()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggles the object. Returns false if it has no model to be activated with.
    pub fn set_active(&mut self, active: bool) -> bool {
        if active && self.model.is_none() {
            return false;
        }

        self.active = active;
        true
    }

    /// Returns the model if this object takes part in the draw pass.
    #[inline]
    pub fn drawable(&self) -> Option<&Rc<Model>> {
        if self.active {
            self.model.as_ref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::primitives::Shape;

    #[test]
    fn unloaded() {
        let source = ModelSource::Shape(Shape::Cube);
        let mut object = SceneObject::unloaded("broken", Some(source.clone()));
        assert!(!object.is_active());
        assert!(!object.set_active(true));
        assert!(object.drawable().is_none());
        assert_eq!(object.source(), Some(&source));
        assert!(object.set_active(false));
    }
}
