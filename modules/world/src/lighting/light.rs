use inlinable_string::InlinableString;

use lumen::math::prelude::{InnerSpace, Vector3};

/// Constant, linear and quadratic coefficients of the distance falloff of a
/// positional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Self {
        Attenuation {
            constant,
            linear,
            quadratic,
        }
    }

    /// Evaluates the falloff factor at `distance`.
    #[inline]
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation::new(1.0, 0.09, 0.032)
    }
}

/// Enumeration for all light sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightSource {
    /// A light infinitely far away, lighting everything from `direction`.
    Directional { direction: Vector3<f32> },
    /// A positional light whose intensity falls off with distance.
    Point {
        position: Vector3<f32>,
        attenuation: Attenuation,
    },
}

/// A light in the scene, identified by its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub key: InlinableString,
    pub source: LightSource,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    /// Only active lights are uploaded to shaders.
    pub active: bool,
}

impl Light {
    /// Creates an active directional light. `direction` is normalized.
    pub fn directional<K, T>(key: K, direction: T) -> Self
    where
        K: Into<InlinableString>,
        T: Into<Vector3<f32>>,
    {
        let direction = direction.into();
        let direction = if direction.magnitude2() > 0.0 {
            direction.normalize()
        } else {
            Vector3::new(0.0, -1.0, 0.0)
        };

        Light {
            key: key.into(),
            source: LightSource::Directional { direction },
            ambient: Vector3::new(0.1, 0.1, 0.1),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            active: true,
        }
    }

    /// Creates an active point light with the given falloff.
    pub fn point<K, T>(key: K, position: T, attenuation: Attenuation) -> Self
    where
        K: Into<InlinableString>,
        T: Into<Vector3<f32>>,
    {
        Light {
            key: key.into(),
            source: LightSource::Point {
                position: position.into(),
                attenuation,
            },
            ambient: Vector3::new(0.1, 0.1, 0.1),
            diffuse: Vector3::new(1.0, 1.0, 1.0),
            specular: Vector3::new(1.0, 1.0, 1.0),
            active: true,
        }
    }

    /// Sets the ambient, diffuse and specular colors.
    pub fn with_colors<T1, T2, T3>(mut self, ambient: T1, diffuse: T2, specular: T3) -> Self
    where
        T1: Into<Vector3<f32>>,
        T2: Into<Vector3<f32>>,
        T3: Into<Vector3<f32>>,
    {
        self.ambient = ambient.into();
        self.diffuse = diffuse.into();
        self.specular = specular.into();
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    #[inline]
    pub fn is_directional(&self) -> bool {
        match self.source {
            LightSource::Directional { .. } => true,
            _ => false,
        }
    }

    /// Returns the falloff coefficients, which only positional lights have.
    #[inline]
    pub fn attenuation(&self) -> Option<Attenuation> {
        match self.source {
            LightSource::Point { attenuation, .. } => Some(attenuation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn sources() {
        let dir = Light::directional("sun", Vector3::new(0.0, -2.0, 0.0));
        assert!(dir.is_directional());
        assert!(dir.attenuation().is_none());
        match dir.source {
            LightSource::Directional { direction } => {
                assert_eq!(direction, Vector3::new(0.0, -1.0, 0.0))
            }
            _ => unreachable!(),
        }

        let att = Attenuation::new(0.1, 0.09, 0.032);
        let point = Light::point("lamp", Vector3::new(3.3, 1.3, 0.3), att);
        assert!(!point.is_directional());
        assert_eq!(point.attenuation(), Some(att));
        assert!(att.factor(10.0) < att.factor(1.0));
    }
}
