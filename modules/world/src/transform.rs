use lumen::math::prelude::*;

/// `Transform` stores the position, rotation and scale of a scene object. The world
/// uses a right handed, y-up coordinate system.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position<T: Into<Vector3<f32>>>(position: T) -> Self {
        Transform {
            position: position.into(),
            ..Default::default()
        }
    }

    /// Sets the rotation from euler angles in degrees, applied in X, Y, Z order.
    pub fn set_euler_angles(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quaternion::from(Euler::new(Deg(x), Deg(y), Deg(z)));
    }

    /// Sets a uniform scale.
    #[inline]
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Transforms direction from local space to world space. This operation is not
    /// affected by scale or position.
    #[inline]
    pub fn transform_direction<T>(&self, v: T) -> Vector3<f32>
    where
        T: Into<Vector3<f32>>,
    {
        self.rotation * v.into()
    }

    /// Transforms points from local space to world space.
    #[inline]
    pub fn transform_point<T>(&self, v: T) -> Vector3<f32>
    where
        T: Into<Vector3<f32>>,
    {
        self.rotation * v.into().mul_element_wise(self.scale) + self.position
    }

    /// Returns the matrix representation, `M = T * R * S`.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Returns the matrix transforming normals into world space, which is the
    /// inverse transpose of the upper 3x3 part of `matrix`.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        let m = self.matrix();
        let m = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        m.invert().map(|v| v.transpose()).unwrap_or(m)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_near(lhs: Vector3<f32>, rhs: Vector3<f32>) {
        assert!((lhs - rhs).magnitude() < 1e-5, "{:?} != {:?}", lhs, rhs);
    }

    #[test]
    fn point() {
        let mut transform = Transform::from_position(Vector3::new(1.0, 0.0, 0.0));
        transform.set_uniform_scale(2.0);
        transform.set_euler_angles(0.0, 90.0, 0.0);

        let v = transform.transform_point(Vector3::new(1.0, 0.0, 0.0));
        assert_near(v, Vector3::new(1.0, 0.0, -2.0));

        let m = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_near(m.truncate(), v);
    }

    #[test]
    fn normal_matrix() {
        let mut transform = Transform::default();
        transform.scale = Vector3::new(2.0, 1.0, 1.0);

        let n = transform.normal_matrix() * Vector3::new(1.0, 1.0, 0.0);
        assert_near(n, Vector3::new(0.5, 1.0, 0.0));
    }
}
