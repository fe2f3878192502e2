//! A fly-through perspective camera.

use lumen::math::prelude::*;

/// Directions a camera can be moved in, relative to where it looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// A perspective camera described by its position and orientation. Angles are in
/// degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub front: Vector3<f32>,
    pub up: Vector3<f32>,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second.
    pub speed: f32,
    /// Degrees per unit of pointer motion.
    pub sensitivity: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            position: Vector3::new(0.0, 10.0, 20.0),
            front: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            yaw: -90.0,
            pitch: 0.0,
            fov: 65.0,
            near: 0.1,
            far: 1000.0,
            speed: 10.0,
            sensitivity: 0.1,
        }
    }
}

impl Camera {
    /// Creates a camera at `position` looking down -Z.
    pub fn new<T: Into<Vector3<f32>>>(position: T) -> Self {
        Camera {
            position: position.into(),
            ..Default::default()
        }
    }

    /// Orients the camera, recomputing `front`. Pitch is clamped short of the poles.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.max(-89.0).min(89.0);

        let (yaw, pitch) = (Rad::from(Deg(self.yaw)), Rad::from(Deg(self.pitch)));
        self.front = Vector3::new(
            yaw.0.cos() * pitch.0.cos(),
            pitch.0.sin(),
            yaw.0.sin() * pitch.0.cos(),
        )
        .normalize();
    }

    /// Turns the camera by pointer motion.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let (yaw, pitch) = (
            self.yaw + dx * self.sensitivity,
            self.pitch + dy * self.sensitivity,
        );

        self.set_yaw_pitch(yaw, pitch);
    }

    /// Narrows or widens the field of view, clamped to [1, 90].
    pub fn zoom(&mut self, delta: f32) {
        self.fov = (self.fov - delta).max(1.0).min(90.0);
    }

    /// Returns the unit vector pointing to the right of the view direction.
    #[inline]
    pub fn right(&self) -> Vector3<f32> {
        self.front.cross(self.up).normalize()
    }

    /// Moves the camera for `dt` seconds at its speed.
    pub fn translate(&mut self, movement: Movement, dt: f32) {
        let distance = self.speed * dt;
        let offset = match movement {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Right => self.right(),
            Movement::Left => -self.right(),
            Movement::Up => self.up,
            Movement::Down => -self.up,
        };

        self.position += offset * distance;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        Matrix4::look_at(eye, eye + self.front, self.up)
    }

    /// Returns the perspective projection for a target with `aspect` ratio.
    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };

        lumen::cgmath::perspective(Deg(self.fov), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn assert_near(lhs: Vector3<f32>, rhs: Vector3<f32>) {
        assert!((lhs - rhs).magnitude() < 1e-5, "{:?} != {:?}", lhs, rhs);
    }

    #[test]
    fn orientation() {
        let mut camera = Camera::default();
        camera.set_yaw_pitch(-90.0, 0.0);
        assert_near(camera.front, Vector3::new(0.0, 0.0, -1.0));
        assert_near(camera.right(), Vector3::new(1.0, 0.0, 0.0));

        camera.set_yaw_pitch(0.0, 120.0);
        assert_eq!(camera.pitch, 89.0);

        camera.zoom(200.0);
        assert_eq!(camera.fov, 1.0);
    }

    #[test]
    fn matrices() {
        let mut camera = Camera::new(Vector3::new(0.0, 0.0, 5.0));
        let v = camera.view_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_near(v.truncate(), Vector3::new(0.0, 0.0, -5.0));

        camera.translate(Movement::Forward, 0.5);
        assert_near(camera.position, Vector3::new(0.0, 0.0, 0.0));

        let p = camera.projection_matrix(0.0);
        assert_eq!(p, camera.projection_matrix(1.0));
    }
}
