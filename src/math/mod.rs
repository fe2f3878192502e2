//! Math primitives. Vectors, matrices and quaternions come from `cgmath`.

pub mod color;

pub mod prelude {
    pub use super::color::Color;
    pub use cgmath::prelude::*;
    pub use cgmath::{
        Deg, Euler, Matrix3, Matrix4, Point3, Quaternion, Rad, Vector2, Vector3, Vector4,
    };
}
