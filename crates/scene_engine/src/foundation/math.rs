//! Math utilities and types
//!
//! Provides fundamental math types for 3D graphics, re-exported from nalgebra.

pub use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Extension trait for Mat4 with projection and view constructors
pub trait Mat4Ext {
    /// Create a perspective projection matrix.
    ///
    /// View-space +z is forward; depth maps to [0, 1]. The (0,0) and (1,1)
    /// entries carry the horizontal/vertical focal scale terms that screen-ray
    /// construction divides by during picking.
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a view matrix looking from `eye` toward `target`.
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let look = (target - eye).normalize();
        let right = up.cross(&look).normalize();
        let cam_up = look.cross(&right);

        // Rows are the camera basis; translation projects the eye onto it.
        Mat4::new(
            right.x, right.y, right.z, -eye.dot(&right),
            cam_up.x, cam_up.y, cam_up.z, -eye.dot(&cam_up),
            look.x, look.y, look.z, -eye.dot(&look),
            0.0, 0.0, 0.0, 1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perspective_scale_terms() {
        let fov = constants::HALF_PI * 0.5;
        let proj = Mat4::perspective(fov, 2.0, 1.0, 100.0);

        let tan_half = (fov * 0.5).tan();
        assert_relative_eq!(proj[(0, 0)], 1.0 / (2.0 * tan_half), epsilon = 1e-6);
        assert_relative_eq!(proj[(1, 1)], 1.0 / tan_half, epsilon = 1e-6);
        // w comes from +z
        assert_relative_eq!(proj[(3, 2)], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_perspective_depth_range() {
        let proj = Mat4::perspective(constants::HALF_PI, 1.0, 1.0, 100.0);

        // Near plane maps to depth 0, far plane to depth 1 after w-divide.
        let near = proj * Vec4::new(0.0, 0.0, 1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, 100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_forward_is_positive_z() {
        let view = Mat4::look_at(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );

        // A point straight ahead of the eye lands on the +z view axis.
        let p = view.transform_point(&Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-6);
    }
}
