//! First-person camera
//!
//! Position plus an orthonormal basis (right/up/look), with walk/strafe and
//! pitch/yaw controls. The view matrix is rebuilt lazily after movement and
//! maps world space to a view space whose +z axis is the look direction,
//! which is the convention the picker's screen-ray construction assumes.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};

/// First-person camera with perspective lens
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    right: Vec3,
    up: Vec3,
    look: Vec3,

    near_z: f32,
    far_z: f32,

    view: Mat4,
    proj: Mat4,
    view_dirty: bool,
}

impl Default for Camera {
    fn default() -> Self {
        let mut camera = Self {
            position: Vec3::zeros(),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            look: Vec3::new(0.0, 0.0, 1.0),
            near_z: 0.0,
            far_z: 0.0,
            view: Mat4::identity(),
            proj: Mat4::identity(),
            view_dirty: true,
        };
        camera.set_lens(0.25 * std::f32::consts::PI, 1.0, 1.0, 1000.0);
        camera
    }
}

impl Camera {
    /// Create a camera with the given lens
    pub fn new(fov_y: f32, aspect: f32, near_z: f32, far_z: f32) -> Self {
        let mut camera = Self::default();
        camera.set_lens(fov_y, aspect, near_z, far_z);
        camera
    }

    /// Set the perspective lens
    pub fn set_lens(&mut self, fov_y: f32, aspect: f32, near_z: f32, far_z: f32) {
        self.near_z = near_z;
        self.far_z = far_z;
        self.proj = Mat4::perspective(fov_y, aspect, near_z, far_z);
    }

    /// World-space position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the camera to a position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.view_dirty = true;
    }

    /// Orient the camera to look from `position` toward `target`
    pub fn look_at(&mut self, position: Vec3, target: Vec3, world_up: Vec3) {
        self.position = position;
        self.look = (target - position).normalize();
        self.right = world_up.cross(&self.look).normalize();
        self.up = self.look.cross(&self.right);
        self.view_dirty = true;
    }

    /// Near clip plane distance
    pub fn near_z(&self) -> f32 {
        self.near_z
    }

    /// Far clip plane distance
    pub fn far_z(&self) -> f32 {
        self.far_z
    }

    /// Move along the look vector
    pub fn walk(&mut self, distance: f32) {
        self.position += distance * self.look;
        self.view_dirty = true;
    }

    /// Move along the right vector
    pub fn strafe(&mut self, distance: f32) {
        self.position += distance * self.right;
        self.view_dirty = true;
    }

    /// Rotate the view up/down around the right vector
    pub fn pitch(&mut self, angle: f32) {
        let rotation = nalgebra::Rotation3::from_axis_angle(
            &nalgebra::Unit::new_normalize(self.right),
            angle,
        );
        self.up = rotation * self.up;
        self.look = rotation * self.look;
        self.view_dirty = true;
    }

    /// Rotate the basis around the world y-axis
    pub fn rotate_y(&mut self, angle: f32) {
        let rotation = nalgebra::Rotation3::from_axis_angle(&Vec3::y_axis(), angle);
        self.right = rotation * self.right;
        self.up = rotation * self.up;
        self.look = rotation * self.look;
        self.view_dirty = true;
    }

    /// Rebuild the view matrix if any movement invalidated it.
    ///
    /// Re-orthonormalizes the basis so error from incremental rotations never
    /// accumulates.
    pub fn update_view_matrix(&mut self) {
        if !self.view_dirty {
            return;
        }

        self.look = self.look.normalize();
        self.up = self.look.cross(&self.right).normalize();
        self.right = self.up.cross(&self.look);

        let x = -self.position.dot(&self.right);
        let y = -self.position.dot(&self.up);
        let z = -self.position.dot(&self.look);

        self.view = Mat4::new(
            self.right.x, self.right.y, self.right.z, x,
            self.up.x, self.up.y, self.up.z, y,
            self.look.x, self.look.y, self.look.z, z,
            0.0, 0.0, 0.0, 1.0,
        );
        self.view_dirty = false;
    }

    /// View matrix.
    ///
    /// # Panics
    /// The view must be current; call [`Self::update_view_matrix`] after
    /// moving the camera.
    pub fn view(&self) -> Mat4 {
        assert!(!self.view_dirty, "view matrix read before update_view_matrix");
        self.view
    }

    /// Inverse view matrix, assembled directly from the basis (exact for a
    /// rigid transform, no numeric inversion).
    pub fn inv_view(&self) -> Mat4 {
        assert!(!self.view_dirty, "view matrix read before update_view_matrix");
        Mat4::new(
            self.right.x, self.up.x, self.look.x, self.position.x,
            self.right.y, self.up.y, self.look.y, self.position.y,
            self.right.z, self.up.z, self.look.z, self.position.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Projection matrix
    pub fn proj(&self) -> Mat4 {
        self.proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat_eq(a: &Mat4, b: &Mat4) {
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(a[(i, j)], b[(i, j)], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut camera = Camera::default();
        camera.rotate_y(0.7);
        camera.pitch(-0.3);
        camera.rotate_y(-1.9);
        camera.update_view_matrix();

        let view = camera.view();
        let inv = camera.inv_view();
        assert_mat_eq(&(view * inv), &Mat4::identity());
    }

    #[test]
    fn test_walk_moves_along_look() {
        let mut camera = Camera::default();
        camera.look_at(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.walk(2.0);
        assert_relative_eq!(camera.position().z, -3.0, epsilon = 1e-6);

        camera.strafe(1.0);
        assert_relative_eq!(camera.position().x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_view_maps_target_to_positive_z() {
        let mut camera = Camera::default();
        camera.look_at(
            Vec3::new(0.0, 0.0, -5.0),
            Vec3::zeros(),
            Vec3::new(0.0, 1.0, 0.0),
        );
        camera.update_view_matrix();

        let p = camera
            .view()
            .transform_point(&crate::foundation::math::Point3::new(0.0, 0.0, 0.0));
        assert_relative_eq!(p.z, 5.0, epsilon = 1e-6);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
    }

    #[test]
    #[should_panic(expected = "update_view_matrix")]
    fn test_stale_view_read_fails_fast() {
        let mut camera = Camera::default();
        camera.walk(1.0);
        let _ = camera.view();
    }
}
