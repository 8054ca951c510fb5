//! Camera projection state
use nalgebra::{Matrix4, Quaternion, Vector3};

use crate::transform::{make_perspective, quaternion_from_euler, Euler};

/// Perspective camera parameters.
///
/// The cached projection matrix is only rebuilt by
/// [`update_projection_matrix`](Self::update_projection_matrix); changing a
/// field alone has no effect on it. The camera's placement lives on its scene
/// node.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Full vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            fov,
            aspect,
            near,
            far,
            projection_matrix: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Camera whose aspect ratio matches a viewport in pixels
    pub fn for_viewport(width: u32, height: u32) -> Self {
        Self::new(50.0, width as f32 / height.max(1) as f32, 0.1, 2000.0)
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = make_perspective(self.fov, self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection_matrix
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}

/// Orientation that points a -Z-forward camera at `eye` toward `target`.
///
/// Pitch comes from the vertical angle and yaw from the horizontal one; roll is
/// always zero.
pub fn look_at_rotation(eye: &Vector3<f32>, target: &Vector3<f32>) -> Quaternion<f32> {
    let d = target - eye;
    let horizontal = (d.x * d.x + d.z * d.z).sqrt();
    let pitch = d.y.atan2(horizontal);
    let yaw = (-d.x).atan2(-d.z);
    quaternion_from_euler(&Euler::new(pitch, yaw, 0.0))
}
