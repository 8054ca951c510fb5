//! Camera framing helpers.
use nalgebra::Vector3;

use crate::geometry::BufferGeometry;
use crate::scene::{NodeId, Scene};

/// Axis-aligned bounds of a geometry's positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
    pub size: Vector3<f32>,
    pub center: Vector3<f32>,
}

impl BoundingBox {
    /// Largest extent along any axis
    pub fn max_dimension(&self) -> f32 {
        self.size.max()
    }
}

/// Bounds by linear scan of the position attribute; all zeros without one.
pub fn bounding_box(geometry: &BufferGeometry) -> BoundingBox {
    let zero = BoundingBox {
        min: Vector3::zeros(),
        max: Vector3::zeros(),
        size: Vector3::zeros(),
        center: Vector3::zeros(),
    };
    let Some(positions) = geometry.position() else {
        return zero;
    };
    if positions.count() == 0 {
        return zero;
    }

    let mut min = Vector3::repeat(f32::INFINITY);
    let mut max = Vector3::repeat(f32::NEG_INFINITY);
    for i in 0..positions.count() {
        let Some(v) = positions.get(i) else { break };
        let p = Vector3::new(
            v.first().copied().unwrap_or(0.0),
            v.get(1).copied().unwrap_or(0.0),
            v.get(2).copied().unwrap_or(0.0),
        );
        min = min.inf(&p);
        max = max.sup(&p);
    }

    BoundingBox {
        min,
        max,
        size: max - min,
        center: (min + max) / 2.0,
    }
}

/// Distance at which an object of `size` fills `fraction` of the viewport
/// height for a vertical field of view of `fov_degrees`.
pub fn camera_distance(size: f32, fov_degrees: f32, fraction: f32) -> f32 {
    let half_fov = (fov_degrees.to_radians() / 2.0).tan();
    size / (half_fov * fraction)
}

/// What to frame: an explicit size or a geometry's largest dimension.
#[derive(Debug, Clone, Copy)]
pub enum FrameTarget<'a> {
    Size(f32),
    Geometry(&'a BufferGeometry),
}

/// Place `camera` on the +Z axis looking at the origin so `target` fills
/// `fraction` of the view, and rebuild its projection.
///
/// Does nothing if `camera` is not a camera node.
pub fn frame_object(scene: &mut Scene, camera: NodeId, target: FrameTarget<'_>, fraction: f32) {
    let size = match target {
        FrameTarget::Size(size) => size,
        FrameTarget::Geometry(geometry) => bounding_box(geometry).max_dimension(),
    };
    let Some(fov) = scene.camera(camera).map(|c| c.fov) else {
        tracing::warn!("frame_object called with {camera:?}, which is not a camera node");
        return;
    };

    let distance = camera_distance(size, fov, fraction);
    if let Some(node) = scene.get_mut(camera) {
        node.position = Vector3::new(0.0, 0.0, distance);
    }
    scene.look_at(camera, &Vector3::zeros());
    if let Some(camera) = scene.camera_mut(camera) {
        camera.update_projection_matrix();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::box_geometry;
    use crate::projection::Camera;

    #[test]
    fn test_bounding_box_of_box() {
        let bounds = bounding_box(&box_geometry(2.0, 4.0, 6.0));
        assert_eq!(bounds.min, Vector3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(bounds.size, Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.center, Vector3::zeros());
        assert_eq!(bounds.max_dimension(), 6.0);
    }

    #[test]
    fn test_bounding_box_without_positions() {
        let bounds = bounding_box(&BufferGeometry::new());
        assert_eq!(bounds.size, Vector3::zeros());
    }

    #[test]
    fn test_camera_distance() {
        // tan(45deg) = 1
        let d = camera_distance(2.0, 90.0, 0.5);
        assert!((d - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_frame_object_places_camera() {
        let mut scene = Scene::new();
        let camera = scene.spawn_camera(Camera::new(90.0, 1.0, 0.1, 100.0));
        let geometry = box_geometry(1.0, 1.0, 1.0);
        frame_object(&mut scene, camera, FrameTarget::Geometry(&geometry), 0.25);

        let node = scene.get(camera).unwrap();
        assert!((node.position.z - 4.0).abs() < 1e-5);
        assert!((node.quaternion.w.abs() - 1.0).abs() < 1e-6);
    }
}
