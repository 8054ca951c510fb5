//! Per-vertex shading functions.
//!
//! A [`Shader`] maps the interpolated attributes of one projected vertex to a
//! colour. Shaders are pure: the renderer may call one several times for the
//! same vertex (once per adjoining triangle) and expects the same answer.
//! Procedural effects in [`modifiers`] wrap an existing shader to make a new one.

pub mod modifiers;
pub mod noise;

use std::sync::Arc;

use nalgebra::Vector3;

use crate::color::Color;

pub use modifiers::{checker, compose, grain, marble, noise, stripes, Modifier};

/// Attributes of one projected vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingRecord {
    /// World-space position
    pub position: Vector3<f32>,
    /// World-space, renormalized; zero-length normals stay zero
    pub normal: Option<Vector3<f32>>,
    pub uv: Option<[f32; 2]>,
    /// Vertex colour channels in 0.0..=1.0
    pub color: Option<[f32; 3]>,
}

impl ShadingRecord {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            normal: None,
            uv: None,
            color: None,
        }
    }

    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.uv = Some([u, v]);
        self
    }

    pub fn with_color(mut self, r: f32, g: f32, b: f32) -> Self {
        self.color = Some([r, g, b]);
        self
    }
}

/// Shared, thread-safe shading function.
pub type Shader = Arc<dyn Fn(&ShadingRecord) -> Color + Send + Sync>;

/// Wrap a closure as a [`Shader`].
pub fn shader<F>(f: F) -> Shader
where
    F: Fn(&ShadingRecord) -> Color + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Ignores the record.
pub fn flat(color: Color) -> Shader {
    shader(move |_| color)
}

/// Single-light diffuse: `0.3 + 0.7 * max(0, normal.z)` times `color`.
///
/// The normal is world-space and the light direction is a fixed +Z, so the
/// result does not follow the camera. Vertices without a normal get the
/// ambient term only.
pub fn diffuse(color: Color) -> Shader {
    shader(move |v| {
        let facing = v.normal.map_or(0.0, |n| n.z.max(0.0));
        let k = 0.3 + 0.7 * facing;
        let [r, g, b] = color.to_f32();
        Color::from_f32((r * k).round(), (g * k).round(), (b * k).round())
    })
}

/// Vertex colour attribute, or neutral gray when absent.
pub fn vertex_color() -> Shader {
    shader(|v| match v.color {
        Some([r, g, b]) => Color::from_f32(r * 255.0, g * 255.0, b * 255.0),
        None => Color::GRAY,
    })
}

/// Debug view: U to red, V to green, fixed blue.
pub fn uv() -> Shader {
    shader(|v| {
        let [u, w] = v.uv.unwrap_or([0.0, 0.0]);
        Color::from_f32(u * 255.0, w * 255.0, 128.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ShadingRecord {
        ShadingRecord::at(Vector3::new(0.2, -0.4, 1.0))
    }

    #[test]
    fn test_flat_ignores_record() {
        let s = flat(Color::new(1, 2, 3));
        assert_eq!(s(&record()), Color::new(1, 2, 3));
        assert_eq!(s(&record().with_uv(0.5, 0.5)), Color::new(1, 2, 3));
    }

    #[test]
    fn test_diffuse_intensity() {
        let s = diffuse(Color::new(100, 200, 50));
        assert_eq!(s(&record().with_normal(Vector3::z())), Color::new(100, 200, 50));
        assert_eq!(s(&record().with_normal(-Vector3::z())), Color::new(30, 60, 15));
        assert_eq!(s(&record()), Color::new(30, 60, 15));

        // 0.3 + 0.7 * 0.5 = 0.65
        let s = diffuse(Color::new(100, 200, 60));
        let half = Vector3::new(0.0, 0.866_025_4, 0.5);
        assert_eq!(s(&record().with_normal(half)), Color::new(65, 130, 39));
    }

    #[test]
    fn test_vertex_color() {
        let s = vertex_color();
        assert_eq!(s(&record()), Color::GRAY);
        assert_eq!(s(&record().with_color(1.0, 0.5, 0.0)), Color::new(255, 127, 0));
    }

    #[test]
    fn test_uv_debug() {
        let s = uv();
        assert_eq!(s(&record().with_uv(1.0, 0.5)), Color::new(255, 127, 128));
        assert_eq!(s(&record()), Color::new(0, 0, 128));
    }
}
