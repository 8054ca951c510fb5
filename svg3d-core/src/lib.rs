//! SVG3D Core Library - scene graph, projection and vector output
//!
//! Builds a hierarchy of groups, meshes and cameras, projects every visible
//! mesh triangle through a perspective camera, orders the results back to
//! front and draws them as flat 2D triangles into a [`Surface`] such as
//! [`SvgSurface`] or the recording [`DrawList`].

pub mod color;
pub mod error;
pub mod framing;
pub mod geometry;
pub mod material;
pub mod primitives;
pub mod projection;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod stl;
pub mod surface;
pub mod svg;
pub mod transform;

// Re-export commonly used types
pub use color::Color;
pub use error::{Error, Result};
pub use framing::{bounding_box, camera_distance, frame_object, BoundingBox, FrameTarget};
pub use geometry::{BufferAttribute, BufferGeometry, DrawRange};
pub use material::{Material, Side};
pub use projection::Camera;
pub use renderer::{FrameStats, QueuedTriangle, Renderer, RendererOptions};
pub use scene::{Mesh, NodeId, NodeKind, Object3D, Scene};
pub use shading::{Modifier, Shader, ShadingRecord};
pub use surface::{DrawCommand, DrawList, ScreenTriangle, Surface};
pub use svg::SvgSurface;
pub use transform::Euler;
