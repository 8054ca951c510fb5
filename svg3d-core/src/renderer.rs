//! Projects a scene through a camera and emits depth-sorted triangles.
//!
//! Each frame: propagate world matrices, build the view-projection matrix,
//! project every visible mesh triangle, sort back to front (painter's
//! algorithm), then draw into a [`Surface`] in that order. There is no depth
//! buffer and no clipping: a triangle is dropped only when all three vertices
//! fall outside the clip depth range.

use std::path::Path;

use nalgebra::{Matrix4, Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::{BufferAttribute, BufferGeometry};
use crate::material::{Material, Side};
use crate::scene::{Mesh, NodeId, NodeKind, Object3D, Scene};
use crate::shading::ShadingRecord;
use crate::surface::{ScreenTriangle, Surface};
use crate::transform::{apply_matrix4, invert, transform_direction};

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererOptions {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    pub clear_color: Color,
    /// Drop triangles whose winding does not match the material's [`Side`].
    /// Counter-clockwise in NDC is the front face.
    pub cull_faces: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            clear_color: Color::from_hex(0x1a1a2e),
            cull_faces: false,
        }
    }
}

impl RendererOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Visible meshes walked
    pub meshes: usize,
    /// Triangles considered
    pub triangles: usize,
    /// Triangles drawn
    pub emitted: usize,
    /// Dropped because all three vertices were outside the depth range
    pub behind: usize,
    /// Dropped by face culling
    pub culled: usize,
    /// Dropped for out-of-range indices or non-finite projection
    pub degenerate: usize,
}

/// A triangle ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedTriangle {
    pub points: ScreenTriangle,
    /// Mean NDC z of the three vertices; larger is farther
    pub depth: f32,
    pub color: Color,
    pub wireframe: bool,
}

struct ProjectedVertex {
    screen: Point2<f32>,
    depth: f32,
    behind: bool,
    record: ShadingRecord,
}

/// Attribute views for one mesh.
struct VertexSource<'a> {
    positions: &'a BufferAttribute,
    normals: Option<&'a BufferAttribute>,
    uvs: Option<&'a BufferAttribute>,
    colors: Option<&'a BufferAttribute>,
}

impl<'a> VertexSource<'a> {
    fn new(geometry: &'a BufferGeometry) -> Option<Self> {
        Some(Self {
            positions: geometry.position()?,
            normals: geometry.normal(),
            uvs: geometry.uv(),
            colors: geometry.color(),
        })
    }
}

fn component(values: &[f32], i: usize) -> f32 {
    values.get(i).copied().unwrap_or(0.0)
}

fn vec3(values: &[f32]) -> Vector3<f32> {
    Vector3::new(component(values, 0), component(values, 1), component(values, 2))
}

/// Painter's-algorithm renderer.
///
/// Holds only configuration and a reusable triangle queue; scenes, geometry
/// and materials stay with the caller.
pub struct Renderer {
    options: RendererOptions,
    half_width: f32,
    half_height: f32,
    queue: Vec<QueuedTriangle>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RendererOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RendererOptions) -> Self {
        let mut renderer = Self {
            options,
            half_width: 0.0,
            half_height: 0.0,
            queue: Vec::new(),
        };
        renderer.set_size(renderer.options.width, renderer.options.height);
        renderer
    }

    pub fn options(&self) -> &RendererOptions {
        &self.options
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.options.width = width;
        self.options.height = height;
        self.half_width = width as f32 / 2.0;
        self.half_height = height as f32 / 2.0;
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.options.clear_color = color;
    }

    pub fn set_cull_faces(&mut self, cull: bool) {
        self.options.cull_faces = cull;
    }

    /// Triangles drawn by the last frame, in draw order (farthest first).
    pub fn queue(&self) -> &[QueuedTriangle] {
        &self.queue
    }

    /// Render one frame of `scene` as seen from the `camera` node.
    ///
    /// Matrices are propagated here, so it is safe to call right after
    /// mutating transforms. A `camera` handle that is stale or not a camera
    /// leaves the surface cleared and draws nothing.
    pub fn render<S>(&mut self, scene: &mut Scene, camera: NodeId, surface: &mut S) -> FrameStats
    where
        S: Surface + ?Sized,
    {
        let root = scene.root();
        scene.update_matrix_world(root);
        scene.update_matrix_world(camera);
        let view_projection = view_projection(scene, camera);

        surface.set_size(self.options.width, self.options.height);
        surface.clear(self.options.clear_color);
        self.queue.clear();

        let mut stats = FrameStats::default();
        let Some(view_projection) = view_projection else {
            tracing::warn!("render called with {camera:?}, which is not a camera node");
            return stats;
        };

        self.project_node(scene, root, &view_projection, &mut stats);

        // stable: equal depths keep traversal order
        self.queue.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        for triangle in &self.queue {
            if triangle.wireframe {
                surface.stroke_triangle(&triangle.points, triangle.color);
            } else {
                surface.fill_triangle(&triangle.points, triangle.color);
            }
        }
        stats.emitted = self.queue.len();

        tracing::debug!(
            meshes = stats.meshes,
            triangles = stats.triangles,
            emitted = stats.emitted,
            behind = stats.behind,
            culled = stats.culled,
            degenerate = stats.degenerate,
            "frame rendered"
        );
        stats
    }

    fn project_node(
        &mut self,
        scene: &Scene,
        id: NodeId,
        view_projection: &Matrix4<f32>,
        stats: &mut FrameStats,
    ) {
        let Some(node) = scene.get(id) else {
            return;
        };
        if !node.visible {
            return;
        }
        if let NodeKind::Mesh(mesh) = &node.kind {
            stats.meshes += 1;
            self.project_mesh(node, mesh, view_projection, stats);
        }
        for &child in node.children() {
            self.project_node(scene, child, view_projection, stats);
        }
    }

    fn project_mesh(
        &mut self,
        node: &Object3D,
        mesh: &Mesh,
        view_projection: &Matrix4<f32>,
        stats: &mut FrameStats,
    ) {
        let Some(source) = VertexSource::new(&mesh.geometry) else {
            tracing::trace!(name = ?node.name, "mesh has no position attribute, skipped");
            return;
        };
        let world = node.matrix_world();
        let model_view_projection = view_projection * world;
        let material: &Material = &mesh.material;

        for [i0, i1, i2] in mesh.geometry.triangles() {
            stats.triangles += 1;

            let project = |i| self.project_vertex(&source, i, world, &model_view_projection);
            let (Some(a), Some(b), Some(c)) = (project(i0), project(i1), project(i2)) else {
                tracing::trace!(i0, i1, i2, "triangle references a missing vertex");
                stats.degenerate += 1;
                continue;
            };

            if a.behind && b.behind && c.behind {
                stats.behind += 1;
                continue;
            }

            let points = [a.screen, b.screen, c.screen];
            let depth = (a.depth + b.depth + c.depth) / 3.0;
            if !depth.is_finite() || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
                tracing::trace!(i0, i1, i2, "triangle projected to non-finite coordinates");
                stats.degenerate += 1;
                continue;
            }

            if self.options.cull_faces && !faces_side(&points, material.side) {
                stats.culled += 1;
                continue;
            }

            let color = if material.shader.is_some() {
                Color::average(
                    material.shade(&a.record),
                    material.shade(&b.record),
                    material.shade(&c.record),
                )
            } else {
                material.color
            };

            self.queue.push(QueuedTriangle {
                points,
                depth,
                color,
                wireframe: material.wireframe,
            });
        }
    }

    fn project_vertex(
        &self,
        source: &VertexSource<'_>,
        index: usize,
        world: &Matrix4<f32>,
        model_view_projection: &Matrix4<f32>,
    ) -> Option<ProjectedVertex> {
        let local = vec3(source.positions.get(index)?);
        let position = apply_matrix4(&local, world);
        let ndc = apply_matrix4(&local, model_view_projection);

        let normal = source
            .normals
            .and_then(|n| n.get(index))
            .map(|n| {
                // zero-length normals stay zero instead of turning into NaN
                let n = transform_direction(&vec3(n), world);
                n.try_normalize(0.0).unwrap_or(n)
            });
        let uv = source
            .uvs
            .and_then(|uv| uv.get(index))
            .map(|uv| [component(uv, 0), component(uv, 1)]);
        let color = source
            .colors
            .and_then(|c| c.get(index))
            .map(|c| [component(c, 0), component(c, 1), component(c, 2)]);

        Some(ProjectedVertex {
            screen: Point2::new(
                self.half_width + ndc.x * self.half_width,
                self.half_height - ndc.y * self.half_height,
            ),
            depth: ndc.z,
            behind: ndc.z < -1.0 || ndc.z > 1.0,
            record: ShadingRecord {
                position,
                normal,
                uv,
                color,
            },
        })
    }
}

/// Projection times the inverse camera world matrix, or `None` if `camera` is
/// not a camera node. Rebuilds the camera's projection matrix.
fn view_projection(scene: &mut Scene, camera: NodeId) -> Option<Matrix4<f32>> {
    let node = scene.get_mut(camera)?;
    let mut view = *node.matrix_world();
    let camera = node.as_camera_mut()?;
    camera.update_projection_matrix();

    if !invert(&mut view) {
        tracing::warn!("camera world matrix is singular, projecting without its inverse");
    }
    Some(camera.projection_matrix() * view)
}

/// Whether a screen-space triangle faces the way `side` keeps.
///
/// Screen y points down, so a counter-clockwise NDC triangle has negative
/// signed area here.
fn faces_side(points: &ScreenTriangle, side: Side) -> bool {
    let [a, b, c] = points;
    let area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
    match side {
        Side::Front => area < 0.0,
        Side::Back => area > 0.0,
        Side::Both => true,
    }
}
