//! Scene graph: transformable nodes arranged in a tree.
//!
//! Nodes live in a slot map owned by the [`Scene`]. Parents own their children
//! through the ordered `children` list; the `parent` field is a plain handle
//! back up the tree. The graph must stay a tree: reparenting a node under one
//! of its own descendants is a caller bug (asserted in debug builds only).

use std::sync::Arc;

use nalgebra::{Matrix4, Quaternion, Vector3};
use slotmap::{new_key_type, SlotMap};

use crate::geometry::BufferGeometry;
use crate::material::Material;
use crate::projection::{look_at_rotation, Camera};
use crate::transform::{compose, quaternion_from_euler, Euler};

new_key_type! {
    /// Handle to a node in a [`Scene`]
    pub struct NodeId;
}

/// Geometry and material drawn at a node's world transform.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Arc<BufferGeometry>,
    pub material: Arc<Material>,
}

/// What a node contributes beyond its transform.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Plain transform node
    Group,
    /// Contributes triangles to the render pass
    Mesh(Mesh),
    /// Viewpoint with projection state
    Camera(Camera),
}

/// A transformable node.
#[derive(Debug, Clone)]
pub struct Object3D {
    pub name: Option<String>,
    pub position: Vector3<f32>,
    pub quaternion: Quaternion<f32>,
    pub scale: Vector3<f32>,
    /// Hides this node and its whole subtree from the renderer
    pub visible: bool,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    matrix: Matrix4<f32>,
    matrix_world: Matrix4<f32>,
}

impl Object3D {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            position: Vector3::zeros(),
            quaternion: Quaternion::identity(),
            scale: Vector3::repeat(1.0),
            visible: true,
            kind,
            parent: None,
            children: Vec::new(),
            matrix: Matrix4::identity(),
            matrix_world: Matrix4::identity(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Local matrix as of the last [`update_matrix`](Self::update_matrix)
    pub fn matrix(&self) -> &Matrix4<f32> {
        &self.matrix
    }

    /// World matrix as of the last [`Scene::update_matrix_world`]
    pub fn matrix_world(&self) -> &Matrix4<f32> {
        &self.matrix_world
    }

    /// Recompute the local matrix from position, rotation and scale.
    pub fn update_matrix(&mut self) {
        self.matrix = compose(&self.position, &self.quaternion, &self.scale);
    }

    pub fn set_rotation_from_euler(&mut self, euler: &Euler) {
        self.quaternion = quaternion_from_euler(euler);
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_camera_mut(&mut self) -> Option<&mut Camera> {
        match &mut self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }
}

/// Owns every node and the root the renderer walks from.
///
/// Spawned nodes start detached; attach them with [`add`](Self::add). A camera
/// does not need to be attached to be used for rendering.
pub struct Scene {
    nodes: SlotMap<NodeId, Object3D>,
    root: NodeId,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Object3D::new(NodeKind::Group).with_name("scene"));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn spawn(&mut self, object: Object3D) -> NodeId {
        self.nodes.insert(object)
    }

    pub fn spawn_group(&mut self) -> NodeId {
        self.spawn(Object3D::new(NodeKind::Group))
    }

    pub fn spawn_mesh(&mut self, geometry: Arc<BufferGeometry>, material: Arc<Material>) -> NodeId {
        self.spawn(Object3D::new(NodeKind::Mesh(Mesh { geometry, material })))
    }

    pub fn spawn_camera(&mut self, camera: Camera) -> NodeId {
        self.spawn(Object3D::new(NodeKind::Camera(camera)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.nodes.get_mut(id)
    }

    pub fn camera(&self, id: NodeId) -> Option<&Camera> {
        self.get(id).and_then(Object3D::as_camera)
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut Camera> {
        self.get_mut(id).and_then(Object3D::as_camera_mut)
    }

    /// Attach `child` under `parent`, detaching it from its previous parent first.
    ///
    /// Returns `false` if either handle is stale or `child == parent`.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.nodes.contains_key(parent) || !self.nodes.contains_key(child) {
            return false;
        }
        debug_assert!(
            !self.is_ancestor(child, parent),
            "adding {child:?} under {parent:?} would create a cycle"
        );

        if let Some(old_parent) = self.nodes[child].parent {
            self.remove(old_parent, child);
        }
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        true
    }

    /// Detach `child` from `parent`. No-op (returns `false`) if it is not a child.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(parent) else {
            return false;
        };
        let Some(position) = node.children.iter().position(|&c| c == child) else {
            return false;
        };
        node.children.remove(position);
        if let Some(child) = self.nodes.get_mut(child) {
            child.parent = None;
        }
        true
    }

    /// Remove a node and its whole subtree from the scene.
    pub fn despawn(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.nodes.get(id).and_then(|n| n.parent) {
            self.remove(parent, id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    /// Whether `ancestor` lies on the parent chain of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    pub fn update_matrix(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.update_matrix();
        }
    }

    /// Recompute local and world matrices for `id` and everything below it.
    ///
    /// The starting node uses its parent's current world matrix as-is; nodes
    /// below it are visited parent-first in stored child order. Mutating a
    /// transform does not trigger this.
    pub fn update_matrix_world(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let parent_world = self
                .nodes
                .get(current)
                .and_then(|n| n.parent)
                .and_then(|p| self.nodes.get(p))
                .map(|p| p.matrix_world);

            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.update_matrix();
            node.matrix_world = match parent_world {
                Some(parent_world) => parent_world * node.matrix,
                None => node.matrix,
            };
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Pre-order depth-first walk starting at `id`.
    pub fn traverse<F>(&self, id: NodeId, mut visitor: F)
    where
        F: FnMut(NodeId, &Object3D),
    {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(current) {
                visitor(current, node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    pub fn set_rotation_from_euler(&mut self, id: NodeId, euler: &Euler) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.set_rotation_from_euler(euler);
        }
    }

    /// Orient a node (normally a camera) from its position toward `target`.
    pub fn look_at(&mut self, id: NodeId, target: &Vector3<f32>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.quaternion = look_at_rotation(&node.position, target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::apply_matrix4;

    #[test]
    fn test_default_node_inherits_parent_world() {
        let mut scene = Scene::new();
        let parent = scene.spawn_group();
        let child = scene.spawn_group();
        scene.add(scene.root(), parent);
        scene.add(parent, child);

        scene.get_mut(parent).unwrap().position = Vector3::new(1.0, 2.0, 3.0);
        scene.set_rotation_from_euler(parent, &Euler::new(0.3, 0.2, 0.1));
        scene.update_matrix_world(scene.root());

        let root_world = *scene.get(scene.root()).unwrap().matrix_world();
        assert!((root_world - Matrix4::identity()).norm() < 1e-6);

        let parent_world = *scene.get(parent).unwrap().matrix_world();
        let child_world = *scene.get(child).unwrap().matrix_world();
        assert!((parent_world - child_world).norm() < 1e-6);
    }

    #[test]
    fn test_world_matrix_chains() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        let b = scene.spawn_group();
        scene.add(scene.root(), a);
        scene.add(a, b);

        scene.get_mut(a).unwrap().position = Vector3::new(1.0, 0.0, 0.0);
        scene.get_mut(a).unwrap().scale = Vector3::repeat(2.0);
        scene.get_mut(b).unwrap().position = Vector3::new(0.0, 1.0, 0.0);
        scene.update_matrix_world(scene.root());

        let origin = apply_matrix4(&Vector3::zeros(), scene.get(b).unwrap().matrix_world());
        assert!((origin - Vector3::new(1.0, 2.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_update_is_not_automatic() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        scene.add(scene.root(), a);
        scene.get_mut(a).unwrap().position = Vector3::new(5.0, 0.0, 0.0);
        assert_eq!(*scene.get(a).unwrap().matrix_world(), Matrix4::identity());

        scene.update_matrix_world(scene.root());
        assert!((scene.get(a).unwrap().matrix_world()[(0, 3)] - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_add_reparents() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        let b = scene.spawn_group();
        let child = scene.spawn_group();
        scene.add(scene.root(), a);
        scene.add(scene.root(), b);

        assert!(scene.add(a, child));
        assert_eq!(scene.get(child).unwrap().parent(), Some(a));

        assert!(scene.add(b, child));
        assert_eq!(scene.get(child).unwrap().parent(), Some(b));
        assert!(scene.get(a).unwrap().children().is_empty());
        assert_eq!(scene.get(b).unwrap().children(), &[child]);
    }

    #[test]
    fn test_remove() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        let b = scene.spawn_group();
        scene.add(scene.root(), a);

        assert!(!scene.remove(scene.root(), b));
        assert!(scene.remove(scene.root(), a));
        assert_eq!(scene.get(a).unwrap().parent(), None);
        assert!(scene.get(scene.root()).unwrap().children().is_empty());
    }

    #[test]
    fn test_add_rejects_self_and_stale() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        assert!(!scene.add(a, a));

        let gone = scene.spawn_group();
        scene.despawn(gone);
        assert!(!scene.add(a, gone));
        assert!(scene.get(gone).is_none());
    }

    #[test]
    fn test_traverse_is_preorder() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene.spawn(Object3D::new(NodeKind::Group).with_name("a"));
        let a1 = scene.spawn(Object3D::new(NodeKind::Group).with_name("a1"));
        let a2 = scene.spawn(Object3D::new(NodeKind::Group).with_name("a2"));
        let b = scene.spawn(Object3D::new(NodeKind::Group).with_name("b"));
        scene.add(root, a);
        scene.add(a, a1);
        scene.add(a, a2);
        scene.add(root, b);

        let mut names = Vec::new();
        scene.traverse(root, |_, node| names.push(node.name.clone().unwrap_or_default()));
        assert_eq!(names, vec!["scene", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn test_despawn_removes_subtree() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        let a1 = scene.spawn_group();
        scene.add(scene.root(), a);
        scene.add(a, a1);

        scene.despawn(a);
        assert!(scene.get(a1).is_none());
        assert_eq!(scene.len(), 1);
        assert!(scene.get(scene.root()).unwrap().children().is_empty());
    }

    #[test]
    fn test_is_ancestor() {
        let mut scene = Scene::new();
        let a = scene.spawn_group();
        let b = scene.spawn_group();
        scene.add(scene.root(), a);
        scene.add(a, b);
        assert!(scene.is_ancestor(scene.root(), b));
        assert!(!scene.is_ancestor(b, a));
    }

    #[test]
    fn test_camera_accessors() {
        let mut scene = Scene::new();
        let cam = scene.spawn_camera(Camera::default());
        assert!(scene.camera(cam).is_some());
        assert!(scene.camera(scene.root()).is_none());

        scene.get_mut(cam).unwrap().position = Vector3::new(0.0, 0.0, 5.0);
        scene.look_at(cam, &Vector3::zeros());
        assert!((scene.get(cam).unwrap().quaternion.w.abs() - 1.0).abs() < 1e-6);
    }
}
