//! A minimal retained scene graph.
//!
//! Nodes own their children, geometry and (shared) materials, so the scene is
//! a plain tree: dropping a node drops its whole subtree and releases every
//! resource it held.

use std::rc::Rc;

use effigy_core::Color;
use glam::{Mat4, Quat, Vec3};

use crate::geometry::Geometry;
use crate::material::Material;

/// Local translation, rotation and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// A point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    /// Distance at which the light falls off to zero.
    pub range: f32,
}

/// Procedural motion applied by [`crate::MeshEntity::animate`], relative
/// to a node's rest transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Motion {
    #[default]
    None,
    /// Vertical bob of the given amplitude.
    Bob { amplitude: f32 },
    /// Swing about the Z axis; `phase` offsets the cycle.
    Swing { amplitude: f32, phase: f32 },
    /// Flap about the X axis; `sign` mirrors left and right.
    Flap { amplitude: f32, sign: f32 },
}

/// What a node carries besides its children.
#[derive(Debug)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: Geometry,
        material: Rc<Material>,
    },
    Light(PointLight),
}

/// One node of the scene tree.
#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Transform the node returns to when not animated.
    pub rest: Transform,
    pub motion: Motion,
    /// Index of the descriptor feature this node was built from.
    pub feature: Option<usize>,
    pub kind: NodeKind,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::IDENTITY,
            rest: Transform::IDENTITY,
            motion: Motion::None,
            feature: None,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: Rc<Material>) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn light(name: impl Into<String>, light: PointLight) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    /// Sets both the current and rest transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.rest = transform;
        self
    }

    #[must_use]
    pub fn at(self, translation: Vec3) -> Self {
        self.with_transform(Transform::from_translation(translation))
    }

    #[must_use]
    pub fn with_motion(mut self, motion: Motion) -> Self {
        self.motion = motion;
        self
    }

    #[must_use]
    pub fn for_feature(mut self, index: usize) -> Self {
        self.feature = Some(index);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh { .. })
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            NodeKind::Mesh { geometry, .. } => Some(geometry),
            _ => None,
        }
    }

    pub fn material(&self) -> Option<&Material> {
        match &self.kind {
            NodeKind::Mesh { material, .. } => Some(material.as_ref()),
            _ => None,
        }
    }

    /// Depth-first search by exact name.
    pub fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(name))
    }

    /// Visits every node depth-first with its world matrix.
    pub fn visit(&self, parent: Mat4, f: &mut impl FnMut(&SceneNode, Mat4)) {
        let world = parent * self.transform.matrix();
        f(self, world);
        for child in &self.children {
            child.visit(world, f);
        }
    }

    /// Visits every node mutably, depth-first.
    pub fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    /// Nodes in this subtree whose name starts with `prefix`.
    pub fn count_prefixed(&self, prefix: &str) -> usize {
        let mut count = 0;
        self.visit(Mat4::IDENTITY, &mut |node, _| {
            if node.name.starts_with(prefix) {
                count += 1;
            }
        });
        count
    }

    /// World-space position of the first node named `name`.
    pub fn world_position(&self, name: &str) -> Option<Vec3> {
        let mut found = None;
        self.visit(Mat4::IDENTITY, &mut |node, world| {
            if found.is_none() && node.name == name {
                found = Some(world.w_axis.truncate());
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::options::MeshOptions;
    use crate::resources::ResourceContext;

    #[test]
    fn test_world_positions_compose() {
        let root = SceneNode::group("root")
            .at(Vec3::new(1.0, 0.0, 0.0))
            .with_child(
                SceneNode::group("arm")
                    .with_transform(
                        Transform::from_translation(Vec3::new(0.0, 2.0, 0.0))
                            .with_scale(Vec3::splat(2.0)),
                    )
                    .with_child(SceneNode::group("hand").at(Vec3::new(0.0, 1.0, 0.0))),
            );
        let hand = root.world_position("hand").unwrap();
        assert!((hand - Vec3::new(1.0, 4.0, 0.0)).length() < 1e-5);
        assert_eq!(root.node_count(), 3);
        assert!(root.find("missing").is_none());
    }

    #[test]
    fn test_dropping_subtree_releases_resources() {
        let ctx = ResourceContext::new();
        let options = MeshOptions::default();
        let material = Rc::new(Material::standard(&ctx, "skin", Color::WHITE));
        let mut root = SceneNode::group("root");
        for i in 0..3 {
            root.add_child(SceneNode::mesh(
                format!("part.{i}"),
                Geometry::sphere(&ctx, 0.1, &options),
                Rc::clone(&material),
            ));
        }
        drop(material);
        assert_eq!(ctx.stats().live_geometries, 3);
        assert_eq!(ctx.stats().live_materials, 1);
        assert_eq!(root.count_prefixed("part."), 3);

        drop(root);
        assert_eq!(ctx.stats().live(), 0);
    }
}
