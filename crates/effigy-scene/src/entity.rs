//! The owned result of a mesh build.

use effigy_core::Result;
use glam::{Quat, Vec3};

use crate::builder::{BodyFrame, HeadFrame};
use crate::gpu::{self, GpuEntity};
use crate::resources::{ResourceContext, ResourceStats};
use crate::scene::{Motion, SceneNode, Transform};

/// Bob cycles per second, in radians.
const BOB_SPEED: f32 = 4.0;
const STRIDE_SPEED: f32 = 8.0;
const FLAP_SPEED: f32 = 10.0;

/// An entity's 3D subtree plus the frames it was built in.
///
/// Owns every geometry and material in the subtree; dropping the entity
/// returns them all to its context's ledger.
#[derive(Debug)]
pub struct MeshEntity {
    root: SceneNode,
    body: BodyFrame,
    head: HeadFrame,
    ctx: ResourceContext,
}

impl MeshEntity {
    pub(crate) fn new(
        root: SceneNode,
        body: BodyFrame,
        head: HeadFrame,
        ctx: ResourceContext,
    ) -> Self {
        Self {
            root,
            body,
            head,
            ctx,
        }
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    pub fn body(&self) -> &BodyFrame {
        &self.body
    }

    pub fn head(&self) -> &HeadFrame {
        &self.head
    }

    /// Ledger counts of the context this entity was built in.
    pub fn resource_stats(&self) -> ResourceStats {
        self.ctx.stats()
    }

    /// Poses the subtree for `time` seconds. Only node transforms change;
    /// nothing is built or freed.
    pub fn animate(&mut self, time: f32) {
        self.root.visit_mut(&mut |node| {
            node.transform = pose(node.rest, node.motion, time);
        });
    }

    /// Uploads every mesh to GPU buffers.
    pub fn upload(&self, device: &wgpu::Device) -> Result<GpuEntity> {
        gpu::upload(device, &self.root)
    }
}

fn pose(rest: Transform, motion: Motion, time: f32) -> Transform {
    match motion {
        Motion::None => rest,
        Motion::Bob { amplitude } => {
            let lift = amplitude * 0.5 * (1.0 - (time * BOB_SPEED).cos());
            Transform {
                translation: rest.translation + Vec3::Y * lift,
                ..rest
            }
        }
        Motion::Swing { amplitude, phase } => {
            let angle = amplitude * (time * STRIDE_SPEED + phase).sin();
            rest.with_rotation(rest.rotation * Quat::from_rotation_z(angle))
        }
        Motion::Flap { amplitude, sign } => {
            let angle = sign * amplitude * (time * FLAP_SPEED).sin();
            rest.with_rotation(rest.rotation * Quat::from_rotation_x(angle))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MeshBuilder;
    use effigy_core::{Classified, Feature, Rect, Shape, VisualDescriptor};

    fn walker() -> VisualDescriptor {
        let leg = |label: &str, x: f32| {
            Feature::new(
                label,
                "#553311",
                Shape::Rectangle(Rect {
                    x,
                    y: 40.0,
                    width: 5.0,
                    height: 12.0,
                }),
            )
        };
        VisualDescriptor {
            features: vec![
                leg("front left leg", 50.0),
                leg("front right leg", 44.0),
                leg("back left leg", 12.0),
                leg("back right leg", 6.0),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_animate_only_moves_nodes() {
        let ctx = ResourceContext::new();
        let mut entity = MeshBuilder::new(&ctx).build(&Classified::new(walker()));
        let before = ctx.stats();
        let nodes = entity.root().node_count();
        let leg_rest = entity.root().find("leg.FL").unwrap().rest;

        entity.animate(0.2);
        assert_eq!(ctx.stats(), before);
        assert_eq!(entity.root().node_count(), nodes);
        let leg = entity.root().find("leg.FL").unwrap();
        assert_ne!(leg.transform, leg_rest);
        assert_eq!(leg.transform.translation, leg_rest.translation);

        let rig = entity.root().find("rig").unwrap();
        assert!(rig.transform.translation.y > 0.0);
        assert_eq!(entity.root().find("shadow").unwrap().transform.translation.y, 0.002);
    }

    #[test]
    fn test_diagonal_legs_swing_together() {
        let ctx = ResourceContext::new();
        let mut entity = MeshBuilder::new(&ctx).build(&Classified::new(walker()));
        entity.animate(0.3);
        let root = entity.root();
        let rotation = |name: &str| root.find(name).unwrap().transform.rotation;
        assert!(rotation("leg.FL").abs_diff_eq(rotation("leg.BR"), 1e-6));
        assert!(rotation("leg.FL").abs_diff_eq(rotation("leg.FR").inverse(), 1e-5));
    }

    #[test]
    fn test_animate_at_zero_is_rest() {
        let ctx = ResourceContext::new();
        let mut entity = MeshBuilder::new(&ctx).build(&Classified::new(walker()));
        entity.animate(0.0);
        entity.root().visit(glam::Mat4::IDENTITY, &mut |node, _| {
            assert!(node
                .transform
                .rotation
                .abs_diff_eq(node.rest.rotation, 1e-5));
            assert!(node
                .transform
                .translation
                .abs_diff_eq(node.rest.translation, 1e-6));
        });
    }

    #[test]
    fn test_drop_releases_everything() {
        let ctx = ResourceContext::new();
        let entity = MeshBuilder::new(&ctx).build(&Classified::new(walker()));
        assert!(entity.resource_stats().live() > 0);
        drop(entity);
        assert_eq!(ctx.stats().live(), 0);
    }
}
