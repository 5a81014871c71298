//! 3D backend for effigy.
//!
//! This crate lifts a classified descriptor into a retained scene subtree:
//! - [`MeshBuilder`] places body parts anatomically from [`BodyPart`] buckets
//! - [`SceneNode`] trees own their [`Geometry`] and [`Material`]s
//! - [`ResourceContext`] tracks every live resource so leaks are observable
//! - [`MeshEntity::upload`] turns a subtree into wgpu buffers
//!
//! [`BodyPart`]: effigy_core::BodyPart

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Mesh generation converts between counts, indices and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
// Placement math reads better with explicit intermediate names
#![allow(clippy::similar_names)]

pub mod builder;
pub mod entity;
pub mod geometry;
pub mod gpu;
pub mod material;
pub mod options;
pub mod resources;
pub mod scene;

pub use builder::{
    head_radius, projection_depth, resolve_sides, BodyFrame, Depth, HeadFrame, LegSlot,
    MeshBuilder, PIXEL_SCALE,
};
pub use entity::MeshEntity;
pub use geometry::{Geometry, GeometryKind, MeshData};
pub use gpu::{GpuEntity, GpuMesh, GpuVertex};
pub use material::Material;
pub use options::MeshOptions;
pub use resources::{ResourceContext, ResourceKind, ResourceStats};
pub use scene::{Motion, NodeKind, PointLight, SceneNode, Transform};
