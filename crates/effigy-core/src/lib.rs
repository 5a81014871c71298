//! Core data model for effigy.
//!
//! This crate provides the pieces every backend shares:
//! - [`VisualDescriptor`] and [`Feature`], the shape-based IR
//! - [`sanitize`], a total and idempotent repair pass for untrusted input
//! - [`classify`], label-driven anatomical classification into [`BodyPart`]s
//! - [`outline`], shape flattening shared by the 2D backends

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Shape math converts between counts and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod classify;
pub mod color;
pub mod descriptor;
pub mod error;
pub mod outline;
pub mod sanitize;

pub use classify::{classify, Anatomy, BodyPart, Classified, Side};
pub use color::Color;
pub use descriptor::{
    Arc, BaseShape, Circle, Ellipse, Feature, Line, Palette, PointList, Rect, RoundedRect, Shape,
    UnknownShape, VisualDescriptor, MAX_FEATURES,
};
pub use error::{EffigyError, Result};
pub use outline::{base_outline, shape_outline, Outline};
pub use sanitize::{sanitize_feature, sanitize_json, sanitize_value};

// Re-export glam types for convenience
pub use glam::{Vec2, Vec3, Vec4};
