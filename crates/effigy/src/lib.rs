//! effigy: one visual descriptor, four renderings.
//!
//! A descriptor is a small shape-based IR: a body outline plus up to twenty
//! labeled primitives. effigy repairs untrusted descriptors, classifies
//! their features into anatomy from the labels, and draws them as
//!
//! - a flat 2D sprite ([`draw_sprite`])
//! - a procedurally animated 3D entity ([`MeshBuilder`])
//! - a neon wireframe ([`draw_wireframe`])
//! - an isometric voxel figure ([`draw_voxel`])
//!
//! # Quick Start
//!
//! ```no_run
//! use effigy::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let json = r##"{
//!         "baseShape": "ellipse", "width": 40, "height": 24,
//!         "features": [
//!             {"label": "head", "color": "#AA7744", "type": "circle", "x": 16, "y": 16, "radius": 14}
//!         ]
//!     }"##;
//!
//!     let mut viewer = AssetViewer::from_json(json, ViewerConfig::default());
//!     viewer.advance(0.5);
//!     viewer.save("effigy.png")?;
//!     Ok(())
//! }
//! ```

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel sizes move between u32 panel sizes and f32 drawing coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod config;
pub mod preview;
pub mod viewer;

use std::path::Path;

pub use config::{SpriteFacing, ViewerConfig};
pub use preview::{draw_scene, render_scene, PreviewCamera};
pub use viewer::{AssetViewer, Panel};

// Re-export core types
pub use effigy_core::{
    classify, sanitize_json, sanitize_value, Anatomy, BaseShape, BodyPart, Classified, Color,
    EffigyError, Feature, Outline, Palette, Result, Shape, Side, VisualDescriptor, Vec2, Vec3,
};

// Re-export 2D backends
pub use effigy_render::{
    draw_sprite, draw_voxel, draw_wireframe, save_image, Canvas, DrawCall, Facing, IsoGrid,
    RasterCanvas, RecordingCanvas, VectorParams,
};

// Re-export the 3D backend
pub use effigy_scene::{
    GpuEntity, MeshBuilder, MeshEntity, MeshOptions, ResourceContext, ResourceStats, SceneNode,
};

/// Installs the `env_logger` backend, honoring `RUST_LOG`. Safe to call
/// more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Sanitizes `json`, renders every panel, and writes the strip to `path`
/// as PNG or JPEG.
///
/// # Example
/// ```no_run
/// effigy::render_to_file(r#"{"width": 32, "height": 32}"#, "out.png", &Default::default())
///     .unwrap();
/// ```
pub fn render_to_file(json: &str, path: impl AsRef<Path>, config: &ViewerConfig) -> Result<()> {
    config.validate()?;
    AssetViewer::from_json(json, config.clone()).save(path)
}

/// Sanitizes `json` and renders every panel into one RGBA strip.
pub fn render_to_image(json: &str, config: &ViewerConfig) -> Result<image::RgbaImage> {
    config.validate()?;
    Ok(AssetViewer::from_json(json, config.clone()).render())
}
