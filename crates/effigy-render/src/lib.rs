//! 2D rendering backends for effigy.
//!
//! This crate provides:
//! - The [`Canvas`] surface trait with a software rasterizer and a recorder
//! - [`sprite`], the immediate-mode descriptor renderer
//! - [`vector`], the glowing wireframe renderer
//! - [`voxel`], the template-based isometric renderer
//! - PNG/JPEG export

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Pixel math converts between float coordinates and integer pixels
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod canvas;
pub mod raster;
pub mod screenshot;
pub mod sprite;
pub mod vector;
pub mod voxel;

pub use canvas::{Canvas, DrawCall, Facing, Placement, RecordingCanvas};
pub use raster::RasterCanvas;
pub use screenshot::{save_image, save_to_buffer};
pub use sprite::{approximate_area, draw_order, draw_sprite, sprite_bounds};
pub use vector::{draw_wireframe, wireframe_paths, VectorParams};
pub use voxel::{draw_voxel, IsoGrid, PaletteSlot, Voxel, CRAWLER_TEMPLATE};
