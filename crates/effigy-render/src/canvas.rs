//! Raster surface abstraction shared by the 2D backends.

use effigy_core::{Color, Outline};
use glam::{Affine2, Vec2};

/// A caller-owned surface the 2D backends draw into.
///
/// Outlines arrive already transformed into surface pixels. Implementations
/// must accept any input, including empty or degenerate outlines.
pub trait Canvas {
    /// Fills the area enclosed by `outline` (implicitly closed).
    fn fill(&mut self, outline: &Outline, paint: Color);

    /// Strokes `outline` with a pen `width` pixels wide.
    fn stroke(&mut self, outline: &Outline, paint: Color, width: f32);
}

/// Horizontal facing of a drawn entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    /// As authored in the descriptor.
    #[default]
    Right,
    /// Mirrored about the descriptor's own width.
    Left,
}

/// Where and how a descriptor lands on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Surface position of the descriptor's top-left corner.
    pub anchor: Vec2,
    /// Uniform scale from descriptor units to pixels.
    pub scale: f32,
    pub facing: Facing,
    /// Descriptor width, the mirror axis span.
    pub width: f32,
}

impl Placement {
    pub fn new(anchor: Vec2, scale: f32, facing: Facing, width: f32) -> Self {
        Self {
            anchor,
            scale,
            facing,
            width,
        }
    }

    /// Descriptor-space to surface-space transform.
    pub fn transform(&self) -> Affine2 {
        let place = Affine2::from_scale_angle_translation(Vec2::splat(self.scale), 0.0, self.anchor);
        match self.facing {
            Facing::Right => place,
            Facing::Left => {
                place
                    * Affine2::from_translation(Vec2::new(self.width, 0.0))
                    * Affine2::from_scale(Vec2::new(-1.0, 1.0))
            }
        }
    }
}

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Fill {
        outline: Outline,
        paint: Color,
    },
    Stroke {
        outline: Outline,
        paint: Color,
        width: f32,
    },
}

impl DrawCall {
    pub fn outline(&self) -> &Outline {
        match self {
            Self::Fill { outline, .. } | Self::Stroke { outline, .. } => outline,
        }
    }

    pub fn paint(&self) -> Color {
        match self {
            Self::Fill { paint, .. } | Self::Stroke { paint, .. } => *paint,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Self::Fill { .. })
    }

    /// Whether the call would put pixels on a surface: a non-empty outline
    /// with non-zero extent, a visible paint, and (for strokes) a positive
    /// width.
    pub fn is_visible(&self) -> bool {
        let outline = self.outline();
        let has_extent = outline
            .bounds()
            .is_some_and(|(min, max)| (max - min).max_element() > 0.0);
        let width_ok = match self {
            Self::Fill { .. } => true,
            Self::Stroke { width, .. } => *width > 0.0,
        };
        has_extent && width_ok && self.paint().is_visible()
    }
}

/// A canvas that records draw calls instead of rasterizing them.
///
/// Useful for inspecting draw order and styling without pixels.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    calls: Vec<DrawCall>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Index of the first fill painted with `paint`.
    pub fn first_fill_with(&self, paint: Color) -> Option<usize> {
        self.calls
            .iter()
            .position(|c| c.is_fill() && c.paint() == paint)
    }
}

impl Canvas for RecordingCanvas {
    fn fill(&mut self, outline: &Outline, paint: Color) {
        self.calls.push(DrawCall::Fill {
            outline: outline.clone(),
            paint,
        });
    }

    fn stroke(&mut self, outline: &Outline, paint: Color, width: f32) {
        self.calls.push(DrawCall::Stroke {
            outline: outline.clone(),
            paint,
            width,
        });
    }
}
