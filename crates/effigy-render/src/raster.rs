//! Software rasterizer backed by an `image::RgbaImage`.
//!
//! Shapes are scan-converted into a per-call coverage mask (pixel-center
//! sampling, even-odd rule) and blended once, so overlapping pieces of a
//! single translucent stroke never double up.

use std::path::Path;

use effigy_core::{Color, Outline, Result};
use glam::Vec2;
use image::{Rgba, RgbaImage};

use crate::canvas::Canvas;
use crate::screenshot;

/// Strokes thinner than this are widened so they always cover pixels.
const MIN_STROKE_WIDTH: f32 = 1.0;

/// Segments in the round caps drawn at stroke joints.
const JOINT_SEGMENTS: usize = 8;

/// A raster surface.
#[derive(Debug, Clone)]
pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    /// Creates a fully transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Creates a canvas filled with `background`.
    pub fn with_background(width: u32, height: u32, background: Color) -> Self {
        let mut canvas = Self::new(width, height);
        canvas.clear(background);
        canvas
    }

    /// Wraps an existing image.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Overwrites every pixel with `color`.
    pub fn clear(&mut self, color: Color) {
        for pixel in self.image.pixels_mut() {
            *pixel = to_rgba(color);
        }
    }

    /// Reads a pixel; out-of-bounds reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.image
            .get_pixel_checked(x, y)
            .map_or(Color::TRANSPARENT, |p| Color::rgba(p[0], p[1], p[2], p[3]))
    }

    /// Number of pixels whose color differs from `background`.
    pub fn count_not(&self, background: Color) -> usize {
        let bg = to_rgba(background);
        self.image.pixels().filter(|&&p| p != bg).count()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Alpha-composites `other` with its top-left corner at `(x, y)`.
    pub fn overlay(&mut self, other: &RgbaImage, x: i64, y: i64) {
        image::imageops::overlay(&mut self.image, other, x, y);
    }

    /// Saves the canvas as PNG or JPEG, chosen by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        screenshot::save_image(path, self.image.as_raw(), self.width(), self.height())
    }

    fn blend(&mut self, coverage: &Coverage, paint: Color) {
        if !paint.is_visible() {
            return;
        }
        for (x, y) in coverage.covered() {
            let dst = self.image.get_pixel_mut(x, y);
            *dst = blend_normal(paint, *dst);
        }
    }
}

impl Canvas for RasterCanvas {
    fn fill(&mut self, outline: &Outline, paint: Color) {
        if outline.points.len() < 3 || !is_finite(outline) {
            return;
        }
        let Some((min, max)) = outline.bounds() else {
            return;
        };
        let Some(mut coverage) = Coverage::new(min, max, self.width(), self.height()) else {
            return;
        };
        coverage.add_polygon(&outline.points);
        self.blend(&coverage, paint);
    }

    fn stroke(&mut self, outline: &Outline, paint: Color, width: f32) {
        if outline.is_empty() || !width.is_finite() || !is_finite(outline) {
            return;
        }
        let half = width.max(MIN_STROKE_WIDTH) * 0.5;
        let Some((min, max)) = outline.bounds() else {
            return;
        };
        let pad = Vec2::splat(half + 1.0);
        let Some(mut coverage) = Coverage::new(min - pad, max + pad, self.width(), self.height())
        else {
            return;
        };

        let points = &outline.points;
        let mut segments: Vec<(Vec2, Vec2)> = points.windows(2).map(|w| (w[0], w[1])).collect();
        if outline.closed && points.len() > 2 {
            segments.push((points[points.len() - 1], points[0]));
        }
        for (a, b) in segments {
            let along = b - a;
            if along.length_squared() <= f32::EPSILON {
                continue;
            }
            let normal = along.perp().normalize() * half;
            coverage.add_polygon(&[a + normal, b + normal, b - normal, a - normal]);
        }
        // Round joints; also makes a single-point outline a dot.
        if half >= 1.0 || points.len() == 1 {
            for &p in points {
                coverage.add_polygon(&disc(p, half));
            }
        }
        self.blend(&coverage, paint);
    }
}

fn is_finite(outline: &Outline) -> bool {
    outline.points.iter().all(|p| p.is_finite())
}

fn disc(center: Vec2, radius: f32) -> Vec<Vec2> {
    (0..JOINT_SEGMENTS)
        .map(|i| {
            let t = i as f32 / JOINT_SEGMENTS as f32 * std::f32::consts::TAU;
            center + Vec2::new(t.cos(), t.sin()) * radius
        })
        .collect()
}

/// A boolean coverage mask over a clipped pixel rectangle.
struct Coverage {
    x0: u32,
    y0: u32,
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Coverage {
    /// Mask covering `[min, max]` clipped to the surface, or `None` when
    /// nothing is on screen.
    fn new(min: Vec2, max: Vec2, surface_w: u32, surface_h: u32) -> Option<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        let x0 = min.x.floor().max(0.0);
        let y0 = min.y.floor().max(0.0);
        let x1 = max.x.ceil().min(surface_w as f32);
        let y1 = max.y.ceil().min(surface_h as f32);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        let (x0, y0) = (x0 as u32, y0 as u32);
        let width = x1 as u32 - x0;
        let height = y1 as u32 - y0;
        Some(Self {
            x0,
            y0,
            width,
            height,
            bits: vec![false; (width * height) as usize],
        })
    }

    /// Marks pixels whose centers lie inside `polygon` (even-odd rule).
    fn add_polygon(&mut self, polygon: &[Vec2]) {
        if polygon.len() < 3 {
            return;
        }
        let mut crossings: Vec<f32> = Vec::with_capacity(polygon.len());
        for row in 0..self.height {
            let py = (self.y0 + row) as f32 + 0.5;
            crossings.clear();
            for (i, &a) in polygon.iter().enumerate() {
                let b = polygon[(i + 1) % polygon.len()];
                if (a.y <= py) != (b.y <= py) {
                    crossings.push(a.x + (py - a.y) * (b.x - a.x) / (b.y - a.y));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5 - self.x0 as f32).ceil().max(0.0);
                let end = (span[1] - 0.5 - self.x0 as f32).ceil().min(self.width as f32);
                if end <= start {
                    continue;
                }
                let row_offset = (row * self.width) as usize;
                for col in start as usize..end as usize {
                    self.bits[row_offset + col] = true;
                }
            }
        }
    }

    /// Surface coordinates of every covered pixel.
    fn covered(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.bits.iter().enumerate().filter(|(_, b)| **b).map(|(i, _)| {
            let i = i as u32;
            (self.x0 + i % self.width, self.y0 + i / self.width)
        })
    }
}

fn to_rgba(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

/// Source-over compositing.
fn blend_normal(src: Color, dst: Rgba<u8>) -> Rgba<u8> {
    let src_a = f32::from(src.a) / 255.0;
    let dst_a = f32::from(dst[3]) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mix = |s: u8, d: u8| {
        let s = f32::from(s) / 255.0;
        let d = f32::from(d) / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(src.r, dst[0]),
        mix(src.g, dst[1]),
        mix(src.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_exact_pixels() {
        let mut canvas = RasterCanvas::new(10, 10);
        canvas.fill(&Outline::rect(2.0, 3.0, 4.0, 2.0), Color::WHITE);
        assert_eq!(canvas.count_not(Color::TRANSPARENT), 8);
        assert_eq!(canvas.pixel(2, 3), Color::WHITE);
        assert_eq!(canvas.pixel(5, 4), Color::WHITE);
        assert_eq!(canvas.pixel(6, 4), Color::TRANSPARENT);
    }

    #[test]
    fn test_fill_clips_to_surface() {
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.fill(&Outline::rect(-10.0, -10.0, 100.0, 100.0), Color::BLACK);
        assert_eq!(canvas.count_not(Color::TRANSPARENT), 16);

        // Entirely off-screen and degenerate input is ignored.
        let mut canvas = RasterCanvas::new(4, 4);
        canvas.fill(&Outline::rect(50.0, 50.0, 2.0, 2.0), Color::BLACK);
        canvas.fill(&Outline::default(), Color::BLACK);
        canvas.stroke(
            &Outline::open(vec![Vec2::splat(f32::NAN), Vec2::ONE]),
            Color::BLACK,
            2.0,
        );
        assert_eq!(canvas.count_not(Color::TRANSPARENT), 0);
    }

    #[test]
    fn test_stroke_is_outline_only() {
        let mut canvas = RasterCanvas::new(20, 20);
        canvas.stroke(&Outline::rect(2.0, 2.0, 16.0, 16.0), Color::WHITE, 2.0);
        assert_eq!(canvas.pixel(10, 10), Color::TRANSPARENT);
        assert_eq!(canvas.pixel(10, 2), Color::WHITE);
    }

    #[test]
    fn test_translucent_stroke_blends_once() {
        let mut canvas = RasterCanvas::with_background(20, 20, Color::BLACK);
        let paint = Color::WHITE.with_alpha(0.5);
        let zigzag = Outline::open(vec![
            Vec2::new(2.0, 10.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(10.0, 2.0),
        ]);
        canvas.stroke(&zigzag, paint, 4.0);
        // The inner corner is covered by both segments and a cap but blended once.
        assert_eq!(canvas.pixel(9, 9), canvas.pixel(5, 10));
    }

    proptest::proptest! {
        #[test]
        fn prop_integer_rect_covers_its_area(
            x in 0u32..12, y in 0u32..12, w in 1u32..8, h in 1u32..8,
        ) {
            let mut canvas = RasterCanvas::new(20, 20);
            canvas.fill(&Outline::rect(x as f32, y as f32, w as f32, h as f32), Color::WHITE);
            proptest::prop_assert_eq!(canvas.count_not(Color::TRANSPARENT), (w * h) as usize);
        }

        #[test]
        fn prop_wild_outlines_never_panic(
            points in proptest::collection::vec((-1e6f32..1e6, -1e6f32..1e6), 0..12),
            width in -5.0f32..50.0,
        ) {
            let outline = Outline::closed(points.into_iter().map(|(x, y)| Vec2::new(x, y)).collect());
            let mut canvas = RasterCanvas::new(16, 16);
            canvas.fill(&outline, Color::WHITE);
            canvas.stroke(&outline, Color::BLACK, width);
        }
    }

    #[test]
    fn test_blend_normal() {
        let out = blend_normal(Color::rgba(255, 0, 0, 128), Rgba([0, 0, 255, 255]));
        assert_eq!(out[3], 255);
        assert!(out[0] > 120 && out[0] < 135);
        assert!(out[2] > 120 && out[2] < 135);
    }
}
