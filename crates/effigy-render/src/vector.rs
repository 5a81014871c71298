//! Neon wireframe renderer.
//!
//! Re-traces the descriptor as outline-only paths. Every path is stroked
//! twice, a wide translucent glow pass under a thin core pass, in the two
//! override colors rather than the descriptor's palette.

use effigy_core::{base_outline, shape_outline, Color, Outline, Shape, VisualDescriptor};
use glam::Vec2;

use crate::canvas::{Canvas, Facing, Placement};

/// Parameters of one wireframe draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorParams {
    /// Surface position of the descriptor box's top-left corner.
    pub x: f32,
    pub y: f32,
    /// Descriptor units to pixels.
    pub scale: f32,
    /// Core line color.
    pub stroke: Color,
    /// Glow color; its alpha is replaced by `glow_alpha`.
    pub glow: Color,
    pub facing: Facing,
    /// Core pen width before scaling.
    pub core_width: f32,
    /// Glow pen width before scaling.
    pub glow_width: f32,
    pub glow_alpha: f32,
}

impl VectorParams {
    pub fn new(x: f32, y: f32, scale: f32, stroke: Color, glow: Color) -> Self {
        Self {
            x,
            y,
            scale,
            stroke,
            glow,
            facing: Facing::Right,
            core_width: 1.0,
            glow_width: 4.0,
            glow_alpha: 0.3,
        }
    }

    /// Sets the facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }
}

/// Outlines traced for a descriptor, in descriptor space: the body first,
/// then every feature in descriptor order.
pub fn wireframe_paths(descriptor: &VisualDescriptor) -> Vec<Outline> {
    let mut paths = Vec::with_capacity(descriptor.features.len() + 1);
    paths.push(base_outline(
        descriptor.base_shape,
        descriptor.width,
        descriptor.height,
    ));
    for feature in &descriptor.features {
        let path = match &feature.shape {
            Shape::Unknown(unknown) => {
                log::debug!("tracing unknown shape '{}' as a diamond", unknown.kind);
                let r = unknown.as_rect();
                Outline::diamond(r.x, r.y, r.width, r.height)
            }
            shape => shape_outline(shape),
        };
        paths.push(path);
    }
    paths
}

/// Draws the descriptor as a glowing wireframe. Never fills.
pub fn draw_wireframe<C: Canvas + ?Sized>(
    canvas: &mut C,
    descriptor: &VisualDescriptor,
    params: &VectorParams,
) {
    let transform = Placement::new(
        Vec2::new(params.x, params.y),
        params.scale,
        params.facing,
        descriptor.width,
    )
    .transform();
    let glow = params.glow.with_alpha(params.glow_alpha);

    for path in wireframe_paths(descriptor) {
        let path = path.transformed(&transform);
        canvas.stroke(&path, glow, params.glow_width * params.scale);
        canvas.stroke(&path, params.stroke, params.core_width * params.scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::raster::RasterCanvas;
    use effigy_core::{Circle, Feature, UnknownShape};

    const CYAN: Color = Color::rgb(0, 255, 255);
    const MAGENTA: Color = Color::rgb(255, 0, 255);

    fn descriptor() -> VisualDescriptor {
        VisualDescriptor {
            width: 40.0,
            height: 30.0,
            features: vec![
                Feature::new(
                    "eye",
                    "#FFFFFF",
                    Shape::Circle(Circle {
                        x: 30.0,
                        y: 10.0,
                        radius: 3.0,
                    }),
                ),
                Feature::new(
                    "thing",
                    "#FFFFFF",
                    Shape::Unknown(UnknownShape {
                        kind: "star".into(),
                        ..Default::default()
                    }),
                ),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_glow_then_core_per_path() {
        let params = VectorParams::new(0.0, 0.0, 2.0, CYAN, MAGENTA);
        let mut canvas = RecordingCanvas::new();
        draw_wireframe(&mut canvas, &descriptor(), &params);

        let calls = canvas.calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|c| !c.is_fill()));
        for pair in calls.chunks_exact(2) {
            assert_eq!(pair[0].paint(), MAGENTA.with_alpha(0.3));
            assert_eq!(pair[1].paint(), CYAN);
            assert_eq!(pair[0].outline(), pair[1].outline());
            match (&pair[0], &pair[1]) {
                (
                    crate::DrawCall::Stroke { width: glow, .. },
                    crate::DrawCall::Stroke { width: core, .. },
                ) => {
                    assert_eq!(*glow, 8.0);
                    assert_eq!(*core, 2.0);
                }
                _ => panic!("expected strokes"),
            }
        }
    }

    #[test]
    fn test_unknown_traced_as_diamond() {
        let paths = wireframe_paths(&descriptor());
        let diamond = &paths[2];
        assert!(diamond.closed);
        assert_eq!(diamond.points.len(), 4);
        assert_eq!(diamond.points[0], Vec2::new(5.0, 0.0));

        let params = VectorParams::new(4.0, 4.0, 1.0, CYAN, MAGENTA);
        let mut recorded = RecordingCanvas::new();
        draw_wireframe(&mut recorded, &descriptor(), &params);
        let diamond_calls = &recorded.calls()[4..];
        assert_eq!(diamond_calls.len(), 2);
        for call in diamond_calls {
            assert!(call.is_visible(), "{call:?}");
            assert!(call.paint().a > 0);
        }

        // Midpoint of the diamond's upper-left edge, clear of the body.
        let mut canvas = RasterCanvas::new(60, 50);
        draw_wireframe(&mut canvas, &descriptor(), &params);
        assert_ne!(canvas.pixel(6, 6), Color::TRANSPARENT);
    }

    #[test]
    fn test_palette_ignored() {
        let mut a = descriptor();
        let mut b = descriptor();
        a.color_primary = "#112233".into();
        b.color_primary = "#FFEEDD".into();
        let params = VectorParams::new(4.0, 4.0, 1.0, CYAN, MAGENTA);

        let mut ca = RasterCanvas::new(60, 50);
        let mut cb = RasterCanvas::new(60, 50);
        draw_wireframe(&mut ca, &a, &params);
        draw_wireframe(&mut cb, &b, &params);
        assert_eq!(ca.image(), cb.image());
        // Interior of the body stays empty.
        assert_eq!(ca.pixel(24, 19), Color::TRANSPARENT);
    }
}
