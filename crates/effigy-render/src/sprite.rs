//! 2D immediate renderer: draws a descriptor straight onto a canvas.

use std::f32::consts::PI;

use effigy_core::{base_outline, shape_outline, Feature, Outline, Shape, VisualDescriptor};
use glam::Vec2;

use crate::canvas::{Canvas, Facing, Placement};

/// How much filled shapes' outlines are darkened relative to their fill.
pub const OUTLINE_DARKEN: f32 = 0.35;

/// Outline pen width, in pixels.
pub const OUTLINE_WIDTH: f32 = 1.5;

/// Area used to order features; larger shapes draw first.
pub fn approximate_area(feature: &Feature) -> f32 {
    match &feature.shape {
        Shape::Circle(c) => PI * c.radius * c.radius,
        Shape::Ellipse(e) => PI * e.radius_x * e.radius_y,
        Shape::Rectangle(r) => r.width * r.height,
        Shape::RoundedRect(r) => r.width * r.height,
        _ => 0.0,
    }
}

/// Feature indices in paint order: descending area, ties in descriptor order.
pub fn draw_order(descriptor: &VisualDescriptor) -> Vec<usize> {
    let mut order: Vec<usize> = (0..descriptor.features.len()).collect();
    // sort_by is stable, so equal areas keep descriptor order.
    order.sort_by(|&a, &b| {
        let area = |i: usize| approximate_area(&descriptor.features[i]);
        area(b).total_cmp(&area(a))
    });
    order
}

/// Box `(min, max)` of everything [`draw_sprite`] paints when the
/// descriptor box sits at the origin, strokes included.
///
/// Features may reach outside `0..width` and `0..height` (ear tips above
/// the body, tails past it), so the box can start at negative coordinates.
pub fn sprite_bounds(descriptor: &VisualDescriptor, facing: Facing) -> (Vec2, Vec2) {
    let transform = Placement::new(Vec2::ZERO, 1.0, facing, descriptor.width).transform();
    let mut min = Vec2::ZERO;
    let mut max = Vec2::new(descriptor.width, descriptor.height);
    let mut include = |outline: Outline, pen: f32| {
        if let Some((lo, hi)) = outline.transformed(&transform).bounds() {
            min = min.min(lo - pen * 0.5);
            max = max.max(hi + pen * 0.5);
        }
    };

    include(
        base_outline(descriptor.base_shape, descriptor.width, descriptor.height),
        OUTLINE_WIDTH,
    );
    for feature in &descriptor.features {
        let pen = match &feature.shape {
            Shape::Line(line) => line.line_width,
            Shape::Arc(arc) => arc.line_width,
            _ => OUTLINE_WIDTH,
        };
        include(shape_outline(&feature.shape), pen);
    }
    (min, max)
}

/// Draws `descriptor` with its box's top-left corner at `(x, y)`.
pub fn draw_sprite<C: Canvas + ?Sized>(
    canvas: &mut C,
    descriptor: &VisualDescriptor,
    x: f32,
    y: f32,
    facing: Facing,
) {
    let transform = Placement::new(Vec2::new(x, y), 1.0, facing, descriptor.width).transform();
    let palette = descriptor.palette();

    let body = base_outline(descriptor.base_shape, descriptor.width, descriptor.height)
        .transformed(&transform);
    canvas.fill(&body, palette.primary);
    canvas.stroke(&body, palette.primary.darken(OUTLINE_DARKEN), OUTLINE_WIDTH);

    for index in draw_order(descriptor) {
        let feature = &descriptor.features[index];
        let paint = feature.paint();
        let outline = shape_outline(&feature.shape).transformed(&transform);

        match &feature.shape {
            Shape::Line(line) => canvas.stroke(&outline, paint, line.line_width),
            Shape::Arc(arc) => canvas.stroke(&outline, paint, arc.line_width),
            shape => {
                if let Shape::Unknown(unknown) = shape {
                    log::debug!("drawing unknown shape '{}' as a rectangle", unknown.kind);
                }
                canvas.fill(&outline, paint);
                if !feature.is_pupil() {
                    canvas.stroke(&outline, paint.darken(OUTLINE_DARKEN), OUTLINE_WIDTH);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawCall, RecordingCanvas};
    use crate::raster::RasterCanvas;
    use effigy_core::{Circle, Color, Ellipse, Line, UnknownShape};

    fn creature() -> VisualDescriptor {
        VisualDescriptor {
            width: 70.0,
            height: 50.0,
            color_primary: "#D4A030".into(),
            features: vec![
                Feature::new(
                    "left pupil",
                    "#000000",
                    Shape::Circle(Circle {
                        x: 60.0,
                        y: 12.0,
                        radius: 1.0,
                    }),
                ),
                Feature::new(
                    "head",
                    "#E0B040",
                    Shape::Circle(Circle {
                        x: 58.0,
                        y: 14.0,
                        radius: 12.0,
                    }),
                ),
                Feature::new(
                    "body",
                    "#C09028",
                    Shape::Ellipse(Ellipse {
                        x: 35.0,
                        y: 30.0,
                        radius_x: 26.0,
                        radius_y: 15.0,
                        rotation: 0.0,
                    }),
                ),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_draw_order_by_area() {
        let descriptor = creature();
        assert_eq!(draw_order(&descriptor), vec![2, 1, 0]);

        let mut canvas = RecordingCanvas::new();
        draw_sprite(&mut canvas, &descriptor, 0.0, 0.0, Facing::Right);
        let body = canvas.first_fill_with(Color::from_hex("#C09028").unwrap()).unwrap();
        let head = canvas.first_fill_with(Color::from_hex("#E0B040").unwrap()).unwrap();
        let pupil = canvas.first_fill_with(Color::BLACK).unwrap();
        assert!(body < head && head < pupil);
    }

    #[test]
    fn test_pupil_has_no_outline() {
        let mut canvas = RecordingCanvas::new();
        draw_sprite(&mut canvas, &creature(), 0.0, 0.0, Facing::Right);
        let calls = canvas.calls();
        // The pupil draws last: a fill and nothing after it.
        assert!(calls.last().unwrap().is_fill());
        assert_eq!(calls.last().unwrap().paint(), Color::BLACK);
        // Base + head + body each get a fill and a stroke.
        assert_eq!(calls.len(), 7);
    }

    #[test]
    fn test_lines_are_stroke_only() {
        let descriptor = VisualDescriptor {
            features: vec![Feature::new(
                "whisker",
                "#101010",
                Shape::Line(Line {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 10.0,
                    y2: 0.0,
                    line_width: 3.0,
                }),
            )],
            ..Default::default()
        };
        let mut canvas = RecordingCanvas::new();
        draw_sprite(&mut canvas, &descriptor, 0.0, 0.0, Facing::Right);
        match canvas.calls().last().unwrap() {
            DrawCall::Stroke { width, paint, .. } => {
                assert_eq!(*width, 3.0);
                assert_eq!(*paint, Color::from_hex("#101010").unwrap());
            }
            DrawCall::Fill { .. } => panic!("line was filled"),
        }
    }

    #[test]
    fn test_unknown_shape_draws_rectangle() {
        let descriptor = VisualDescriptor {
            features: vec![Feature::new(
                "spike",
                "#FF0000",
                Shape::Unknown(UnknownShape {
                    kind: "star".into(),
                    x: Some(4.0),
                    y: Some(4.0),
                    ..Default::default()
                }),
            )],
            ..Default::default()
        };
        let mut canvas = RecordingCanvas::new();
        draw_sprite(&mut canvas, &descriptor, 0.0, 0.0, Facing::Right);
        let index = canvas.first_fill_with(Color::rgb(255, 0, 0)).unwrap();
        let call = &canvas.calls()[index];
        assert!(call.is_visible());
        assert_eq!(
            call.outline().bounds(),
            Some((Vec2::new(4.0, 4.0), Vec2::new(14.0, 14.0)))
        );
    }

    #[test]
    fn test_facing_left_mirrors_in_place() {
        let descriptor = creature();
        let mut right = RecordingCanvas::new();
        let mut left = RecordingCanvas::new();
        draw_sprite(&mut right, &descriptor, 100.0, 0.0, Facing::Right);
        draw_sprite(&mut left, &descriptor, 100.0, 0.0, Facing::Left);

        let head = Color::from_hex("#E0B040").unwrap();
        let center = |canvas: &RecordingCanvas| {
            let call = &canvas.calls()[canvas.first_fill_with(head).unwrap()];
            let (min, max) = call.outline().bounds().unwrap();
            (min + max) * 0.5
        };
        let r = center(&right);
        let l = center(&left);
        assert!((r.x - 158.0).abs() < 0.01);
        assert!((l.x - 112.0).abs() < 0.01);
        assert!((r.y - l.y).abs() < 0.01);
    }

    #[test]
    fn test_bounds_cover_overhanging_features() {
        let descriptor = VisualDescriptor {
            width: 40.0,
            height: 30.0,
            features: vec![Feature::new(
                "tail",
                "#00FF00",
                Shape::Circle(Circle {
                    x: -20.0,
                    y: 10.0,
                    radius: 8.0,
                }),
            )],
            ..Default::default()
        };
        let pen = OUTLINE_WIDTH * 0.5;

        let (min, max) = sprite_bounds(&descriptor, Facing::Right);
        assert!((min.x - (-28.0 - pen)).abs() < 0.1, "{min}");
        assert!((min.y - (-pen)).abs() < 0.1, "{min}");
        assert!((max.x - (40.0 + pen)).abs() < 0.1, "{max}");
        assert!((max.y - (30.0 + pen)).abs() < 0.1, "{max}");

        let (min, max) = sprite_bounds(&descriptor, Facing::Left);
        assert!((min.x - (-pen)).abs() < 0.1, "{min}");
        assert!((max.x - (68.0 + pen)).abs() < 0.1, "{max}");

        // Every recorded call stays inside the box.
        let mut canvas = RecordingCanvas::new();
        draw_sprite(&mut canvas, &descriptor, 0.0, 0.0, Facing::Right);
        let (min, max) = sprite_bounds(&descriptor, Facing::Right);
        for call in canvas.calls() {
            let (lo, hi) = call.outline().bounds().unwrap();
            assert!(lo.cmpge(min).all() && hi.cmple(max).all(), "{call:?}");
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_draw_order_is_sorted_permutation(radii in proptest::collection::vec(0.5f32..60.0, 0..20)) {
            let descriptor = VisualDescriptor {
                features: radii
                    .iter()
                    .map(|&radius| {
                        Feature::new("spot", "#123456", Shape::Circle(Circle { x: 0.0, y: 0.0, radius }))
                    })
                    .collect(),
                ..Default::default()
            };
            let order = draw_order(&descriptor);
            let mut seen = order.clone();
            seen.sort_unstable();
            proptest::prop_assert_eq!(seen, (0..radii.len()).collect::<Vec<_>>());
            for pair in order.windows(2) {
                proptest::prop_assert!(radii[pair[0]] >= radii[pair[1]]);
            }
        }
    }

    #[test]
    fn test_rasterizes_visible_pixels() {
        let mut canvas = RasterCanvas::new(80, 60);
        draw_sprite(&mut canvas, &creature(), 5.0, 5.0, Facing::Right);
        assert!(canvas.count_not(Color::TRANSPARENT) > 1000);
        assert_eq!(canvas.pixel(0, 0), Color::TRANSPARENT);
    }
}
