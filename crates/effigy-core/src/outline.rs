//! Flattening of descriptor shapes into polylines.
//!
//! Both 2D backends trace shapes through these outlines, so a circle in the
//! sprite and a circle in the wireframe are the same polygon. Coordinates
//! stay in descriptor space (y down); callers apply their own transform.

use std::f32::consts::TAU;

use glam::{Affine2, Vec2};

use crate::descriptor::{BaseShape, RoundedRect, Shape};

/// Segments used for a full ellipse.
pub const CURVE_SEGMENTS: usize = 32;

/// Segments used for one rounded corner.
const CORNER_SEGMENTS: usize = 6;

/// A flattened shape: a polyline, closed or open.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Outline {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

impl Outline {
    pub fn closed(points: Vec<Vec2>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn open(points: Vec<Vec2>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Axis-aligned rectangle from its top-left corner.
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::closed(vec![
            Vec2::new(x, y),
            Vec2::new(x + width, y),
            Vec2::new(x + width, y + height),
            Vec2::new(x, y + height),
        ])
    }

    /// Ellipse around `center`, rotated by `rotation` radians.
    pub fn ellipse(center: Vec2, radii: Vec2, rotation: f32) -> Self {
        let rot = Vec2::from_angle(rotation);
        let points = (0..CURVE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CURVE_SEGMENTS as f32 * TAU;
                center + rot.rotate(Vec2::new(t.cos() * radii.x, t.sin() * radii.y))
            })
            .collect();
        Self::closed(points)
    }

    /// Diamond inscribed in the given box.
    pub fn diamond(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::closed(vec![
            Vec2::new(x + width * 0.5, y),
            Vec2::new(x + width, y + height * 0.5),
            Vec2::new(x + width * 0.5, y + height),
            Vec2::new(x, y + height * 0.5),
        ])
    }

    /// Rectangle with circular corners; the radius is limited to half the
    /// shorter side.
    pub fn rounded_rect(rect: &RoundedRect) -> Self {
        let r = rect.radius.min(rect.width * 0.5).min(rect.height * 0.5).max(0.0);
        if r <= f32::EPSILON {
            return Self::rect(rect.x, rect.y, rect.width, rect.height);
        }
        // Corner centers, clockwise from top-right, with their start angles.
        let corners = [
            (Vec2::new(rect.x + rect.width - r, rect.y + r), -TAU / 4.0),
            (
                Vec2::new(rect.x + rect.width - r, rect.y + rect.height - r),
                0.0,
            ),
            (Vec2::new(rect.x + r, rect.y + rect.height - r), TAU / 4.0),
            (Vec2::new(rect.x + r, rect.y + r), TAU / 2.0),
        ];
        let mut points = Vec::with_capacity(corners.len() * (CORNER_SEGMENTS + 1));
        for (center, start) in corners {
            for i in 0..=CORNER_SEGMENTS {
                let t = start + i as f32 / CORNER_SEGMENTS as f32 * (TAU / 4.0);
                points.push(center + Vec2::new(t.cos(), t.sin()) * r);
            }
        }
        Self::closed(points)
    }

    /// Circular arc following canvas semantics: from `start` clockwise (in
    /// y-down space) to `end`, wrapping once; a sweep of a full turn or more
    /// draws the whole circle.
    pub fn arc(center: Vec2, radius: f32, start: f32, end: f32) -> Self {
        let mut sweep = end - start;
        if sweep.abs() >= TAU {
            sweep = TAU;
        } else if sweep < 0.0 {
            sweep += TAU;
        }
        let steps = ((sweep / TAU) * CURVE_SEGMENTS as f32).ceil().max(1.0) as usize;
        let points = (0..=steps)
            .map(|i| {
                let t = start + sweep * i as f32 / steps as f32;
                center + Vec2::new(t.cos(), t.sin()) * radius
            })
            .collect();
        Self::open(points)
    }

    /// The outline mapped through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: &Affine2) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|&p| transform.transform_point2(p))
                .collect(),
            closed: self.closed,
        }
    }

    /// Bounding box `(min, max)`, or `None` when empty.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        let first = *self.points.first()?;
        Some(
            self.points
                .iter()
                .fold((first, first), |(min, max), &p| (min.min(p), max.max(p))),
        )
    }

    /// Length of the polyline, including the closing edge.
    pub fn perimeter(&self) -> f32 {
        let open: f32 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + first.distance(*last),
            _ => open,
        }
    }
}

/// Outline of a feature shape in descriptor space.
pub fn shape_outline(shape: &Shape) -> Outline {
    match shape {
        Shape::Circle(c) => Outline::ellipse(Vec2::new(c.x, c.y), Vec2::splat(c.radius), 0.0),
        Shape::Ellipse(e) => Outline::ellipse(
            Vec2::new(e.x, e.y),
            Vec2::new(e.radius_x, e.radius_y),
            e.rotation,
        ),
        Shape::Rectangle(r) => Outline::rect(r.x, r.y, r.width, r.height),
        Shape::RoundedRect(r) => Outline::rounded_rect(r),
        Shape::Triangle(p) | Shape::Polygon(p) => {
            Outline::closed(p.points.iter().map(|&[x, y]| Vec2::new(x, y)).collect())
        }
        Shape::Line(l) => Outline::open(vec![Vec2::new(l.x1, l.y1), Vec2::new(l.x2, l.y2)]),
        Shape::Arc(a) => Outline::arc(Vec2::new(a.x, a.y), a.radius, a.start_angle, a.end_angle),
        Shape::Unknown(u) => {
            let r = u.as_rect();
            Outline::rect(r.x, r.y, r.width, r.height)
        }
    }
}

/// Outline of the body for a `width x height` descriptor box.
pub fn base_outline(base: BaseShape, width: f32, height: f32) -> Outline {
    let center = Vec2::new(width * 0.5, height * 0.5);
    match base {
        BaseShape::Ellipse => Outline::ellipse(center, center, 0.0),
        BaseShape::Circle => Outline::ellipse(center, Vec2::splat(width.min(height) * 0.5), 0.0),
        BaseShape::Rectangle => Outline::rect(0.0, 0.0, width, height),
        BaseShape::RoundedRect => Outline::rounded_rect(&RoundedRect {
            x: 0.0,
            y: 0.0,
            width,
            height,
            radius: width.min(height) * 0.2,
        }),
        BaseShape::Triangle => Outline::closed(vec![
            Vec2::new(width * 0.5, 0.0),
            Vec2::new(width, height),
            Vec2::new(0.0, height),
        ]),
        BaseShape::Diamond => Outline::diamond(0.0, 0.0, width, height),
    }
}
