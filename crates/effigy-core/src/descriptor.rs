//! The Visual Descriptor: a declarative, shape-based description of an entity.
//!
//! A descriptor is produced externally, sanitized once (see [`crate::sanitize`])
//! and then shared read-only by every renderer.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;

/// Maximum number of features kept per descriptor.
pub const MAX_FEATURES: usize = 20;

/// Maximum number of points kept for a polygon.
pub const MAX_POLYGON_POINTS: usize = 32;

/// Maximum label length, in characters.
pub const MAX_LABEL_CHARS: usize = 64;

/// Outline of the entity's body, drawn before any feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BaseShape {
    #[default]
    Ellipse,
    Circle,
    Rectangle,
    RoundedRect,
    Triangle,
    Diamond,
}

impl BaseShape {
    /// Looks up a base shape by its JSON name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ellipse" | "oval" => Some(Self::Ellipse),
            "circle" => Some(Self::Circle),
            "rectangle" | "rect" => Some(Self::Rectangle),
            "roundedrect" | "rounded_rect" => Some(Self::RoundedRect),
            "triangle" => Some(Self::Triangle),
            "diamond" => Some(Self::Diamond),
            _ => None,
        }
    }

    /// Whether the body reads as round rather than boxy.
    pub fn is_round(self) -> bool {
        matches!(self, Self::Ellipse | Self::Circle)
    }
}

/// A declarative entity description consumed by all renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualDescriptor {
    pub base_shape: BaseShape,
    pub width: f32,
    pub height: f32,
    pub color_primary: String,
    pub color_secondary: String,
    pub color_accent: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl Default for VisualDescriptor {
    fn default() -> Self {
        Self {
            base_shape: BaseShape::Ellipse,
            width: 64.0,
            height: 64.0,
            color_primary: Palette::FALLBACK_PRIMARY.to_owned(),
            color_secondary: Palette::FALLBACK_SECONDARY.to_owned(),
            color_accent: Palette::FALLBACK_ACCENT.to_owned(),
            features: Vec::new(),
        }
    }
}

impl VisualDescriptor {
    /// Strictly deserializes a descriptor, reporting any schema error.
    ///
    /// Use [`crate::sanitize::sanitize_json`] for untrusted input.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The three palette colors, parsed.
    pub fn palette(&self) -> Palette {
        Palette {
            primary: Color::from_hex_or(
                &self.color_primary,
                Color::from_hex_or(Palette::FALLBACK_PRIMARY, Color::BLACK),
            ),
            secondary: Color::from_hex_or(
                &self.color_secondary,
                Color::from_hex_or(Palette::FALLBACK_SECONDARY, Color::BLACK),
            ),
            accent: Color::from_hex_or(
                &self.color_accent,
                Color::from_hex_or(Palette::FALLBACK_ACCENT, Color::BLACK),
            ),
        }
    }
}

/// The descriptor's three palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
}

impl Palette {
    pub const FALLBACK_PRIMARY: &'static str = "#8A8A8A";
    pub const FALLBACK_SECONDARY: &'static str = "#5C5C5C";
    pub const FALLBACK_ACCENT: &'static str = "#FFD23F";
}

/// One primitive shape entry in a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Free-text label, used for semantic classification.
    #[serde(default)]
    pub label: String,
    /// Hex fill (or stroke, for lines and arcs) color.
    pub color: String,
    #[serde(flatten)]
    pub shape: Shape,
}

impl Feature {
    pub fn new(label: impl Into<String>, color: impl Into<String>, shape: Shape) -> Self {
        Self {
            label: label.into(),
            color: color.into(),
            shape,
        }
    }

    /// The parsed feature color, or the shape type's fallback.
    pub fn paint(&self) -> Color {
        Color::from_hex_or(
            &self.color,
            Color::from_hex_or(self.shape.fallback_color(), Color::BLACK),
        )
    }

    /// Whether the label marks this feature as a pupil.
    pub fn is_pupil(&self) -> bool {
        self.label.to_lowercase().contains("pupil")
    }
}

/// Type-specific geometry of a feature, keyed by `type` in JSON.
///
/// Positional convention differs by type: circles and ellipses are
/// positioned by their center, rectangles by their top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Shape {
    Circle(Circle),
    Ellipse(Ellipse),
    Rectangle(Rect),
    RoundedRect(RoundedRect),
    Triangle(PointList),
    Polygon(PointList),
    Line(Line),
    Arc(Arc),
    /// A shape type this crate does not know. Never produced by the
    /// sanitizer; renderers demote it to a per-backend default.
    #[serde(skip)]
    Unknown(UnknownShape),
}

impl Shape {
    /// The JSON `type` name.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Circle(_) => "circle",
            Self::Ellipse(_) => "ellipse",
            Self::Rectangle(_) => "rectangle",
            Self::RoundedRect(_) => "roundedRect",
            Self::Triangle(_) => "triangle",
            Self::Polygon(_) => "polygon",
            Self::Line(_) => "line",
            Self::Arc(_) => "arc",
            Self::Unknown(u) => &u.kind,
        }
    }

    /// Lines and arcs are stroke-only; everything else is filled.
    pub fn is_stroke_only(&self) -> bool {
        matches!(self, Self::Line(_) | Self::Arc(_))
    }

    /// Color used when a feature's own color is invalid.
    pub fn fallback_color(&self) -> &'static str {
        if self.is_stroke_only() {
            "#3A3A3A"
        } else {
            "#9E9E9E"
        }
    }

    /// Center of the shape in descriptor space.
    pub fn center(&self) -> [f32; 2] {
        match self {
            Self::Circle(c) => [c.x, c.y],
            Self::Ellipse(e) => [e.x, e.y],
            Self::Rectangle(r) => [r.x + r.width * 0.5, r.y + r.height * 0.5],
            Self::RoundedRect(r) => [r.x + r.width * 0.5, r.y + r.height * 0.5],
            Self::Triangle(p) | Self::Polygon(p) => p.centroid(),
            Self::Line(l) => [(l.x1 + l.x2) * 0.5, (l.y1 + l.y2) * 0.5],
            Self::Arc(a) => [a.x, a.y],
            Self::Unknown(u) => {
                let rect = u.as_rect();
                [rect.x + rect.width * 0.5, rect.y + rect.height * 0.5]
            }
        }
    }

    /// Half-extents `(w/2, h/2)` of the shape's bounding box.
    pub fn half_extents(&self) -> [f32; 2] {
        match self {
            Self::Circle(c) => [c.radius, c.radius],
            Self::Ellipse(e) => [e.radius_x, e.radius_y],
            Self::Rectangle(r) => [r.width * 0.5, r.height * 0.5],
            Self::RoundedRect(r) => [r.width * 0.5, r.height * 0.5],
            Self::Triangle(p) | Self::Polygon(p) => {
                let (min, max) = p.bounds();
                [(max[0] - min[0]) * 0.5, (max[1] - min[1]) * 0.5]
            }
            Self::Line(l) => [(l.x2 - l.x1).abs() * 0.5, (l.y2 - l.y1).abs() * 0.5],
            Self::Arc(a) => [a.radius, a.radius],
            Self::Unknown(u) => {
                let rect = u.as_rect();
                [rect.width * 0.5, rect.height * 0.5]
            }
        }
    }

    /// A single representative radius: the radius for round shapes, the
    /// larger half-extent otherwise.
    pub fn nominal_radius(&self) -> f32 {
        match self {
            Self::Circle(c) => c.radius,
            Self::Arc(a) => a.radius,
            _ => {
                let [hw, hh] = self.half_extents();
                hw.max(hh)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub x: f32,
    pub y: f32,
    pub radius_x: f32,
    pub radius_y: f32,
    #[serde(default)]
    pub rotation: f32,
}

/// Axis-aligned rectangle positioned by its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Corner radius.
    pub radius: f32,
}

/// An implicitly closed point list (triangle or polygon).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointList {
    pub points: Vec<[f32; 2]>,
}

impl PointList {
    /// Mean of the points; the origin for an empty list.
    pub fn centroid(&self) -> [f32; 2] {
        if self.points.is_empty() {
            return [0.0, 0.0];
        }
        let n = self.points.len() as f32;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p[0], sy + p[1]));
        [sx / n, sy / n]
    }

    /// Bounding box `(min, max)`.
    pub fn bounds(&self) -> ([f32; 2], [f32; 2]) {
        if self.points.is_empty() {
            return ([0.0, 0.0], [0.0, 0.0]);
        }
        self.points.iter().fold(
            ([f32::MAX, f32::MAX], [f32::MIN, f32::MIN]),
            |(min, max), p| {
                (
                    [min[0].min(p[0]), min[1].min(p[1])],
                    [max[0].max(p[0]), max[1].max(p[1])],
                )
            },
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub line_width: f32,
}

/// Circular arc; angles in radians, measured clockwise from +x in
/// descriptor space (y points down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arc {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub line_width: f32,
}

/// Whatever could be salvaged from a feature of unrecognized type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownShape {
    pub kind: String,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl UnknownShape {
    /// Default size used when an unknown shape carries no dimensions.
    pub const DEFAULT_SIZE: f32 = 10.0;

    /// The rectangle this shape demotes to, using available fields.
    pub fn as_rect(&self) -> Rect {
        let size = |v: Option<f32>| {
            v.filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(Self::DEFAULT_SIZE)
        };
        let coord = |v: Option<f32>| v.filter(|v| v.is_finite()).unwrap_or(0.0);
        Rect {
            x: coord(self.x),
            y: coord(self.y),
            width: size(self.width),
            height: size(self.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_json_shape() {
        let json = r##"{"type":"circle","label":"head","x":16,"y":16,"radius":14,"color":"#E0B040"}"##;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.label, "head");
        assert_eq!(
            feature.shape,
            Shape::Circle(Circle {
                x: 16.0,
                y: 16.0,
                radius: 14.0
            })
        );

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["type"], "circle");
        assert_eq!(value["radius"], 14.0);
    }

    #[test]
    fn test_camel_case_fields() {
        let feature = Feature::new(
            "body",
            "#D4A030",
            Shape::Ellipse(Ellipse {
                x: 40.0,
                y: 24.0,
                radius_x: 26.0,
                radius_y: 15.0,
                rotation: 0.0,
            }),
        );
        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["radiusX"], 26.0);
        assert_eq!(value["type"], "ellipse");

        let rounded = Shape::RoundedRect(RoundedRect {
            x: 0.0,
            y: 0.0,
            width: 4.0,
            height: 4.0,
            radius: 1.0,
        });
        let value = serde_json::to_value(Feature::new("", "#000", rounded)).unwrap();
        assert_eq!(value["type"], "roundedRect");
    }

    #[test]
    fn test_strict_json_rejects_unknown_type() {
        let json = r##"{"baseShape":"ellipse","width":10,"height":10,"colorPrimary":"#fff","colorSecondary":"#fff","colorAccent":"#fff","features":[{"type":"blob","color":"#fff"}]}"##;
        assert!(VisualDescriptor::from_json(json).is_err());
    }

    #[test]
    fn test_unknown_shape_rect() {
        let unknown = UnknownShape {
            kind: "star".into(),
            x: Some(3.0),
            width: Some(-1.0),
            ..Default::default()
        };
        let rect = unknown.as_rect();
        assert_eq!(rect.x, 3.0);
        assert_eq!(rect.y, 0.0);
        assert_eq!(rect.width, UnknownShape::DEFAULT_SIZE);
    }

    #[test]
    fn test_palette_fallback() {
        let descriptor = VisualDescriptor {
            color_primary: "nope".into(),
            ..Default::default()
        };
        assert_eq!(
            descriptor.palette().primary,
            Color::from_hex(Palette::FALLBACK_PRIMARY).unwrap()
        );
    }
}
