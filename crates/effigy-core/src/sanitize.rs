//! Total, idempotent repair of untrusted descriptor input.
//!
//! Every entry point maps *any* input to a valid descriptor or feature:
//! unknown shape types become rectangles, missing or out-of-range numbers are
//! clamped to their documented range, invalid colors fall back per type, and
//! point lists with fewer than three points demote to a rectangle.
//! Re-sanitizing a sanitized value returns it unchanged.

use std::f32::consts::{PI, TAU};

use serde_json::{Map, Value};

use crate::color::is_valid_hex;
use crate::descriptor::{
    Arc, BaseShape, Circle, Ellipse, Feature, Line, Palette, PointList, Rect, RoundedRect, Shape,
    UnknownShape, VisualDescriptor, MAX_FEATURES, MAX_LABEL_CHARS, MAX_POLYGON_POINTS,
};

/// A documented numeric range with the value used when the field is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl FieldRange {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Clamps `raw` into range; missing or NaN values become the default.
    pub fn apply(self, raw: Option<f64>) -> f32 {
        match raw {
            Some(v) => {
                let v = v as f32;
                if v.is_nan() {
                    self.default
                } else {
                    v.clamp(self.min, self.max)
                }
            }
            None => self.default,
        }
    }

    /// [`FieldRange::apply`] for an already-typed value.
    pub fn apply_f32(self, v: f32) -> f32 {
        self.apply(Some(f64::from(v)))
    }
}

/// Descriptor `width` / `height`.
pub const DESCRIPTOR_SIZE: FieldRange = FieldRange::new(8.0, 512.0, 64.0);
/// Any positional coordinate.
pub const COORD: FieldRange = FieldRange::new(-1024.0, 1024.0, 0.0);
/// Circle and arc radius.
pub const RADIUS: FieldRange = FieldRange::new(0.5, 256.0, 8.0);
pub const RADIUS_X: FieldRange = FieldRange::new(0.5, 256.0, 10.0);
pub const RADIUS_Y: FieldRange = FieldRange::new(0.5, 256.0, 6.0);
pub const ROTATION: FieldRange = FieldRange::new(-TAU, TAU, 0.0);
pub const RECT_WIDTH: FieldRange = FieldRange::new(0.5, 512.0, 10.0);
pub const RECT_HEIGHT: FieldRange = FieldRange::new(0.5, 512.0, 10.0);
pub const CORNER_RADIUS: FieldRange = FieldRange::new(0.0, 128.0, 3.0);
pub const LINE_WIDTH: FieldRange = FieldRange::new(0.5, 32.0, 2.0);
pub const START_ANGLE: FieldRange = FieldRange::new(-TAU, TAU, 0.0);
pub const END_ANGLE: FieldRange = FieldRange::new(-TAU, TAU, PI);

/// Sanitizes arbitrary JSON text. Unparseable text yields the default
/// descriptor.
pub fn sanitize_json(json: &str) -> VisualDescriptor {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => sanitize_value(&value),
        Err(e) => {
            log::warn!("descriptor is not valid JSON ({e}); using default descriptor");
            VisualDescriptor::default()
        }
    }
}

/// Sanitizes an arbitrary JSON value into a valid descriptor.
pub fn sanitize_value(value: &Value) -> VisualDescriptor {
    let Some(obj) = value.as_object() else {
        log::debug!("descriptor is not an object; using default descriptor");
        return VisualDescriptor::default();
    };

    let base_shape = obj
        .get("baseShape")
        .and_then(Value::as_str)
        .and_then(BaseShape::from_name)
        .unwrap_or_default();

    let features = obj
        .get("features")
        .and_then(Value::as_array)
        .map(|list| list.iter().take(MAX_FEATURES).map(sanitize_feature).collect())
        .unwrap_or_default();

    VisualDescriptor {
        base_shape,
        width: DESCRIPTOR_SIZE.apply(number(obj, "width")),
        height: DESCRIPTOR_SIZE.apply(number(obj, "height")),
        color_primary: color_or(obj.get("colorPrimary"), Palette::FALLBACK_PRIMARY),
        color_secondary: color_or(obj.get("colorSecondary"), Palette::FALLBACK_SECONDARY),
        color_accent: color_or(obj.get("colorAccent"), Palette::FALLBACK_ACCENT),
        features,
    }
}

/// Sanitizes one feature entry. Never fails; non-objects become a default
/// rectangle.
pub fn sanitize_feature(value: &Value) -> Feature {
    let empty = Map::new();
    let obj = value.as_object().unwrap_or(&empty);

    let kind = obj
        .get("type")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let shape = match kind.as_str() {
        "circle" => Shape::Circle(Circle {
            x: COORD.apply(number(obj, "x")),
            y: COORD.apply(number(obj, "y")),
            radius: RADIUS.apply(number(obj, "radius")),
        }),
        "ellipse" => Shape::Ellipse(Ellipse {
            x: COORD.apply(number(obj, "x")),
            y: COORD.apply(number(obj, "y")),
            radius_x: RADIUS_X.apply(number(obj, "radiusX")),
            radius_y: RADIUS_Y.apply(number(obj, "radiusY")),
            rotation: ROTATION.apply(number(obj, "rotation")),
        }),
        "rectangle" | "rect" => Shape::Rectangle(rect_from(obj, None)),
        "roundedrect" | "rounded_rect" | "roundrect" => {
            let rect = rect_from(obj, None);
            Shape::RoundedRect(RoundedRect {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                radius: CORNER_RADIUS.apply(number(obj, "radius")),
            })
        }
        "triangle" | "polygon" => {
            let points = parse_points(obj.get("points"));
            let keep = if kind == "triangle" { 3 } else { MAX_POLYGON_POINTS };
            if points.len() >= 3 {
                let points = PointList {
                    points: points.into_iter().take(keep).collect(),
                };
                if kind == "triangle" {
                    Shape::Triangle(points)
                } else {
                    Shape::Polygon(points)
                }
            } else {
                log::debug!(
                    "{kind} with {} point(s) demoted to rectangle",
                    points.len()
                );
                Shape::Rectangle(rect_from(obj, points.first().copied()))
            }
        }
        "line" => Shape::Line(Line {
            x1: COORD.apply(number(obj, "x1")),
            y1: COORD.apply(number(obj, "y1")),
            x2: COORD.apply(number(obj, "x2")),
            y2: COORD.apply(number(obj, "y2")),
            line_width: LINE_WIDTH.apply(number(obj, "lineWidth")),
        }),
        "arc" => Shape::Arc(Arc {
            x: COORD.apply(number(obj, "x")),
            y: COORD.apply(number(obj, "y")),
            radius: RADIUS.apply(number(obj, "radius")),
            start_angle: START_ANGLE.apply(number(obj, "startAngle")),
            end_angle: END_ANGLE.apply(number(obj, "endAngle")),
            line_width: LINE_WIDTH.apply(number(obj, "lineWidth")),
        }),
        other => {
            log::debug!("unknown feature type {other:?} demoted to rectangle");
            Shape::Rectangle(rect_from(obj, None))
        }
    };

    Feature {
        label: normalize_label(obj.get("label").and_then(Value::as_str).unwrap_or("")),
        color: color_or(obj.get("color"), shape.fallback_color()),
        shape,
    }
}

impl VisualDescriptor {
    /// Applies the sanitizer's rules to an already-typed descriptor.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        Self {
            base_shape: self.base_shape,
            width: DESCRIPTOR_SIZE.apply_f32(self.width),
            height: DESCRIPTOR_SIZE.apply_f32(self.height),
            color_primary: valid_color_or(&self.color_primary, Palette::FALLBACK_PRIMARY),
            color_secondary: valid_color_or(&self.color_secondary, Palette::FALLBACK_SECONDARY),
            color_accent: valid_color_or(&self.color_accent, Palette::FALLBACK_ACCENT),
            features: self
                .features
                .iter()
                .take(MAX_FEATURES)
                .map(Feature::sanitized)
                .collect(),
        }
    }
}

impl Feature {
    /// Applies the sanitizer's rules to an already-typed feature.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let shape = match &self.shape {
            Shape::Circle(c) => Shape::Circle(Circle {
                x: COORD.apply_f32(c.x),
                y: COORD.apply_f32(c.y),
                radius: RADIUS.apply_f32(c.radius),
            }),
            Shape::Ellipse(e) => Shape::Ellipse(Ellipse {
                x: COORD.apply_f32(e.x),
                y: COORD.apply_f32(e.y),
                radius_x: RADIUS_X.apply_f32(e.radius_x),
                radius_y: RADIUS_Y.apply_f32(e.radius_y),
                rotation: ROTATION.apply_f32(e.rotation),
            }),
            Shape::Rectangle(r) => Shape::Rectangle(clamp_rect(r)),
            Shape::RoundedRect(r) => {
                let rect = clamp_rect(&Rect {
                    x: r.x,
                    y: r.y,
                    width: r.width,
                    height: r.height,
                });
                Shape::RoundedRect(RoundedRect {
                    x: rect.x,
                    y: rect.y,
                    width: rect.width,
                    height: rect.height,
                    radius: CORNER_RADIUS.apply_f32(r.radius),
                })
            }
            Shape::Triangle(p) => sanitize_point_list(p, 3).map_or_else(
                || demote_points(p),
                Shape::Triangle,
            ),
            Shape::Polygon(p) => sanitize_point_list(p, MAX_POLYGON_POINTS)
                .map_or_else(|| demote_points(p), Shape::Polygon),
            Shape::Line(l) => Shape::Line(Line {
                x1: COORD.apply_f32(l.x1),
                y1: COORD.apply_f32(l.y1),
                x2: COORD.apply_f32(l.x2),
                y2: COORD.apply_f32(l.y2),
                line_width: LINE_WIDTH.apply_f32(l.line_width),
            }),
            Shape::Arc(a) => Shape::Arc(Arc {
                x: COORD.apply_f32(a.x),
                y: COORD.apply_f32(a.y),
                radius: RADIUS.apply_f32(a.radius),
                start_angle: START_ANGLE.apply_f32(a.start_angle),
                end_angle: END_ANGLE.apply_f32(a.end_angle),
                line_width: LINE_WIDTH.apply_f32(a.line_width),
            }),
            Shape::Unknown(u) => {
                log::debug!("unknown feature type {:?} demoted to rectangle", u.kind);
                Shape::Rectangle(clamp_rect(&u.as_rect()))
            }
        };

        Self {
            label: normalize_label(&self.label),
            color: valid_color_or(&self.color, shape.fallback_color()),
            shape,
        }
    }
}

fn sanitize_point_list(list: &PointList, keep: usize) -> Option<PointList> {
    let points: Vec<[f32; 2]> = list
        .points
        .iter()
        .map(|p| [COORD.apply_f32(p[0]), COORD.apply_f32(p[1])])
        .take(keep)
        .collect();
    (points.len() >= 3).then_some(PointList { points })
}

fn demote_points(list: &PointList) -> Shape {
    let [x, y] = list.points.first().copied().unwrap_or([0.0, 0.0]);
    Shape::Rectangle(Rect {
        x: COORD.apply_f32(x),
        y: COORD.apply_f32(y),
        width: RECT_WIDTH.default,
        height: RECT_HEIGHT.default,
    })
}

fn clamp_rect(r: &Rect) -> Rect {
    Rect {
        x: COORD.apply_f32(r.x),
        y: COORD.apply_f32(r.y),
        width: RECT_WIDTH.apply_f32(r.width),
        height: RECT_HEIGHT.apply_f32(r.height),
    }
}

/// Reads a rectangle from whatever fields are present. `anchor` supplies
/// the position when `x`/`y` are missing.
fn rect_from(obj: &Map<String, Value>, anchor: Option<[f32; 2]>) -> Rect {
    let [ax, ay] = anchor.unwrap_or([COORD.default, COORD.default]);
    Rect {
        x: number(obj, "x").map_or(ax, |v| COORD.apply(Some(v))),
        y: number(obj, "y").map_or(ay, |v| COORD.apply(Some(v))),
        width: RECT_WIDTH.apply(number(obj, "width")),
        height: RECT_HEIGHT.apply(number(obj, "height")),
    }
}

/// Reads points given as `[x, y]` pairs or `{x, y}` objects; malformed
/// entries are skipped.
fn parse_points(value: Option<&Value>) -> Vec<[f32; 2]> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|entry| {
            let (x, y) = match entry {
                Value::Array(pair) if pair.len() >= 2 => {
                    (as_number(&pair[0])?, as_number(&pair[1])?)
                }
                Value::Object(o) => (number(o, "x")?, number(o, "y")?),
                _ => return None,
            };
            Some([COORD.apply(Some(x)), COORD.apply(Some(y))])
        })
        .collect()
}

fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(as_number)
}

/// Accepts JSON numbers and numeric strings.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn color_or(value: Option<&Value>, fallback: &str) -> String {
    value
        .and_then(Value::as_str)
        .map_or_else(|| fallback.to_owned(), |s| valid_color_or(s, fallback))
}

fn valid_color_or(color: &str, fallback: &str) -> String {
    let trimmed = color.trim();
    if is_valid_hex(trimmed) {
        trimmed.to_owned()
    } else {
        fallback.to_owned()
    }
}

fn normalize_label(label: &str) -> String {
    let capped: String = label.trim().chars().take(MAX_LABEL_CHARS).collect();
    capped.trim_end().to_owned()
}
