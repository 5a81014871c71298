//! Lifts a classified 2D descriptor into an anatomically placed 3D subtree.
//!
//! World axes: `+X` forward (the head side), `+Y` up, `+Z` toward the
//! camera, which is also the entity's right side. Descriptor pixels map to
//! world units through [`PIXEL_SCALE`]; the body stands on `y = 0`.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::rc::Rc;

use effigy_core::sanitize::DESCRIPTOR_SIZE;
use effigy_core::{
    classify, Anatomy, BodyPart, Classified, Color, Feature, Outline, Shape, Side,
    VisualDescriptor,
};
use glam::{Quat, Vec2, Vec3};

use crate::entity::MeshEntity;
use crate::geometry::Geometry;
use crate::material::Material;
use crate::options::MeshOptions;
use crate::resources::ResourceContext;
use crate::scene::{Motion, PointLight, SceneNode, Transform};

/// World units per descriptor pixel.
pub const PIXEL_SCALE: f32 = 0.02;
/// Body depth relative to its larger scaled dimension.
pub const DEPTH_RATIO: f32 = 0.7;
/// Largest head radius relative to the scaled body width.
pub const HEAD_MAX_RATIO: f32 = 0.28;
/// Forward offset of the head, relative to its radius.
pub const HEAD_FORWARD_OFFSET: f32 = 0.35;
/// Head radius assumed when the descriptor has no head feature.
pub const FALLBACK_HEAD_RATIO: f32 = 0.2;
/// Largest mane radius relative to the head radius.
pub const MANE_MAX_RATIO: f32 = 1.3;
/// Smallest eye radius relative to the head radius.
pub const EYE_MIN_RATIO: f32 = 0.15;
/// Smallest pupil radius relative to the head radius.
pub const PUPIL_MIN_RATIO: f32 = 0.08;
pub const EAR_RADIUS_RATIO: f32 = 0.3;
pub const EAR_HEIGHT_RATIO: f32 = 0.7;
pub const MAX_LEGS: usize = 4;
/// Inward tilt of wing quads, in radians.
pub const WING_TILT: f32 = 0.35;
/// Depth offset of projected leg-like features, relative to body depth.
pub const LEG_DEPTH_RATIO: f32 = 0.35;

const LEG_LENGTH_RATIO: f32 = 0.45;
const LEG_SPREAD: f32 = 0.3;
const EAR_TILT: f32 = 0.3;
const BOB_RATIO: f32 = 0.04;
const STRIDE_AMPLITUDE: f32 = 0.35;
const FLAP_AMPLITUDE: f32 = 0.25;

/// Fixed leg mounting points, filled in descriptor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegSlot {
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl LegSlot {
    pub const ORDER: [LegSlot; MAX_LEGS] = [
        Self::FrontLeft,
        Self::FrontRight,
        Self::BackLeft,
        Self::BackRight,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::FrontLeft => "FL",
            Self::FrontRight => "FR",
            Self::BackLeft => "BL",
            Self::BackRight => "BR",
        }
    }

    pub fn is_front(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }

    pub fn side(self) -> Side {
        match self {
            Self::FrontLeft | Self::BackLeft => Side::Left,
            Self::FrontRight | Self::BackRight => Side::Right,
        }
    }

    /// Diagonal pairs swing together.
    fn stride_phase(self) -> f32 {
        match self {
            Self::FrontLeft | Self::BackRight => 0.0,
            Self::FrontRight | Self::BackLeft => PI,
        }
    }
}

/// Body measurements in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyFrame {
    pub source_width: f32,
    pub source_height: f32,
    pub scaled_width: f32,
    pub scaled_height: f32,
    pub depth: f32,
    /// Center of the body volume.
    pub center: Vec3,
}

impl BodyFrame {
    pub fn of(descriptor: &VisualDescriptor) -> Self {
        let source_width = DESCRIPTOR_SIZE.apply_f32(descriptor.width);
        let source_height = DESCRIPTOR_SIZE.apply_f32(descriptor.height);
        let scaled_width = source_width * PIXEL_SCALE;
        let scaled_height = source_height * PIXEL_SCALE;
        let depth = scaled_width.max(scaled_height) * DEPTH_RATIO;
        let leg_length = scaled_height * LEG_LENGTH_RATIO;
        Self {
            source_width,
            source_height,
            scaled_width,
            scaled_height,
            depth,
            center: Vec3::new(0.0, leg_length + scaled_height * 0.4, 0.0),
        }
    }

    /// Maps a descriptor-space point onto the body's midplane (`z = 0`).
    pub fn project(&self, point: [f32; 2]) -> Vec3 {
        Vec3::new(
            (point[0] - self.source_width * 0.5) * PIXEL_SCALE,
            self.center.y + (self.source_height * 0.5 - point[1]) * PIXEL_SCALE,
            0.0,
        )
    }

    /// Height of the top of the body.
    pub fn top(&self) -> f32 {
        self.center.y + self.scaled_height * 0.5
    }

    /// Whether a descriptor x coordinate lies in the front (head) half.
    pub fn is_front_half(&self, x: f32) -> bool {
        x >= self.source_width * 0.5
    }
}

/// Head sphere the face features are placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadFrame {
    pub center: Vec3,
    pub radius: f32,
    /// Whether a head feature exists; a missing head is still sized.
    pub present: bool,
}

impl HeadFrame {
    fn new(body: &BodyFrame, source_radius: Option<f32>) -> Self {
        match source_radius {
            Some(source) => {
                let radius = head_radius(source, body.scaled_width);
                Self {
                    center: Vec3::new(
                        body.scaled_width * 0.5 + HEAD_FORWARD_OFFSET * radius,
                        body.top(),
                        0.0,
                    ),
                    radius,
                    present: true,
                }
            }
            None => {
                let radius = FALLBACK_HEAD_RATIO * body.scaled_width;
                Self {
                    center: Vec3::new(
                        body.scaled_width * 0.5 - radius,
                        body.center.y + body.scaled_height * 0.25,
                        0.0,
                    ),
                    radius,
                    present: false,
                }
            }
        }
    }

    /// Point on the sphere in `direction` from the center.
    pub fn surface_toward(&self, direction: Vec3) -> Vec3 {
        self.center + direction.normalize_or(Vec3::X) * self.radius
    }

    /// Point on the camera-facing hemisphere under `point` (x and y kept,
    /// pulled inside the silhouette if needed).
    pub fn surface_under(&self, point: Vec3) -> Vec3 {
        let mut offset = (point - self.center).truncate();
        let limit = self.radius * 0.9;
        if offset.length() > limit {
            offset = offset.normalize_or_zero() * limit;
        }
        let z = (self.radius * self.radius - offset.length_squared()).max(0.0).sqrt();
        self.center + offset.extend(z)
    }
}

/// Head radius for a source radius in pixels.
pub fn head_radius(source_radius: f32, scaled_width: f32) -> f32 {
    let limit = HEAD_MAX_RATIO * scaled_width;
    let radius = (source_radius * PIXEL_SCALE).min(limit);
    if radius.is_finite() && radius > 0.0 {
        radius
    } else {
        // Zero, negative or NaN sources still need a visible head.
        limit * 0.5
    }
}

/// Where a projected feature lands in depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Depth {
    /// A fixed `z`.
    Plane(f32),
    /// On the head's camera-facing surface.
    HeadSurface,
}

/// Depth of a feature projected from the 2D descriptor, by body part.
pub fn projection_depth(part: BodyPart, source_x: f32, body: &BodyFrame) -> Depth {
    match part {
        BodyPart::Tail => Depth::Plane(-body.depth * 0.5),
        BodyPart::Wing => Depth::Plane(-body.depth * 0.25),
        BodyPart::Leg => {
            let sign = if body.is_front_half(source_x) { 1.0 } else { -1.0 };
            Depth::Plane(sign * LEG_DEPTH_RATIO * body.depth)
        }
        BodyPart::Head
        | BodyPart::Mane
        | BodyPart::Nose
        | BodyPart::Mouth
        | BodyPart::Eye
        | BodyPart::Pupil
        | BodyPart::Ear => Depth::HeadSurface,
        BodyPart::Other => Depth::Plane(body.depth * 0.5),
    }
}

/// Resolves sides for one bucket. Labels naming neither side alternate left
/// and right in bucket order; a lone unsided label stays centered.
pub fn resolve_sides<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<Side> {
    let mut sides: Vec<Option<Side>> = labels
        .into_iter()
        .map(|label| match Side::from_label(label) {
            Side::Center => None,
            side => Some(side),
        })
        .collect();
    let unsided = sides.iter().filter(|s| s.is_none()).count();
    let mut next = 0;
    for side in &mut sides {
        if side.is_none() {
            *side = Some(if unsided == 1 {
                Side::Center
            } else if next % 2 == 0 {
                Side::Left
            } else {
                Side::Right
            });
            next += 1;
        }
    }
    sides.into_iter().map(|s| s.unwrap_or(Side::Center)).collect()
}

/// Builds [`MeshEntity`]s whose resources are tracked by one context.
#[derive(Debug, Clone)]
pub struct MeshBuilder {
    ctx: ResourceContext,
    options: MeshOptions,
}

impl MeshBuilder {
    pub fn new(ctx: &ResourceContext) -> Self {
        Self {
            ctx: ctx.clone(),
            options: MeshOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: MeshOptions) -> Self {
        self.options = options;
        self
    }

    /// Builds the entity subtree. Total: any descriptor yields at least a
    /// body, a shadow and a light.
    pub fn build(&self, classified: &Classified) -> MeshEntity {
        let descriptor = classified.descriptor();
        let anatomy = classified.anatomy();
        let body = BodyFrame::of(descriptor);
        let head_source = anatomy
            .head
            .and_then(|i| descriptor.features.get(i))
            .map(|f| f.shape.nominal_radius());
        let head = HeadFrame::new(&body, head_source);

        let mut build = Build {
            ctx: &self.ctx,
            options: &self.options,
            descriptor,
            body,
            head,
            materials: HashMap::new(),
            rig: SceneNode::group("rig").with_motion(Motion::Bob {
                amplitude: body.scaled_height * BOB_RATIO,
            }),
        };
        build.body();
        build.head(anatomy);
        build.mane(anatomy);
        build.eyes_and_pupils(anatomy);
        build.ears(anatomy);
        build.legs(anatomy);
        build.tails(anatomy);
        build.wings(anatomy);
        for index in [anatomy.nose, anatomy.mouth].into_iter().flatten() {
            build.projected(index, classify(&descriptor.features[index].label));
        }
        for &index in &anatomy.other {
            build.projected(index, classify(&descriptor.features[index].label));
        }

        let shadow = build.shadow();
        let light = build.light();
        let root = SceneNode::group("entity")
            .with_child(build.rig)
            .with_child(shadow)
            .with_child(light);

        log::debug!(
            "built entity: {} nodes, head radius {:.3}",
            root.node_count(),
            head.radius
        );
        MeshEntity::new(root, body, head, self.ctx.clone())
    }
}

/// State of one build.
struct Build<'a> {
    ctx: &'a ResourceContext,
    options: &'a MeshOptions,
    descriptor: &'a VisualDescriptor,
    body: BodyFrame,
    head: HeadFrame,
    materials: HashMap<Color, Rc<Material>>,
    rig: SceneNode,
}

impl<'a> Build<'a> {
    /// Shared material for a color.
    fn material(&mut self, color: Color) -> Rc<Material> {
        let ctx = self.ctx;
        Rc::clone(
            self.materials
                .entry(color)
                .or_insert_with(|| Rc::new(Material::standard(ctx, color.to_hex(), color))),
        )
    }

    fn feature(&self, index: usize) -> &'a Feature {
        &self.descriptor.features[index]
    }

    fn sphere(&mut self, name: String, index: usize, radius: f32, at: Vec3) {
        let geometry = Geometry::sphere(self.ctx, radius, self.options);
        let material = self.material(self.feature(index).paint());
        self.rig.add_child(
            SceneNode::mesh(name, geometry, material)
                .at(at)
                .for_feature(index),
        );
    }

    fn body(&mut self) {
        let body = self.body;
        let geometry = if self.descriptor.base_shape.is_round() {
            Geometry::ellipsoid(
                self.ctx,
                Vec3::new(body.scaled_width, body.scaled_height, body.depth) * 0.5,
                self.options,
            )
        } else {
            Geometry::cuboid(
                self.ctx,
                Vec3::new(body.scaled_width, body.scaled_height, body.depth),
            )
        };
        let material = self.material(self.descriptor.palette().primary);
        self.rig
            .add_child(SceneNode::mesh("body", geometry, material).at(body.center));
    }

    fn head(&mut self, anatomy: &Anatomy) {
        if let Some(index) = anatomy.head {
            let head = self.head;
            self.sphere("head".to_owned(), index, head.radius, head.center);
        }
    }

    fn mane(&mut self, anatomy: &Anatomy) {
        let Some(index) = anatomy.mane else {
            return;
        };
        let head = self.head;
        let source = self.feature(index).shape.nominal_radius() * PIXEL_SCALE;
        let radius = source.min(MANE_MAX_RATIO * head.radius);
        let at = head.center + Vec3::new(-0.35, 0.1, 0.0) * head.radius;
        self.sphere("mane".to_owned(), index, radius, at);
    }

    fn eyes_and_pupils(&mut self, anatomy: &Anatomy) {
        let head = self.head;
        let eye_direction =
            |side: Side| Vec3::new(0.8, 0.35, 0.55 * side.sign()).normalize();

        let mut placed: Vec<(Side, Vec3, f32)> = Vec::with_capacity(anatomy.eyes.len());
        let sides = resolve_sides(anatomy.eyes.iter().map(|&i| self.feature(i).label.as_str()));
        for (k, (&index, side)) in anatomy.eyes.iter().zip(sides).enumerate() {
            let source = self.feature(index).shape.nominal_radius() * PIXEL_SCALE;
            let radius = source.max(EYE_MIN_RATIO * head.radius);
            let at = head.surface_toward(eye_direction(side));
            self.sphere(format!("eye.{k}"), index, radius, at);
            placed.push((side, at, radius));
        }

        let sides = resolve_sides(
            anatomy
                .pupils
                .iter()
                .map(|&i| self.feature(i).label.as_str()),
        );
        for (k, (&index, side)) in anatomy.pupils.iter().zip(sides).enumerate() {
            let source = self.feature(index).shape.nominal_radius() * PIXEL_SCALE;
            let radius = source.max(PUPIL_MIN_RATIO * head.radius);
            let direction = eye_direction(side);
            let at = match placed.iter().find(|(s, _, _)| *s == side) {
                Some(&(_, eye, eye_radius)) => eye + direction * eye_radius * 0.85,
                None => head.surface_toward(direction) + direction * radius * 0.5,
            };
            self.sphere(format!("pupil.{k}"), index, radius, at);
        }
    }

    fn ears(&mut self, anatomy: &Anatomy) {
        let head = self.head;
        let sides = resolve_sides(anatomy.ears.iter().map(|&i| self.feature(i).label.as_str()));
        for (k, (&index, side)) in anatomy.ears.iter().zip(sides).enumerate() {
            let sign = side.sign();
            let geometry = Geometry::cone(
                self.ctx,
                EAR_RADIUS_RATIO * head.radius,
                EAR_HEIGHT_RATIO * head.radius,
                self.options,
            );
            let material = self.material(self.feature(index).paint());
            let at = head.center + Vec3::new(-0.15, 0.75, 0.55 * sign) * head.radius;
            let transform =
                Transform::from_translation(at).with_rotation(Quat::from_rotation_x(sign * EAR_TILT));
            self.rig.add_child(
                SceneNode::mesh(format!("ear.{k}"), geometry, material)
                    .with_transform(transform)
                    .for_feature(index),
            );
        }
    }

    fn legs(&mut self, anatomy: &Anatomy) {
        let body = self.body;
        if anatomy.legs.len() > MAX_LEGS {
            log::debug!(
                "dropping {} legs past the fourth",
                anatomy.legs.len() - MAX_LEGS
            );
        }
        let hip_y = body.center.y - body.scaled_height * 0.3;
        let (thin, thick) = (body.scaled_width * 0.03, body.scaled_width * 0.08);

        for (&index, slot) in anatomy.legs.iter().zip(LegSlot::ORDER) {
            let [hw, hh] = self.feature(index).shape.half_extents();
            let radius = (hw.min(hh) * PIXEL_SCALE).clamp(thin, thick);
            let x = if slot.is_front() { 1.0 } else { -1.0 } * LEG_SPREAD * body.scaled_width;
            let z = slot.side().sign() * LEG_SPREAD * body.depth;

            let geometry = Geometry::tube(
                self.ctx,
                &[Vec3::ZERO, Vec3::new(0.0, -hip_y, 0.0)],
                radius,
                self.options,
            );
            let material = self.material(self.feature(index).paint());
            let name = format!("leg.{}", slot.code());
            let mesh = SceneNode::mesh(format!("{name}.mesh"), geometry, material).for_feature(index);
            self.rig.add_child(
                SceneNode::group(name)
                    .at(Vec3::new(x, hip_y, z))
                    .with_motion(Motion::Swing {
                        amplitude: STRIDE_AMPLITUDE,
                        phase: slot.stride_phase(),
                    })
                    .for_feature(index)
                    .with_child(mesh),
            );
        }
    }

    fn tails(&mut self, anatomy: &Anatomy) {
        let body = self.body;
        let root = Vec3::new(-body.scaled_width * 0.45, body.center.y + body.scaled_height * 0.1, 0.0);
        for (k, &index) in anatomy.tails.iter().enumerate() {
            match &self.feature(index).shape {
                Shape::Line(line) => {
                    let mut direction = Vec2::new(line.x2 - line.x1, line.y1 - line.y2);
                    if direction.x > 0.0 {
                        direction = -direction;
                    }
                    let direction = direction.try_normalize().unwrap_or(Vec2::new(-0.9, 0.45).normalize());
                    let length = (line.x2 - line.x1).hypot(line.y2 - line.y1) * PIXEL_SCALE;
                    let end = root + direction.extend(0.0) * length.max(body.scaled_width * 0.1);
                    let radius = (line.line_width * PIXEL_SCALE * 0.5).max(0.005);
                    let geometry = Geometry::tube(self.ctx, &[root, end], radius, self.options);
                    let material = self.material(self.feature(index).paint());
                    self.rig.add_child(
                        SceneNode::mesh(format!("tail.{k}"), geometry, material).for_feature(index),
                    );
                }
                Shape::Circle(circle) => {
                    let radius = (circle.radius * PIXEL_SCALE).max(0.005);
                    let at = root - Vec3::X * radius * 0.6;
                    self.sphere(format!("tail.{k}"), index, radius, at);
                }
                _ => self.projected(index, BodyPart::Tail),
            }
        }
    }

    fn wings(&mut self, anatomy: &Anatomy) {
        let body = self.body;
        let sides = resolve_sides(anatomy.wings.iter().map(|&i| self.feature(i).label.as_str()));
        let min_size = body.scaled_width * 0.1;
        for (k, (&index, side)) in anatomy.wings.iter().zip(sides).enumerate() {
            let feature = self.feature(index);
            let [hw, hh] = feature.shape.half_extents();
            let width = (hw * 2.0 * PIXEL_SCALE).max(min_size);
            let height = (hh * 2.0 * PIXEL_SCALE).max(min_size);
            let x = body
                .project(feature.shape.center())
                .x
                .clamp(-body.scaled_width * 0.5, body.scaled_width * 0.5);
            let sign = side.sign();
            let pivot = Vec3::new(
                x,
                body.center.y + body.scaled_height * 0.25,
                sign * (body.depth * 0.5 + 0.01),
            );

            let geometry = Geometry::quad(self.ctx, width, height);
            let material = self.material(feature.paint());
            let mesh = SceneNode::mesh(format!("wing.{k}.mesh"), geometry, material)
                .at(Vec3::new(0.0, height * 0.5, 0.0))
                .for_feature(index);
            let transform =
                Transform::from_translation(pivot).with_rotation(Quat::from_rotation_x(-sign * WING_TILT));
            self.rig.add_child(
                SceneNode::group(format!("wing.{k}"))
                    .with_transform(transform)
                    .with_motion(Motion::Flap {
                        amplitude: FLAP_AMPLITUDE,
                        sign,
                    })
                    .for_feature(index)
                    .with_child(mesh),
            );
        }
    }

    /// Places a feature by projecting its 2D shape and taking depth from
    /// [`projection_depth`].
    fn projected(&mut self, index: usize, part: BodyPart) {
        let feature = self.feature(index);
        let body = self.body;
        let center = feature.shape.center();
        let thickness = (body.depth * 0.1).max(0.01);

        let Some((geometry, rotation)) =
            feature_geometry(self.ctx, &feature.shape, thickness, self.options)
        else {
            log::debug!(
                "skipping feature {index} ('{}'): unsupported shape '{}'",
                feature.label,
                feature.shape.type_name()
            );
            return;
        };

        let mut at = body.project(center);
        match projection_depth(part, center[0], &body) {
            Depth::Plane(z) => at.z = z,
            Depth::HeadSurface if self.head.present => at = self.head.surface_under(at),
            Depth::HeadSurface => at.z = body.depth * 0.5,
        }

        let material = self.material(feature.paint());
        self.rig.add_child(
            SceneNode::mesh(format!("feature.{index}"), geometry, material)
                .with_transform(Transform::from_translation(at).with_rotation(rotation))
                .for_feature(index),
        );
    }

    fn shadow(&mut self) -> SceneNode {
        let body = self.body;
        let geometry = Geometry::disc(
            self.ctx,
            body.scaled_width.max(body.depth) * 0.55,
            self.options,
        );
        let material = Rc::new(Material::shadow(self.ctx));
        SceneNode::mesh("shadow", geometry, material).with_transform(
            Transform::from_translation(Vec3::new(0.0, 0.002, 0.0))
                .with_scale(Vec3::new(1.0, 1.0, 0.6)),
        )
    }

    fn light(&self) -> SceneNode {
        let reach = self.body.scaled_width.max(self.body.scaled_height);
        SceneNode::light(
            "light",
            PointLight {
                color: Color::WHITE,
                intensity: 1.2,
                range: reach * 4.0 + 1.0,
            },
        )
        .at(self.head.center + Vec3::new(0.3, 0.8, 0.8) * reach)
    }
}

/// Geometry for a feature shape centered on its own center, with the
/// rotation that orients it. Descriptor y points down, so shapes are
/// flipped vertically. Unknown shapes have no geometry.
fn feature_geometry(
    ctx: &ResourceContext,
    shape: &Shape,
    thickness: f32,
    options: &MeshOptions,
) -> Option<(Geometry, Quat)> {
    let [cx, cy] = shape.center();
    let local = |x: f32, y: f32| Vec2::new((x - cx) * PIXEL_SCALE, (cy - y) * PIXEL_SCALE);

    let built = match shape {
        Shape::Circle(c) => (
            Geometry::sphere(ctx, c.radius * PIXEL_SCALE, options),
            Quat::IDENTITY,
        ),
        Shape::Ellipse(e) => {
            let rx = e.radius_x * PIXEL_SCALE;
            let ry = e.radius_y * PIXEL_SCALE;
            (
                Geometry::ellipsoid(ctx, Vec3::new(rx, ry, rx.min(ry) * 0.6), options),
                Quat::from_rotation_z(-e.rotation),
            )
        }
        Shape::Rectangle(r) => (
            Geometry::cuboid(
                ctx,
                Vec3::new(r.width * PIXEL_SCALE, r.height * PIXEL_SCALE, thickness),
            ),
            Quat::IDENTITY,
        ),
        Shape::RoundedRect(r) => {
            let outline = Outline::rounded_rect(r);
            let points: Vec<Vec2> = outline.points.iter().map(|p| local(p.x, p.y)).collect();
            (Geometry::prism(ctx, &counter_clockwise(points), thickness), Quat::IDENTITY)
        }
        Shape::Triangle(list) | Shape::Polygon(list) => {
            let points: Vec<Vec2> = list.points.iter().map(|&[x, y]| local(x, y)).collect();
            (Geometry::prism(ctx, &counter_clockwise(points), thickness), Quat::IDENTITY)
        }
        Shape::Line(line) => {
            let radius = (line.line_width * PIXEL_SCALE * 0.5).max(0.005);
            let points = [
                local(line.x1, line.y1).extend(0.0),
                local(line.x2, line.y2).extend(0.0),
            ];
            (Geometry::tube(ctx, &points, radius, options), Quat::IDENTITY)
        }
        Shape::Arc(arc) => {
            let radius = (arc.line_width * PIXEL_SCALE * 0.5).max(0.005);
            let outline = Outline::arc(
                Vec2::new(arc.x, arc.y),
                arc.radius,
                arc.start_angle,
                arc.end_angle,
            );
            let points: Vec<Vec3> = outline
                .points
                .iter()
                .map(|p| local(p.x, p.y).extend(0.0))
                .collect();
            (Geometry::tube(ctx, &points, radius, options), Quat::IDENTITY)
        }
        Shape::Unknown(_) => return None,
    };
    Some(built)
}

fn counter_clockwise(mut points: Vec<Vec2>) -> Vec<Vec2> {
    let twice_area: f32 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.perp_dot(*b))
        .sum();
    if twice_area < 0.0 {
        points.reverse();
    }
    points
}
