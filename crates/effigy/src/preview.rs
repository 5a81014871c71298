//! Software preview of a 3D subtree.
//!
//! Orthographic and flat-shaded, drawn through a 2D [`Canvas`] back to
//! front. It needs no GPU, so the viewer can show the mesh panel anywhere
//! and tests can look at it.

use effigy_core::{Color, Outline};
use effigy_render::{Canvas, RasterCanvas};
use effigy_scene::{NodeKind, SceneNode};
use glam::{Mat4, Vec2, Vec3};

/// Padding around the fitted bounds.
const FIT_MARGIN: f32 = 1.15;

/// Pitch is kept off the poles so `up` never lines up with the view.
const MAX_PITCH: f32 = 1.5;

/// An orthographic camera orbiting its target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Half the visible height, in world units.
    pub ortho_scale: f32,
}

impl PreviewCamera {
    /// Looks at the origin from `yaw` radians around +Y and `pitch` radians
    /// above the horizon. Zero yaw looks down -Z onto the entity's side.
    pub fn orbit(yaw: f32, pitch: f32) -> Self {
        let pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
        let back = Vec3::new(
            yaw.sin() * pitch.cos(),
            pitch.sin(),
            yaw.cos() * pitch.cos(),
        );
        Self {
            position: back,
            target: Vec3::ZERO,
            up: Vec3::Y,
            ortho_scale: 1.0,
        }
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Re-aims at the center of the box and widens the view to fit it,
    /// keeping the viewing direction.
    pub fn look_at_box(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let size = (max - min).length().max(1e-3);
        let back = -self.forward();
        self.target = center;
        self.position = center + back * size * 1.5;

        let view = self.view_matrix();
        let mut half = Vec2::ZERO;
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            );
            half = half.max(view.transform_point3(corner).truncate().abs());
        }
        self.ortho_scale = (half.max_element() * FIT_MARGIN).max(0.01);
    }

    /// Maps a view-space point onto a square surface `size` pixels wide.
    pub fn to_screen(&self, view_point: Vec3, size: f32) -> Vec2 {
        let half = size * 0.5;
        Vec2::new(
            half + view_point.x / self.ortho_scale * half,
            half - view_point.y / self.ortho_scale * half,
        )
    }
}

/// One lit triangle in world space.
#[derive(Debug, Clone, Copy)]
struct Facet {
    corners: [Vec3; 3],
    paint: Color,
}

/// Renders `root` into a new square canvas.
pub fn render_scene(
    root: &SceneNode,
    camera: PreviewCamera,
    size: u32,
    background: Color,
) -> RasterCanvas {
    let mut canvas = RasterCanvas::with_background(size, size, background);
    draw_scene(&mut canvas, root, camera, size as f32);
    canvas
}

/// Draws every mesh triangle of `root`, farthest first. The camera is
/// fitted to the subtree's bounds. Returns the number of triangles drawn.
pub fn draw_scene<C: Canvas + ?Sized>(
    canvas: &mut C,
    root: &SceneNode,
    mut camera: PreviewCamera,
    size: f32,
) -> usize {
    let facets = collect_facets(root, camera.forward());
    let Some((min, max)) = facet_bounds(&facets) else {
        return 0;
    };
    camera.look_at_box(min, max);
    let view = camera.view_matrix();

    let mut projected: Vec<(f32, Outline, Color)> = facets
        .iter()
        .map(|facet| {
            let corners = facet.corners.map(|c| view.transform_point3(c));
            let depth = (corners[0].z + corners[1].z + corners[2].z) / 3.0;
            let points = corners
                .iter()
                .map(|&p| camera.to_screen(p, size))
                .collect();
            (depth, Outline::closed(points), facet.paint)
        })
        .collect();
    // View space looks down -Z: smaller z is farther away.
    projected.sort_by(|a, b| a.0.total_cmp(&b.0));

    for (_, outline, paint) in &projected {
        canvas.fill(outline, *paint);
    }
    projected.len()
}

/// Triangulates and shades every mesh node. Faces are lit two-sided so
/// open surfaces such as wings and discs read from either side.
fn collect_facets(root: &SceneNode, forward: Vec3) -> Vec<Facet> {
    let toward_camera = -forward;

    let mut light = None;
    root.visit(Mat4::IDENTITY, &mut |node, world| {
        if light.is_none() && matches!(node.kind, NodeKind::Light(_)) {
            light = Some(world.transform_point3(Vec3::ZERO));
        }
    });

    let mut facets = Vec::new();
    root.visit(Mat4::IDENTITY, &mut |node, world| {
        let (Some(geometry), Some(material)) = (node.geometry(), node.material()) else {
            return;
        };
        for triangle in geometry.mesh().triangles() {
            let corners = triangle.map(|p| world.transform_point3(p));
            let Some(mut normal) = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .try_normalize()
            else {
                continue;
            };
            if normal.dot(toward_camera) < 0.0 {
                normal = -normal;
            }
            let centroid = (corners[0] + corners[1] + corners[2]) / 3.0;
            let to_light = light
                .map_or(toward_camera + Vec3::Y, |l| l - centroid)
                .normalize_or(Vec3::Y);
            facets.push(Facet {
                corners,
                paint: material.shade(normal.dot(to_light)),
            });
        }
    });
    facets
}

fn facet_bounds(facets: &[Facet]) -> Option<(Vec3, Vec3)> {
    let first = facets.first()?.corners[0];
    Some(
        facets
            .iter()
            .flat_map(|f| f.corners)
            .fold((first, first), |(min, max), p| (min.min(p), max.max(p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use effigy_render::RecordingCanvas;
    use effigy_scene::{Geometry, Material, ResourceContext};
    use std::rc::Rc;

    const BG: Color = Color::rgb(10, 10, 10);

    fn cube(ctx: &ResourceContext, name: &str, color: Color, at: Vec3) -> SceneNode {
        let material = Rc::new(Material::standard(ctx, name, color));
        SceneNode::mesh(name, Geometry::cuboid(ctx, Vec3::ONE), material).at(at)
    }

    #[test]
    fn test_empty_scene_draws_nothing() {
        let root = SceneNode::group("empty");
        let canvas = render_scene(&root, PreviewCamera::orbit(0.4, 0.3), 32, BG);
        assert_eq!(canvas.count_not(BG), 0);
    }

    #[test]
    fn test_cube_fills_center() {
        let ctx = ResourceContext::new();
        let red = Color::rgb(200, 40, 40);
        let root = SceneNode::group("root").with_child(cube(&ctx, "box", red, Vec3::ZERO));
        let canvas = render_scene(&root, PreviewCamera::orbit(0.6, 0.4), 48, BG);
        assert_ne!(canvas.pixel(24, 24), BG);
        // Fitted with a margin: corners stay clear.
        assert_eq!(canvas.pixel(0, 0), BG);
    }

    #[test]
    fn test_near_triangles_paint_last() {
        let ctx = ResourceContext::new();
        let red = Color::rgb(220, 0, 0);
        let blue = Color::rgb(0, 0, 220);
        let root = SceneNode::group("root")
            .with_child(cube(&ctx, "near", red, Vec3::new(0.0, 0.0, 2.0)))
            .with_child(cube(&ctx, "far", blue, Vec3::new(0.0, 0.0, -2.0)));

        let mut canvas = RecordingCanvas::new();
        let drawn = draw_scene(&mut canvas, &root, PreviewCamera::orbit(0.0, 0.0), 64.0);
        assert_eq!(drawn, 24);
        let is_red = |c: Color| c.r > 0 && c.b == 0;
        let last_blue = canvas.calls().iter().rposition(|c| !is_red(c.paint())).unwrap();
        let first_red = canvas.calls().iter().position(|c| is_red(c.paint())).unwrap();
        assert!(last_blue < first_red);
    }

    #[test]
    fn test_light_brightens_facing_side() {
        let ctx = ResourceContext::new();
        let gray = Color::rgb(200, 200, 200);
        let light = effigy_scene::PointLight {
            color: Color::WHITE,
            intensity: 1.0,
            range: 10.0,
        };
        let root = SceneNode::group("root")
            .with_child(cube(&ctx, "box", gray, Vec3::ZERO))
            .with_child(SceneNode::light("light", light).at(Vec3::new(0.0, 0.0, 5.0)));

        let facets = collect_facets(&root, PreviewCamera::orbit(0.0, 0.0).forward());
        let brightest = facets.iter().map(|f| f.paint.r).max().unwrap();
        let darkest = facets.iter().map(|f| f.paint.r).min().unwrap();
        assert!(brightest >= 195);
        assert!(darkest < 150);
    }
}
