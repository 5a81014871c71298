//! Isometric voxel renderer.
//!
//! Voxel art is not derived from the descriptor's shapes. A hand-authored
//! template is painted with the descriptor's three palette colors, so the
//! same archetype reads consistently regardless of the feature list.

use effigy_core::{Color, Outline, Palette};
use glam::Vec2;

use crate::canvas::Canvas;

/// Shade applied to the face turned toward the lower left.
pub const LEFT_FACE_SHADE: f32 = 0.8;

/// Shade applied to the face turned toward the lower right.
pub const RIGHT_FACE_SHADE: f32 = 0.6;

/// Voxels along one tile edge.
pub const VOXELS_PER_TILE: f32 = 8.0;

/// Which palette color a voxel takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteSlot {
    Primary,
    Secondary,
    Accent,
}

impl PaletteSlot {
    pub fn resolve(self, palette: &Palette) -> Color {
        match self {
            Self::Primary => palette.primary,
            Self::Secondary => palette.secondary,
            Self::Accent => palette.accent,
        }
    }
}

/// One unit cube of a template. `x` runs tail to head, `y` across the
/// body, `z` up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub slot: PaletteSlot,
}

const fn v(x: i32, y: i32, z: i32, slot: PaletteSlot) -> Voxel {
    Voxel { x, y, z, slot }
}

use PaletteSlot::{Accent as A, Primary as P, Secondary as S};

/// A low four-legged crawler, seven voxels long.
pub const CRAWLER_TEMPLATE: &[Voxel] = &[
    // legs
    v(1, 0, 0, S),
    v(1, 3, 0, S),
    v(5, 0, 0, S),
    v(5, 3, 0, S),
    // body
    v(0, 1, 1, P),
    v(0, 2, 1, P),
    v(1, 0, 1, P),
    v(1, 1, 1, P),
    v(1, 2, 1, P),
    v(1, 3, 1, P),
    v(2, 1, 1, P),
    v(2, 2, 1, P),
    v(3, 1, 1, P),
    v(3, 2, 1, P),
    v(4, 1, 1, P),
    v(4, 2, 1, P),
    v(5, 0, 1, P),
    v(5, 1, 1, P),
    v(5, 2, 1, P),
    v(5, 3, 1, P),
    // back
    v(1, 1, 2, P),
    v(1, 2, 2, P),
    v(2, 1, 2, A),
    v(3, 2, 2, A),
    v(4, 1, 2, A),
    v(4, 2, 2, P),
    // tail
    v(-1, 1, 1, S),
    v(-2, 1, 2, S),
    // head
    v(6, 1, 1, S),
    v(6, 2, 1, S),
    v(6, 1, 2, S),
    v(6, 2, 2, S),
    // eyes
    v(7, 1, 2, A),
    v(7, 2, 2, A),
];

/// An isometric tile grid anchored at `origin`, the top corner of tile
/// `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsoGrid {
    pub origin: Vec2,
    pub tile_width: f32,
    pub tile_height: f32,
}

impl IsoGrid {
    pub fn new(origin: Vec2, tile_width: f32, tile_height: f32) -> Self {
        Self {
            origin,
            tile_width,
            tile_height,
        }
    }

    /// Screen position of the top corner of tile `(col, row)`.
    pub fn grid_to_screen(&self, col: f32, row: f32) -> Vec2 {
        self.origin
            + Vec2::new(
                (col - row) * self.tile_width * 0.5,
                (col + row) * self.tile_height * 0.5,
            )
    }

    /// Screen position of the center of tile `(col, row)`.
    pub fn tile_center(&self, col: f32, row: f32) -> Vec2 {
        self.grid_to_screen(col, row) + Vec2::new(0.0, self.tile_height * 0.5)
    }

    /// Projects a voxel-space corner relative to the template anchor.
    fn project(&self, x: f32, y: f32, z: f32) -> Vec2 {
        let w = self.tile_width / VOXELS_PER_TILE;
        let h = self.tile_height / VOXELS_PER_TILE;
        Vec2::new((x - y) * w * 0.5, (x + y) * h * 0.5 - z * h)
    }
}

/// Template voxels in paint order, farthest first.
pub fn paint_order(template: &[Voxel]) -> Vec<Voxel> {
    let mut voxels = template.to_vec();
    voxels.sort_by_key(|v| v.x + v.y + v.z);
    voxels
}

/// Draws the crawler standing on tile `(col, row)`, colored by `palette`.
pub fn draw_voxel<C: Canvas + ?Sized>(
    canvas: &mut C,
    grid: &IsoGrid,
    col: f32,
    row: f32,
    palette: &Palette,
) {
    draw_template(canvas, grid, col, row, palette, CRAWLER_TEMPLATE);
}

/// Draws an arbitrary template. Each cube shows its top face in the slot
/// color and its two lower faces shaded.
pub fn draw_template<C: Canvas + ?Sized>(
    canvas: &mut C,
    grid: &IsoGrid,
    col: f32,
    row: f32,
    palette: &Palette,
    template: &[Voxel],
) {
    let Some(center) = footprint_center(template) else {
        return;
    };
    let anchor = grid.tile_center(col, row) - grid.project(center.x, center.y, 0.0);
    let corner = |x: i32, y: i32, z: i32| anchor + grid.project(x as f32, y as f32, z as f32);

    for voxel in paint_order(template) {
        let Voxel { x, y, z, slot } = voxel;
        let base = slot.resolve(palette);

        let top = Outline::closed(vec![
            corner(x, y, z + 1),
            corner(x + 1, y, z + 1),
            corner(x + 1, y + 1, z + 1),
            corner(x, y + 1, z + 1),
        ]);
        let left = Outline::closed(vec![
            corner(x, y + 1, z + 1),
            corner(x + 1, y + 1, z + 1),
            corner(x + 1, y + 1, z),
            corner(x, y + 1, z),
        ]);
        let right = Outline::closed(vec![
            corner(x + 1, y, z + 1),
            corner(x + 1, y + 1, z + 1),
            corner(x + 1, y + 1, z),
            corner(x + 1, y, z),
        ]);

        canvas.fill(&top, base);
        canvas.fill(&left, base.shade(LEFT_FACE_SHADE));
        canvas.fill(&right, base.shade(RIGHT_FACE_SHADE));
    }
}

/// Center of the template's ground footprint, in voxel units.
fn footprint_center(template: &[Voxel]) -> Option<Vec2> {
    let first = template.first()?;
    let (min, max) = template.iter().fold(
        ((first.x, first.y), (first.x, first.y)),
        |((lx, ly), (hx, hy)), v| ((lx.min(v.x), ly.min(v.y)), (hx.max(v.x), hy.max(v.y))),
    );
    Some(Vec2::new(
        (min.0 + max.0 + 1) as f32 * 0.5,
        (min.1 + max.1 + 1) as f32 * 0.5,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RecordingCanvas;
    use crate::raster::RasterCanvas;
    use effigy_core::{Circle, Feature, Shape, VisualDescriptor};

    fn palette() -> Palette {
        Palette {
            primary: Color::rgb(200, 100, 50),
            secondary: Color::rgb(100, 100, 100),
            accent: Color::rgb(255, 210, 60),
        }
    }

    #[test]
    fn test_grid_to_screen() {
        let grid = IsoGrid::new(Vec2::new(100.0, 20.0), 64.0, 32.0);
        assert_eq!(grid.grid_to_screen(0.0, 0.0), Vec2::new(100.0, 20.0));
        assert_eq!(grid.grid_to_screen(1.0, 0.0), Vec2::new(132.0, 36.0));
        assert_eq!(grid.grid_to_screen(0.0, 1.0), Vec2::new(68.0, 36.0));
        assert_eq!(grid.grid_to_screen(2.0, 2.0), Vec2::new(100.0, 84.0));
    }

    #[test]
    fn test_faces_are_shaded() {
        let grid = IsoGrid::new(Vec2::ZERO, 64.0, 32.0);
        let single = [v(0, 0, 0, PaletteSlot::Primary)];
        let mut canvas = RecordingCanvas::new();
        draw_template(&mut canvas, &grid, 1.0, 1.0, &palette(), &single);

        let paints: Vec<Color> = canvas.calls().iter().map(|c| c.paint()).collect();
        let base = palette().primary;
        assert_eq!(
            paints,
            vec![base, base.shade(LEFT_FACE_SHADE), base.shade(RIGHT_FACE_SHADE)]
        );
        assert!(canvas.calls().iter().all(|c| c.is_fill() && c.is_visible()));
    }

    #[test]
    fn test_back_to_front() {
        let order = paint_order(CRAWLER_TEMPLATE);
        assert_eq!(order.len(), CRAWLER_TEMPLATE.len());
        assert!(order
            .windows(2)
            .all(|w| w[0].x + w[0].y + w[0].z <= w[1].x + w[1].y + w[1].z));
    }

    #[test]
    fn test_every_slot_used() {
        for slot in [PaletteSlot::Primary, PaletteSlot::Secondary, PaletteSlot::Accent] {
            assert!(CRAWLER_TEMPLATE.iter().any(|v| v.slot == slot));
        }
    }

    #[test]
    fn test_independent_of_features() {
        let plain = VisualDescriptor::default();
        let busy = VisualDescriptor {
            features: vec![Feature::new(
                "head",
                "#FF0000",
                Shape::Circle(Circle {
                    x: 10.0,
                    y: 10.0,
                    radius: 9.0,
                }),
            )],
            ..Default::default()
        };
        let grid = IsoGrid::new(Vec2::new(64.0, 16.0), 96.0, 48.0);

        let mut a = RasterCanvas::new(128, 96);
        let mut b = RasterCanvas::new(128, 96);
        draw_voxel(&mut a, &grid, 0.5, 0.5, &plain.palette());
        draw_voxel(&mut b, &grid, 0.5, 0.5, &busy.palette());
        assert_eq!(a.image(), b.image());
        assert!(a.count_not(Color::TRANSPARENT) > 0);
    }
}
