//! The asset viewer: one descriptor shown by every backend side by side.

use std::path::Path;

use effigy_core::{sanitize_json, Anatomy, Classified, Result, VisualDescriptor};
use effigy_render::{
    draw_sprite, draw_voxel, draw_wireframe, sprite_bounds, Canvas, Facing, IsoGrid, RasterCanvas,
    VectorParams,
};
use effigy_scene::{MeshBuilder, MeshEntity, ResourceContext, ResourceStats};
use glam::Vec2;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::config::ViewerConfig;
use crate::preview::{render_scene, PreviewCamera};

/// Share of a panel the 2D drawings may cover.
const PANEL_FILL: f32 = 0.85;

/// Where the voxel tile sits, as a fraction of panel height.
const VOXEL_ORIGIN_RATIO: f32 = 0.35;

/// One panel of the viewer strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Sprite,
    Mesh,
    Wireframe,
    Voxel,
}

impl Panel {
    /// Left-to-right order in [`AssetViewer::render`].
    pub const ALL: [Panel; 4] = [Panel::Sprite, Panel::Mesh, Panel::Wireframe, Panel::Voxel];

    pub fn name(self) -> &'static str {
        match self {
            Panel::Sprite => "sprite",
            Panel::Mesh => "mesh",
            Panel::Wireframe => "wireframe",
            Panel::Voxel => "voxel",
        }
    }
}

/// Owns a sanitized descriptor, its classification, and the 3D entity
/// built from it.
///
/// Each viewer has its own [`ResourceContext`], so two viewers never see
/// each other's resources and dropping a viewer releases all of its own.
#[derive(Debug)]
pub struct AssetViewer {
    config: ViewerConfig,
    classified: Classified,
    entity: MeshEntity,
    ctx: ResourceContext,
    time: f32,
}

impl AssetViewer {
    /// Sanitizes `descriptor` and builds every backend's input from it.
    pub fn new(descriptor: &VisualDescriptor, config: ViewerConfig) -> Self {
        let ctx = ResourceContext::new();
        let classified = Classified::new(descriptor.clone());
        let entity = MeshBuilder::new(&ctx)
            .with_options(config.mesh)
            .build(&classified);
        log::info!(
            "viewer ready: {} features, {} live resources",
            classified.descriptor().features.len(),
            ctx.stats().live()
        );
        Self {
            config,
            classified,
            entity,
            ctx,
            time: 0.0,
        }
    }

    /// Builds a viewer from untrusted JSON. Never fails: anything
    /// malformed is repaired by the sanitizer.
    pub fn from_json(json: &str, config: ViewerConfig) -> Self {
        Self::new(&sanitize_json(json), config)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn descriptor(&self) -> &VisualDescriptor {
        self.classified.descriptor()
    }

    pub fn anatomy(&self) -> &Anatomy {
        self.classified.anatomy()
    }

    pub fn entity(&self) -> &MeshEntity {
        &self.entity
    }

    pub fn resource_stats(&self) -> ResourceStats {
        self.ctx.stats()
    }

    /// Seconds of animation applied so far.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Swaps in a new descriptor, reclassifies it and rebuilds the entity.
    /// The old entity's resources are released as soon as the new one
    /// takes its place; the animation clock keeps running.
    pub fn replace_descriptor(&mut self, descriptor: &VisualDescriptor) {
        let before = self.ctx.stats();
        self.classified.replace(descriptor.clone());
        self.entity = MeshBuilder::new(&self.ctx)
            .with_options(self.config.mesh)
            .build(&self.classified);
        self.entity.animate(self.time);
        log::info!(
            "descriptor replaced: {} -> {} live resources",
            before.live(),
            self.ctx.stats().live()
        );
    }

    /// Like [`replace_descriptor`](Self::replace_descriptor), from JSON.
    pub fn replace_json(&mut self, json: &str) {
        self.replace_descriptor(&sanitize_json(json));
    }

    /// Advances the 3D animation by `dt` seconds. Negative or non-finite
    /// steps are ignored.
    pub fn advance(&mut self, dt: f32) {
        if !(dt.is_finite() && dt >= 0.0) {
            log::warn!("ignoring animation step {dt}");
            return;
        }
        self.time += dt;
        self.entity.animate(self.time);
    }

    /// Renders all panels left to right into one strip.
    pub fn render(&self) -> RgbaImage {
        let size = self.config.panel_size;
        let mut strip = RasterCanvas::with_background(
            size * Panel::ALL.len() as u32,
            size,
            self.config.background_color(),
        );
        for (i, panel) in Panel::ALL.into_iter().enumerate() {
            strip.overlay(&self.render_panel(panel), i64::from(size) * i as i64, 0);
        }
        strip.into_image()
    }

    /// Renders a single panel.
    pub fn render_panel(&self, panel: Panel) -> RgbaImage {
        let size = self.config.panel_size;
        let background = self.config.background_color();
        match panel {
            Panel::Sprite => self.sprite_panel(),
            Panel::Mesh => {
                let camera =
                    PreviewCamera::orbit(self.config.preview_yaw, self.config.preview_pitch);
                render_scene(self.entity.root(), camera, size, background).into_image()
            }
            Panel::Wireframe => {
                let mut canvas = RasterCanvas::with_background(size, size, background);
                self.draw_wireframe_panel(&mut canvas);
                canvas.into_image()
            }
            Panel::Voxel => {
                let mut canvas = RasterCanvas::with_background(size, size, background);
                self.draw_voxel_panel(&mut canvas);
                canvas.into_image()
            }
        }
    }

    /// Renders the strip and saves it as PNG or JPEG, chosen by extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = self.render();
        RasterCanvas::from_image(image).save(path)?;
        log::info!("saved viewer strip to {}", path.display());
        Ok(())
    }

    /// The sprite is drawn at its native size on a canvas covering every
    /// feature, then shrunk to the panel with nearest-neighbor sampling if
    /// it does not fit.
    fn sprite_panel(&self) -> RgbaImage {
        let size = self.config.panel_size;
        let descriptor = self.descriptor();
        let facing = Facing::from(self.config.sprite_facing);
        let (min, max) = sprite_bounds(descriptor, facing);
        let origin = min.floor();
        let extent = (max - origin).ceil();
        let width = (extent.x as u32).max(1);
        let height = (extent.y as u32).max(1);

        let mut sprite = RasterCanvas::new(width, height);
        draw_sprite(&mut sprite, descriptor, -origin.x, -origin.y, facing);
        let mut sprite = sprite.into_image();

        let limit = size as f32 * PANEL_FILL;
        let fit = limit / width.max(height) as f32;
        if fit < 1.0 {
            let w = ((width as f32 * fit).floor() as u32).max(1);
            let h = ((height as f32 * fit).floor() as u32).max(1);
            sprite = imageops::resize(&sprite, w, h, FilterType::Nearest);
        }

        let mut panel = RasterCanvas::with_background(size, size, self.config.background_color());
        let x = (i64::from(size) - i64::from(sprite.width())) / 2;
        let y = (i64::from(size) - i64::from(sprite.height())) / 2;
        panel.overlay(&sprite, x, y);
        panel.into_image()
    }

    fn draw_wireframe_panel<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let size = self.config.panel_size as f32;
        let descriptor = self.descriptor();
        let scale = size * PANEL_FILL / descriptor.width.max(descriptor.height);
        let mut params = VectorParams::new(
            (size - descriptor.width * scale) * 0.5,
            (size - descriptor.height * scale) * 0.5,
            scale,
            self.config.stroke_color(),
            self.config.glow_color(),
        )
        .with_facing(Facing::from(self.config.sprite_facing));
        params.core_width = self.config.vector_core_width;
        params.glow_width = self.config.vector_glow_width;
        params.glow_alpha = self.config.vector_glow_alpha;
        draw_wireframe(canvas, descriptor, &params);
    }

    fn draw_voxel_panel<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        let size = self.config.panel_size as f32;
        let grid = IsoGrid::new(
            Vec2::new(size * 0.5, size * VOXEL_ORIGIN_RATIO),
            self.config.voxel_tile_width,
            self.config.voxel_tile_height,
        );
        draw_voxel(canvas, &grid, 0.0, 0.0, &self.descriptor().palette());
    }
}
