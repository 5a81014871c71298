//! Viewer configuration.

use std::path::Path;

use effigy_core::color::is_valid_hex;
use effigy_core::{Color, EffigyError, Result};
use effigy_render::Facing;
use effigy_scene::MeshOptions;
use serde::{Deserialize, Serialize};

/// Which way the sprite panel faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SpriteFacing {
    #[default]
    Right,
    Left,
}

impl From<SpriteFacing> for Facing {
    fn from(facing: SpriteFacing) -> Self {
        match facing {
            SpriteFacing::Right => Facing::Right,
            SpriteFacing::Left => Facing::Left,
        }
    }
}

/// Settings for [`AssetViewer`](crate::AssetViewer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Side length of each square panel, in pixels.
    pub panel_size: u32,
    /// Panel background color.
    pub background: String,
    pub sprite_facing: SpriteFacing,
    /// Wireframe core color, replacing the descriptor palette.
    pub vector_stroke: String,
    /// Wireframe glow color.
    pub vector_glow: String,
    pub vector_core_width: f32,
    pub vector_glow_width: f32,
    pub vector_glow_alpha: f32,
    pub voxel_tile_width: f32,
    pub voxel_tile_height: f32,
    /// Rotation of the 3D preview about the vertical axis, in radians.
    pub preview_yaw: f32,
    /// Downward tilt of the 3D preview camera, in radians.
    pub preview_pitch: f32,
    pub mesh: MeshOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            panel_size: 192,
            background: "#1B1B22".to_owned(),
            sprite_facing: SpriteFacing::Right,
            vector_stroke: "#3CF2FF".to_owned(),
            vector_glow: "#FF3CC8".to_owned(),
            vector_core_width: 1.0,
            vector_glow_width: 4.0,
            vector_glow_alpha: 0.3,
            voxel_tile_width: 128.0,
            voxel_tile_height: 64.0,
            preview_yaw: 0.5,
            preview_pitch: 0.3,
            mesh: MeshOptions::default(),
        }
    }
}

impl ViewerConfig {
    pub const MIN_PANEL_SIZE: u32 = 32;
    pub const MAX_PANEL_SIZE: u32 = 2048;

    /// Loads and validates a JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Rejects values no panel can be drawn with.
    pub fn validate(&self) -> Result<()> {
        if !(Self::MIN_PANEL_SIZE..=Self::MAX_PANEL_SIZE).contains(&self.panel_size) {
            return Err(EffigyError::InvalidConfig(format!(
                "panel_size {} outside {}..={}",
                self.panel_size,
                Self::MIN_PANEL_SIZE,
                Self::MAX_PANEL_SIZE
            )));
        }
        for (field, value) in [
            ("background", &self.background),
            ("vector_stroke", &self.vector_stroke),
            ("vector_glow", &self.vector_glow),
        ] {
            if !is_valid_hex(value) {
                return Err(EffigyError::InvalidConfig(format!(
                    "{field} is not a hex color: {value:?}"
                )));
            }
        }
        let positive = [
            ("vector_core_width", self.vector_core_width),
            ("vector_glow_width", self.vector_glow_width),
            ("voxel_tile_width", self.voxel_tile_width),
            ("voxel_tile_height", self.voxel_tile_height),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(EffigyError::InvalidConfig(format!(
                    "{field} must be positive, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.vector_glow_alpha) {
            return Err(EffigyError::InvalidConfig(format!(
                "vector_glow_alpha must be within 0..=1, got {}",
                self.vector_glow_alpha
            )));
        }
        Ok(())
    }

    pub fn background_color(&self) -> Color {
        Color::from_hex_or(&self.background, Color::BLACK)
    }

    pub fn stroke_color(&self) -> Color {
        Color::from_hex_or(&self.vector_stroke, Color::WHITE)
    }

    pub fn glow_color(&self) -> Color {
        Color::from_hex_or(&self.vector_glow, Color::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        ViewerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json() {
        let config: ViewerConfig =
            serde_json::from_str(r##"{"panel_size": 64, "sprite_facing": "Left"}"##).unwrap();
        assert_eq!(config.panel_size, 64);
        assert_eq!(config.sprite_facing, SpriteFacing::Left);
        assert_eq!(config.background, ViewerConfig::default().background);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = ViewerConfig {
            panel_size: 4,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EffigyError::InvalidConfig(_))));

        let config = ViewerConfig {
            vector_glow: "magenta".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EffigyError::InvalidConfig(_))));

        let config = ViewerConfig {
            vector_glow_alpha: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("effigy-config-{}.json", std::process::id()));
        let config = ViewerConfig {
            panel_size: 96,
            preview_yaw: -0.25,
            ..Default::default()
        };
        config.save(&path).unwrap();
        let loaded = ViewerConfig::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
