//! Tessellation options for procedural geometry.

use serde::{Deserialize, Serialize};

/// Controls how finely curved primitives are tessellated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Longitudinal segments of spheres and ellipsoids.
    pub sphere_segments: u32,
    /// Latitudinal rings of spheres and ellipsoids.
    pub sphere_rings: u32,
    /// Segments around cones, tubes and discs.
    pub radial_segments: u32,
}

impl MeshOptions {
    /// Lowest values accepted; anything smaller is raised to these.
    pub const MIN_SEGMENTS: u32 = 3;
    pub const MIN_RINGS: u32 = 2;

    /// Options with every count raised to a usable minimum.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            sphere_segments: self.sphere_segments.max(Self::MIN_SEGMENTS),
            sphere_rings: self.sphere_rings.max(Self::MIN_RINGS),
            radial_segments: self.radial_segments.max(Self::MIN_SEGMENTS),
        }
    }
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            sphere_segments: 16,
            sphere_rings: 10,
            radial_segments: 12,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: MeshOptions = serde_json::from_str(r#"{"sphere_rings": 4}"#).unwrap();
        assert_eq!(options.sphere_rings, 4);
        assert_eq!(options.sphere_segments, MeshOptions::default().sphere_segments);
    }

    #[test]
    fn test_clamped() {
        let options = MeshOptions {
            sphere_segments: 0,
            sphere_rings: 1,
            radial_segments: 2,
        }
        .clamped();
        assert_eq!(options.sphere_segments, 3);
        assert_eq!(options.sphere_rings, 2);
        assert_eq!(options.radial_segments, 3);
    }
}
