//! Hex color parsing and the small amount of color math the renderers share.

use glam::{Vec3, Vec4};

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Creates a color with explicit alpha.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// Five and seven digit strings pass [`is_valid_hex`] but have no
    /// standard meaning; they are read as their four and six digit prefixes.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !is_valid_hex(hex) {
            return None;
        }
        let digits = &hex[1..];
        let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        match digits.len() {
            3 => Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 | 5 => Some(Self::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 | 7 => Some(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Parses `hex`, falling back to `fallback` when it is not a valid color.
    pub fn from_hex_or(hex: &str, fallback: Color) -> Self {
        Self::from_hex(hex).unwrap_or(fallback)
    }

    /// Formats as `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Multiplies the RGB channels by `factor`, keeping alpha.
    #[must_use]
    pub fn shade(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |c: u8| (f32::from(c) * factor).round() as u8;
        Self::rgba(scale(self.r), scale(self.g), scale(self.b), self.a)
    }

    /// Darkens by `amount` (0.35 leaves 65% of each channel).
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        self.shade(1.0 - amount)
    }

    /// Replaces alpha with `alpha` in `[0, 1]`.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// Normalized RGB.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }

    /// Normalized RGBA.
    pub fn to_vec4(self) -> Vec4 {
        self.to_vec3().extend(f32::from(self.a) / 255.0)
    }

    /// Builds a color from normalized RGB.
    pub fn from_vec3(rgb: Vec3) -> Self {
        let to_byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(to_byte(rgb.x), to_byte(rgb.y), to_byte(rgb.z))
    }

    /// Whether anything would be visible when painting with this color.
    pub fn is_visible(self) -> bool {
        self.a > 0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Whether `s` matches `#[0-9A-Fa-f]{3,8}`.
pub fn is_valid_hex(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    (3..=8).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#D4A030"), Some(Color::rgb(0xD4, 0xA0, 0x30)));
        assert_eq!(
            Color::from_hex("#11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::from_hex("#1234"), Some(Color::rgba(0x11, 0x22, 0x33, 0x44)));
        assert_eq!(Color::from_hex("#1234567"), Some(Color::rgb(0x12, 0x34, 0x56)));
    }

    #[test]
    fn test_invalid_hex() {
        assert!(!is_valid_hex("D4A030"));
        assert!(!is_valid_hex("#12"));
        assert!(!is_valid_hex("#123456789"));
        assert!(!is_valid_hex("#GGGGGG"));
        assert!(!is_valid_hex("#ééé"));
        assert_eq!(Color::from_hex_or("red", Color::WHITE), Color::WHITE);
    }

    #[test]
    fn test_darken() {
        let c = Color::rgb(200, 100, 0).darken(0.35);
        assert_eq!(c, Color::rgb(130, 65, 0));
        assert_eq!(c.a, 255);
    }

    #[test]
    fn test_hex_round_trip() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(Color::from_hex(&c.to_hex()), Some(c));
        assert_eq!(Color::rgb(0xAB, 0xCD, 0xEF).to_hex(), "#ABCDEF");
    }
}
