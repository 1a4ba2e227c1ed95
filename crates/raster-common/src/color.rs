//! RGBA colors and their packed ARGB32 representation.

use crate::error::{RasterError, RasterResult};
use serde::{Deserialize, Serialize};

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const DARK_BLUE: Color = Color::rgb(0, 0, 128);
    pub const DARK_RED: Color = Color::rgb(128, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Pack into `0xAARRGGBB`, the layout of an ARGB32 pixel.
    #[inline(always)]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Unpack a `0xAARRGGBB` pixel.
    #[inline(always)]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> RasterResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let invalid = || RasterError::InvalidColor(hex.to_string());

        if !digits.is_ascii() {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());

        match digits.len() {
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color::new(byte(2)?, byte(4)?, byte(6)?, byte(0)?)),
            _ => Err(invalid()),
        }
    }

    /// Format as `#RRGGBB`, or `#AARRGGBB` when not opaque.
    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.a, self.r, self.g, self.b)
        }
    }

    /// Perceived brightness (ITU-R BT.601 weights), 0..=255.
    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_packing() {
        let c = Color::new(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_argb(), 0x7812_3456);
        assert_eq!(Color::from_argb(0x7812_3456), c);
        assert_eq!(Color::transparent().to_argb(), 0);
    }

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::RED);
        assert_eq!(Color::from_hex("00FF00").unwrap(), Color::GREEN);
        assert_eq!(
            Color::from_hex("#80000080").unwrap(),
            Color::new(0, 0, 128, 128)
        );
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert!(Color::from_hex("#FFF").is_err());
        assert!(Color::from_hex("#ÿÿÿ").is_err());
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Color::DARK_BLUE.to_hex(), "#000080");
        assert_eq!(Color::new(1, 2, 3, 4).to_hex(), "#04010203");
    }
}
