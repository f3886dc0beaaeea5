//! Visual appearance of a rendered QR code.
//!
//! A [`StyleConfig`] is replaced wholesale on every edit; partial edits are
//! expressed as a [`StylePatch`] and merged with [`StyleConfig::apply`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Smallest accepted image width in pixels.
pub const MIN_SIZE: u32 = 100;
/// Largest accepted image width in pixels.
pub const MAX_SIZE: u32 = 500;
/// Width used when nothing else is configured.
pub const DEFAULT_SIZE: u32 = 180;

/// An RGBA color, written as a CSS-style hex string.
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

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parses `#RGB`, `#RRGGBB` or `#RRGGBBAA`.
    ///
    /// ```rust
    /// use qrsession::style::Color;
    ///
    /// let orange: Color = "#FFA500".parse().unwrap();
    /// assert_eq!(orange, Color::rgb(255, 165, 0));
    /// assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
    /// ```
    pub fn parse_hex(input: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor(input.to_string());
        let digits = input.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(digits.chars()) {
                    let nibble = c.to_digit(16).unwrap_or(0) as u8;
                    *slot = nibble * 17;
                }
                Ok(Color::rgb(channels[0], channels[1], channels[2]))
            }
            6 => Ok(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Color {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(invalid()),
        }
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Size and colors used when rendering a QR code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Width and height of the output image in pixels.
    pub size: u32,
    /// Color of the dark modules.
    pub foreground: Color,
    /// Color of the light modules and the quiet zone.
    pub background: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            foreground: Color::BLACK,
            background: Color::WHITE,
        }
    }
}

impl StyleConfig {
    /// Returns a copy of `self` with every field set in `patch` replaced.
    ///
    /// Fails without producing a style if the patched size is out of bounds.
    pub fn apply(&self, patch: &StylePatch) -> Result<StyleConfig> {
        let merged = StyleConfig {
            size: patch.size.unwrap_or(self.size),
            foreground: patch.foreground.unwrap_or(self.foreground),
            background: patch.background.unwrap_or(self.background),
        };
        merged.validate()?;
        Ok(merged)
    }

    pub fn validate(&self) -> Result<()> {
        if (MIN_SIZE..=MAX_SIZE).contains(&self.size) {
            Ok(())
        } else {
            Err(Error::InvalidSize(self.size))
        }
    }
}

/// A partial style edit; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StylePatch {
    pub size: Option<u32>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl StylePatch {
    pub fn size(size: u32) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn foreground(color: Color) -> Self {
        Self {
            foreground: Some(color),
            ..Self::default()
        }
    }

    pub fn background(color: Color) -> Self {
        Self {
            background: Some(color),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.foreground.is_none() && self.background.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse_hex("#000000").unwrap(), Color::BLACK);
        assert_eq!(Color::parse_hex("#FFFFFF").unwrap(), Color::WHITE);
        assert_eq!(Color::parse_hex("#abc").unwrap(), Color::rgb(0xaa, 0xbb, 0xcc));
        assert_eq!(
            Color::parse_hex("#11223380").unwrap(),
            Color { r: 0x11, g: 0x22, b: 0x33, a: 0x80 }
        );
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        for bad in ["000000", "#12345", "#GGGGGG", "", "#", "#ffé"] {
            assert!(
                matches!(Color::parse_hex(bad), Err(Error::InvalidColor(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_display_round_trips_through_serde() {
        let color = Color::rgb(255, 165, 0);
        assert_eq!(color.to_string(), "#FFA500");
        assert_eq!(Color { a: 0x80, ..color }.to_string(), "#FFA50080");

        let json = serde_json::to_string(&StyleConfig::default()).unwrap();
        assert_eq!(json, r##"{"size":180,"foreground":"#000000","background":"#FFFFFF"}"##);
    }

    #[test]
    fn test_partial_style_config_uses_defaults() {
        let style: StyleConfig = serde_json::from_str(r##"{"foreground":"#ff0000"}"##).unwrap();
        assert_eq!(style.size, DEFAULT_SIZE);
        assert_eq!(style.foreground, Color::rgb(255, 0, 0));
        assert_eq!(style.background, Color::WHITE);
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let base = StyleConfig::default();
        let patched = base.apply(&StylePatch::size(300)).unwrap();
        assert_eq!(patched.size, 300);
        assert_eq!(patched.foreground, base.foreground);
        assert_eq!(patched.background, base.background);
    }

    #[test]
    fn test_apply_rejects_out_of_bounds_size() {
        let base = StyleConfig::default();
        assert!(matches!(base.apply(&StylePatch::size(99)), Err(Error::InvalidSize(99))));
        assert!(matches!(base.apply(&StylePatch::size(501)), Err(Error::InvalidSize(501))));
        assert!(base.apply(&StylePatch::size(MIN_SIZE)).is_ok());
        assert!(base.apply(&StylePatch::size(MAX_SIZE)).is_ok());
    }
}
