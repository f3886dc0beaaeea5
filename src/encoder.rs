//! Turning text into a rendered QR image.
//!
//! The session controller only talks to the [`Encoder`] trait. [`QrEncoder`]
//! is the default implementation: the `qrcode` crate builds the symbol and
//! the [`helper`](crate::helper) functions paint it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use qrcode::{EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::helper;
use crate::style::{Color, StyleConfig};

/// Error correction level of the generated symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    #[default]
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl ErrorCorrection {
    fn ec_level(self) -> EcLevel {
        match self {
            ErrorCorrection::Low => EcLevel::L,
            ErrorCorrection::Medium => EcLevel::M,
            ErrorCorrection::Quartile => EcLevel::Q,
            ErrorCorrection::High => EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "low" => Ok(ErrorCorrection::Low),
            "m" | "medium" => Ok(ErrorCorrection::Medium),
            "q" | "quartile" => Ok(ErrorCorrection::Quartile),
            "h" | "high" => Ok(ErrorCorrection::High),
            _ => Err(Error::InvalidErrorCorrection(s.to_string())),
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            ErrorCorrection::Low => "L",
            ErrorCorrection::Medium => "M",
            ErrorCorrection::Quartile => "Q",
            ErrorCorrection::High => "H",
        };
        f.write_str(letter)
    }
}

/// Render options handed to an [`Encoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Requested image width in pixels.
    pub width: u32,
    pub color_dark: Color,
    pub color_light: Color,
}

impl From<&StyleConfig> for EncodeOptions {
    fn from(style: &StyleConfig) -> Self {
        Self {
            width: style.size,
            color_dark: style.foreground,
            color_light: style.background,
        }
    }
}

/// A square grid of dark and light modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl QrMatrix {
    /// Encodes `text` as UTF-8 bytes at the given error correction level.
    pub fn encode(text: &str, error_correction: ErrorCorrection) -> Result<Self> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), error_correction.ec_level())
            .map_err(Error::encoding)?;
        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect();
        Ok(Self {
            width: code.width(),
            modules,
        })
    }

    /// Number of modules along one side (21 for version 1, 177 for version 40).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns whether the module at (x, y) is dark. Coordinates outside
    /// the symbol are light.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.width as i32;
        range.contains(&x)
            && range.contains(&y)
            && self.modules[y as usize * self.width + x as usize]
    }
}

/// A PNG-encoded QR image. Cloning shares the underlying bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RenderedImage {
    width: u32,
    height: u32,
    png: Arc<[u8]>,
}

impl RenderedImage {
    pub fn new(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self {
            width,
            height,
            png: png.into(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    /// A `data:image/png;base64,...` URL for embedding the image.
    pub fn to_data_url(&self) -> String {
        helper::to_data_url(&self.png)
    }
}

impl fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_len", &self.png.len())
            .finish()
    }
}

/// Produces a rendered QR image from text.
pub trait Encoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<RenderedImage>;
}

/// The default [`Encoder`], backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrEncoder {
    pub error_correction: ErrorCorrection,
}

impl QrEncoder {
    pub fn new(error_correction: ErrorCorrection) -> Self {
        Self { error_correction }
    }
}

impl Encoder for QrEncoder {
    fn encode(&self, text: &str, options: &EncodeOptions) -> Result<RenderedImage> {
        let matrix = QrMatrix::encode(text, self.error_correction)?;
        let img = helper::render_rgba(&matrix, options);
        let (width, height) = img.dimensions();
        let png = helper::to_png_bytes(&img)?;
        debug!(
            modules = matrix.width(),
            width,
            ecc = %self.error_correction,
            bytes = png.len(),
            "encoded QR code"
        );
        Ok(RenderedImage::new(width, height, png))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_width_for_short_text() {
        let matrix = QrMatrix::encode("Hello, world!", ErrorCorrection::Low).unwrap();
        // "Hello, world!" fits in version 1 at the low level.
        assert_eq!(matrix.width(), 21);
        // Top-left finder pattern corner is dark, outside the symbol is light.
        assert!(matrix.get_module(0, 0));
        assert!(!matrix.get_module(-1, 0));
        assert!(!matrix.get_module(21, 21));
    }

    #[test]
    fn test_error_correction_parse() {
        assert_eq!("L".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Low);
        assert_eq!("quartile".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::Quartile);
        assert_eq!(" h ".parse::<ErrorCorrection>().unwrap(), ErrorCorrection::High);
        assert!(matches!(
            "x".parse::<ErrorCorrection>(),
            Err(Error::InvalidErrorCorrection(_))
        ));
        assert_eq!(ErrorCorrection::default().to_string(), "M");
    }

    #[test]
    fn test_encoder_produces_requested_width() {
        let options = EncodeOptions::from(&StyleConfig::default());
        let rendered = QrEncoder::default().encode("https://example.com", &options).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (180, 180));

        let decoded = image::load_from_memory(rendered.png_bytes()).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (180, 180));
    }

    #[test]
    fn test_encoder_rejects_oversized_text() {
        let text = "x".repeat(4000);
        let options = EncodeOptions::from(&StyleConfig::default());
        let err = QrEncoder::default().encode(&text, &options).unwrap_err();
        assert!(matches!(err, Error::Encoding(_)));
    }

    #[test]
    fn test_data_url_prefix() {
        let options = EncodeOptions::from(&StyleConfig::default());
        let image = QrEncoder::default().encode("abc", &options).unwrap();
        assert!(image.to_data_url().starts_with("data:image/png;base64,"));
    }
}
