use thiserror::Error;

/// Errors produced while styling, encoding or exporting QR codes.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder rejected the text or the render options.
    #[error("QR encoding failed: {0}")]
    Encoding(String),

    #[error("invalid color {0:?}, expected #RGB, #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("invalid size {0}, must be between {min} and {max} pixels", min = crate::style::MIN_SIZE, max = crate::style::MAX_SIZE)]
    InvalidSize(u32),

    #[error("invalid error correction level {0:?}, expected L, M, Q or H")]
    InvalidErrorCorrection(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn encoding(reason: impl std::fmt::Display) -> Self {
        Self::Encoding(reason.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
