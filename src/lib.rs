//! # qrsession
//!
//! A Rust library for running QR code generation sessions.
//!
//! A [`QrSession`] turns text into a styled QR image, keeps the current code
//! on display, and remembers every distinct text generated during the session.
//! Symbols are built with the `qrcode` crate and painted with `image`.
//!
//! ## Features
//!
//! - Render text as a PNG QR code of a chosen size (100 to 500 pixels) and colors.
//! - Deduplicated, append-only session history.
//! - Re-render the current code automatically while the customization panel is open.
//! - Export the current code as `qrcode.png` and history entries as `qrcode_{n}.png`.
//! - SVG strings, console output and `data:` URLs for other surfaces.
//!
//! ## Example
//!
//! ```rust
//! use qrsession::{QrSession, StylePatch};
//!
//! let mut session = QrSession::new();
//! session.generate("https://example.com").unwrap();
//!
//! session.toggle_customization();
//! session.update_style(StylePatch::size(300)).unwrap();
//!
//! assert_eq!(session.history().len(), 1);
//! assert_eq!(session.current_image().unwrap().width(), 300);
//! ```
//!
//! ## Modules
//!
//! - [`session`]: The session controller and its state.
//! - [`style`]: Colors and style configuration.
//! - [`encoder`]: The encoder seam and the default QR encoder.
//! - [`helper`]: Utilities for rendering QR codes in various formats.
//! - [`export`]: Saving codes under their download names.
//! - [`config`]: Session defaults.

pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod helper;
pub mod session;
pub mod style;

pub use config::SessionConfig;
pub use encoder::{EncodeOptions, Encoder, ErrorCorrection, QrEncoder, QrMatrix, RenderedImage};
pub use error::{Error, Result};
pub use session::{Generation, HistoryEntry, Phase, QrSession, SessionState};
pub use style::{Color, StyleConfig, StylePatch};
