//! QR generation session: current code, style and deduplicated history.
//!
//! ```text
//!            generate            toggle_customization
//!   Empty ─────────────▶ Generated ◀──────────────▶ Customizing ─┐
//!     ▲                      │                          │  ▲     │ update_style
//!     └──────── clear ───────┴──────────────────────────┘  └─────┘ (regenerates)
//! ```

use tracing::{debug, warn};

use crate::config::SessionConfig;
use crate::encoder::{EncodeOptions, Encoder, QrEncoder, RenderedImage};
use crate::error::Result;
use crate::style::{StyleConfig, StylePatch};

/// A generated code kept in the session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    text: String,
    image: RenderedImage,
}

impl HistoryEntry {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The image captured the first time this text was generated.
    pub fn image(&self) -> &RenderedImage {
        &self.image
    }
}

/// Everything the session displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current_text: String,
    pub current_image: Option<RenderedImage>,
    pub history: Vec<HistoryEntry>,
    pub style: StyleConfig,
    pub customization_visible: bool,
}

/// Where the session is in its lifecycle, derived from [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Generated,
    Customizing,
}

/// Outcome of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Blank text; nothing happened.
    Skipped,
    /// New text; a history entry was appended.
    Created,
    /// Text already in history; only the current image changed.
    Refreshed,
}

/// Owns a [`SessionState`] and applies user actions to it.
#[derive(Debug)]
pub struct QrSession<E = QrEncoder> {
    encoder: E,
    state: SessionState,
}

impl QrSession<QrEncoder> {
    pub fn new() -> Self {
        Self::from_config(&SessionConfig::default())
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        let mut session = Self::with_encoder(QrEncoder::new(config.error_correction));
        session.state.style = config.style;
        session
    }
}

impl Default for QrSession<QrEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoder> QrSession<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self {
            encoder,
            state: SessionState::default(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn style(&self) -> &StyleConfig {
        &self.state.style
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.state.history
    }

    pub fn current_text(&self) -> &str {
        &self.state.current_text
    }

    pub fn current_image(&self) -> Option<&RenderedImage> {
        self.state.current_image.as_ref()
    }

    pub fn is_customizing(&self) -> bool {
        self.state.customization_visible
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn phase(&self) -> Phase {
        match (&self.state.current_image, self.state.customization_visible) {
            (None, _) => Phase::Empty,
            (Some(_), false) => Phase::Generated,
            (Some(_), true) => Phase::Customizing,
        }
    }

    /// Renders `text` with the current style and makes it the current code.
    ///
    /// Blank text is ignored. A text already in the history only replaces
    /// the current image; the stored entry keeps its first image. If the
    /// encoder fails the state is left untouched and the error is returned.
    pub fn generate(&mut self, text: &str) -> Result<Generation> {
        if text.trim().is_empty() {
            return Ok(Generation::Skipped);
        }

        let options = EncodeOptions::from(&self.state.style);
        let image = match self.encoder.encode(text, &options) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, len = text.len(), "failed to generate QR code");
                return Err(err);
            }
        };

        let outcome = if self.state.history.iter().any(|entry| entry.text == text) {
            debug!(text, "text already in history, refreshing current image");
            Generation::Refreshed
        } else {
            self.state.history.push(HistoryEntry {
                text: text.to_string(),
                image: image.clone(),
            });
            debug!(text, history = self.state.history.len(), "added QR code to history");
            Generation::Created
        };

        self.state.current_text = text.to_string();
        self.state.current_image = Some(image);
        Ok(outcome)
    }

    /// The generate button: closes the customization panel, then generates.
    pub fn submit(&mut self, text: &str) -> Result<Generation> {
        self.state.customization_visible = false;
        self.generate(text)
    }

    /// Merges `patch` into the style. While customizing an existing code,
    /// the current text is regenerated with the new style.
    ///
    /// An invalid patch changes nothing. A failed regeneration keeps the
    /// new style and the previous image.
    pub fn update_style(&mut self, patch: StylePatch) -> Result<Option<Generation>> {
        self.state.style = self.state.style.apply(&patch)?;
        debug!(style = ?self.state.style, "style updated");

        if self.state.customization_visible && self.state.current_image.is_some() {
            let text = self.state.current_text.clone();
            return self.generate(&text).map(Some);
        }
        Ok(None)
    }

    /// Shows or hides the customization panel and returns whether it is
    /// now visible. It cannot be shown before a code has been generated.
    pub fn toggle_customization(&mut self) -> bool {
        self.state.customization_visible =
            !self.state.customization_visible && self.state.current_image.is_some();
        self.state.customization_visible
    }

    /// Drops the current code. History is kept for the whole session.
    pub fn clear(&mut self) {
        self.state.current_text.clear();
        self.state.current_image = None;
        self.state.customization_visible = false;
    }
}
