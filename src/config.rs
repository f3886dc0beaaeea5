use std::path::PathBuf;

use serde::Deserialize;

use crate::encoder::ErrorCorrection;
use crate::style::StyleConfig;

/// Defaults a new session starts from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial style; edits during the session replace it.
    pub style: StyleConfig,
    pub error_correction: ErrorCorrection,
    /// Directory PNG exports are written to.
    pub out_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            error_correction: ErrorCorrection::default(),
            out_dir: PathBuf::from("."),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> crate::Result<()> {
        self.style.validate()
    }
}
