//! Writing rendered codes to disk under their download names.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::encoder::{Encoder, RenderedImage};
use crate::error::Result;
use crate::session::QrSession;

/// Download name of the current code.
pub fn current_file_name() -> &'static str {
    "qrcode.png"
}

/// Download name of the history entry at `index` (0-based display order).
pub fn history_file_name(index: usize) -> String {
    format!("qrcode_{}.png", index + 1)
}

/// Saves PNG bytes as `directory/filename`, creating the directory if needed.
pub fn save_png(image: &RenderedImage, directory: &Path, filename: &str) -> Result<PathBuf> {
    // Check if the directory exists, create it if it doesn't
    if !directory.exists() {
        fs::create_dir_all(directory)?;
    }

    let path = directory.join(filename);
    fs::write(&path, image.png_bytes())?;
    info!(path = %path.display(), bytes = image.png_bytes().len(), "saved QR code");
    Ok(path)
}

/// Saves the current code as `qrcode.png`. Returns `None` when there is no
/// current code.
pub fn export_current<E: Encoder>(session: &QrSession<E>, directory: &Path) -> Result<Option<PathBuf>> {
    session
        .current_image()
        .map(|image| save_png(image, directory, current_file_name()))
        .transpose()
}

/// Saves every history entry as `qrcode_{n}.png`, in display order.
pub fn export_history<E: Encoder>(session: &QrSession<E>, directory: &Path) -> Result<Vec<PathBuf>> {
    session
        .history()
        .iter()
        .enumerate()
        .map(|(index, entry)| save_png(entry.image(), directory, &history_file_name(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(current_file_name(), "qrcode.png");
        assert_eq!(history_file_name(0), "qrcode_1.png");
        assert_eq!(history_file_name(9), "qrcode_10.png");
    }

    #[test]
    fn test_export_current_requires_a_code() {
        let dir = tempfile::tempdir().unwrap();
        let session = QrSession::new();
        assert_eq!(export_current(&session, dir.path()).unwrap(), None);
    }

    #[test]
    fn test_export_current_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");

        let mut session = QrSession::new();
        session.generate("foo").unwrap();
        session.generate("bar").unwrap();
        session.generate("foo").unwrap();

        let current = export_current(&session, &out).unwrap().unwrap();
        assert_eq!(current, out.join("qrcode.png"));
        let written = fs::read(&current).unwrap();
        assert_eq!(written, session.current_image().unwrap().png_bytes());

        let paths = export_history(&session, &out).unwrap();
        assert_eq!(paths, [out.join("qrcode_1.png"), out.join("qrcode_2.png")]);
        let decoded = image::open(&paths[1]).unwrap();
        assert_eq!(decoded.width(), 180);
    }
}
