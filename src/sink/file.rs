//! Still-image sink, used when no framebuffer device is configured

use std::io::Cursor;
use std::path::PathBuf;
use tracing::info;

use super::FrameSink;
use crate::error::{DisplayError, Result};
use crate::metadata::DisplayPair;
use crate::render::Frame;

const PLACEHOLDER: &str = "unknown";

/// Writes one PNG per update, named after the artist and title
#[derive(Debug)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Destination for `pair`: `<artist>-<title>.png`
    pub fn path_for(&self, pair: &DisplayPair) -> PathBuf {
        self.dir.join(file_name(pair))
    }
}

impl FrameSink for FileSink {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn write(&mut self, frame: &Frame, pair: &DisplayPair) -> Result<()> {
        let mut png = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut png,
            frame.as_bytes(),
            frame.width(),
            frame.height(),
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )?;

        let path = self.path_for(pair);
        std::fs::write(&path, png.into_inner())
            .map_err(|source| DisplayError::ImageWrite {
                path: path.clone(),
                source,
            })?;

        info!("Saved {}", path.display());
        Ok(())
    }

    fn close(&mut self) {}
}

fn file_name(pair: &DisplayPair) -> String {
    format!(
        "{}-{}.png",
        name_part(pair.artist.as_deref()),
        name_part(pair.title.as_deref())
    )
}

/// Field text with path separators neutralised, or the placeholder
fn name_part(field: Option<&str>) -> String {
    match field {
        Some(text) if !text.is_empty() => text
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
            .collect(),
        _ => PLACEHOLDER.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair(artist: Option<&str>, title: Option<&str>) -> DisplayPair {
        DisplayPair::new(artist.map(String::from), title.map(String::from))
    }

    #[test]
    fn test_file_names() {
        assert_eq!(file_name(&pair(Some("A"), Some("T"))), "A-T.png");
        assert_eq!(file_name(&pair(Some("A"), None)), "A-unknown.png");
        assert_eq!(file_name(&pair(None, Some(""))), "unknown-unknown.png");
        assert_eq!(file_name(&pair(Some("AC/DC"), Some("a\\b"))), "AC_DC-a_b.png");
    }

    #[test]
    fn test_write_png() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::new(dir.path());
        sink.open().unwrap();

        let frame = Frame::from_rgba(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap();
        let p = pair(Some("Artist"), None);
        sink.write(&frame, &p).unwrap();
        sink.close();

        let img = image::open(dir.path().join("Artist-unknown.png"))
            .unwrap()
            .to_rgba8();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let mut sink = FileSink::new("/nonexistent/output");
        let frame = Frame::from_rgba(1, 1, vec![0; 4]).unwrap();
        let err = sink.write(&frame, &DisplayPair::default()).unwrap_err();
        assert!(matches!(err, DisplayError::ImageWrite { .. }));
    }
}
