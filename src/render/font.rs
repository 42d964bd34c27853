//! Text rasterization
//!
//! `TextPainter` is the seam between the renderer and the glyph rasterizer.
//! `FontPainter` is the real implementation backed by fontdue.

use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{DisplayError, Result};

/// System bold CJK font (Debian/Raspberry Pi OS `fonts-noto-cjk`)
pub const SYSTEM_FONT: &str = "/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc";

/// Per-user fallback, relative to the home directory (macOS dev machines)
pub const USER_FONT: &str = "Library/Fonts/NotoSansJP-Bold.ttf";

/// Placement of one line of text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Nominal pixel size
    pub size: f32,
    /// Horizontal centre of the line
    pub center_x: f32,
    /// Baseline position
    pub baseline_y: f32,
    /// Lines wider than this are scaled down to fit
    pub max_width: f32,
    pub color: Rgba<u8>,
}

/// Draws a single centred line of text onto the canvas
pub trait TextPainter: Send {
    fn draw_centered(&self, canvas: &mut RgbaImage, text: &str, style: &TextStyle);
}

/// fontdue-backed painter
pub struct FontPainter {
    font: Font,
}

impl FontPainter {
    /// Load the configured font, or the first fallback that exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidates = match path {
            Some(path) => vec![path.to_path_buf()],
            None => fallback_fonts(),
        };

        let source = candidates
            .iter()
            .find(|p| p.exists())
            .cloned()
            .ok_or_else(|| {
                DisplayError::FontLoad(format!("no font file found (tried {:?})", candidates))
            })?;

        let bytes = std::fs::read(&source)
            .map_err(|e| DisplayError::FontLoad(format!("{}: {}", source.display(), e)))?;
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| DisplayError::FontLoad(format!("{}: {}", source.display(), e)))?;

        info!("Loaded font: {}", source.display());
        Ok(Self { font })
    }

    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars()
            .map(|c| self.font.metrics(c, size).advance_width)
            .sum()
    }
}

impl TextPainter for FontPainter {
    fn draw_centered(&self, canvas: &mut RgbaImage, text: &str, style: &TextStyle) {
        let mut size = style.size;
        let mut width = self.measure(text, size);

        if width > style.max_width && width > 0.0 {
            size *= style.max_width / width;
            width = self.measure(text, size);
            debug!("Scaled '{}' down to {:.1}px to fit", text, size);
        }

        let mut pen_x = style.center_x - width / 2.0;
        for c in text.chars() {
            let (metrics, coverage) = self.font.rasterize(c, size);
            let left = pen_x.round() as i32 + metrics.xmin;
            let top = style.baseline_y.round() as i32 - (metrics.height as i32 + metrics.ymin);

            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let alpha = coverage[row * metrics.width + col];
                    if alpha == 0 {
                        continue;
                    }
                    let x = left + col as i32;
                    let y = top + row as i32;
                    if x < 0 || y < 0 || x as u32 >= canvas.width() || y as u32 >= canvas.height() {
                        continue;
                    }
                    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                    *pixel = blend(style.color, *pixel, alpha);
                }
            }

            pen_x += metrics.advance_width;
        }
    }
}

fn fallback_fonts() -> Vec<PathBuf> {
    let mut fonts = vec![PathBuf::from(SYSTEM_FONT)];
    if let Some(home) = dirs::home_dir() {
        fonts.push(home.join(USER_FONT));
    }
    fonts
}

/// Blend foreground over background with glyph coverage
fn blend(fg: Rgba<u8>, bg: Rgba<u8>, alpha: u8) -> Rgba<u8> {
    let a = alpha as u32;
    let inv = 255 - a;
    let mix = |f: u8, b: u8| ((f as u32 * a + b as u32 * inv) / 255) as u8;
    Rgba([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2]), 255])
}
