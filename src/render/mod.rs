//! Now-playing renderer
//!
//! Owns the canvas and the last drawn pair. A pair equal to the last one drawn is
//! skipped; anything else clears the canvas and redraws both lines.

pub mod font;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::convert::BYTES_PER_PIXEL;
use crate::error::{DisplayError, Result};
use crate::metadata::DisplayPair;

pub use font::{FontPainter, TextPainter, TextStyle};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const FOREGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

const ARTIST_SIZE: f32 = 70.0;
const ARTIST_BASELINE: f32 = 120.0;
const TITLE_SIZE: f32 = 40.0;
const TITLE_BASELINE: f32 = 40.0;

/// One full RGBA frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Wrap raw RGBA pixels, checking the length against the dimensions
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(DisplayError::FrameSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { width, height, data })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// What is currently on the canvas
#[derive(Debug, Default)]
struct RenderState {
    previous_artist: Option<String>,
    previous_title: Option<String>,
    /// Set when the last frame never reached the output; forces the next redraw
    stale: bool,
}

pub struct Renderer {
    canvas: RgbaImage,
    painter: Box<dyn TextPainter>,
    state: RenderState,
}

impl Renderer {
    pub fn new(width: u32, height: u32, painter: Box<dyn TextPainter>) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(width, height, BACKGROUND),
            painter,
            state: RenderState::default(),
        }
    }

    /// Redraw for `pair` if it differs from what is shown
    ///
    /// `None` means no update is needed.
    pub fn render(&mut self, pair: &DisplayPair) -> Option<Frame> {
        if !self.state.stale
            && pair.artist == self.state.previous_artist
            && pair.title == self.state.previous_title
        {
            debug!("Metadata unchanged, skipping redraw");
            return None;
        }

        self.draw(pair);

        self.state = RenderState {
            previous_artist: pair.artist.clone(),
            previous_title: pair.title.clone(),
            stale: false,
        };

        Some(Frame {
            width: self.canvas.width(),
            height: self.canvas.height(),
            data: self.canvas.as_raw().clone(),
        })
    }

    /// Forget what was drawn so the next pair is always redrawn
    pub fn invalidate(&mut self) {
        self.state.stale = true;
    }

    fn draw(&mut self, pair: &DisplayPair) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = BACKGROUND;
        }

        let center_x = self.canvas.width() as f32 / 2.0;
        let max_width = self.canvas.width() as f32;

        if let Some(artist) = pair.artist.as_deref() {
            self.draw_line(
                artist,
                TextStyle {
                    size: ARTIST_SIZE,
                    center_x,
                    baseline_y: ARTIST_BASELINE,
                    max_width,
                    color: FOREGROUND,
                },
            );
        }
        if let Some(title) = pair.title.as_deref() {
            self.draw_line(
                title,
                TextStyle {
                    size: TITLE_SIZE,
                    center_x,
                    baseline_y: TITLE_BASELINE,
                    max_width,
                    color: FOREGROUND,
                },
            );
        }
    }

    fn draw_line(&mut self, text: &str, style: TextStyle) {
        let text = clean_text(text);
        if text.is_empty() {
            return;
        }
        self.painter.draw_centered(&mut self.canvas, &text, &style);
    }
}

/// Strip one trailing parenthesised suffix and surrounding whitespace
///
/// `"Imagine (Remastered 2021)"` becomes `"Imagine"`.
pub fn clean_text(text: &str) -> String {
    let trimmed = text.trim_end();
    let Some(body) = trimmed.strip_suffix(')') else {
        return text.trim().to_string();
    };

    // The suffix may not contain ')' itself, so it starts at the first '(' after
    // the last ')' in the body
    let search_from = body.rfind(')').map_or(0, |i| i + 1);
    match body[search_from..].find('(') {
        Some(open) => body[..search_from + open].trim().to_string(),
        None => text.trim().to_string(),
    }
}
