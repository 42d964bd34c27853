//! Error taxonomy for the display pipeline
//!
//! Startup failures (configuration, device open, font loading) abort the process.
//! Everything else is raised inside the update pipeline, logged, and dropped.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, DisplayError>;

#[derive(Debug, Error)]
pub enum DisplayError {
    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Framebuffer device could not be opened
    #[error("failed to open device {path}: {source}")]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure while writing a frame to the device
    #[error("device write failed: {0}")]
    DeviceWrite(#[from] std::io::Error),

    /// The device accepted fewer bytes than one full frame
    #[error("short write to device: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Write attempted on a device sink that is not open
    #[error("device is not open")]
    DeviceClosed,

    /// Pixel buffer length is not a multiple of 4
    #[error("malformed pixel buffer: length {len} is not a multiple of 4")]
    MalformedBuffer { len: usize },

    /// Frame dimensions do not match the pixel data
    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSize { expected: usize, actual: usize },

    /// Metadata field payload is not valid text
    #[error("invalid {field} payload: not UTF-8 text")]
    InvalidEventPayload { field: &'static str },

    /// PNG encoding failed
    #[error("image encoding failed: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// Encoded image could not be persisted
    #[error("failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No usable font could be loaded
    #[error("failed to load font: {0}")]
    FontLoad(String),
}
