//! Now-playing display
//!
//! Pairs artist/title metadata events, renders them as two centred lines of
//! text, and pushes the frame to a framebuffer device or an image file.

pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod pairing;
pub mod render;
pub mod service;
pub mod sink;
pub mod source;

pub use config::{ConfigOverrides, DisplayConfig};
pub use error::{DisplayError, Result};
pub use metadata::{DisplayPair, MetadataEvent};
pub use pairing::{PairingCoordinator, DEFAULT_DEBOUNCE};
pub use render::{Frame, Renderer};
pub use service::NowPlaying;
pub use sink::{FrameSink, OutputSink};
