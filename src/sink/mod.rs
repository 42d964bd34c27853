//! Output sinks for rendered frames
//!
//! The sink is chosen once at startup: a configured device path selects
//! [`DeviceSink`], otherwise frames are saved as images by [`FileSink`].

pub mod device;
pub mod file;

use std::path::Path;

use crate::error::Result;
use crate::metadata::DisplayPair;
use crate::render::Frame;

pub use device::DeviceSink;
pub use file::FileSink;

/// Capabilities shared by every sink
pub trait FrameSink {
    /// Acquire the output resource
    fn open(&mut self) -> Result<()>;

    /// Persist one full frame for `pair`
    fn write(&mut self, frame: &Frame, pair: &DisplayPair) -> Result<()>;

    /// Release the output resource
    fn close(&mut self);
}

/// The sink selected for this process
#[derive(Debug)]
pub enum OutputSink {
    Device(DeviceSink),
    File(FileSink),
}

impl OutputSink {
    /// Pick the sink from configuration; an empty device path counts as absent
    pub fn select(device: Option<&Path>, output_dir: &Path) -> Self {
        match device {
            Some(path) if !path.to_string_lossy().trim().is_empty() => {
                Self::Device(DeviceSink::new(path))
            }
            _ => Self::File(FileSink::new(output_dir)),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Device(_) => "device",
            Self::File(_) => "file",
        }
    }
}

impl FrameSink for OutputSink {
    fn open(&mut self) -> Result<()> {
        match self {
            Self::Device(sink) => sink.open(),
            Self::File(sink) => sink.open(),
        }
    }

    fn write(&mut self, frame: &Frame, pair: &DisplayPair) -> Result<()> {
        match self {
            Self::Device(sink) => sink.write(frame, pair),
            Self::File(sink) => sink.write(frame, pair),
        }
    }

    fn close(&mut self) {
        match self {
            Self::Device(sink) => sink.close(),
            Self::File(sink) => sink.close(),
        }
    }
}
