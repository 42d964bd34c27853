//! Raw framebuffer device sink

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::FrameSink;
use crate::convert::rgba_to_native;
use crate::error::{DisplayError, Result};
use crate::metadata::DisplayPair;
use crate::render::Frame;

/// Writes converted frames at offset 0 of a framebuffer device (e.g. `/dev/fb0`)
#[derive(Debug)]
pub struct DeviceSink {
    path: PathBuf,
    file: Option<File>,
}

impl DeviceSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl FrameSink for DeviceSink {
    fn open(&mut self) -> Result<()> {
        let file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .map_err(|source| DisplayError::DeviceOpen {
                path: self.path.clone(),
                source,
            })?;
        info!("Opened framebuffer device: {}", self.path.display());
        self.file = Some(file);
        Ok(())
    }

    fn write(&mut self, frame: &Frame, _pair: &DisplayPair) -> Result<()> {
        let file = self.file.as_mut().ok_or(DisplayError::DeviceClosed)?;
        let bytes = rgba_to_native(frame.as_bytes())?;
        let written = write_frame(file, &bytes)?;

        debug!("Wrote {} bytes to {}", written, self.path.display());
        Ok(())
    }

    fn close(&mut self) {
        if self.file.take().is_some() {
            info!("Closed framebuffer device: {}", self.path.display());
        }
    }
}

/// Overwrite the frame at offset 0 with one write call
///
/// Partial writes are not retried.
fn write_frame(out: &mut (impl Write + Seek), bytes: &[u8]) -> Result<usize> {
    out.seek(SeekFrom::Start(0))?;
    let written = out.write(bytes)?;
    if written != bytes.len() {
        return Err(DisplayError::ShortWrite {
            written,
            expected: bytes.len(),
        });
    }
    Ok(written)
}
