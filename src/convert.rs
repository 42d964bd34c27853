//! Pixel format conversion
//!
//! The canvas produces RGBA (R, G, B, pad). Linux framebuffers in 32bpp mode expect
//! little-endian XRGB, i.e. bytes B, G, R, 0.

use crate::error::{DisplayError, Result};

/// Bytes per pixel for both layouts
pub const BYTES_PER_PIXEL: usize = 4;

/// Convert an RGBA buffer into the device's native B, G, R, 0 layout
///
/// The source alpha/pad byte is discarded; the destination pad byte is always zero.
pub fn rgba_to_native(src: &[u8]) -> Result<Vec<u8>> {
    if src.len() % BYTES_PER_PIXEL != 0 {
        return Err(DisplayError::MalformedBuffer { len: src.len() });
    }

    let mut dst = vec![0u8; src.len()];
    for (out, px) in dst
        .chunks_exact_mut(BYTES_PER_PIXEL)
        .zip(src.chunks_exact(BYTES_PER_PIXEL))
    {
        out[0] = px[2];
        out[1] = px[1];
        out[2] = px[0];
        out[3] = 0;
    }
    Ok(dst)
}
