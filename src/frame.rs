//! Raw input frame type.

use crate::error::{GifError, Result};

/// Largest canvas dimension a GIF logical screen can describe.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// A flat, row-major 24-bit RGB frame (3 bytes per pixel, no padding).
///
/// This is the input surface supplied by a PNG-decoding collaborator.
#[derive(Debug, Clone)]
pub struct RgbFrame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbFrame {
    /// Wrap a raw RGB buffer, validating dimensions against the buffer size.
    pub fn from_rgb(data: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(GifError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize * 3;
        if data.len() != expected {
            return Err(GifError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGB bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// RGB triple at a flat raster position.
    pub fn pixel(&self, index: usize) -> [u8; 3] {
        let at = index * 3;
        [self.data[at], self.data[at + 1], self.data[at + 2]]
    }
}
