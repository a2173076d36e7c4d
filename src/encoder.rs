//! Per-frame raster encoding pipeline.
//!
//! Ties the stages together: unique-color collapse, quantization (median cut
//! or fixed palette), optional dithering, inter-frame transparency, and LZW
//! compression into the packed byte stream handed to a GIF container writer.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dither;
use crate::error::{GifError, Result};
use crate::frame::RgbFrame;
use crate::lzw;
use crate::palette::{Palette, PaletteVariant, MAX_TABLE_BITS};
use crate::pixels::UniqueColors;
use crate::quantize::{auto_table_bits, force_black_white, median_cut};

/// Raster encoder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Palette selection strategy.
    pub palette: PaletteVariant,
    /// Color table bit size (1-8). `None` picks the smallest table that
    /// holds the frame's unique colors; fixed variants carry their own size.
    pub table_bits: Option<u8>,
    /// Enable Floyd-Steinberg dithering.
    pub dither: bool,
    /// Force exact black and white into computed palettes.
    pub force_black_white: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            palette: PaletteVariant::MedianCut,
            table_bits: None,
            dither: false,
            force_black_white: false,
        }
    }
}

/// One encoded frame: the collaborator surface for a GIF container writer,
/// which owns sub-block chunking and the surrounding container structure.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Color table, exactly `2^table_bits` RGB triples.
    pub palette: Vec<[u8; 3]>,
    /// Reserved transparent slot, when the palette variant defines one.
    pub transparent_index: Option<u8>,
    /// Color table bit size.
    pub table_bits: u8,
    /// The LZW-minimum-code-size byte preceding the image data.
    pub min_code_size: u8,
    /// Packed LZW byte stream (pre-sub-blocking).
    pub data: Vec<u8>,
    /// Final per-pixel palette indices, kept for inspection and for
    /// callers correlating frames.
    pub indices: Vec<u8>,
}

/// GIF raster encoder.
#[derive(Debug, Clone, Default)]
pub struct RasterEncoder {
    config: EncoderConfig,
}

impl RasterEncoder {
    /// Create an encoder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with a custom configuration.
    pub fn with_config(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Set the palette variant.
    pub fn palette(mut self, variant: PaletteVariant) -> Self {
        self.config.palette = variant;
        self
    }

    /// Set an explicit color table bit size.
    pub fn table_bits(mut self, bits: u8) -> Self {
        self.config.table_bits = Some(bits);
        self
    }

    /// Enable or disable dithering.
    pub fn dither(mut self, enable: bool) -> Self {
        self.config.dither = enable;
        self
    }

    /// Enable or disable forcing exact black/white palette slots.
    pub fn force_black_white(mut self, enable: bool) -> Self {
        self.config.force_black_white = enable;
        self
    }

    /// Encode one frame.
    ///
    /// `previous` is the raw buffer of the immediately preceding frame in a
    /// sequence; when the palette variant reserves a transparent slot,
    /// pixels unchanged since `previous` are replaced with it.
    pub fn encode_frame(
        &self,
        frame: &RgbFrame,
        previous: Option<&RgbFrame>,
    ) -> Result<EncodedFrame> {
        if let Some(prev) = previous {
            if prev.width() != frame.width() || prev.height() != frame.height() {
                return Err(GifError::InvalidDimensions {
                    width: prev.width(),
                    height: prev.height(),
                });
            }
        }

        let mut unique = UniqueColors::build(frame);
        debug!(
            width = frame.width(),
            height = frame.height(),
            unique = unique.len(),
            "collapsed frame"
        );

        let (mut palette, table_bits) = self.build_palette(&mut unique)?;

        if self.config.force_black_white
            && (self.config.palette == PaletteVariant::MedianCut
                || self.config.palette.is_grayscale())
        {
            force_black_white(&mut palette);
        }

        let mut indices = if self.config.dither {
            dither::dither(frame, &palette)
        } else {
            unique.index_map()
        };

        if let (Some(transparent), Some(prev)) = (palette.transparent_index(), previous) {
            apply_transparency(&mut indices, frame, prev, transparent);
        }

        // GIF requires a minimum code size of at least 2 even for tiny
        // tables, which also keeps the start width at the 3-bit floor.
        let min_code_size = table_bits.max(2);
        let data = lzw::compress(&indices, min_code_size)?;
        debug!(
            table_bits,
            packed = data.len(),
            "encoded frame"
        );

        Ok(EncodedFrame {
            palette: palette.colors().to_vec(),
            transparent_index: palette.transparent_index(),
            table_bits,
            min_code_size,
            data,
            indices,
        })
    }

    /// Resolve the palette and table size for one frame, assigning each
    /// unique color its palette slot.
    fn build_palette(&self, unique: &mut UniqueColors) -> Result<(Palette, u8)> {
        if let Some(bits) = self.config.table_bits {
            if bits > MAX_TABLE_BITS {
                return Err(GifError::PaletteOverflow {
                    colors: 1usize << bits,
                    capacity: 1usize << MAX_TABLE_BITS,
                });
            }
            if bits == 0 {
                return Err(GifError::UnsupportedTableBits { bits });
            }
        }

        match self.config.palette {
            PaletteVariant::MedianCut => {
                let bits = self
                    .config
                    .table_bits
                    .unwrap_or_else(|| auto_table_bits(unique.len()));
                Ok((median_cut(unique, bits), bits))
            }
            variant => {
                let bits = variant
                    .table_bits()
                    .expect("fixed variants define a table size");
                let palette = variant.fixed_palette();
                for entry in &mut unique.entries {
                    entry.color_index = palette.nearest(entry.rgb());
                }
                Ok((palette, bits))
            }
        }
    }
}

/// Substitute the transparent slot for pixels identical to the previous
/// frame's co-located raw color.
fn apply_transparency(indices: &mut [u8], frame: &RgbFrame, previous: &RgbFrame, slot: u8) {
    for (i, index) in indices.iter_mut().enumerate() {
        if frame.pixel(i) == previous.pixel(i) {
            *index = slot;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(pixels: &[[u8; 3]], width: u32) -> RgbFrame {
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        let height = pixels.len() as u32 / width;
        RgbFrame::from_rgb(data, width, height).unwrap()
    }

    #[test]
    fn test_encode_two_color_frame() {
        let frame = frame_of(
            &[[0, 0, 0], [255, 255, 255], [255, 255, 255], [0, 0, 0]],
            2,
        );
        let out = RasterEncoder::new().encode_frame(&frame, None).unwrap();
        assert_eq!(out.table_bits, 1);
        assert_eq!(out.min_code_size, 2);
        assert_eq!(out.palette.len(), 2);
        assert_eq!(out.indices, vec![0, 1, 1, 0]);
        assert!(!out.data.is_empty());
    }

    #[test]
    fn test_palette_is_padded_to_power_of_two() {
        let frame = frame_of(&[[1, 0, 0], [2, 0, 0], [3, 0, 0]], 3);
        let out = RasterEncoder::new().encode_frame(&frame, None).unwrap();
        assert_eq!(out.table_bits, 2);
        assert_eq!(out.palette.len(), 4);
    }

    #[test]
    fn test_dither_off_equals_nearest_classification() {
        let frame = frame_of(
            &[[10, 20, 30], [200, 100, 50], [10, 20, 30], [90, 90, 90]],
            2,
        );
        let config = EncoderConfig {
            palette: PaletteVariant::Web216,
            ..Default::default()
        };
        let out = RasterEncoder::with_config(config)
            .encode_frame(&frame, None)
            .unwrap();
        let palette = PaletteVariant::Web216.fixed_palette();
        for i in 0..frame.pixel_count() {
            assert_eq!(out.indices[i], palette.nearest(frame.pixel(i)));
        }
    }

    #[test]
    fn test_transparency_substitution() {
        let prev = frame_of(&[[10, 10, 10], [50, 60, 70], [0, 0, 0], [9, 9, 9]], 2);
        let frame = frame_of(&[[10, 10, 10], [51, 60, 70], [0, 0, 0], [8, 9, 9]], 2);
        let config = EncoderConfig {
            palette: PaletteVariant::Rgb685,
            ..Default::default()
        };
        let out = RasterEncoder::with_config(config)
            .encode_frame(&frame, Some(&prev))
            .unwrap();
        assert_eq!(out.transparent_index, Some(255));
        assert_eq!(out.indices[0], 255);
        assert_ne!(out.indices[1], 255);
        assert_eq!(out.indices[2], 255);
        assert_ne!(out.indices[3], 255);
    }

    #[test]
    fn test_first_frame_has_no_transparency() {
        let frame = frame_of(&[[10, 10, 10], [50, 60, 70]], 2);
        let config = EncoderConfig {
            palette: PaletteVariant::Rgb685,
            ..Default::default()
        };
        let out = RasterEncoder::with_config(config)
            .encode_frame(&frame, None)
            .unwrap();
        assert!(out.indices.iter().all(|&i| i != 255));
    }

    #[test]
    fn test_mismatched_previous_frame_rejected() {
        let frame = frame_of(&[[1, 2, 3], [4, 5, 6]], 2);
        let prev = frame_of(&[[1, 2, 3]], 1);
        let err = RasterEncoder::new()
            .palette(PaletteVariant::Rgb685)
            .encode_frame(&frame, Some(&prev))
            .unwrap_err();
        assert!(matches!(err, GifError::InvalidDimensions { .. }));
    }

    #[test]
    fn test_oversized_table_bits_rejected() {
        let frame = frame_of(&[[1, 2, 3]], 1);
        let err = RasterEncoder::new()
            .table_bits(9)
            .encode_frame(&frame, None)
            .unwrap_err();
        assert!(matches!(err, GifError::PaletteOverflow { .. }));
    }

    #[test]
    fn test_force_black_white_snaps_palette() {
        let frame = frame_of(&[[3, 3, 3], [250, 250, 250], [3, 3, 3], [250, 250, 250]], 2);
        let out = RasterEncoder::new()
            .force_black_white(true)
            .encode_frame(&frame, None)
            .unwrap();
        assert!(out.palette.contains(&[0, 0, 0]));
        assert!(out.palette.contains(&[255, 255, 255]));
    }

    #[test]
    fn test_gray16_uses_four_table_bits() {
        let frame = frame_of(&[[0, 0, 0], [128, 128, 128], [255, 255, 255]], 3);
        let out = RasterEncoder::new()
            .palette(PaletteVariant::Gray16)
            .encode_frame(&frame, None)
            .unwrap();
        assert_eq!(out.table_bits, 4);
        assert_eq!(out.min_code_size, 4);
        assert_eq!(out.palette.len(), 16);
        assert_eq!(out.indices, vec![0, 8, 15]);
    }
}
