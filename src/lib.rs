// Allow common patterns in image/DSP code
#![allow(clippy::needless_range_loop)]

//! GIF raster encoding: palettization and LZW compression for the transcode
//! pipeline's GIF output path.
//!
//! This crate turns flat 24-bit RGB frames into the palettized,
//! LZW-compressed byte stream a GIF container embeds:
//!
//! - color quantization (median cut or fixed palettes)
//! - optional Floyd-Steinberg error-diffusion dithering
//! - inter-frame transparency substitution
//! - a self-resetting variable-code-width LZW compressor
//! - LSB-first bit packing with GIF width escalation
//!
//! Container framing (headers, graphic-control blocks, sub-block chunking,
//! trailer) is a collaborator's job; the [`EncodedFrame`] handoff carries
//! everything such a writer needs.
//!
//! ## Example
//!
//! ```no_run
//! use rastergif::{RasterEncoder, RgbFrame, PaletteVariant};
//!
//! # let rgb: Vec<u8> = vec![0; 64 * 64 * 3];
//! let frame = RgbFrame::from_rgb(rgb, 64, 64)?;
//! let encoder = RasterEncoder::new()
//!     .palette(PaletteVariant::MedianCut)
//!     .dither(true);
//! let encoded = encoder.encode_frame(&frame, None)?;
//! // encoded.palette, encoded.min_code_size, encoded.data -> container writer
//! # Ok::<(), rastergif::GifError>(())
//! ```

#![warn(missing_docs)]

mod error;
mod frame;

pub mod bitpack;
pub mod dither;
pub mod encoder;
pub mod lzw;
pub mod palette;
pub mod pixels;
pub mod quantize;

pub use encoder::{EncodedFrame, EncoderConfig, RasterEncoder};
pub use error::{GifError, Result};
pub use frame::{RgbFrame, MAX_DIMENSION};
pub use palette::{Palette, PaletteVariant};
