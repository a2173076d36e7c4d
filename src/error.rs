//! Encoder error types.

use thiserror::Error;

/// GIF raster-encoding errors.
///
/// All failures are deterministic for a given input; callers should treat
/// them as fatal rather than retrying.
#[derive(Error, Debug)]
pub enum GifError {
    /// Frame dimensions are unusable (zero, or beyond the GIF canvas limit).
    #[error("Invalid frame dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },

    /// The requested or required color table cannot be represented.
    #[error("Palette overflow: {colors} colors exceed a {capacity}-entry table")]
    PaletteOverflow {
        /// Number of colors that were required.
        colors: usize,
        /// Capacity of the largest allowed table.
        capacity: usize,
    },

    /// Requested table-bit size is outside the supported 1-8 range.
    #[error("Unsupported color table size: {bits} bits")]
    UnsupportedTableBits {
        /// The rejected bit size.
        bits: u8,
    },

    /// The LZW encoder made no progress on a non-empty input.
    ///
    /// Single-symbol codes always exist, so this is unreachable by
    /// construction and indicates an internal invariant violation.
    #[error("LZW encoder stalled with {remaining} symbols unconsumed")]
    EncoderStall {
        /// Symbols left unconsumed when the stall was detected.
        remaining: usize,
    },
}

/// Encoder result type.
pub type Result<T> = std::result::Result<T, GifError>;
