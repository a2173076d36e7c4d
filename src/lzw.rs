//! Self-resetting variable-code-width LZW compression.
//!
//! GIF caps LZW codes at 12 bits, so the dictionary cannot grow unbounded.
//! Instead of pinning a full table, the encoder halts once the table
//! saturates and reports how much input it consumed; the driver emits a
//! clear code and restarts it on the remainder. [`compress`] runs that loop
//! and packs the resulting passes through one persistent [`BitPacker`].

use std::collections::HashMap;

use tracing::trace;

use crate::bitpack::BitPacker;
use crate::error::{GifError, Result};

/// Widest LZW code the GIF bit stream allows.
pub const MAX_CODE_BITS: u8 = 12;

/// Dictionary capacity at the 12-bit cap.
const MAX_DICT_SIZE: u16 = 1 << MAX_CODE_BITS;

/// Where one compression pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwState {
    /// The dictionary saturated at the 12-bit cap; input remains.
    TableFull,
    /// All input was consumed and the pending match was flushed.
    Exhausted,
}

/// Output of one compression pass over a chunk of input.
#[derive(Debug)]
pub struct LzwChunk {
    /// Emitted codes, clear and stop codes excluded.
    pub codes: Vec<u16>,
    /// Input symbols consumed; less than the input length iff the state is
    /// [`LzwState::TableFull`].
    pub consumed: usize,
    /// Code-count offsets (into `codes`) at which the code width grew by
    /// one bit. The bit packer replays these during serialization.
    pub width_jumps: Vec<u32>,
    /// Terminal state of this pass.
    pub state: LzwState,
}

/// One-shot LZW encoder parameterized by the GIF minimum code size.
///
/// Each [`LzwEncoder::encode_chunk`] call starts from a freshly initialized
/// dictionary, mirroring the decoder-side reset a clear code triggers.
#[derive(Debug, Clone, Copy)]
pub struct LzwEncoder {
    min_code_size: u8,
    clear_code: u16,
}

impl LzwEncoder {
    /// Create an encoder for `min_code_size` root bits (2-8 for GIF).
    pub fn new(min_code_size: u8) -> Self {
        debug_assert!((2..=8).contains(&min_code_size));
        Self {
            min_code_size,
            clear_code: 1 << min_code_size,
        }
    }

    /// The dictionary-reset code for this table size.
    pub fn clear_code(&self) -> u16 {
        self.clear_code
    }

    /// The end-of-information code for this table size.
    pub fn stop_code(&self) -> u16 {
        self.clear_code + 1
    }

    /// Initial code width: one bit above the minimum code size, never
    /// below 3.
    pub fn start_bits(&self) -> u8 {
        (self.min_code_size + 1).max(3)
    }

    /// Compress one chunk of symbols until input or table space runs out.
    ///
    /// Width grows by one bit immediately after the insertion that fills the
    /// current width, recording the emitted-code offset of the jump. Once
    /// the dictionary holds 4096 entries, insertion stops; the second code
    /// emitted without an insertion halts the pass with partial consumption.
    /// That partial consumption is the contract, not a failure: the caller
    /// resubmits the remainder after a clear code.
    pub fn encode_chunk(&self, input: &[u8]) -> LzwChunk {
        let mut dictionary: HashMap<Vec<u8>, u16> =
            (0..1u16 << self.min_code_size).map(|i| (vec![i as u8], i)).collect();
        let mut next_free = self.clear_code + 2;
        let mut nbits = self.start_bits();

        let mut codes = Vec::new();
        let mut width_jumps = Vec::new();
        let mut w: Vec<u8> = Vec::new();
        let mut saturated_emits = 0u8;

        for (i, &c) in input.iter().enumerate() {
            let mut wc = w.clone();
            wc.push(c);
            if dictionary.contains_key(&wc) {
                w = wc;
                continue;
            }

            codes.push(dictionary[&w]);

            if next_free < MAX_DICT_SIZE {
                dictionary.insert(wc, next_free);
                next_free += 1;
                if nbits < MAX_CODE_BITS && next_free == (1 << nbits) + 1 {
                    width_jumps.push(codes.len() as u32);
                    nbits += 1;
                }
            } else {
                saturated_emits += 1;
                if saturated_emits >= 2 {
                    // Emitted codes cover exactly input[..i]; the current
                    // symbol goes back to the caller.
                    return LzwChunk {
                        codes,
                        consumed: i,
                        width_jumps,
                        state: LzwState::TableFull,
                    };
                }
            }

            w = vec![c];
        }

        if !w.is_empty() {
            codes.push(dictionary[&w]);
        }

        LzwChunk {
            codes,
            consumed: input.len(),
            width_jumps,
            state: LzwState::Exhausted,
        }
    }
}

/// Compress a full index sequence into the packed GIF LZW byte stream.
///
/// Runs the pass loop: every pass is prefixed with a clear code, and the
/// terminal pass is followed by the stop code. All passes share one bit
/// packer so the stream is byte-contiguous across dictionary resets.
pub fn compress(indices: &[u8], min_code_size: u8) -> Result<Vec<u8>> {
    let encoder = LzwEncoder::new(min_code_size);
    let mut packer = BitPacker::new(min_code_size);
    let mut remaining = indices;

    loop {
        let chunk = encoder.encode_chunk(remaining);
        if chunk.consumed == 0 && !remaining.is_empty() {
            return Err(GifError::EncoderStall {
                remaining: remaining.len(),
            });
        }
        trace!(
            codes = chunk.codes.len(),
            consumed = chunk.consumed,
            jumps = chunk.width_jumps.len(),
            "lzw pass"
        );

        let terminal = chunk.state == LzwState::Exhausted;
        let mut pass = Vec::with_capacity(chunk.codes.len() + 2);
        pass.push(encoder.clear_code());
        pass.extend_from_slice(&chunk.codes);
        if terminal {
            pass.push(encoder.stop_code());
        }
        packer.pack(&pass, &chunk.width_jumps);

        if terminal {
            return Ok(packer.finish());
        }
        remaining = &remaining[chunk.consumed..];
    }
}
