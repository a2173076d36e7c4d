//! Variable-width code serialization into the GIF byte stream.
//!
//! GIF packs LZW codes LSB-first: each code lands at the lowest unoccupied
//! bits of the stream, and bytes are emitted as they fill. The packer owns
//! the carry state (partial byte plus fill count) explicitly so several
//! compression passes serialize contiguously into one stream.

use crate::lzw::MAX_CODE_BITS;

/// LSB-first bit packer with persistent carry state and code-width tracking.
#[derive(Debug)]
pub struct BitPacker {
    acc: u64,
    filled: u32,
    bytes: Vec<u8>,
    width: u8,
    start_bits: u8,
    clear_code: u16,
    since_clear: u32,
}

impl BitPacker {
    /// Create a packer for a stream with the given GIF minimum code size.
    pub fn new(min_code_size: u8) -> Self {
        let start_bits = (min_code_size + 1).max(3);
        Self {
            acc: 0,
            filled: 0,
            bytes: Vec::new(),
            width: start_bits,
            start_bits,
            clear_code: 1 << min_code_size,
            since_clear: 0,
        }
    }

    /// Append one pass of codes.
    ///
    /// `width_jumps` holds the code offsets (relative to the last clear code)
    /// at which the width grows by one bit, as recorded by the LZW encoder.
    /// A clear code is written at the current width and then resets the
    /// width escalation, since each pass restarts from the initial width.
    pub fn pack(&mut self, codes: &[u16], width_jumps: &[u32]) {
        let mut jump = 0usize;
        for &code in codes {
            if code == self.clear_code {
                self.push_code(code);
                self.width = self.start_bits;
                self.since_clear = 0;
                jump = 0;
                continue;
            }
            while jump < width_jumps.len() && self.since_clear == width_jumps[jump] {
                if self.width < MAX_CODE_BITS {
                    self.width += 1;
                }
                jump += 1;
            }
            self.push_code(code);
            self.since_clear += 1;
        }
    }

    /// Flush the carry, zero-padding the final partial byte, and return the
    /// packed stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.bytes.push(self.acc as u8);
        }
        self.bytes
    }

    /// Bytes fully emitted so far, excluding the pending carry.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    fn push_code(&mut self, code: u16) {
        self.acc |= (code as u64) << self.filled;
        self.filled += self.width as u32;
        while self.filled >= 8 {
            self.bytes.push(self.acc as u8);
            self.acc >>= 8;
            self.filled -= 8;
        }
    }
}
