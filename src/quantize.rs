//! Median-cut color quantization.
//!
//! Operates on the unique-color list in place, partitioning it into exactly
//! `2^table_bits` bins through `table_bits` rounds of bisection. Bins are
//! `(start, len)` views into the shared entry buffer and never copy pixels.

use tracing::debug;

use crate::palette::Palette;
use crate::pixels::{PixelEntry, UniqueColors};

/// A contiguous bin of unique colors under quantization.
#[derive(Debug, Clone, Copy, Default)]
struct ColorBin {
    start: usize,
    len: usize,
    min: [u8; 3],
    max: [u8; 3],
}

impl ColorBin {
    fn slice<'a>(&self, entries: &'a mut [PixelEntry]) -> &'a mut [PixelEntry] {
        &mut entries[self.start..self.start + self.len]
    }

    fn compute_bounds(&mut self, entries: &mut [PixelEntry]) {
        let mut min = [255u8; 3];
        let mut max = [0u8; 3];
        for e in self.slice(entries).iter() {
            let rgb = e.rgb();
            for c in 0..3 {
                min[c] = min[c].min(rgb[c]);
                max[c] = max[c].max(rgb[c]);
            }
        }
        self.min = min;
        self.max = max;
    }

    /// Channel with the widest range; ties favor R over G over B.
    fn widest_channel(&self) -> usize {
        let range = [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ];
        if range[0] >= range[1] {
            if range[0] >= range[2] {
                0
            } else {
                2
            }
        } else if range[1] >= range[2] {
            1
        } else {
            2
        }
    }
}

/// Smallest table-bit size whose table holds `n` colors, capped at 8.
pub fn auto_table_bits(n: usize) -> u8 {
    let mut bits = 1u8;
    while (1usize << bits) < n && bits < 8 {
        bits += 1;
    }
    bits
}

/// Partition the unique colors into `2^table_bits` bins and assign each
/// entry the ordinal of its bin. Returns the palette of bin means.
///
/// When the unique count already fits the table, no cutting happens and each
/// color keeps its ordinal slot (lossless).
pub fn median_cut(unique: &mut UniqueColors, table_bits: u8) -> Palette {
    let table_size = 1usize << table_bits;

    if unique.len() <= table_size {
        let mut colors = Vec::with_capacity(unique.len());
        for (i, e) in unique.entries.iter_mut().enumerate() {
            e.color_index = i as u8;
            colors.push(e.rgb());
        }
        return Palette::from_colors(colors, table_bits);
    }

    debug!(unique = unique.len(), table_size, "running median cut");

    let entries = unique.entries.as_mut_slice();
    let mut bins = vec![ColorBin::default(); table_size];
    bins[0] = ColorBin {
        start: 0,
        len: entries.len(),
        min: [0; 3],
        max: [0; 3],
    };

    // Each round doubles the bin population; the new bin from splitting slot
    // i*step lands at the structural slot i*step + step/2.
    for round in 0..table_bits {
        let populated = 1usize << round;
        let step = 1usize << (table_bits - round);
        let half = step >> 1;
        for i in 0..populated {
            let source = i * step;
            let mut left = bins[source];
            let right = split_bin(&mut left, entries);
            bins[source] = left;
            bins[source + half] = right;
        }
    }

    let mut colors = Vec::with_capacity(table_size);
    for (ordinal, bin) in bins.iter().enumerate() {
        if bin.len == 0 {
            colors.push([0, 0, 0]);
            continue;
        }
        let mut sum = [0u32; 3];
        for e in &entries[bin.start..bin.start + bin.len] {
            let rgb = e.rgb();
            for c in 0..3 {
                sum[c] += rgb[c] as u32;
            }
        }
        let mean = [
            (sum[0] / bin.len as u32) as u8,
            (sum[1] / bin.len as u32) as u8,
            (sum[2] / bin.len as u32) as u8,
        ];
        for e in &mut entries[bin.start..bin.start + bin.len] {
            e.color_index = ordinal as u8;
        }
        colors.push(mean);
    }

    // Cutting reshuffled the buffer; put it back so the raster map holds.
    unique.restore_sorted_order();

    Palette::from_colors(colors, table_bits)
}

/// Split one bin at its median along the widest channel. The left half stays
/// in place; the right half (length `len / 2`) becomes the returned bin.
fn split_bin(bin: &mut ColorBin, entries: &mut [PixelEntry]) -> ColorBin {
    if bin.len < 2 {
        return ColorBin {
            start: bin.start + bin.len,
            len: 0,
            min: [0; 3],
            max: [0; 3],
        };
    }

    bin.compute_bounds(entries);
    let channel = bin.widest_channel();
    // Secondary key keeps the split deterministic for equal channel values.
    bin.slice(entries)
        .sort_unstable_by_key(|e| (e.rgb()[channel], e.packed));

    let right_len = bin.len / 2;
    bin.len -= right_len;
    ColorBin {
        start: bin.start + bin.len,
        len: right_len,
        min: [0; 3],
        max: [0; 3],
    }
}

/// Force exact black and white into a computed palette.
///
/// Finds the slots nearest pure black and pure white and overwrites them with
/// the exact triples. Applies to median-cut and grayscale palettes.
pub fn force_black_white(palette: &mut Palette) {
    let black = palette.nearest([0, 0, 0]);
    let white = palette.nearest([255, 255, 255]);
    palette.set_color(black, [0, 0, 0]);
    palette.set_color(white, [255, 255, 255]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::RgbFrame;

    fn unique_of(pixels: &[[u8; 3]]) -> UniqueColors {
        let data: Vec<u8> = pixels.iter().flatten().copied().collect();
        let frame = RgbFrame::from_rgb(data, pixels.len() as u32, 1).unwrap();
        UniqueColors::build(&frame)
    }

    #[test]
    fn test_auto_table_bits() {
        assert_eq!(auto_table_bits(1), 1);
        assert_eq!(auto_table_bits(2), 1);
        assert_eq!(auto_table_bits(3), 2);
        assert_eq!(auto_table_bits(16), 4);
        assert_eq!(auto_table_bits(17), 5);
        assert_eq!(auto_table_bits(256), 8);
        assert_eq!(auto_table_bits(100_000), 8);
    }

    #[test]
    fn test_lossless_when_colors_fit() {
        let mut unique = unique_of(&[[1, 0, 0], [2, 0, 0], [3, 0, 0]]);
        let palette = median_cut(&mut unique, 2);
        assert_eq!(palette.colors().len(), 4);
        let indices: Vec<u8> = unique.entries.iter().map(|e| e.color_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(palette.colors()[0], [1, 0, 0]);
        assert_eq!(palette.colors()[2], [3, 0, 0]);
    }

    #[test]
    fn test_two_bin_cut_means() {
        let mut unique = unique_of(&[[0, 0, 0], [10, 0, 0], [200, 0, 0], [250, 0, 0]]);
        let palette = median_cut(&mut unique, 1);
        assert_eq!(palette.colors(), &[[5, 0, 0], [225, 0, 0]]);
        // Dark pair maps to bin 0, bright pair to bin 1.
        assert_eq!(unique.entry_at(0).color_index, 0);
        assert_eq!(unique.entry_at(1).color_index, 0);
        assert_eq!(unique.entry_at(2).color_index, 1);
        assert_eq!(unique.entry_at(3).color_index, 1);
    }

    #[test]
    fn test_cut_produces_exact_bin_count() {
        // 40 colors into 16 bins: palette stays exactly 2^4 entries.
        let pixels: Vec<[u8; 3]> = (0..40u32)
            .map(|i| [(i * 6) as u8, (255 - i * 3) as u8, (i * 2) as u8])
            .collect();
        let mut unique = unique_of(&pixels);
        let palette = median_cut(&mut unique, 4);
        assert_eq!(palette.colors().len(), 16);
        for e in &unique.entries {
            assert!((e.color_index as usize) < 16);
        }
        // Multiplicities survive quantization.
        let total: u32 = unique.entries.iter().map(|e| e.count).sum();
        assert_eq!(total, 40);
    }

    #[test]
    fn test_tiebreak_prefers_red_channel() {
        // Equal ranges on R and G: the cut must sort along R.
        let mut unique = unique_of(&[[0, 100, 0], [100, 0, 0], [40, 60, 0], [60, 40, 0]]);
        let palette = median_cut(&mut unique, 1);
        // R-sorted halves: {0,40} and {60,100} red values.
        assert_eq!(palette.colors()[0], [20, 80, 0]);
        assert_eq!(palette.colors()[1], [80, 20, 0]);
    }

    #[test]
    fn test_force_black_white() {
        let mut palette = Palette::from_colors(vec![[3, 2, 1], [250, 251, 252], [128, 0, 0]], 2);
        force_black_white(&mut palette);
        assert_eq!(palette.colors()[0], [0, 0, 0]);
        assert_eq!(palette.colors()[1], [255, 255, 255]);
        assert_eq!(palette.colors()[2], [128, 0, 0]);
    }
}
