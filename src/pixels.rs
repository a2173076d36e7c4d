//! Unique-color collection over a raw frame.
//!
//! Collapses a frame's pixels into a sorted unique-color list with
//! multiplicities, plus an index map from raster position back to the unique
//! entry. The map replaces the original pointer-reordered pixel arena with an
//! explicit index-addressed buffer.

use crate::frame::RgbFrame;

/// One unique color observed in a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelEntry {
    /// 24-bit composite `(b << 16) | (g << 8) | r` used as the sort key.
    pub packed: u32,
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Raster position of the first pixel carrying this color.
    pub first_index: u32,
    /// Position in the color-sorted unique order; restores order after
    /// quantization reshuffles the entries.
    pub sort_index: u32,
    /// Assigned palette slot.
    pub color_index: u8,
    /// Number of frame pixels collapsed into this entry.
    pub count: u32,
}

impl PixelEntry {
    /// RGB triple of this entry.
    pub fn rgb(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Pack an RGB triple into the 24-bit sort key.
pub fn pack_rgb(rgb: [u8; 3]) -> u32 {
    ((rgb[2] as u32) << 16) | ((rgb[1] as u32) << 8) | rgb[0] as u32
}

/// The unique colors of one frame plus the raster-position map.
#[derive(Debug)]
pub struct UniqueColors {
    /// Unique entries, initially in ascending `packed` order.
    pub entries: Vec<PixelEntry>,
    /// `map[raster_index]` = ordinal of the owning unique entry.
    map: Vec<u32>,
}

impl UniqueColors {
    /// Collapse a frame into its unique colors.
    ///
    /// Pixels are sorted by `(packed, raster index)` so equal-color runs are
    /// contiguous and the retained `first_index` is the earliest occurrence.
    /// Each entry receives a provisional ordinal `color_index`, valid as-is
    /// when no further quantization is needed.
    pub fn build(frame: &RgbFrame) -> Self {
        let npixels = frame.pixel_count();
        let mut sorted: Vec<(u32, u32)> = Vec::with_capacity(npixels);
        for i in 0..npixels {
            sorted.push((pack_rgb(frame.pixel(i)), i as u32));
        }
        sorted.sort_unstable();

        let mut entries: Vec<PixelEntry> = Vec::new();
        let mut map = vec![0u32; npixels];
        for &(packed, frame_index) in &sorted {
            match entries.last_mut() {
                Some(last) if last.packed == packed => last.count += 1,
                _ => {
                    entries.push(PixelEntry {
                        packed,
                        r: packed as u8,
                        g: (packed >> 8) as u8,
                        b: (packed >> 16) as u8,
                        first_index: frame_index,
                        sort_index: entries.len() as u32,
                        color_index: entries.len().min(u8::MAX as usize) as u8,
                        count: 1,
                    });
                }
            }
            map[frame_index as usize] = (entries.len() - 1) as u32;
        }

        Self { entries, map }
    }

    /// Number of distinct colors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the frame had no pixels (never happens for validated frames).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unique entry owning the pixel at a raster position.
    pub fn entry_at(&self, raster_index: usize) -> &PixelEntry {
        &self.entries[self.map[raster_index] as usize]
    }

    /// Restore `entries` to ascending `sort_index` order so the raster map is
    /// valid again after quantization reordered the buffer.
    pub fn restore_sorted_order(&mut self) {
        self.entries.sort_unstable_by_key(|e| e.sort_index);
    }

    /// Final per-pixel palette indices, replicating each entry's assigned
    /// `color_index` across all pixels sharing it.
    pub fn index_map(&self) -> Vec<u8> {
        self.map
            .iter()
            .map(|&u| self.entries[u as usize].color_index)
            .collect()
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
    fn test_collapse_counts_sum_to_pixel_count() {
        let frame = frame_of(
            &[
                [1, 2, 3],
                [1, 2, 3],
                [9, 9, 9],
                [1, 2, 3],
                [0, 0, 0],
                [9, 9, 9],
            ],
            3,
        );
        let unique = UniqueColors::build(&frame);
        assert_eq!(unique.len(), 3);
        let total: u32 = unique.entries.iter().map(|e| e.count).sum();
        assert_eq!(total as usize, frame.pixel_count());
    }

    #[test]
    fn test_sorted_by_packed_color() {
        let frame = frame_of(&[[0, 0, 5], [0, 0, 1], [0, 0, 3]], 3);
        let unique = UniqueColors::build(&frame);
        let packs: Vec<u32> = unique.entries.iter().map(|e| e.packed).collect();
        let mut sorted = packs.clone();
        sorted.sort_unstable();
        assert_eq!(packs, sorted);
    }

    #[test]
    fn test_first_index_is_earliest_occurrence() {
        let frame = frame_of(&[[9, 9, 9], [1, 1, 1], [9, 9, 9]], 3);
        let unique = UniqueColors::build(&frame);
        let entry = unique
            .entries
            .iter()
            .find(|e| e.rgb() == [9, 9, 9])
            .unwrap();
        assert_eq!(entry.first_index, 0);
    }

    #[test]
    fn test_index_map_restores_raster_order() {
        let frame = frame_of(&[[5, 0, 0], [1, 0, 0], [5, 0, 0], [1, 0, 0]], 2);
        let unique = UniqueColors::build(&frame);
        // Provisional ordinals follow packed order: [1,0,0] sorts first.
        assert_eq!(unique.index_map(), vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_restore_sorted_order_after_shuffle() {
        let frame = frame_of(&[[5, 0, 0], [1, 0, 0], [3, 0, 0]], 3);
        let mut unique = UniqueColors::build(&frame);
        unique.entries.reverse();
        unique.restore_sorted_order();
        assert_eq!(unique.entry_at(0).rgb(), [5, 0, 0]);
        assert_eq!(unique.entry_at(1).rgb(), [1, 0, 0]);
        assert_eq!(unique.entry_at(2).rgb(), [3, 0, 0]);
    }
}
