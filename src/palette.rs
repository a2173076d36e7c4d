//! Color palettes and nearest-color classification.
//!
//! Fixed palette variants are pure precomputed data; the median-cut variant
//! is computed per frame by [`crate::quantize`].

use serde::{Deserialize, Serialize};

use crate::pixels::pack_rgb;

/// Largest supported color table (8 table bits).
pub const MAX_TABLE_BITS: u8 = 8;

/// Palette selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaletteVariant {
    /// Per-frame adaptive palette via median cut.
    #[default]
    MedianCut,
    /// 6x8x5 R-G-B levels plus 15 grays, with a reserved transparent slot.
    Rgb685,
    /// 6x6x6 web-safe color cube.
    Web216,
    /// Full 256-level grayscale ramp.
    Gray256,
    /// 16-level grayscale ramp.
    Gray16,
}

impl PaletteVariant {
    /// Color table bit size this variant requires, or `None` when the size
    /// is chosen per frame (median cut).
    pub fn table_bits(&self) -> Option<u8> {
        match self {
            PaletteVariant::MedianCut => None,
            PaletteVariant::Rgb685 | PaletteVariant::Web216 | PaletteVariant::Gray256 => Some(8),
            PaletteVariant::Gray16 => Some(4),
        }
    }

    /// Whether this variant's palette is grayscale.
    pub fn is_grayscale(&self) -> bool {
        matches!(self, PaletteVariant::Gray256 | PaletteVariant::Gray16)
    }

    /// Build the precomputed palette for a fixed variant.
    ///
    /// # Panics
    ///
    /// Panics for [`PaletteVariant::MedianCut`], which has no fixed table.
    pub fn fixed_palette(&self) -> Palette {
        match self {
            PaletteVariant::MedianCut => panic!("median cut palette is computed per frame"),
            PaletteVariant::Rgb685 => rgb685(),
            PaletteVariant::Web216 => web216(),
            PaletteVariant::Gray256 => gray_ramp(256),
            PaletteVariant::Gray16 => gray_ramp(16),
        }
    }
}

/// An ordered color table of up to 256 RGB triples.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<[u8; 3]>,
    /// Entries participating in nearest-color search; trailing padding and
    /// the transparent slot are excluded.
    search_len: usize,
    transparent: Option<u8>,
}

impl Palette {
    /// Build a palette from computed colors, zero-padding to `2^table_bits`
    /// entries. Only the supplied colors participate in nearest search.
    pub fn from_colors(mut colors: Vec<[u8; 3]>, table_bits: u8) -> Self {
        let search_len = colors.len();
        colors.resize(1 << table_bits, [0, 0, 0]);
        Self {
            colors,
            search_len,
            transparent: None,
        }
    }

    /// The full color table, padded to its power-of-two size.
    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }

    /// Number of entries participating in nearest-color search.
    pub fn search_len(&self) -> usize {
        self.search_len
    }

    /// Reserved transparent slot, when the variant defines one.
    pub fn transparent_index(&self) -> Option<u8> {
        self.transparent
    }

    /// Overwrite one palette slot with an exact color.
    pub fn set_color(&mut self, index: u8, rgb: [u8; 3]) {
        self.colors[index as usize] = rgb;
    }

    /// Index of the searchable palette color nearest to `rgb` by squared
    /// Euclidean distance. Ties resolve to the lower index.
    pub fn nearest(&self, rgb: [u8; 3]) -> u8 {
        let mut best = 0usize;
        let mut best_dist = i32::MAX;
        for (i, p) in self.colors[..self.search_len].iter().enumerate() {
            let dr = rgb[0] as i32 - p[0] as i32;
            let dg = rgb[1] as i32 - p[1] as i32;
            let db = rgb[2] as i32 - p[2] as i32;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i;
                if dist == 0 {
                    break;
                }
            }
        }
        best as u8
    }

    /// Nearest search against a residual-adjusted floating point color, used
    /// by the ditherer. Same scan order and tie-break as [`Palette::nearest`].
    pub fn nearest_f32(&self, rgb: [f32; 3]) -> u8 {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (i, p) in self.colors[..self.search_len].iter().enumerate() {
            let dr = rgb[0] - p[0] as f32;
            let dg = rgb[1] - p[1] as f32;
            let db = rgb[2] - p[2] as f32;
            let dist = dr * dr + dg * dg + db * db;
            if dist < best_dist {
                best_dist = dist;
                best = i;
            }
        }
        best as u8
    }

    /// 24-bit packed value of one entry, matching the pixel sort key.
    pub fn packed(&self, index: u8) -> u32 {
        pack_rgb(self.colors[index as usize])
    }
}

/// Evenly spaced channel level: `step` of `count` levels spanning 0-255.
fn level(step: usize, count: usize) -> u8 {
    (step * 255 / (count - 1)) as u8
}

/// 6x8x5 R-G-B cube (240 colors), 15 grays, one transparent slot at 255.
fn rgb685() -> Palette {
    let mut colors = Vec::with_capacity(256);
    for r in 0..6 {
        for g in 0..8 {
            for b in 0..5 {
                colors.push([level(r, 6), level(g, 8), level(b, 5)]);
            }
        }
    }
    for i in 1..=15usize {
        let v = (i * 255 / 16) as u8;
        colors.push([v, v, v]);
    }
    // Slot 255 is the reserved transparent index; the color is a placeholder.
    colors.push([0, 0, 0]);
    Palette {
        colors,
        search_len: 255,
        transparent: Some(255),
    }
}

/// 6x6x6 web-safe cube, zero-padded to 256 entries.
fn web216() -> Palette {
    let mut colors = Vec::with_capacity(256);
    for r in 0..6 {
        for g in 0..6 {
            for b in 0..6 {
                colors.push([(r * 51) as u8, (g * 51) as u8, (b * 51) as u8]);
            }
        }
    }
    let search_len = colors.len();
    colors.resize(256, [0, 0, 0]);
    Palette {
        colors,
        search_len,
        transparent: None,
    }
}

/// Evenly spaced grayscale ramp of `steps` entries.
fn gray_ramp(steps: usize) -> Palette {
    let colors: Vec<[u8; 3]> = (0..steps)
        .map(|i| {
            let v = level(i, steps);
            [v, v, v]
        })
        .collect();
    let search_len = colors.len();
    Palette {
        colors,
        search_len,
        transparent: None,
    }
}
