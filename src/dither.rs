//! Non-serpentine Floyd-Steinberg error diffusion.

use crate::frame::RgbFrame;
use crate::palette::Palette;

/// Error weights, sixteenths: right, below-left, below, below-right.
const WEIGHTS: [f32; 4] = [7.0 / 16.0, 3.0 / 16.0, 5.0 / 16.0, 1.0 / 16.0];

/// Dither a frame against a final palette, returning per-pixel indices.
///
/// Raster order, top-to-bottom and left-to-right. Each pixel is classified
/// by its base color plus the residual accumulated from already-visited
/// neighbors; the quantization error is spread to the four unvisited
/// neighbors, skipping positions outside the frame. Residual state is scoped
/// to this call.
pub fn dither(frame: &RgbFrame, palette: &Palette) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let mut residual = vec![[0f32; 3]; width * height];
    let mut indices = vec![0u8; width * height];

    for y in 0..height {
        for x in 0..width {
            let at = y * width + x;
            let base = frame.pixel(at);
            let effective = [
                base[0] as f32 + residual[at][0],
                base[1] as f32 + residual[at][1],
                base[2] as f32 + residual[at][2],
            ];

            let index = palette.nearest_f32(effective);
            indices[at] = index;

            let matched = palette.colors()[index as usize];
            let error = [
                effective[0] - matched[0] as f32,
                effective[1] - matched[1] as f32,
                effective[2] - matched[2] as f32,
            ];

            let mut spread = |target: usize, weight: f32| {
                for c in 0..3 {
                    residual[target][c] += error[c] * weight;
                }
            };
            if x + 1 < width {
                spread(at + 1, WEIGHTS[0]);
            }
            if y + 1 < height {
                if x > 0 {
                    spread(at + width - 1, WEIGHTS[1]);
                }
                spread(at + width, WEIGHTS[2]);
                if x + 1 < width {
                    spread(at + width + 1, WEIGHTS[3]);
                }
            }
        }
    }

    indices
}
