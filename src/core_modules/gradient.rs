// THEORY:
// The `gradient` module is the first and heaviest stage of the detection cycle.
// It converts a raw color frame into a downsampled grid of gradient magnitudes,
// which is the only representation later stages ever look at.
//
// Key architectural principles:
// 1.  **Downsample First**: The grid is sampled at a fixed stride (`downsample`,
//     3 by default), cutting per-frame work by roughly the square of the factor.
//     That trade of resolution for throughput is what keeps the whole cycle
//     inside its real-time budget; the overlay only needs edge positions to
//     within a few pixels anyway.
// 2.  **The Simplified Kernel Is Load-Bearing**: Each interior cell accumulates
//     `gx`/`gy` over its 8 downsampled neighbors weighted by the sign of the
//     neighbor offset. This is not a textbook Sobel (there is no double-weighted
//     center row), and it must stay that way: the edge threshold and the
//     scanner's density floor are tuned against this exact formula.
// 3.  **Borders Stay Zero**: The outer ring of cells is never computed. The
//     line scanner excludes a margin wider than one cell on every side, so the
//     ring can never influence a detection.
// 4.  **No Failure Mode**: A frame with zero area produces no grid at all,
//     which the pipeline reports as "no detection this cycle". Nothing here
//     can error.

use crate::core_modules::frame::FrameView;

/// A 2-D grid of non-negative gradient magnitudes at downsampled resolution,
/// along with the maximum magnitude observed while building it.
///
/// Built and discarded within a single detection cycle.
#[derive(Debug, Clone)]
pub struct GradientGrid {
    width: usize,
    height: usize,
    magnitudes: Vec<f32>,
    max_magnitude: f32,
}

impl GradientGrid {
    /// Grid width in cells (`floor(frame_width / downsample)`).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells (`floor(frame_height / downsample)`).
    pub fn height(&self) -> usize {
        self.height
    }

    /// The largest magnitude in the grid; zero for a uniform frame.
    pub fn max_magnitude(&self) -> f32 {
        self.max_magnitude
    }

    /// Magnitude at grid cell `(x, y)`.
    pub fn magnitude(&self, x: usize, y: usize) -> f32 {
        self.magnitudes[y * self.width + x]
    }
}

/// Builds the gradient grid for one frame, or `None` when the frame has no
/// area yet (capture surface still warming up).
pub fn estimate_gradient(frame: &FrameView<'_>, downsample: u32) -> Option<GradientGrid> {
    if frame.is_empty() {
        return None;
    }

    let width = (frame.width() / downsample) as usize;
    let height = (frame.height() / downsample) as usize;
    let mut magnitudes = vec![0.0f32; width * height];
    let mut max_magnitude = 0.0f32;

    // Interior cells only; the border ring stays at zero magnitude.
    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            let mut gx = 0.0f32;
            let mut gy = 0.0f32;

            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let px = (x as i32 + dx) as u32 * downsample;
                    let py = (y as i32 + dy) as u32 * downsample;
                    let luma = frame.luma(px, py);
                    gx += luma * dx as f32;
                    gy += luma * dy as f32;
                }
            }

            let magnitude = (gx * gx + gy * gy).sqrt();
            magnitudes[y * width + x] = magnitude;
            if magnitude > max_magnitude {
                max_magnitude = magnitude;
            }
        }
    }

    Some(GradientGrid {
        width,
        height,
        magnitudes,
        max_magnitude,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::BYTES_PER_PIXEL;

    const SCALE: u32 = 3;

    fn solid_frame(width: u32, height: u32, value: u8) -> Vec<u8> {
        vec![value; width as usize * height as usize * BYTES_PER_PIXEL]
    }

    /// A frame split into a dark left half and a bright right half at `split_x`.
    fn step_frame(width: u32, height: u32, split_x: u32) -> Vec<u8> {
        let mut data = solid_frame(width, height, 40);
        for y in 0..height {
            for x in split_x..width {
                let index = (y as usize * width as usize + x as usize) * BYTES_PER_PIXEL;
                data[index..index + 3].fill(200);
            }
        }
        data
    }

    #[test]
    fn zero_area_frame_builds_no_grid() {
        let frame = FrameView::new(0, 0, &[]).unwrap();
        assert!(estimate_gradient(&frame, SCALE).is_none());
    }

    #[test]
    fn grid_dimensions_follow_downsample_factor() {
        let data = solid_frame(64, 47, 128);
        let frame = FrameView::new(64, 47, &data).unwrap();
        let grid = estimate_gradient(&frame, SCALE).unwrap();
        assert_eq!(grid.width(), 21);
        assert_eq!(grid.height(), 15);
    }

    #[test]
    fn uniform_frame_has_zero_max_magnitude() {
        let data = solid_frame(60, 60, 128);
        let frame = FrameView::new(60, 60, &data).unwrap();
        let grid = estimate_gradient(&frame, SCALE).unwrap();
        assert_eq!(grid.max_magnitude(), 0.0);
    }

    #[test]
    fn step_edge_produces_magnitude_at_the_boundary() {
        let data = step_frame(60, 60, 30);
        let frame = FrameView::new(60, 60, &data).unwrap();
        let grid = estimate_gradient(&frame, SCALE).unwrap();

        assert!(grid.max_magnitude() > 0.0);
        // Cells whose 3x3 sample straddles x=30 (grid column 10) carry the edge.
        let mid_y = grid.height() / 2;
        assert!(grid.magnitude(10, mid_y) > 0.0);
        // Far away from the step everything is flat.
        assert_eq!(grid.magnitude(3, mid_y), 0.0);
        assert_eq!(grid.magnitude(grid.width() - 4, mid_y), 0.0);
    }

    #[test]
    fn border_ring_is_left_at_zero() {
        let data = step_frame(60, 60, 30);
        let frame = FrameView::new(60, 60, &data).unwrap();
        let grid = estimate_gradient(&frame, SCALE).unwrap();

        for x in 0..grid.width() {
            assert_eq!(grid.magnitude(x, 0), 0.0);
            assert_eq!(grid.magnitude(x, grid.height() - 1), 0.0);
        }
        for y in 0..grid.height() {
            assert_eq!(grid.magnitude(0, y), 0.0);
            assert_eq!(grid.magnitude(grid.width() - 1, y), 0.0);
        }
    }
}
