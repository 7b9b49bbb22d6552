// THEORY:
// The `edge_map` module turns the continuous gradient grid into a binary
// edge/not-edge decision. It is intentionally the thinnest stage in the cycle.
//
// Key architectural principles:
// 1.  **Adaptive, Not Absolute**: The threshold is a fixed fraction (0.25) of
//     the frame's own maximum magnitude, so the mask adapts to exposure and
//     lighting changes without retuning. A dim, low-contrast frame and a bright
//     one classify the same relative structure.
// 2.  **Strict Comparison**: A cell is an edge only when its magnitude strictly
//     exceeds the threshold. A uniform frame has max magnitude zero, its
//     threshold is zero, and strictness makes the mask all-false. Downstream
//     can then never assemble a rectangle out of a blank frame, which is
//     correct by construction.

use crate::core_modules::gradient::GradientGrid;

/// A binary edge mask at gradient-grid resolution, built and discarded within
/// one detection cycle.
#[derive(Debug, Clone)]
pub struct EdgeMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl EdgeMask {
    /// Mask width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Mask height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether cell `(x, y)` was classified as an edge.
    pub fn is_edge(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }
}

/// Thresholds a gradient grid into an edge mask.
///
/// `threshold_ratio` is the fraction of the grid's maximum magnitude a cell
/// must strictly exceed to count as an edge.
pub fn build_edge_mask(grid: &GradientGrid, threshold_ratio: f32) -> EdgeMask {
    let threshold = grid.max_magnitude() * threshold_ratio;
    let width = grid.width();
    let height = grid.height();
    let mut cells = vec![false; width * height];

    for y in 0..height {
        for x in 0..width {
            cells[y * width + x] = grid.magnitude(x, y) > threshold;
        }
    }

    EdgeMask {
        width,
        height,
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::{BYTES_PER_PIXEL, FrameView};
    use crate::core_modules::gradient::estimate_gradient;

    #[test]
    fn uniform_frame_yields_all_false_mask() {
        let data = vec![128u8; 60 * 60 * BYTES_PER_PIXEL];
        let frame = FrameView::new(60, 60, &data).unwrap();
        let grid = estimate_gradient(&frame, 3).unwrap();
        let mask = build_edge_mask(&grid, 0.25);

        assert_eq!(mask.width(), grid.width());
        assert_eq!(mask.height(), grid.height());
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                assert!(!mask.is_edge(x, y), "cell ({x}, {y}) marked edge");
            }
        }
    }

    #[test]
    fn strong_edges_survive_thresholding() {
        // Bright right half starting at x=30.
        let mut data = vec![40u8; 60 * 60 * BYTES_PER_PIXEL];
        for y in 0..60usize {
            for x in 30..60usize {
                let index = (y * 60 + x) * BYTES_PER_PIXEL;
                data[index..index + 3].fill(200);
            }
        }
        let frame = FrameView::new(60, 60, &data).unwrap();
        let grid = estimate_gradient(&frame, 3).unwrap();
        let mask = build_edge_mask(&grid, 0.25);

        let mid_y = mask.height() / 2;
        assert!(mask.is_edge(10, mid_y));
        assert!(!mask.is_edge(3, mid_y));
    }
}
