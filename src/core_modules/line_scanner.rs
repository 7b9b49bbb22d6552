// THEORY:
// The `line_scanner` module reads the binary edge mask and proposes at most one
// border line per side of the card: top, bottom, left, right. It is where the
// edge-case-heavy heuristics live.
//
// Key architectural principles:
// 1.  **Margins Kill Artifacts**: Capture surfaces produce junk along the frame
//     border (vignetting, sensor rows, letterboxing). An 8% margin on every
//     side is excluded from scanning outright, which also makes the zeroed
//     gradient border ring irrelevant.
// 2.  **Density Before Position**: A row or column only qualifies as a line
//     candidate when at least 15% of the cells across its search band are
//     edges. Sparse, noisy lines never make it to the positional stage.
// 3.  **Positional Split**: The top line is chosen only among rows in the upper
//     45% of the search band and the bottom only among rows in the lower 45%
//     (likewise left/right for columns). A card's longest edges sit near the
//     image periphery; the split stops one strong interior texture edge from
//     being read as two opposite borders. The split is measured across the
//     margin-clipped band, since that is the only region ever scanned.
// 4.  **First Seen Wins**: Candidates are compared with strictly-greater edge
//     counts, so among tied rows the one scanned first is kept. Ties are
//     common on sharp edges that straddle two grid rows.
//
// Scan coordinates are grid cells; results are rescaled by the downsample
// factor back into original-frame pixels.

use crate::core_modules::edge_map::EdgeMask;
use crate::pipeline::PipelineConfig;

/// The four candidate border lines for one frame, in original-frame pixels.
/// Any side may be absent; a candidate rectangle needs all four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderLines {
    pub top: Option<u32>,
    pub bottom: Option<u32>,
    pub left: Option<u32>,
    pub right: Option<u32>,
}

impl BorderLines {
    /// Returns `(top, bottom, left, right)` when all four lines were found.
    pub fn complete(&self) -> Option<(u32, u32, u32, u32)> {
        Some((self.top?, self.bottom?, self.left?, self.right?))
    }
}

/// Tracks the best (highest edge count) line seen so far on one side.
#[derive(Default)]
struct BestLine {
    coordinate: Option<usize>,
    edge_count: usize,
}

impl BestLine {
    fn offer(&mut self, coordinate: usize, edge_count: usize) {
        if edge_count > self.edge_count {
            self.edge_count = edge_count;
            self.coordinate = Some(coordinate);
        }
    }

    fn into_pixels(self, downsample: u32) -> Option<u32> {
        self.coordinate.map(|c| c as u32 * downsample)
    }
}

/// Scans the edge mask for the four card border lines.
pub fn scan_border_lines(
    mask: &EdgeMask,
    downsample: u32,
    config: &PipelineConfig,
) -> BorderLines {
    let width = mask.width();
    let height = mask.height();

    let margin_x = (width as f32 * config.border_margin_ratio) as usize;
    let margin_y = (height as f32 * config.border_margin_ratio) as usize;
    let (min_x, max_x) = (margin_x, width.saturating_sub(margin_x));
    let (min_y, max_y) = (margin_y, height.saturating_sub(margin_y));
    if max_x <= min_x || max_y <= min_y {
        return BorderLines::default();
    }

    let split = config.band_split_ratio;
    let mut lines = BorderLines::default();

    // Horizontal lines: scan rows, counting edges across the horizontal band.
    {
        let band = (max_x - min_x) as f32;
        let min_edges = band * config.min_edge_density;
        let span = (max_y - min_y) as f32;
        let upper_limit = min_y as f32 + span * split;
        let lower_limit = min_y as f32 + span * (1.0 - split);

        let mut top = BestLine::default();
        let mut bottom = BestLine::default();
        for y in min_y..max_y {
            let edge_count = (min_x..max_x).filter(|&x| mask.is_edge(x, y)).count();
            if (edge_count as f32) < min_edges {
                continue;
            }
            if (y as f32) < upper_limit {
                top.offer(y, edge_count);
            } else if (y as f32) > lower_limit {
                bottom.offer(y, edge_count);
            }
        }
        lines.top = top.into_pixels(downsample);
        lines.bottom = bottom.into_pixels(downsample);
    }

    // Vertical lines: the symmetric scan over columns.
    {
        let band = (max_y - min_y) as f32;
        let min_edges = band * config.min_edge_density;
        let span = (max_x - min_x) as f32;
        let left_limit = min_x as f32 + span * split;
        let right_limit = min_x as f32 + span * (1.0 - split);

        let mut left = BestLine::default();
        let mut right = BestLine::default();
        for x in min_x..max_x {
            let edge_count = (min_y..max_y).filter(|&y| mask.is_edge(x, y)).count();
            if (edge_count as f32) < min_edges {
                continue;
            }
            if (x as f32) < left_limit {
                left.offer(x, edge_count);
            } else if (x as f32) > right_limit {
                right.offer(x, edge_count);
            }
        }
        lines.left = left.into_pixels(downsample);
        lines.right = right.into_pixels(downsample);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::edge_map::build_edge_mask;
    use crate::core_modules::frame::{BYTES_PER_PIXEL, FrameView};
    use crate::core_modules::gradient::estimate_gradient;

    /// Builds an EdgeMask by rendering a frame whose bright cells become edges.
    /// `edges` lists grid cells to mark; everything else stays flat.
    fn mask_from_cells(grid_w: usize, grid_h: usize, edges: &[(usize, usize)]) -> EdgeMask {
        // Render each marked grid cell as an isolated bright sample so its
        // neighbors pick up gradient magnitude, then threshold. Simpler and
        // closer to production than synthesizing the mask struct by hand:
        // paint at full resolution, downsample by 1.
        let width = grid_w as u32;
        let height = grid_h as u32;
        let mut data = vec![60u8; grid_w * grid_h * BYTES_PER_PIXEL];
        for &(x, y) in edges {
            let index = (y * grid_w + x) * BYTES_PER_PIXEL;
            data[index..index + 3].fill(220);
        }
        let frame = FrameView::new(width, height, &data).unwrap();
        let grid = estimate_gradient(&frame, 1).unwrap();
        build_edge_mask(&grid, 0.25)
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn empty_mask_finds_no_lines() {
        let mask = mask_from_cells(50, 50, &[]);
        let lines = scan_border_lines(&mask, 3, &config());
        assert_eq!(lines, BorderLines::default());
        assert!(lines.complete().is_none());
    }

    #[test]
    fn full_row_in_upper_band_becomes_top_line() {
        let cells: Vec<(usize, usize)> = (5..45).map(|x| (x, 10)).collect();
        let mask = mask_from_cells(50, 50, &cells);
        let lines = scan_border_lines(&mask, 3, &config());
        // The bright strip smears over rows 9-11; first qualifying row wins.
        let top = lines.top.expect("top line");
        assert!((27..=33).contains(&top), "top={top}");
        assert_eq!(lines.bottom, None);
    }

    #[test]
    fn sparse_row_fails_the_density_floor() {
        // 4 edge cells out of a ~42-cell band is under 15%.
        let cells: Vec<(usize, usize)> = (5..9).map(|x| (x, 10)).collect();
        let mask = mask_from_cells(50, 50, &cells);
        let lines = scan_border_lines(&mask, 3, &config());
        assert_eq!(lines.top, None);
    }

    #[test]
    fn center_row_is_claimed_by_neither_side() {
        let cells: Vec<(usize, usize)> = (5..45).map(|x| (x, 25)).collect();
        let mask = mask_from_cells(50, 50, &cells);
        let lines = scan_border_lines(&mask, 3, &config());
        assert_eq!(lines.top, None);
        assert_eq!(lines.bottom, None);
    }

    #[test]
    fn columns_are_scanned_symmetrically() {
        let mut cells: Vec<(usize, usize)> = (5..45).map(|y| (8, y)).collect();
        cells.extend((5..45).map(|y| (41, y)));
        let mask = mask_from_cells(50, 50, &cells);
        let lines = scan_border_lines(&mask, 3, &config());
        let left = lines.left.expect("left line");
        let right = lines.right.expect("right line");
        assert!((21..=27).contains(&left), "left={left}");
        assert!((120..=126).contains(&right), "right={right}");
        assert!(left < right);
    }

    #[test]
    fn denser_row_displaces_a_weaker_candidate() {
        let mut cells: Vec<(usize, usize)> = (15..35).map(|x| (x, 8)).collect();
        cells.extend((5..45).map(|x| (x, 15)));
        let mask = mask_from_cells(50, 50, &cells);
        let lines = scan_border_lines(&mask, 3, &config());
        let top = lines.top.expect("top line");
        // The 40-cell row at y=15 outweighs the 20-cell row at y=8.
        assert!((42..=48).contains(&top), "top={top}");
    }
}
