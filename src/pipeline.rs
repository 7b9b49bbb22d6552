// THEORY:
// The `pipeline` module is the per-cycle API of the detection engine. It chains
// the four analysis stages (gradient -> edge mask -> border lines -> validated
// bounds) into one pure function of a frame, and owns the single configuration
// struct every stage reads its tunables from.
//
// Key architectural principles:
// 1.  **Strictly Forward Dataflow**: Each stage consumes only the previous
//     stage's output; intermediate grids are built and discarded within the
//     call. `detect` holds no state at all, which is what lets the session
//     layer reason about temporal behavior in one place (the tracker).
// 2.  **One Config To Rule The Stages**: Every tunable lives in
//     `PipelineConfig` with a `Default` carrying the tuned values. The numbers
//     form a matched set: the edge threshold, the density floor, and the
//     geometric gates were calibrated together against the simplified gradient
//     kernel, so overriding one in isolation is usually a mistake.
// 3.  **Absence, Not Errors**: From a validly shaped frame onward nothing in
//     the cycle can fail. A blank frame, a missing border, an implausible
//     rectangle: all of them surface as `None`, the routine "no card this
//     cycle" outcome the tracker is built to absorb.

use crate::core_modules::edge_map::build_edge_mask;
use crate::core_modules::frame::FrameView;
use crate::core_modules::gradient::estimate_gradient;
use crate::core_modules::line_scanner::scan_border_lines;
use std::time::Duration;

// Re-export key data structures for the public API.
pub use crate::core_modules::bounds::{BoundingBox, validate_bounds};
pub use crate::core_modules::line_scanner::BorderLines;
pub use crate::core_modules::tracker::{BoundsTracker, TrackerUpdate};

/// Configuration for the detection pipeline and session, with tuned defaults.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Downsample factor between frame pixels and gradient-grid cells.
    pub downsample: u32,
    /// Fraction of the max gradient magnitude a cell must exceed to be an edge.
    pub edge_threshold_ratio: f32,
    /// Fraction of each grid dimension excluded from scanning on every side.
    pub border_margin_ratio: f32,
    /// Minimum fraction of a scan band that must be edge cells for a line to
    /// qualify.
    pub min_edge_density: f32,
    /// Fraction of the search band reserved for each side's line candidates
    /// (top/left take the first 45%, bottom/right the last 45%).
    pub band_split_ratio: f32,
    /// Accepted width/height range for a candidate rectangle.
    pub aspect_ratio_min: f64,
    pub aspect_ratio_max: f64,
    /// Minimum candidate extent as a fraction of each frame dimension.
    pub min_span_ratio: f64,
    /// Maximum candidate extent as a fraction of each frame dimension.
    pub max_span_ratio: f64,
    /// Accepted candidate area as a fraction of the frame area.
    pub area_ratio_min: f64,
    pub area_ratio_max: f64,
    /// Relative change below which a new smoothed box does not replace the
    /// stable box.
    pub jitter_tolerance: f64,
    /// Minimum time between CPU-bound scans (~5 Hz by default).
    pub scan_interval: Duration,
    /// Grace delay between losing the card and hiding the overlay.
    pub hide_grace: Duration,
    /// Cadence of the session's refresh ticker (the scan throttle gates the
    /// actual work).
    pub refresh_interval: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            downsample: 3,
            edge_threshold_ratio: 0.25,
            border_margin_ratio: 0.08,
            min_edge_density: 0.15,
            band_split_ratio: 0.45,
            aspect_ratio_min: 0.5,
            aspect_ratio_max: 2.5,
            min_span_ratio: 0.3,
            max_span_ratio: 0.95,
            area_ratio_min: 0.15,
            area_ratio_max: 0.9,
            jitter_tolerance: 0.10,
            scan_interval: Duration::from_millis(200),
            hide_grace: Duration::from_millis(500),
            refresh_interval: Duration::from_millis(16),
        }
    }
}

/// The per-cycle card-boundary detector: a pure function from one frame to at
/// most one geometrically plausible candidate rectangle.
pub struct DetectionPipeline {
    config: PipelineConfig,
}

impl DetectionPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one detection cycle over a frame.
    ///
    /// Returns the candidate bounding box in frame pixels, or `None` for every
    /// flavor of "nothing usable found": empty frame, blank scene, missing
    /// border lines, or a rectangle the validator rejects.
    pub fn detect(&self, frame: &FrameView<'_>) -> Option<BoundingBox> {
        // Stage 1: downsampled gradient magnitudes.
        let grid = estimate_gradient(frame, self.config.downsample)?;

        // Stage 2: adaptive binary edge mask.
        let mask = build_edge_mask(&grid, self.config.edge_threshold_ratio);

        // Stage 3: one candidate line per side.
        let lines = scan_border_lines(&mask, self.config.downsample, &self.config);
        let (top, bottom, left, right) = lines.complete()?;

        // Stage 4: geometric gatekeeping.
        let bounds = validate_bounds(
            top,
            bottom,
            left,
            right,
            frame.width(),
            frame.height(),
            &self.config,
        );
        if let Some(bounds) = bounds {
            log::debug!(
                "candidate bounds x={} y={} w={} h={}",
                bounds.x,
                bounds.y,
                bounds.width,
                bounds.height
            );
        }
        bounds
    }
}
