// THEORY:
// The `bounds` module owns the crate's central data type, `BoundingBox`, and
// the geometric gatekeeping that turns four raw border lines into a candidate
// rectangle or nothing.
//
// Key architectural principles:
// 1.  **Absence Is Explicit**: There is no such thing as an empty or zero-sized
//     box. Every constructed `BoundingBox` has positive width and height; "no
//     card this cycle" is always `None`. Downstream code never needs a
//     degenerate-box check.
// 2.  **All Checks Or Nothing**: The validator is a chain of plausibility
//     filters (orientation, aspect ratio, minimum size, maximum size, area
//     share) and every one must pass. Each filter targets a distinct failure
//     mode seen in practice: inverted line pairs, text lines mistaken for
//     borders, distant cards, and the frame border itself.
// 3.  **Rejection Is Routine**: A failed validation is an expected, frequent,
//     benign outcome (the operator is still aiming the camera). It is not an
//     error and is never logged above debug level by callers.

use crate::pipeline::PipelineConfig;

/// An axis-aligned rectangle in original-frame pixel coordinates.
///
/// Invariant: `width > 0 && height > 0`. Construction sites guarantee it;
/// absence of a detection is represented by `Option::None`, never by a
/// zero-sized box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Validates four border lines against the frame geometry, producing a
/// candidate rectangle or rejecting the set.
pub fn validate_bounds(
    top: u32,
    bottom: u32,
    left: u32,
    right: u32,
    frame_width: u32,
    frame_height: u32,
    config: &PipelineConfig,
) -> Option<BoundingBox> {
    // 1. Non-degenerate rectangle.
    if bottom <= top || right <= left {
        return None;
    }
    let width = (right - left) as f64;
    let height = (bottom - top) as f64;
    let frame_w = frame_width as f64;
    let frame_h = frame_height as f64;

    // 2. Card-like aspect ratio, with margin for tilted framing.
    let aspect = width / height;
    if !(config.aspect_ratio_min..=config.aspect_ratio_max).contains(&aspect) {
        return None;
    }

    // 3. Not implausibly small relative to the frame.
    if width < frame_w * config.min_span_ratio || height < frame_h * config.min_span_ratio {
        return None;
    }

    // 4. Not the frame itself.
    if width > frame_w * config.max_span_ratio || height > frame_h * config.max_span_ratio {
        return None;
    }

    // 5. Plausible share of the frame area.
    let area_ratio = (width * height) / (frame_w * frame_h);
    if !(config.area_ratio_min..=config.area_ratio_max).contains(&area_ratio) {
        return None;
    }

    Some(BoundingBox {
        x: left,
        y: top,
        width: (right - left),
        height: (bottom - top),
    })
}
