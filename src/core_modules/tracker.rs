// THEORY:
// The `tracker` module is the heart of the temporal layer. It adds "memory" to
// the otherwise stateless per-frame detection: raw candidates jitter with
// sensor noise and drop out for single frames, and forwarding them straight to
// the overlay would produce a flickering, vibrating highlight. The tracker
// converts that noisy stream into a stable box plus explicit hide timing.
//
// Key architectural principles:
// 1.  **Smoothing Over History**: Accepted candidates are kept in a short
//     bounded history (capacity 5) and the published box is their component-wise
//     mean. Five frames at the scan rate is enough to absorb lighting noise
//     without visibly lagging a deliberately moved card.
// 2.  **Hysteresis Against Micro-Jitter**: A freshly smoothed box only replaces
//     the stable box when it moves by more than 10% of the previous box in some
//     dimension. Below that the previous box is kept verbatim, so the overlay
//     is not redrawn at all for sub-threshold wobble.
// 3.  **Deferred Hiding**: Losing the candidate for one cycle (motion blur, a
//     hand crossing the lens) must not blank the overlay. An empty cycle clears
//     the history but only *requests* a hide; the driver schedules it after a
//     grace delay and asks `hide_if_due` at fire time. If any detection
//     refilled the history in between, the hide is a no-op. This
//     recheck-at-fire-time policy is what makes the scheduled hide cancellable
//     without cancellation plumbing.
// 4.  **No Clock Inside**: The tracker is a pure state machine; all timing
//     (scan throttle, grace delay) belongs to the session driver. That keeps
//     every property here unit-testable without a runtime.

use crate::core_modules::bounds::BoundingBox;
use std::collections::VecDeque;

/// How many accepted candidates the smoothing history retains.
const BOUNDS_HISTORY_CAPACITY: usize = 5;

/// What the session driver must do with the overlay after one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerUpdate {
    /// A new stable box was adopted; redraw the overlay with it.
    Redraw(BoundingBox),
    /// The candidate was within jitter tolerance; keep the overlay as drawn.
    Unchanged,
    /// No candidate, but a stable box is showing; schedule a deferred hide.
    ScheduleHide,
    /// No candidate and nothing is showing.
    Idle,
}

/// The persistent per-session tracking state: smoothing history plus the
/// currently displayed stable box.
#[derive(Debug, Default)]
pub struct BoundsTracker {
    history: VecDeque<BoundingBox>,
    stable: Option<BoundingBox>,
    jitter_tolerance: f64,
}

impl BoundsTracker {
    pub fn new(jitter_tolerance: f64) -> Self {
        Self {
            history: VecDeque::with_capacity(BOUNDS_HISTORY_CAPACITY),
            stable: None,
            jitter_tolerance,
        }
    }

    /// The currently displayed box, if any.
    pub fn stable_bounds(&self) -> Option<BoundingBox> {
        self.stable
    }

    /// Feeds one cycle's outcome into the tracker and reports what the
    /// overlay should do.
    pub fn observe(&mut self, candidate: Option<BoundingBox>) -> TrackerUpdate {
        match candidate {
            Some(bounds) => {
                self.history.push_back(bounds);
                if self.history.len() > BOUNDS_HISTORY_CAPACITY {
                    self.history.pop_front();
                }

                let smoothed = self.smoothed();
                match self.stable {
                    Some(previous) if !self.exceeds_jitter(&previous, &smoothed) => {
                        TrackerUpdate::Unchanged
                    }
                    _ => {
                        self.stable = Some(smoothed);
                        TrackerUpdate::Redraw(smoothed)
                    }
                }
            }
            None => {
                self.history.clear();
                if self.stable.is_some() {
                    TrackerUpdate::ScheduleHide
                } else {
                    TrackerUpdate::Idle
                }
            }
        }
    }

    /// Called when a scheduled hide fires. Hides (clears the stable box and
    /// returns true) only if no detection repopulated the history since the
    /// hide was scheduled; otherwise the hide was superseded and is a no-op.
    pub fn hide_if_due(&mut self) -> bool {
        if self.history.is_empty() && self.stable.is_some() {
            self.stable = None;
            true
        } else {
            false
        }
    }

    /// Drops all state; used on session start and stop.
    pub fn reset(&mut self) {
        self.history.clear();
        self.stable = None;
    }

    /// Component-wise arithmetic mean of the history, rounded to pixels.
    /// Only called with a non-empty history.
    fn smoothed(&self) -> BoundingBox {
        let count = self.history.len() as f64;
        let mut sums = [0.0f64; 4];
        for bounds in &self.history {
            sums[0] += bounds.x as f64;
            sums[1] += bounds.y as f64;
            sums[2] += bounds.width as f64;
            sums[3] += bounds.height as f64;
        }
        BoundingBox {
            x: (sums[0] / count).round() as u32,
            y: (sums[1] / count).round() as u32,
            width: (sums[2] / count).round() as u32,
            height: (sums[3] / count).round() as u32,
        }
    }

    /// Whether `next` differs from `previous` by more than the tolerance in
    /// any dimension. Horizontal deltas are normalized by the previous width,
    /// vertical deltas by the previous height.
    fn exceeds_jitter(&self, previous: &BoundingBox, next: &BoundingBox) -> bool {
        let width = previous.width as f64;
        let height = previous.height as f64;
        let deltas = [
            (next.x as f64 - previous.x as f64).abs() / width,
            (next.y as f64 - previous.y as f64).abs() / height,
            (next.width as f64 - previous.width as f64).abs() / width,
            (next.height as f64 - previous.height as f64).abs() / height,
        ];
        deltas.iter().any(|delta| *delta > self.jitter_tolerance)
    }
}
