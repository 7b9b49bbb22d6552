// THEORY:
// This file is the main entry point for the `card_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (the capture/UI controller).
//
// The primary goal is to export the `DetectionSession` lifecycle, the
// `DetectionPipeline` for callers that drive their own cycles, and the
// associated data structures (`PipelineConfig`, `BoundingBox`, boundary
// traits). The staged internals live in `core_modules` and stay usable for
// advanced consumers, but the re-exports below are the supported surface.

pub mod core_modules;
pub mod pipeline;
pub mod session;

pub use crate::core_modules::bounds::BoundingBox;
pub use crate::core_modules::frame::{FrameBuffer, FrameError, FrameView};
pub use crate::core_modules::tracker::{BoundsTracker, TrackerUpdate};
pub use crate::pipeline::{DetectionPipeline, PipelineConfig};
pub use crate::session::{DetectionSession, FrameSource, OverlaySink};
