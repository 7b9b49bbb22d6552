// The internal analysis stack, leaf to root: frames in, tracked bounds out.
// `pipeline` and `session` compose these; external consumers should prefer the
// re-exports in `lib.rs`.

pub mod bounds;
pub mod edge_map;
pub mod frame;
pub mod gradient;
pub mod line_scanner;
pub mod tracker;
