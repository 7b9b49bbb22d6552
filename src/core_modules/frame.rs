// THEORY:
// The `frame` module is the input boundary of the detection engine. Everything
// upstream of it (camera drivers, capture surfaces, permission prompts) lives in
// external collaborators; everything downstream assumes a single canonical pixel
// layout. This module is where that assumption is enforced.
//
// Key architectural principles:
// 1.  **One Canonical Layout**: Frames are interleaved 4-channel bytes (RGBA),
//     row-major, with no padding between rows. A buffer that does not match its
//     declared dimensions is the only hard error in the whole crate and is
//     rejected at construction time. Downstream code never re-validates.
// 2.  **Borrow, Don't Copy**: `FrameView` borrows the capture collaborator's
//     buffer for the duration of one detection cycle. The detector only reads.
//     `FrameBuffer` is the owned counterpart used to hand a frame across the
//     `FrameSource` boundary between tasks.
// 3.  **Luma At The Source**: The per-pixel luma used by the gradient stage is
//     the unweighted mean of the three color channels. That is deliberately not
//     a Rec. 601 weighting; the downstream thresholds are tuned against it.

use image::RgbaImage;
use thiserror::Error;

/// Bytes per pixel in the canonical interleaved RGBA layout.
pub const BYTES_PER_PIXEL: usize = 4;

/// Errors raised at the frame input boundary.
///
/// This is the only error type in the crate: past a validly shaped frame, every
/// anomalous outcome degrades to "no detection this cycle" instead of failing.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The pixel buffer does not match the declared dimensions.
    #[error("frame buffer holds {actual} bytes but {width}x{height} RGBA requires {expected}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A read-only view of one RGBA video frame.
///
/// Owned by the capture collaborator; borrowed by the detector for exactly one
/// detection cycle. Zero-area views are legal and simply yield no detection.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> FrameView<'a> {
    /// Wraps a raw interleaved RGBA buffer, validating its size.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Adapts an `image::RgbaImage`, which guarantees the canonical layout.
    pub fn from_rgba(image: &'a RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw(),
        }
    }

    /// The frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the frame has no area (capture surface not yet ready).
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Luma of the pixel at `(x, y)`: the unweighted mean of R, G and B.
    ///
    /// Callers must stay in bounds; every stage derives its coordinates from
    /// the dimensions reported by this view.
    pub fn luma(&self, x: u32, y: u32) -> f32 {
        let index = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        let pixel = &self.data[index..index + 3];
        (pixel[0] as f32 + pixel[1] as f32 + pixel[2] as f32) / 3.0
    }
}

/// An owned RGBA frame, used to move a snapshot across the `FrameSource`
/// boundary between the capture collaborator and the session task.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl FrameBuffer {
    /// Borrows this buffer as a validated `FrameView`.
    pub fn view(&self) -> Result<FrameView<'_>, FrameError> {
        FrameView::new(self.width, self.height, &self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_buffer(width: u32, height: u32, value: u8) -> Vec<u8> {
        vec![value; width as usize * height as usize * BYTES_PER_PIXEL]
    }

    #[test]
    fn accepts_matching_buffer() {
        let data = solid_buffer(4, 3, 10);
        let frame = FrameView::new(4, 3, &data).unwrap();
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 3);
        assert!(!frame.is_empty());
    }

    #[test]
    fn rejects_short_buffer() {
        let data = solid_buffer(4, 3, 10);
        let err = FrameView::new(5, 3, &data).unwrap_err();
        match err {
            FrameError::BufferSize {
                expected, actual, ..
            } => {
                assert_eq!(expected, 60);
                assert_eq!(actual, 48);
            }
        }
    }

    #[test]
    fn zero_area_frame_is_empty_not_an_error() {
        let frame = FrameView::new(0, 0, &[]).unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn luma_is_unweighted_channel_mean() {
        let mut data = solid_buffer(2, 1, 0);
        data[0] = 30; // R
        data[1] = 60; // G
        data[2] = 90; // B
        data[3] = 255; // alpha is ignored
        let frame = FrameView::new(2, 1, &data).unwrap();
        assert_eq!(frame.luma(0, 0), 60.0);
        assert_eq!(frame.luma(1, 0), 0.0);
    }

    #[test]
    fn adapts_rgba_image() {
        let image = RgbaImage::from_pixel(6, 5, image::Rgba([12, 24, 36, 255]));
        let frame = FrameView::from_rgba(&image);
        assert_eq!(frame.width(), 6);
        assert_eq!(frame.height(), 5);
        assert_eq!(frame.luma(3, 2), 24.0);
    }

    #[test]
    fn frame_buffer_round_trips_to_view() {
        let buffer = FrameBuffer {
            width: 3,
            height: 3,
            data: solid_buffer(3, 3, 7),
        };
        assert!(buffer.view().is_ok());

        let bad = FrameBuffer {
            width: 3,
            height: 3,
            data: vec![0; 5],
        };
        assert!(bad.view().is_err());
    }
}
