#![allow(dead_code)]

use card_vision::FrameBuffer;
use image::{Rgba, RgbaImage};

/// A uniform mid-gray frame: no gradients, no card.
pub fn uniform_frame(width: u32, height: u32) -> FrameBuffer {
    let image = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
    FrameBuffer {
        width,
        height,
        data: image.into_raw(),
    }
}

/// A mid-gray frame with a sharp-edged bright rectangle, standing in for a
/// well-lit card against a desk.
pub fn card_frame(
    width: u32,
    height: u32,
    card_x: u32,
    card_y: u32,
    card_w: u32,
    card_h: u32,
) -> FrameBuffer {
    let mut image = RgbaImage::from_pixel(width, height, Rgba([128, 128, 128, 255]));
    for y in card_y..card_y + card_h {
        for x in card_x..card_x + card_w {
            image.put_pixel(x, y, Rgba([245, 245, 245, 255]));
        }
    }
    FrameBuffer {
        width,
        height,
        data: image.into_raw(),
    }
}
