// Example runner for the `card_vision` library: wires a synthetic camera feed
// (a card sliding across a gray scene) into a short-lived detection session
// with a logging overlay. The library entry point is `src/lib.rs`.

use card_vision::{BoundingBox, DetectionSession, FrameBuffer, FrameSource, OverlaySink};
use image::{Rgba, RgbaImage};
use std::time::Duration;

const FRAME_WIDTH: u32 = 640;
const FRAME_HEIGHT: u32 = 480;

/// A fake camera: mid-gray scene with a sharp card drifting to the right a
/// little on every snapshot.
struct SyntheticCamera {
    card_x: u32,
}

impl FrameSource for SyntheticCamera {
    fn ready(&self) -> bool {
        true
    }

    fn snapshot(&mut self) -> Option<FrameBuffer> {
        let mut image = RgbaImage::from_pixel(FRAME_WIDTH, FRAME_HEIGHT, Rgba([128, 128, 128, 255]));
        for y in 80..260 {
            for x in self.card_x..self.card_x + 300 {
                image.put_pixel(x, y, Rgba([245, 245, 245, 255]));
            }
        }
        self.card_x = (self.card_x + 2).min(320);
        Some(FrameBuffer {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            data: image.into_raw(),
        })
    }
}

struct ConsoleOverlay;

impl OverlaySink for ConsoleOverlay {
    fn show(&mut self, bounds: BoundingBox, frame_width: u32, frame_height: u32) {
        println!(
            "overlay: card at x={} y={} w={} h={} (frame {}x{})",
            bounds.x, bounds.y, bounds.width, bounds.height, frame_width, frame_height
        );
    }

    fn hide(&mut self) {
        println!("overlay: hidden");
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();
    println!("card_vision example runner");

    let camera = SyntheticCamera { card_x: 100 };
    let mut session = DetectionSession::start(camera, ConsoleOverlay, Default::default());

    tokio::time::sleep(Duration::from_secs(3)).await;
    session.stop().await;
}
