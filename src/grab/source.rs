use anyhow::{bail, Result};

use crate::grab::flags;
use crate::grab::frame::PixelBuffer;

/// Contract between the sampling loop and whatever produces frames.
///
/// A source is configured once with its dimensions and an opaque flag mask;
/// `capture_into` blocks until a frame is available and overwrites the
/// caller's buffer. The buffer must match the configured dimensions.
pub trait FrameSource {
    fn dimensions(&self) -> (u32, u32);

    fn set_flags(&mut self, flags: u32);

    fn capture_into(&mut self, frame: &mut PixelBuffer) -> Result<()>;
}

/// Built-in source that renders a deterministic test pattern.
///
/// Stands in for display hardware so the probe runs everywhere: a red/green
/// gradient with a sweep line that advances one row per capture, so
/// consecutive snapshots are visibly different. Rotation, flip and
/// red/blue-swap flag bits are applied to the finished frame; the
/// SNAPSHOT_* bits are accepted and ignored since there is no YUV or
/// packing path here.
pub struct TestPatternSource {
    width: u32,
    height: u32,
    flags: u32,
    tick: u64,
    warned_rotation: bool,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            flags: 0,
            tick: 0,
            warned_rotation: false,
        }
    }

    fn fill_pattern(&self, frame: &mut PixelBuffer) {
        for y in 0..self.height {
            for x in 0..self.width {
                frame.set_pixel(x, y, pattern_pixel(x, y, self.width, self.height, self.tick));
            }
        }
    }

    fn apply_flags(&mut self, frame: &mut PixelBuffer) -> Result<()> {
        match self.flags & flags::ROTATION_MASK {
            flags::ROTATE_180 => frame.rotate_180(),
            code @ (flags::ROTATE_90 | flags::ROTATE_270) => {
                if self.width == self.height {
                    if code == flags::ROTATE_90 {
                        frame.rotate_90_cw()?;
                    } else {
                        frame.rotate_90_ccw()?;
                    }
                } else if !self.warned_rotation {
                    eprintln!(
                        "Warning: 90/270 degree rotation needs a square frame ({}x{}), ignoring",
                        self.width, self.height
                    );
                    self.warned_rotation = true;
                }
            }
            _ => {}
        }
        if self.flags & flags::FLIP_HORIZONTAL != 0 {
            frame.flip_horizontal();
        }
        if self.flags & flags::FLIP_VERTICAL != 0 {
            frame.flip_vertical();
        }
        if self.flags & flags::SNAPSHOT_SWAP_RED_BLUE != 0 {
            frame.swap_red_blue();
        }
        Ok(())
    }
}

impl FrameSource for TestPatternSource {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    fn capture_into(&mut self, frame: &mut PixelBuffer) -> Result<()> {
        if frame.width() != self.width || frame.height() != self.height {
            bail!(
                "frame buffer is {}x{} but the source is configured for {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
        }
        self.fill_pattern(frame);
        self.apply_flags(frame)?;
        self.tick = self.tick.wrapping_add(1);
        Ok(())
    }
}

fn pattern_pixel(x: u32, y: u32, width: u32, height: u32, tick: u64) -> [u8; 4] {
    // horizontal red ramp, vertical green ramp, blue cycles with the tick
    let r = if width > 1 {
        (x as u64 * 255 / (width as u64 - 1)) as u8
    } else {
        0
    };
    let g = if height > 1 {
        (y as u64 * 255 / (height as u64 - 1)) as u8
    } else {
        0
    };
    let b = (tick % 256) as u8;
    if y as u64 == tick % height as u64 {
        // sweep line
        [255, 255, b, 255]
    } else {
        [r, g, b, 255]
    }
}
