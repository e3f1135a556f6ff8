use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::grab::frame::{self, PixelBuffer};
use crate::grab::source::FrameSource;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_PREFIX: &str = "SNAPSHOT_";

/// Periodically captures a frame from the source and writes it to disk as
/// a PNG named `{prefix}{index}.png`.
///
/// The grab buffer and the export image are allocated once and reused for
/// every iteration. A capture failure aborts the loop; a failed PNG write
/// is reported as a warning and sampling continues.
pub struct Sampler<S: FrameSource> {
    source: S,
    frame: PixelBuffer,
    image: RgbaImage,
    prefix: String,
    interval: Duration,
    index: u64,
}

impl<S: FrameSource> Sampler<S> {
    pub fn new(source: S, prefix: impl Into<String>, interval: Duration) -> Self {
        let (width, height) = source.dimensions();
        Self {
            frame: PixelBuffer::new(width, height),
            image: RgbaImage::new(width, height),
            source,
            prefix: prefix.into(),
            interval,
            index: 0,
        }
    }

    /// Index of the next snapshot to be written. Starts at 0 and advances
    /// once per iteration, never reset.
    pub fn frame_index(&self) -> u64 {
        self.index
    }

    /// Run until `running` reads false. The flag is polled at the top of
    /// each iteration only, so an in-flight capture/export always
    /// completes before the loop exits. Returns the number of completed
    /// iterations.
    pub fn run(&mut self, running: &AtomicBool) -> Result<u64> {
        let mut completed = 0u64;
        while running.load(Ordering::SeqCst) {
            self.sample_once()?;
            completed += 1;

            // No drift correction: the period is interval + work time.
            thread::sleep(self.interval);
        }
        Ok(completed)
    }

    fn sample_once(&mut self) -> Result<()> {
        self.source
            .capture_into(&mut self.frame)
            .context("frame capture failed")?;

        // The export image keeps its own row stride; query it instead of
        // assuming it matches the grab buffer.
        let row_bytes = self.frame.stride();
        let rows = self.frame.height() as usize;
        let samples = self.image.as_flat_samples_mut();
        let dst_stride = samples.layout.height_stride;
        frame::copy_rows(
            self.frame.as_bytes(),
            self.frame.stride(),
            samples.samples,
            dst_stride,
            row_bytes,
            rows,
        )?;

        let path = self.output_path();
        if let Err(e) = self.image.save(&path) {
            eprintln!("Warning: failed to write {}: {}", path.display(), e);
        }
        self.index += 1;
        Ok(())
    }

    fn output_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}.png", self.prefix, self.index))
    }
}
