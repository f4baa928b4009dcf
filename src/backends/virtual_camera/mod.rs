// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera that replays a still image
//!
//! Stands in for camera hardware on machines without one, and in tests.
//! The image is delivered over and over at a fixed frame rate, each time
//! with a fresh sequence number and capture timestamp, exactly as a real
//! stream would push frames into its sink.

mod file_source;

pub use file_source::load_image_as_raw_frame;

use crate::backends::camera::CameraStream;
use crate::backends::camera::frame_loop::{CaptureLoopController, LoopAction};
use crate::backends::camera::types::{BackendError, BackendResult, RawFrame};
use crate::constants::virtual_camera::IMAGE_STREAM_FRAME_DURATION;
use crate::frame_processor::capture::FrameSink;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A [`CameraStream`] that repeatedly delivers one frame
pub struct StillImageStream {
    frame: RawFrame,
    interval: Duration,
    frame_limit: Option<u64>,
    worker: Option<CaptureLoopController>,
}

impl StillImageStream {
    /// Stream an already decoded frame
    pub fn new(frame: RawFrame) -> Self {
        Self {
            frame,
            interval: IMAGE_STREAM_FRAME_DURATION,
            frame_limit: None,
            worker: None,
        }
    }

    /// Stream the contents of an image file
    pub fn open(path: &Path) -> BackendResult<Self> {
        Ok(Self::new(load_image_as_raw_frame(path)?))
    }

    /// Set the delay between frames
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop on its own after delivering `limit` frames
    pub fn with_frame_limit(mut self, limit: u64) -> Self {
        self.frame_limit = Some(limit);
        self
    }

    /// Dimensions of the frames this stream delivers
    pub fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }
}

impl CameraStream for StillImageStream {
    fn start(&mut self, sink: FrameSink) -> BackendResult<()> {
        if self.is_running() {
            return Err(BackendError::AlreadyRunning);
        }
        // Reap a worker that ended by reaching its frame limit
        self.worker = None;

        let frame = self.frame.clone();
        let interval = self.interval;
        let limit = self.frame_limit;

        info!(
            width = frame.width,
            height = frame.height,
            interval_ms = interval.as_millis(),
            "Starting still image stream"
        );

        let worker = CaptureLoopController::start_with_init(
            "still-image",
            || Ok(0u64),
            move |sequence: &mut u64| {
                *sequence += 1;
                let mut next = frame.clone().with_sequence(*sequence);
                next.captured_at = Instant::now();
                sink.deliver(next);

                if limit.is_some_and(|limit| *sequence >= limit) {
                    debug!(delivered = *sequence, "Still image stream reached frame limit");
                    return LoopAction::Stop;
                }

                std::thread::sleep(interval);
                LoopAction::Continue
            },
        )?;

        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
            info!("Still image stream stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_running())
    }
}
