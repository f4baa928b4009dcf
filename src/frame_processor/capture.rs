// SPDX-License-Identifier: GPL-3.0-only

//! Capture producer
//!
//! Turns the camera's raw frame stream into canonical frames in the
//! [`FrameBuffer`]. The camera callback only touches a single pending slot
//! through [`FrameSink::deliver`]; conversion and rotation run on the
//! producer's own worker thread. When the worker falls behind, the oldest
//! undelivered raw frame is overwritten, so backlog never exceeds one frame.

use super::frame_buffer::FrameBuffer;
use crate::backends::camera::format_converters;
use crate::backends::camera::frame_loop::{CaptureLoopController, LoopAction};
use crate::backends::camera::types::{BackendError, BackendResult, RawFrame, SensorRotation};
use crate::constants::capture::{FRAME_LOG_INTERVAL, WORKER_POLL_INTERVAL};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Counters describing what happened to delivered frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Raw frames handed to the sink
    pub delivered: u64,
    /// Frames converted and stored in the frame buffer
    pub published: u64,
    /// Raw frames overwritten before the worker picked them up
    pub dropped: u64,
    /// Raw frames that failed conversion and were skipped
    pub conversion_failures: u64,
}

#[derive(Debug, Default)]
struct CaptureCounters {
    delivered: AtomicU64,
    published: AtomicU64,
    dropped: AtomicU64,
    conversion_failures: AtomicU64,
}

impl CaptureCounters {
    fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            conversion_failures: self.conversion_failures.load(Ordering::Relaxed),
        }
    }
}

/// Hand-off slot between the camera callback and the producer worker
#[derive(Debug, Default)]
struct PendingSlot {
    frame: Mutex<Option<RawFrame>>,
    ready: Condvar,
}

impl PendingSlot {
    /// Put `raw` in the slot, returning the frame it displaced
    fn put(&self, raw: RawFrame) -> Option<RawFrame> {
        let displaced = self
            .frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .replace(raw);
        self.ready.notify_one();
        displaced
    }

    /// Take the pending frame, waiting up to `timeout` for one to arrive
    fn take_timeout(&self, timeout: Duration) -> Option<RawFrame> {
        let guard = self
            .frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let (mut guard, _) = self
            .ready
            .wait_timeout_while(guard, timeout, |frame| frame.is_none())
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.take()
    }

    fn clear(&self) -> Option<RawFrame> {
        self.frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

/// The callback handle a camera stream pushes raw frames into
///
/// Cloning is cheap; all clones feed the same producer.
#[derive(Debug, Clone)]
pub struct FrameSink {
    pending: Arc<PendingSlot>,
    counters: Arc<CaptureCounters>,
}

impl FrameSink {
    /// Hand a raw frame to the producer
    ///
    /// Never waits for conversion. If the previous frame has not been picked
    /// up yet it is discarded in favor of this one.
    pub fn deliver(&self, raw: RawFrame) {
        self.counters.delivered.fetch_add(1, Ordering::Relaxed);

        if let Some(displaced) = self.pending.put(raw) {
            let dropped = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            if dropped % FRAME_LOG_INTERVAL == 1 {
                debug!(
                    dropped,
                    sequence = displaced.sequence,
                    "Capture worker behind, dropping stale frame"
                );
            }
        }
    }
}

/// Converts raw camera frames and publishes them to the frame buffer
pub struct CaptureProducer {
    buffer: Arc<FrameBuffer>,
    rotation: SensorRotation,
    pending: Arc<PendingSlot>,
    counters: Arc<CaptureCounters>,
    worker: Option<CaptureLoopController>,
}

impl CaptureProducer {
    /// Create a producer that publishes into `buffer`
    ///
    /// `rotation` is the clockwise rotation that turns the sensor's native
    /// frames upright.
    pub fn new(buffer: Arc<FrameBuffer>, rotation: SensorRotation) -> Self {
        Self {
            buffer,
            rotation,
            pending: Arc::new(PendingSlot::default()),
            counters: Arc::new(CaptureCounters::default()),
            worker: None,
        }
    }

    /// The sink to register with a camera stream
    pub fn sink(&self) -> FrameSink {
        FrameSink {
            pending: Arc::clone(&self.pending),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Start the worker that drains the sink
    pub fn start(&mut self) -> BackendResult<()> {
        if self.is_running() {
            return Err(BackendError::AlreadyRunning);
        }

        let pending = Arc::clone(&self.pending);
        let buffer = Arc::clone(&self.buffer);
        let counters = Arc::clone(&self.counters);
        let rotation = self.rotation;

        info!(rotation = %rotation, "Starting capture producer");

        let worker = CaptureLoopController::start("capture-producer", move || {
            if let Some(raw) = pending.take_timeout(WORKER_POLL_INTERVAL) {
                publish(&raw, rotation, &buffer, &counters);
            }
            LoopAction::Continue
        })?;

        self.worker = Some(worker);
        Ok(())
    }

    /// Stop the worker and discard any pending raw frame
    ///
    /// The last published frame stays in the frame buffer.
    pub fn stop(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.stop();
            let stats = self.stats();
            info!(
                published = stats.published,
                dropped = stats.dropped,
                failures = stats.conversion_failures,
                "Capture producer stopped"
            );
        }
        self.pending.clear();
    }

    /// Check if the worker is running
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| w.is_running())
    }

    /// Convert and publish one raw frame on the calling thread
    ///
    /// Returns whether a frame was published. Conversion failures are
    /// counted and skipped.
    pub fn process(&self, raw: &RawFrame) -> bool {
        publish(raw, self.rotation, &self.buffer, &self.counters)
    }

    /// Snapshot of the capture counters
    pub fn stats(&self) -> CaptureStats {
        self.counters.snapshot()
    }
}

fn publish(
    raw: &RawFrame,
    rotation: SensorRotation,
    buffer: &FrameBuffer,
    counters: &CaptureCounters,
) -> bool {
    match format_converters::to_canonical(raw, rotation) {
        Ok(frame) => {
            let published = counters.published.fetch_add(1, Ordering::Relaxed) + 1;
            if published % FRAME_LOG_INTERVAL == 0 {
                trace!(
                    published,
                    sequence = frame.sequence,
                    width = frame.width,
                    height = frame.height,
                    latency_us = frame.captured_at.elapsed().as_micros(),
                    "Published frame"
                );
            }
            buffer.set(frame);
            true
        }
        Err(e) => {
            counters.conversion_failures.fetch_add(1, Ordering::Relaxed);
            debug!(sequence = raw.sequence, error = %e, "Skipping frame that failed conversion");
            false
        }
    }
}
