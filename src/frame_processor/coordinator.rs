// SPDX-License-Identifier: GPL-3.0-only

//! On-demand decode coordination
//!
//! A trigger (a shutter button, a CLI command) calls
//! [`DecodeCoordinator::decode_once`]. The coordinator snapshots the frame
//! buffer, runs the detector on the blocking pool and reports a
//! [`DecodeResult`]. At most one decode is in flight; triggers that arrive
//! while one is running are ignored rather than queued.

use super::detector::CodeDetector;
use super::frame_buffer::FrameBuffer;
use super::types::DecodeResult;
use crate::constants::scanner::MAX_ABANDONED_DETECTIONS;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Serializes decode requests against the latest captured frame
pub struct DecodeCoordinator {
    buffer: Arc<FrameBuffer>,
    detector: Arc<dyn CodeDetector>,
    timeout: Option<Duration>,
    decoding: AtomicBool,
    /// Detector calls currently running on the blocking pool
    detecting: Arc<AtomicUsize>,
}

/// Releases the in-flight flag when a decode finishes or is abandoned
struct DecodingGuard<'a>(&'a AtomicBool);

impl Drop for DecodingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts one running detector call, dropped when the call returns
struct DetectionCount(Arc<AtomicUsize>);

impl DetectionCount {
    fn claim(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(Arc::clone(count))
    }
}

impl Drop for DetectionCount {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl DecodeCoordinator {
    /// Create a coordinator reading from `buffer`
    ///
    /// With `timeout` set, a decode that runs longer is reported as failed
    /// and the coordinator accepts new triggers again. The detector call
    /// itself cannot be interrupted and finishes in the background; while
    /// too many of those are still running, triggers fail without starting
    /// another.
    pub fn new(
        buffer: Arc<FrameBuffer>,
        detector: Arc<dyn CodeDetector>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            buffer,
            detector,
            timeout,
            decoding: AtomicBool::new(false),
            detecting: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Check if a decode is currently in flight
    pub fn is_decoding(&self) -> bool {
        self.decoding.load(Ordering::Acquire)
    }

    /// Detector calls abandoned by a timeout that have not returned yet
    pub fn abandoned_detections(&self) -> usize {
        let running = self.detecting.load(Ordering::Acquire);
        if self.is_decoding() {
            running.saturating_sub(1)
        } else {
            running
        }
    }

    /// Decode the most recent frame
    ///
    /// Returns `None` if another decode is still outstanding; the trigger is
    /// ignored and the detector is not invoked.
    pub async fn decode_once(&self) -> Option<DecodeResult> {
        if self
            .decoding
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Decode already in progress, ignoring trigger");
            return None;
        }
        let _guard = DecodingGuard(&self.decoding);

        let Some(frame) = self.buffer.get() else {
            debug!("Decode triggered before any frame was captured");
            return Some(DecodeResult::no_frame());
        };

        // No decode is in flight here, so every running call was abandoned
        let abandoned = self.detecting.load(Ordering::Acquire);
        if abandoned >= MAX_ABANDONED_DETECTIONS {
            warn!(abandoned, "Detector unresponsive, refusing new decode");
            return Some(DecodeResult::Failed(format!(
                "detector unresponsive, {} timed-out detections still running",
                abandoned
            )));
        }
        if abandoned > 0 {
            warn!(abandoned, "Timed-out detections still running");
        }

        let start = Instant::now();
        let sequence = frame.sequence;
        let detector = Arc::clone(&self.detector);
        let count = DetectionCount::claim(&self.detecting);
        let task = tokio::task::spawn_blocking(move || {
            let _count = count;
            detector.detect(&frame)
        });

        let joined = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(
                        sequence,
                        timeout_ms = limit.as_millis(),
                        "Detection timed out"
                    );
                    return Some(DecodeResult::Failed(format!(
                        "detection timed out after {} ms",
                        limit.as_millis()
                    )));
                }
            },
            None => task.await,
        };

        let result = match joined {
            Ok(Ok(Some(payload))) => DecodeResult::Payload(payload),
            Ok(Ok(None)) => DecodeResult::NotFound,
            Ok(Err(e)) => {
                debug!(sequence, error = %e, "Detector reported an error");
                DecodeResult::Failed(e.to_string())
            }
            Err(e) => {
                warn!(sequence, error = %e, "Detection task failed");
                DecodeResult::Failed(format!("detection task failed: {}", e))
            }
        };

        info!(
            sequence,
            elapsed_ms = start.elapsed().as_millis(),
            found = result.payload().is_some(),
            "Decode finished"
        );

        Some(result)
    }
}
