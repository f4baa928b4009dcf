// SPDX-License-Identifier: GPL-3.0-only

//! Single-slot holder for the most recent camera frame
//!
//! The capture producer overwrites the slot at camera frame rate and the
//! decode coordinator reads it on demand. There is no queue and no history.
//! Frames are immutable and stored behind an `Arc`, so a write is a pointer
//! swap and a read is a reference-count increment; neither side can observe
//! a partially written frame.

use crate::backends::camera::types::CameraFrame;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Thread-safe, overwrite-on-arrival frame slot
#[derive(Debug, Default)]
pub struct FrameBuffer {
    slot: Mutex<Option<Arc<CameraFrame>>>,
    writes: AtomicU64,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, replacing whatever was there
    pub fn set(&self, frame: CameraFrame) {
        self.set_shared(Arc::new(frame));
    }

    /// Store an already shared frame, replacing whatever was there
    pub fn set_shared(&self, frame: Arc<CameraFrame>) {
        // Swap under the lock, drop the previous frame after releasing it
        let previous = self.lock().replace(frame);
        self.writes.fetch_add(1, Ordering::Relaxed);
        drop(previous);
    }

    /// Snapshot of the most recent frame, or `None` if nothing was stored
    pub fn get(&self) -> Option<Arc<CameraFrame>> {
        self.lock().clone()
    }

    /// Return to the empty state
    pub fn clear(&self) {
        let previous = self.lock().take();
        drop(previous);
    }

    /// Check if the buffer currently holds no frame
    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    /// Number of frames stored since creation
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<CameraFrame>>> {
        // The slot only ever holds a complete Arc, so a poisoned lock is
        // still consistent
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
