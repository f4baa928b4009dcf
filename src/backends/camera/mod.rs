// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend abstraction
//!
//! A camera backend pushes raw frames into a [`FrameSink`] from whatever
//! callback or thread its platform delivers them on. The sink is the only
//! thing a backend knows about the rest of the scanner.
//!
//! ```text
//! ┌──────────────────────┐
//! │ Camera hardware      │  ← frame-ready callback, tens of fps
//! └──────────┬───────────┘
//!            │ FrameSink::deliver (never blocks)
//!            ▼
//! ┌──────────────────────┐
//! │ CaptureProducer      │  ← convert + rotate on its own worker
//! └──────────┬───────────┘
//!            │ FrameBuffer::set
//!            ▼
//! ┌──────────────────────┐
//! │ FrameBuffer          │  ← single slot, read by the decode coordinator
//! └──────────────────────┘
//! ```

pub mod format_converters;
pub mod frame_loop;
pub mod types;

pub use types::*;

use crate::frame_processor::capture::FrameSink;

/// A continuous source of raw camera frames
///
/// Implementations register exactly one sink and call
/// [`FrameSink::deliver`] for every frame the hardware produces. Delivery
/// must return promptly; the sink takes care of discarding frames that the
/// rest of the pipeline cannot keep up with.
pub trait CameraStream: Send {
    /// Start delivering frames into `sink`
    ///
    /// Fails with [`BackendError::AlreadyRunning`] if the stream is active.
    fn start(&mut self, sink: FrameSink) -> BackendResult<()>;

    /// Stop delivering frames and release the sink
    fn stop(&mut self);

    /// Check if the stream is currently delivering frames
    fn is_running(&self) -> bool;
}
