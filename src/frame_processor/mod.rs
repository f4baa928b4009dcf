// SPDX-License-Identifier: GPL-3.0-only

//! Frame processing for on-demand code scanning
//!
//! Frames flow from a camera stream through the capture producer into a
//! single-slot frame buffer. A decode trigger snapshots that buffer and
//! hands the frame to a code detector. Capture never waits on decoding
//! and decoding never waits on capture.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │ CameraStream │ ──▶ │ CaptureProducer  │ ──▶ │ FrameBuffer │
//! │  (RawFrame)  │     │  - convert RGBA  │     │ (latest     │
//! │              │     │  - rotate        │     │  frame)     │
//! └──────────────┘     └──────────────────┘     └──────┬──────┘
//!                                                      │ get()
//!                      ┌──────────────────┐     ┌──────▼──────┐
//!                      │   CodeDetector   │ ◀── │   Decode    │
//!                      │ (blocking pool)  │     │ Coordinator │
//!                      └──────────────────┘     └─────────────┘
//! ```

pub mod capture;
pub mod coordinator;
pub mod detector;
pub mod frame_buffer;
pub mod tasks;
pub mod types;

pub use capture::{CaptureProducer, CaptureStats, FrameSink};
pub use coordinator::DecodeCoordinator;
pub use detector::CodeDetector;
pub use frame_buffer::FrameBuffer;
pub use tasks::QrDetector;
pub use types::{DecodeResult, Symbology};
