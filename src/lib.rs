// SPDX-License-Identifier: GPL-3.0-only

//! QR Scanner - on-demand QR code scanning and generation
//!
//! This library provides the core of a camera-based code scanner: a live
//! frame pipeline that always holds the most recent upright frame, a decode
//! coordinator that scans that frame when asked, and a QR code generator.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Camera stream abstraction, frame types and conversion
//! - [`frame_processor`]: Frame buffer, capture producer, decode coordination
//! - [`pipelines`]: QR code generation
//! - [`config`]: User configuration handling
//! - [`errors`]: Error types
//!
//! # Example
//!
//! ```ignore
//! let buffer = Arc::new(FrameBuffer::new());
//! let mut producer = CaptureProducer::new(Arc::clone(&buffer), SensorRotation::Rotate90);
//! producer.start()?;
//! camera.start(producer.sink())?;
//!
//! let coordinator = DecodeCoordinator::new(buffer, Arc::new(QrDetector::new()), None);
//! if let Some(result) = coordinator.decode_once().await {
//!     println!("{}", result.message());
//! }
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod frame_processor;
pub mod pipelines;

// Re-export commonly used types
pub use backends::camera::{CameraFrame, CameraStream, PixelFormat, RawFrame, SensorRotation};
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use frame_processor::{
    CaptureProducer, CodeDetector, DecodeCoordinator, DecodeResult, FrameBuffer, QrDetector,
    Symbology,
};
pub use pipelines::{CodeGenerator, CorrectionLevel, GeneratedCode};
