// SPDX-License-Identifier: GPL-3.0-only

//! Output pipelines
//!
//! - [`generator`]: text to QR code image, with PNG export

pub mod generator;

pub use generator::{CodeGenerator, CorrectionLevel, GeneratedCode};
