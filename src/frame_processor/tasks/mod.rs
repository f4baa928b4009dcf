// SPDX-License-Identifier: GPL-3.0-only

//! Code detector implementations

pub mod qr_detector;

pub use qr_detector::QrDetector;
