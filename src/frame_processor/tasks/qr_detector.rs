// SPDX-License-Identifier: GPL-3.0-only

//! QR code detection task
//!
//! This module implements QR code detection using the rqrr crate.
//! It converts canonical RGBA frames to (optionally downscaled) grayscale,
//! searches for QR grids and returns the content of the first grid that
//! decodes. Grids are tried largest first so the result does not depend on
//! the order rqrr happens to report them in.

use crate::backends::camera::types::CameraFrame;
use crate::constants::scanner::MAX_DETECTION_DIMENSION;
use crate::errors::DetectionError;
use crate::frame_processor::detector::CodeDetector;
use crate::frame_processor::types::Symbology;
use std::cmp::Reverse;
use tracing::{debug, trace, warn};

/// Symbologies rqrr can decode
const SUPPORTED: &[Symbology] = &[Symbology::Qr];

/// QR code detector
///
/// Optimized for on-demand scans of camera frames: frames larger than the
/// maximum dimension are downscaled before detection.
#[derive(Debug, Clone)]
pub struct QrDetector {
    /// Maximum dimension for processing (frames are downscaled to this)
    max_dimension: u32,
    /// Requested symbologies this detector actually handles
    symbologies: Vec<Symbology>,
}

impl Default for QrDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl QrDetector {
    /// Create a new QR detector with default settings
    pub fn new() -> Self {
        Self::with_max_dimension(MAX_DETECTION_DIMENSION)
    }

    /// Create a QR detector with custom max dimension
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            symbologies: SUPPORTED.to_vec(),
        }
    }

    /// Create a detector for a requested symbology set
    ///
    /// Requested symbologies this detector cannot decode are logged and left
    /// out. The resulting set is fixed for the detector's lifetime.
    pub fn with_symbologies(max_dimension: u32, requested: &[Symbology]) -> Self {
        let (supported, unsupported): (Vec<Symbology>, Vec<Symbology>) = requested
            .iter()
            .copied()
            .partition(|s| SUPPORTED.contains(s));

        if !unsupported.is_empty() {
            let names: Vec<&str> = unsupported.iter().map(|s| s.display_name()).collect();
            warn!(
                unsupported = %names.join(", "),
                "Requested symbologies are not supported by the QR detector"
            );
        }

        Self {
            max_dimension: max_dimension.max(1),
            symbologies: supported,
        }
    }
}

impl CodeDetector for QrDetector {
    fn detect(&self, frame: &CameraFrame) -> Result<Option<String>, DetectionError> {
        if !self.symbologies.contains(&Symbology::Qr) {
            return Ok(None);
        }

        let expected = frame.width as usize * frame.height as usize * 4;
        if frame.width == 0 || frame.height == 0 || frame.data.len() < expected {
            return Err(DetectionError::new(format!(
                "frame buffer holds {} bytes, {}x{} RGBA needs {}",
                frame.data.len(),
                frame.width,
                frame.height,
                expected
            )));
        }

        Ok(detect_sync(frame, self.max_dimension))
    }

    fn symbologies(&self) -> &[Symbology] {
        &self.symbologies
    }
}

/// Synchronous QR detection (runs on the blocking pool)
fn detect_sync(frame: &CameraFrame, max_dimension: u32) -> Option<String> {
    let start = std::time::Instant::now();

    let (luma, width, height) = if frame.width > max_dimension || frame.height > max_dimension {
        let scale = (frame.width as f32 / max_dimension as f32)
            .max(frame.height as f32 / max_dimension as f32);
        let new_width = ((frame.width as f32 / scale) as u32).max(1);
        let new_height = ((frame.height as f32 / scale) as u32).max(1);
        (
            downscale_luma(frame, new_width, new_height),
            new_width,
            new_height,
        )
    } else {
        (rgba_to_luma(frame), frame.width, frame.height)
    };

    let conversion_time = start.elapsed();
    trace!(
        width,
        height,
        conversion_ms = conversion_time.as_millis(),
        "Prepared grayscale image for detection"
    );

    let w = width as usize;
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(w, height as usize, |x, y| luma[y * w + x]);
    let mut grids = prepared.detect_grids();

    // Largest first, then leftmost, then topmost
    grids.sort_by_key(|grid| {
        let min_x = grid.bounds.iter().map(|p| p.x).min().unwrap_or(0);
        let min_y = grid.bounds.iter().map(|p| p.y).min().unwrap_or(0);
        (Reverse(quad_area(&grid.bounds)), min_x, min_y)
    });

    trace!(
        count = grids.len(),
        detection_ms = (start.elapsed() - conversion_time).as_millis(),
        "QR grid detection complete"
    );

    for grid in &grids {
        match grid.decode() {
            Ok((_meta, content)) => {
                debug!(
                    content = %content,
                    candidates = grids.len(),
                    total_ms = start.elapsed().as_millis(),
                    "Decoded QR code"
                );
                return Some(content);
            }
            Err(e) => {
                debug!(error = %e, "Failed to decode QR grid");
            }
        }
    }

    None
}

/// Twice the area of the quadrilateral (shoelace formula)
fn quad_area(points: &[rqrr::Point; 4]) -> i64 {
    let mut sum = 0i64;
    for i in 0..4 {
        let a = &points[i];
        let b = &points[(i + 1) % 4];
        sum += a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64;
    }
    sum.abs()
}

/// BT.601 luma of an RGBA pixel
fn luma(px: &[u8]) -> u8 {
    ((px[0] as u32 * 299 + px[1] as u32 * 587 + px[2] as u32 * 114) / 1000) as u8
}

/// Convert a full-resolution frame to grayscale
fn rgba_to_luma(frame: &CameraFrame) -> Vec<u8> {
    let pixels = frame.width as usize * frame.height as usize;
    frame.data[..pixels * 4].chunks_exact(4).map(luma).collect()
}

/// Downscale a frame to grayscale using bilinear interpolation
fn downscale_luma(frame: &CameraFrame, dst_width: u32, dst_height: u32) -> Vec<u8> {
    let src_width = frame.width as usize;
    let src_height = frame.height as usize;
    let stride = src_width * 4;

    let x_ratio = src_width as f32 / dst_width as f32;
    let y_ratio = src_height as f32 / dst_height as f32;

    let sample = |px: usize, py: usize| -> f32 {
        let offset = py * stride + px * 4;
        luma(&frame.data[offset..offset + 4]) as f32
    };

    let mut result = Vec::with_capacity((dst_width * dst_height) as usize);

    for y in 0..dst_height {
        for x in 0..dst_width {
            let src_x = x as f32 * x_ratio;
            let src_y = y as f32 * y_ratio;

            let x0 = (src_x as usize).min(src_width - 1);
            let y0 = (src_y as usize).min(src_height - 1);
            let x1 = (x0 + 1).min(src_width - 1);
            let y1 = (y0 + 1).min(src_height - 1);

            let x_frac = src_x - x0 as f32;
            let y_frac = src_y - y0 as f32;

            let value = sample(x0, y0) * (1.0 - x_frac) * (1.0 - y_frac)
                + sample(x1, y0) * x_frac * (1.0 - y_frac)
                + sample(x0, y1) * (1.0 - x_frac) * y_frac
                + sample(x1, y1) * x_frac * y_frac;

            result.push(value.clamp(0.0, 255.0) as u8);
        }
    }

    result
}
