// SPDX-License-Identifier: GPL-3.0-only

//! Image file loading for the still image source

use crate::backends::camera::types::{BackendError, BackendResult, PixelFormat, RawFrame};
use crate::constants::file_formats;
use std::path::Path;
use tracing::{info, warn};

/// Load an image file as a raw RGBA frame
///
/// Supports common image formats: PNG, JPEG, GIF, BMP, WebP. The frame is
/// returned as the sensor would hand it over, so the usual rotation and
/// conversion still apply downstream.
pub fn load_image_as_raw_frame(path: &Path) -> BackendResult<RawFrame> {
    info!(path = %path.display(), "Loading image file");

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if !file_formats::is_image_extension(extension) {
        // image sniffs the content, so an odd extension is not fatal
        warn!(path = %path.display(), "Unrecognized image extension");
    }

    let img = image::open(path).map_err(|e| {
        BackendError::Other(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let rgba = img.to_rgba8();
    let width = rgba.width();
    let height = rgba.height();
    if width == 0 || height == 0 {
        return Err(BackendError::InvalidFrame(format!(
            "'{}' has no pixels",
            path.display()
        )));
    }

    info!(width, height, "Image loaded successfully");

    Ok(RawFrame::new(
        width,
        height,
        PixelFormat::RGBA,
        rgba.into_raw(),
    ))
}
