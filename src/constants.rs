// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// On-demand decode constants
pub mod scanner {
    use super::Duration;

    /// Frames larger than this (in either dimension) are downscaled before detection
    pub const MAX_DETECTION_DIMENSION: u32 = 640;

    /// Default upper bound on a single decode
    pub const DECODE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Timed-out detections still running before new triggers are refused
    pub const MAX_ABANDONED_DETECTIONS: usize = 2;

    /// Failure reason reported when a decode finds the frame buffer empty
    pub const NO_FRAME_REASON: &str = "no frame available";
}

/// Capture producer constants
pub mod capture {
    use super::Duration;

    /// Dropped-frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// How long the worker waits for a frame before checking for stop
    pub const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(50);
}

/// QR generation defaults
pub mod generator {
    /// Pixels per module
    pub const DEFAULT_SCALE: u32 = 10;

    /// Light border around the symbol, in modules
    pub const QUIET_ZONE_MODULES: u32 = 4;
}

/// Still image frame source constants
pub mod virtual_camera {
    use super::Duration;

    /// Frame rate for image streaming (~30fps)
    pub const IMAGE_STREAM_FRAME_DURATION: Duration = Duration::from_millis(33);
}

/// Supported file formats for the still image source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}

/// Application information utilities
pub mod app_info {
    /// Directory name under the user config directory
    pub const CONFIG_DIR_NAME: &str = "qr-scanner";

    /// Settings file name inside [`CONFIG_DIR_NAME`]
    pub const CONFIG_FILE_NAME: &str = "config.json";

    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}
