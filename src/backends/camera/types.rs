// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use std::sync::Arc;
use std::time::Instant;

/// Sensor rotation in degrees (clockwise)
///
/// Camera sensors are often mounted at an angle relative to the device.
/// Phones typically mount the back sensor rotated 90° relative to the
/// portrait display, so raw frames arrive lying on their side and must be
/// turned upright before detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorRotation {
    /// No rotation (sensor is oriented correctly)
    #[default]
    None,
    /// 90 degrees clockwise
    Rotate90,
    /// 180 degrees (upside down)
    Rotate180,
    /// 270 degrees clockwise (90 degrees counter-clockwise)
    Rotate270,
}

impl SensorRotation {
    /// Create rotation from an integer degree value (normalised to 0-360).
    ///
    /// Values that are not a multiple of 90 fall back to no rotation.
    pub fn from_degrees_int(degrees: i32) -> Self {
        match degrees.rem_euclid(360) {
            90 => SensorRotation::Rotate90,
            180 => SensorRotation::Rotate180,
            270 => SensorRotation::Rotate270,
            _ => SensorRotation::None,
        }
    }

    /// Get the rotation in degrees
    pub fn degrees(&self) -> u32 {
        match self {
            SensorRotation::None => 0,
            SensorRotation::Rotate90 => 90,
            SensorRotation::Rotate180 => 180,
            SensorRotation::Rotate270 => 270,
        }
    }

    /// Check if rotation swaps width and height
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, SensorRotation::Rotate90 | SensorRotation::Rotate270)
    }
}

impl std::fmt::Display for SensorRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Pixel format of raw frames delivered by a camera stream
///
/// RGBA is the canonical format; everything else is converted on the CPU
/// by [`super::format_converters`] before a frame is published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// RGBA - 32-bit with alpha (4 bytes per pixel)
    RGBA,
    /// BGRA - 32-bit with alpha (B G R A byte order)
    BGRA,
    /// RGB24 - 24-bit RGB (3 bytes per pixel, no alpha)
    RGB24,
    /// Gray8 - 8-bit grayscale (single channel)
    Gray8,
    /// YUYV - Packed 4:2:2 (Y0 U Y1 V interleaved)
    YUYV,
    /// UYVY - Packed 4:2:2 (U Y0 V Y1 interleaved)
    UYVY,
    /// NV12 - Semi-planar 4:2:0 (Y plane + interleaved UV plane)
    NV12,
}

impl PixelFormat {
    /// Minimum row stride in bytes for a frame of the given width
    ///
    /// For NV12 this is the stride of the Y plane; the UV plane shares it.
    pub fn min_stride(&self, width: u32) -> usize {
        let width = width as usize;
        match self {
            Self::RGBA | Self::BGRA => width * 4,
            Self::RGB24 => width * 3,
            Self::Gray8 => width,
            // Each row carries whole UV pairs, so odd widths round up
            Self::NV12 => width.div_ceil(2) * 2,
            // 4:2:2 packs two pixels into four bytes; odd widths round up
            Self::YUYV | Self::UYVY => width.div_ceil(2) * 4,
        }
    }

    /// Minimum buffer length for a frame with the given geometry
    pub fn min_buffer_len(&self, width: u32, height: u32, stride: usize) -> usize {
        let rows = height as usize;
        if rows == 0 {
            return 0;
        }
        match self {
            // Y plane followed by a half-height UV plane
            Self::NV12 => stride * rows + stride * rows.div_ceil(2),
            _ => stride * (rows - 1) + self.min_stride(width),
        }
    }
}

/// A raw sample as handed over by camera hardware
///
/// This is whatever the sensor pipeline produced: any supported pixel
/// format, possibly with row padding, in the sensor's native orientation.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    pub format: PixelFormat,
    pub data: Arc<[u8]>,
    /// Timestamp when the frame was captured
    pub captured_at: Instant,
    /// Sequence number assigned by the stream
    pub sequence: u64,
}

impl RawFrame {
    /// Create a raw frame with a tightly packed stride
    pub fn new(width: u32, height: u32, format: PixelFormat, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            stride: format.min_stride(width) as u32,
            format,
            data: data.into(),
            captured_at: Instant::now(),
            sequence: 0,
        }
    }

    /// Builder-style sequence number assignment
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// A single canonical frame
///
/// Pixels are upright, tightly packed RGBA (stride = width * 4). Frames are
/// immutable once built; the pixel data is shared behind an `Arc` so
/// snapshots are cheap to hand out.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Timestamp when the source frame was captured
    pub captured_at: Instant,
    /// Sequence number inherited from the raw frame
    pub sequence: u64,
}

impl CameraFrame {
    /// Wrap tightly packed RGBA pixels
    ///
    /// Fails if the buffer length does not match `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> BackendResult<Self> {
        let data = data.into();
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(BackendError::InvalidFrame(format!(
                "RGBA buffer is {} bytes, expected {} for {}x{}",
                data.len(),
                expected,
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            captured_at: Instant::now(),
            sequence: 0,
        })
    }

    /// Row stride in bytes
    pub fn stride(&self) -> u32 {
        self.width * 4
    }

    /// RGBA value of the pixel at (x, y), if in bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone)]
pub enum BackendError {
    /// Failed to initialize backend
    InitializationFailed(String),
    /// Frame geometry does not match its buffer
    InvalidFrame(String),
    /// Stream is already running
    AlreadyRunning,
    /// General I/O error
    IoError(String),
    /// Other errors
    Other(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            BackendError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            BackendError::AlreadyRunning => write!(f, "Stream is already running"),
            BackendError::IoError(msg) => write!(f, "I/O error: {}", msg),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}
