// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the scanner

use crate::backends::camera::types::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Frame source or capture errors
    Capture(BackendError),
    /// Code detection errors
    Detection(DetectionError),
    /// Code generation errors
    Generator(GeneratorError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Error raised by a code detector
///
/// Carries only a description; callers show it, they never match on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionError {
    message: String,
}

impl DetectionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// QR generation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    /// Input does not fit in the largest QR version at this correction level
    DataTooLong,
    /// Encoder rejected the input
    Encoding(String),
    /// Writing the image failed
    SaveFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Capture(e) => write!(f, "Capture error: {}", e),
            AppError::Detection(e) => write!(f, "Detection error: {}", e),
            AppError::Generator(e) => write!(f, "Generator error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Display for GeneratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneratorError::DataTooLong => write!(f, "Text is too long for a QR code"),
            GeneratorError::Encoding(msg) => write!(f, "Encoding failed: {}", msg),
            GeneratorError::SaveFailed(msg) => write!(f, "Save failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DetectionError {}
impl std::error::Error for GeneratorError {}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Capture(err)
    }
}

impl From<DetectionError> for AppError {
    fn from(err: DetectionError) -> Self {
        AppError::Detection(err)
    }
}

impl From<GeneratorError> for AppError {
    fn from(err: GeneratorError) -> Self {
        AppError::Generator(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for GeneratorError {
    fn from(err: image::ImageError) -> Self {
        GeneratorError::SaveFailed(err.to_string())
    }
}

impl From<qrcode::types::QrError> for GeneratorError {
    fn from(err: qrcode::types::QrError) -> Self {
        match err {
            qrcode::types::QrError::DataTooLong => GeneratorError::DataTooLong,
            other => GeneratorError::Encoding(other.to_string()),
        }
    }
}
