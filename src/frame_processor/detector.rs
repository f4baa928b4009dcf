// SPDX-License-Identifier: GPL-3.0-only

//! Code detection capability
//!
//! The decode coordinator does not know how codes are found. It hands a
//! frame snapshot to a [`CodeDetector`] on the blocking thread pool and maps
//! the answer to a [`super::DecodeResult`].

use super::types::Symbology;
use crate::backends::camera::types::CameraFrame;
use crate::errors::DetectionError;

/// Finds and decodes an optical code in a frame
///
/// Implementations are called from a blocking worker thread and may take
/// as long as they need. The supported symbology set is fixed when the
/// detector is built.
pub trait CodeDetector: Send + Sync {
    /// Detect a code in `frame`
    ///
    /// Returns the payload of the first code found, `Ok(None)` if detection
    /// ran but found nothing, or an error if detection could not run.
    fn detect(&self, frame: &CameraFrame) -> Result<Option<String>, DetectionError>;

    /// Symbologies this detector looks for
    fn symbologies(&self) -> &[Symbology];
}
