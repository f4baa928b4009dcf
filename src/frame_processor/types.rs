// SPDX-License-Identifier: GPL-3.0-only

//! Core types for decode results
//!
//! These are the values the decode coordinator hands back to whoever
//! triggered a scan, and the symbology vocabulary shared by detectors and
//! configuration.

use crate::constants::scanner::NO_FRAME_REASON;
use serde::{Deserialize, Serialize};

/// Outcome of one decode attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A code was found; carries its decoded content
    Payload(String),
    /// Detection ran over the frame and found nothing
    NotFound,
    /// Detection could not run or raised an error
    ///
    /// The reason is advisory text for display only.
    Failed(String),
}

impl DecodeResult {
    /// Failure reported when no frame has been captured yet
    pub fn no_frame() -> Self {
        Self::Failed(NO_FRAME_REASON.to_string())
    }

    /// Decoded content, if any
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Payload(text) => Some(text),
            _ => None,
        }
    }

    /// Short informational text for showing the result to a user
    pub fn message(&self) -> String {
        match self {
            Self::Payload(text) => text.clone(),
            Self::NotFound => "No barcode found.".to_string(),
            Self::Failed(reason) if reason == NO_FRAME_REASON => "No frame.".to_string(),
            Self::Failed(reason) => format!("Error: {}", reason),
        }
    }
}

impl std::fmt::Display for DecodeResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Optical code encoding standards a detector may recognise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Qr,
    Ean13,
    Ean8,
    Code128,
    Pdf417,
    Aztec,
    DataMatrix,
    UpcE,
    Code39,
}

impl Symbology {
    /// Every symbology, in the order scanners request them
    pub const ALL: [Symbology; 9] = [
        Symbology::Qr,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::Code128,
        Symbology::Pdf417,
        Symbology::Aztec,
        Symbology::DataMatrix,
        Symbology::UpcE,
        Symbology::Code39,
    ];

    /// Get display name for the symbology
    pub fn display_name(&self) -> &'static str {
        match self {
            Symbology::Qr => "QR Code",
            Symbology::Ean13 => "EAN-13",
            Symbology::Ean8 => "EAN-8",
            Symbology::Code128 => "Code 128",
            Symbology::Pdf417 => "PDF417",
            Symbology::Aztec => "Aztec",
            Symbology::DataMatrix => "Data Matrix",
            Symbology::UpcE => "UPC-E",
            Symbology::Code39 => "Code 39",
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
