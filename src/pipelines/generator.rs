// SPDX-License-Identifier: GPL-3.0-only

//! QR code generation
//!
//! Text in, image out. The encoder produces one pixel per module; the
//! result is then scaled up by an integer factor with nearest-neighbour
//! sampling so module edges stay crisp at any display size.

use crate::constants::generator::{DEFAULT_SCALE, QUIET_ZONE_MODULES};
use crate::errors::GeneratorError;
use image::{GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// QR error correction level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CorrectionLevel {
    /// ~7% of codewords recoverable
    L,
    /// ~15% of codewords recoverable
    #[default]
    M,
    /// ~25% of codewords recoverable
    Q,
    /// ~30% of codewords recoverable
    H,
}

impl CorrectionLevel {
    pub const ALL: [CorrectionLevel; 4] = [
        CorrectionLevel::L,
        CorrectionLevel::M,
        CorrectionLevel::Q,
        CorrectionLevel::H,
    ];

    /// Single-letter name used in settings and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrectionLevel::L => "L",
            CorrectionLevel::M => "M",
            CorrectionLevel::Q => "Q",
            CorrectionLevel::H => "H",
        }
    }
}

impl From<CorrectionLevel> for EcLevel {
    fn from(level: CorrectionLevel) -> Self {
        match level {
            CorrectionLevel::L => EcLevel::L,
            CorrectionLevel::M => EcLevel::M,
            CorrectionLevel::Q => EcLevel::Q,
            CorrectionLevel::H => EcLevel::H,
        }
    }
}

impl FromStr for CorrectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            other => Err(format!(
                "unknown correction level '{}', expected one of L, M, Q, H",
                other
            )),
        }
    }
}

impl std::fmt::Display for CorrectionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered QR code
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedCode {
    /// Black-on-white image including the quiet zone
    pub image: GrayImage,
    /// Pixels per module
    pub scale: u32,
    /// Modules per side, excluding the quiet zone
    pub modules: u32,
    pub level: CorrectionLevel,
}

impl GeneratedCode {
    /// Write the image as PNG
    pub fn save_png(&self, path: &Path) -> Result<(), GeneratorError> {
        self.image
            .save_with_format(path, image::ImageFormat::Png)
            .map_err(GeneratorError::from)
    }
}

/// Renders text into QR code images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeGenerator {
    scale: u32,
    quiet_zone: u32,
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE)
    }
}

impl CodeGenerator {
    /// Create a generator with the given pixels-per-module factor
    ///
    /// A scale of zero is treated as one.
    pub fn new(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            quiet_zone: QUIET_ZONE_MODULES,
        }
    }

    /// Override the quiet zone width in modules
    pub fn with_quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Encode `text` as a QR code
    ///
    /// Surrounding whitespace is trimmed. Returns `Ok(None)` when nothing is
    /// left to encode, so a caller's current image stays as it is.
    pub fn generate(
        &self,
        text: &str,
        level: CorrectionLevel,
    ) -> Result<Option<GeneratedCode>, GeneratorError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("Nothing to encode after trimming");
            return Ok(None);
        }

        let code = QrCode::with_error_correction_level(text.as_bytes(), level.into())?;
        let base = render_modules(&code, self.quiet_zone);
        let image = upscale_nearest(&base, self.scale);

        debug!(
            modules = code.width(),
            level = %level,
            scale = self.scale,
            size = image.width(),
            "Generated QR code"
        );

        Ok(Some(GeneratedCode {
            image,
            scale: self.scale,
            modules: code.width() as u32,
            level,
        }))
    }
}

/// One pixel per module, with `quiet_zone` light modules on every side
fn render_modules(code: &QrCode, quiet_zone: u32) -> GrayImage {
    let modules = code.width() as u32;
    let size = modules + 2 * quiet_zone;

    GrayImage::from_fn(size, size, |x, y| {
        let inside = (quiet_zone..quiet_zone + modules).contains(&x)
            && (quiet_zone..quiet_zone + modules).contains(&y);
        if !inside {
            return LIGHT;
        }
        let module = ((x - quiet_zone) as usize, (y - quiet_zone) as usize);
        match code[module] {
            Color::Dark => DARK,
            Color::Light => LIGHT,
        }
    })
}

/// Integer nearest-neighbour upscale
fn upscale_nearest(base: &GrayImage, scale: u32) -> GrayImage {
    if scale == 1 {
        return base.clone();
    }
    GrayImage::from_fn(base.width() * scale, base.height() * scale, |x, y| {
        *base.get_pixel(x / scale, y / scale)
    })
}
