// SPDX-License-Identifier: GPL-3.0-only

//! Persistent settings
//!
//! Settings live in a JSON file under the user config directory. Missing
//! files and missing fields fall back to defaults, so an empty `{}` is a
//! valid configuration.

use crate::backends::camera::types::SensorRotation;
use crate::constants::app_info::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};
use crate::constants::{generator, scanner};
use crate::errors::{AppError, AppResult};
use crate::frame_processor::types::Symbology;
use crate::pipelines::generator::CorrectionLevel;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerSettings {
    /// Frames larger than this are downscaled before detection
    pub max_dimension: u32,
    /// Decode time limit in milliseconds (`None` waits indefinitely)
    pub decode_timeout_ms: Option<u64>,
    /// Symbologies to look for
    pub symbologies: Vec<Symbology>,
    /// Sensor mounting rotation in degrees, clockwise
    pub rotation_degrees: i32,
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            max_dimension: scanner::MAX_DETECTION_DIMENSION,
            decode_timeout_ms: Some(scanner::DECODE_TIMEOUT.as_millis() as u64),
            symbologies: Symbology::ALL.to_vec(),
            // Portrait phone sensors are mounted a quarter turn off
            rotation_degrees: 90,
        }
    }
}

/// Code generator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Pixels per module
    pub scale: u32,
    pub correction_level: CorrectionLevel,
    /// Light border in modules
    pub quiet_zone: u32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            scale: generator::DEFAULT_SCALE,
            correction_level: CorrectionLevel::default(),
            quiet_zone: generator::QUIET_ZONE_MODULES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerSettings,
    pub generator: GeneratorSettings,
}

impl Config {
    /// Default settings file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load settings from `path`
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded settings");
        Ok(config)
    }

    /// Load settings from `path`, or from the default location
    ///
    /// A missing file yields defaults. A file that exists but cannot be
    /// parsed is an error.
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) => path,
                None => {
                    debug!("No config directory on this platform, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load(&path)
    }

    /// Write settings to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved settings");
        Ok(())
    }

    pub fn decode_timeout(&self) -> Option<Duration> {
        self.scanner.decode_timeout_ms.map(Duration::from_millis)
    }

    pub fn rotation(&self) -> SensorRotation {
        SensorRotation::from_degrees_int(self.scanner.rotation_degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"generator": {"correction_level": "H"}}"#).unwrap();
        assert_eq!(config.generator.correction_level, CorrectionLevel::H);
        assert_eq!(config.generator.scale, generator::DEFAULT_SCALE);
        assert_eq!(config.scanner, ScannerSettings::default());
    }

    #[test]
    fn test_null_timeout_disables_limit() {
        let config: Config =
            serde_json::from_str(r#"{"scanner": {"decode_timeout_ms": null}}"#).unwrap();
        assert_eq!(config.decode_timeout(), None);
        assert_eq!(
            Config::default().decode_timeout(),
            Some(scanner::DECODE_TIMEOUT)
        );
    }

    #[test]
    fn test_rotation_from_degrees() {
        let mut config = Config::default();
        assert_eq!(config.rotation(), SensorRotation::Rotate90);
        config.scanner.rotation_degrees = 0;
        assert_eq!(config.rotation(), SensorRotation::None);
    }
}
