// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Scanning an image file through the live capture pipeline
//! - Generating QR code images

use qr_scanner::backends::camera::CameraStream;
use qr_scanner::backends::virtual_camera::StillImageStream;
use qr_scanner::{
    CaptureProducer, CodeGenerator, Config, CorrectionLevel, DecodeCoordinator, DecodeResult,
    FrameBuffer, QrDetector, SensorRotation,
};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long to wait for the first frame to reach the buffer
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Scan an image file for a QR code
///
/// The image is streamed through the same capture path a camera would use,
/// then a single decode is triggered against the latest frame.
pub async fn scan_image(
    image: &Path,
    rotation: Option<i32>,
    timeout_ms: Option<u64>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(degrees) = rotation {
        config.scanner.rotation_degrees = degrees;
    }
    if let Some(ms) = timeout_ms {
        config.scanner.decode_timeout_ms = Some(ms);
    }

    let rotation = config.rotation();
    if rotation == SensorRotation::None && config.scanner.rotation_degrees.rem_euclid(360) != 0 {
        return Err(format!(
            "Rotation must be a multiple of 90 degrees, got {}",
            config.scanner.rotation_degrees
        )
        .into());
    }

    let mut stream = StillImageStream::open(image)?;
    let (width, height) = stream.dimensions();
    println!("Scanning {} ({}x{}, rotation {})", image.display(), width, height, rotation);

    let buffer = Arc::new(FrameBuffer::new());
    let mut producer = CaptureProducer::new(Arc::clone(&buffer), rotation);
    producer.start()?;
    stream.start(producer.sink())?;

    // Wait for the producer to publish the first frame
    let start = Instant::now();
    while buffer.is_empty() && start.elapsed() < FIRST_FRAME_TIMEOUT {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let detector = QrDetector::with_symbologies(
        config.scanner.max_dimension,
        &config.scanner.symbologies,
    );
    let coordinator = DecodeCoordinator::new(
        Arc::clone(&buffer),
        Arc::new(detector),
        config.decode_timeout(),
    );
    let result = coordinator.decode_once().await;

    stream.stop();
    producer.stop();

    match result {
        Some(DecodeResult::Failed(reason)) => Err(format!("Error: {}", reason).into()),
        Some(result) => {
            println!("{}", result.message());
            Ok(())
        }
        None => Err("A decode was already in progress".into()),
    }
}

/// Generate a QR code and save it as PNG
pub fn generate_code(
    text: &str,
    output: &Path,
    level: Option<CorrectionLevel>,
    scale: Option<u32>,
    config_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default(config_path)?;
    let level = level.unwrap_or(config.generator.correction_level);
    let scale = scale.unwrap_or(config.generator.scale);

    let generator = CodeGenerator::new(scale).with_quiet_zone(config.generator.quiet_zone);
    let Some(code) = generator.generate(text, level)? else {
        println!("Nothing to encode.");
        return Ok(());
    };

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    code.save_png(output)?;

    println!(
        "QR code saved: {} ({}x{} px, {} modules, level {})",
        output.display(),
        code.image.width(),
        code.image.height(),
        code.modules,
        code.level
    );
    Ok(())
}
