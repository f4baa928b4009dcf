// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use qr_scanner::CorrectionLevel;
use qr_scanner::constants::app_info;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "qr-scanner")]
#[command(about = "Scan and generate QR codes")]
#[command(version = app_info::version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an image file for a QR code, as if it came from the camera
    Scan {
        /// Image file to scan (PNG, JPEG, GIF, BMP, WebP)
        image: PathBuf,

        /// Sensor rotation in degrees clockwise (0, 90, 180, 270)
        #[arg(short, long)]
        rotation: Option<i32>,

        /// Give up on detection after this many milliseconds
        #[arg(short, long)]
        timeout_ms: Option<u64>,

        /// Settings file (default: ~/.config/qr-scanner/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate a QR code image from text
    Generate {
        /// Text to encode
        text: String,

        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,

        /// Error correction level
        #[arg(short, long)]
        level: Option<CorrectionLevel>,

        /// Pixels per module
        #[arg(short, long)]
        scale: Option<u32>,

        /// Settings file (default: ~/.config/qr-scanner/config.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qr_scanner=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            image,
            rotation,
            timeout_ms,
            config,
        } => cli::scan_image(&image, rotation, timeout_ms, config.as_deref()).await,
        Commands::Generate {
            text,
            output,
            level,
            scale,
            config,
        } => cli::generate_code(&text, &output, level, scale, config.as_deref()),
    }
}
