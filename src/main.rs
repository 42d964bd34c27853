//! Now-playing display daemon
//!
//! Shows the current artist/title on a framebuffer, or saves PNG snapshots when
//! no framebuffer device is configured.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nowplaying_display::render::FontPainter;
use nowplaying_display::{
    source, ConfigOverrides, DisplayConfig, FrameSink, NowPlaying, OutputSink, PairingCoordinator,
    Renderer, DEFAULT_DEBOUNCE,
};

/// Now-playing display - artist/title on a framebuffer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Framebuffer device (empty writes PNG files instead)
    #[arg(short, long, env = "FB_DEVICE")]
    device: Option<PathBuf>,

    /// Display width in pixels
    #[arg(long, env = "SCREEN_WIDTH")]
    width: Option<u32>,

    /// Display height in pixels
    #[arg(long, env = "SCREEN_HEIGHT")]
    height: Option<u32>,

    /// Bold font file
    #[arg(long, env = "FONT_PATH")]
    font: Option<PathBuf>,

    /// Directory for PNG output
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Metadata source: a file/FIFO path, or - for stdin
    #[arg(short, long, env = "METADATA_SOURCE")]
    metadata: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            device: self.device.clone(),
            width: self.width,
            height: self.height,
            font: self.font.clone(),
            output_dir: self.output_dir.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("Application started...");

    let mut config = match &args.config {
        Some(path) => {
            info!("Configuration file: {}", path);
            DisplayConfig::load(path).await?
        }
        None => DisplayConfig::default(),
    };
    config.apply_overrides(args.overrides());
    config.validate()?;
    info!("Display: {}x{}", config.width, config.height);

    let painter = FontPainter::load(config.font.as_deref())?;
    let renderer = Renderer::new(config.width, config.height, Box::new(painter));

    let mut sink = OutputSink::select(config.device_path(), &config.output_dir);
    sink.open()?;
    info!("Using {} sink", sink.kind());

    let events = source::open(&config.metadata)
        .await
        .with_context(|| format!("Failed to open metadata source: {}", config.metadata))?;

    let mut app = NowPlaying::new(PairingCoordinator::new(DEFAULT_DEBOUNCE), renderer, sink);
    app.run(events, shutdown_signal()).await;

    info!("Shutdown complete");
    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
