//! CLI binary for barcode-decode.
//!
//! A thin shim over the library crate: `serve` runs the HTTP endpoint,
//! `decode` scans one local file and prints the results as JSON.

use anyhow::{Context, Result};
use barcode_decode::{serve, DecodeError, Decoder, DecoderConfig, ServerConfig, Upload};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "barcode-decode",
    version,
    about = "Find and decode barcodes and QR codes in images and PDF files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "BARCODE_VERBOSE")]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (POST /decode/).
    Serve {
        /// Interface to bind (IP address or host name).
        #[arg(long, env = "BARCODE_HOST", default_value = "0.0.0.0")]
        host: String,

        /// TCP port.
        #[arg(short, long, env = "BARCODE_PORT", default_value_t = 8000)]
        port: u16,

        /// Largest accepted request body in bytes.
        #[arg(long, env = "BARCODE_MAX_UPLOAD_BYTES", default_value_t = 50 * 1024 * 1024)]
        max_upload_bytes: usize,

        #[command(flatten)]
        decoder: DecoderArgs,
    },

    /// Decode one local image or PDF and print the results as JSON.
    Decode {
        /// Path to the image or PDF file.
        path: PathBuf,

        #[command(flatten)]
        decoder: DecoderArgs,
    },
}

#[derive(Args, Debug)]
struct DecoderArgs {
    /// PDF rasterisation DPI (72–600).
    #[arg(long, env = "BARCODE_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Cap on either rendered page dimension, in pixels.
    #[arg(long, env = "BARCODE_MAX_PIXELS", default_value_t = 4000,
          value_parser = clap::value_parser!(u32).range(100..=i32::MAX as i64))]
    max_pixels: u32,

    /// Path to the pdfium shared library (defaults to the system library).
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "BARCODE_PDF_PASSWORD")]
    password: Option<String>,
}

impl DecoderArgs {
    fn to_config(&self) -> Result<DecoderConfig, DecodeError> {
        let mut builder = DecoderConfig::builder()
            .dpi(self.dpi)
            .max_rendered_pixels(self.max_pixels);
        if let Some(path) = &self.pdfium_lib {
            builder = builder.pdfium_lib_path(path);
        }
        if let Some(pwd) = &self.password {
            builder = builder.password(pwd);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Serve {
            host,
            port,
            max_upload_bytes,
            decoder,
        } => {
            let server = ServerConfig {
                host,
                port,
                max_upload_bytes,
            };
            run_server(server, &decoder).await
        }
        Command::Decode { path, decoder } => run_decode(path, &decoder).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_server(server: ServerConfig, args: &DecoderArgs) -> Result<()> {
    let config = args.to_config().context("Invalid decoder configuration")?;
    tracing::debug!("{:?} {:?}", server, config);

    serve(Decoder::new(config), &server, shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn run_decode(path: PathBuf, args: &DecoderArgs) -> Result<()> {
    let config = args.to_config().context("Invalid decoder configuration")?;

    let upload = Upload::from_path(&path).await?;
    let outcome = Decoder::new(config)
        .decode(upload)
        .await
        .with_context(|| format!("Error processing file {}", path.display()))?;

    let json = serde_json::to_string_pretty(&outcome.results)?;
    println!("{json}");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
