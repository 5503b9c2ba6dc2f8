//! # barcode-decode
//!
//! Find and decode barcodes and QR codes in uploaded images and PDF documents.
//!
//! A PDF is rasterised page by page with pdfium; an image is decoded as a
//! single page. Each page image goes through rxing's multi-symbol reader and
//! every hit is reported with its symbology, UTF-8 payload, bounding box and
//! 1-based page number.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (bytes + declared MIME type)
//!  │
//!  ├─ 1. Input      application/pdf │ image/* │ rejected (415)
//!  ├─ 2. Render     pdfium pages or a single decoded image (spawn_blocking)
//!  ├─ 3. Recognize  rxing, per page, native order
//!  └─ 4. Output     {file, pages, barcodes_found, results[]}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use barcode_decode::{Decoder, DecoderConfig, Upload};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let decoder = Decoder::new(DecoderConfig::default());
//!     let upload = Upload::from_path("invoice.pdf").await?;
//!     let outcome = decoder.decode(upload).await?;
//!     for r in &outcome.results {
//!         println!("page {}: {} {}", r.page, r.symbology, r.data);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `barcode-decode` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod decode;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DecoderConfig, DecoderConfigBuilder, ServerConfig, MAX_RENDER_DIMENSION};
pub use decode::Decoder;
pub use error::DecodeError;
pub use output::{BoundingBox, DecodeOutcome, DecodeResponse, DecodeResult, DetectedSymbol};
pub use pipeline::input::{MediaKind, Upload};
pub use pipeline::recognize::{RxingRecognizer, SymbolRecognizer};
pub use pipeline::render::{PdfiumRasterizer, RasterPage, Rasterizer};
pub use server::{router, serve, ApiError};
