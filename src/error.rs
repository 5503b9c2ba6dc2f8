//! Error types for the barcode-decode library.
//!
//! Every failure funnels into [`DecodeError`], but callers only ever need to
//! distinguish two classes:
//!
//! * **Format rejection**: the declared content type is neither `image/*` nor
//!   `application/pdf`. Detected before a single byte is processed
//!   ([`DecodeError::UnsupportedFormat`]).
//!
//! * **Decode failure**: anything that goes wrong while rasterising,
//!   decoding the image, or recognising symbols. The remaining variants keep
//!   the underlying cause for logs, while the HTTP layer folds them into one
//!   internal-error response.
//!
//! A failure on any page aborts the whole request; there is no per-page
//! error type.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the barcode-decode library.
#[derive(Debug, Error)]
pub enum DecodeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Declared content type is not an image and not a PDF.
    #[error("Unsupported content type '{content_type}'")]
    UnsupportedFormat { content_type: String },

    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF is corrupt or unreadable: {detail}")]
    CorruptPdf { detail: String },

    /// PDF requires a password but none was configured.
    #[error("PDF is encrypted and requires a password")]
    PasswordRequired,

    /// A password was configured but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Image errors ──────────────────────────────────────────────────────
    /// The bytes could not be decoded as a raster image.
    #[error("cannot identify image file: {0}")]
    ImageDecode(#[from] image::ImageError),

    // ── Recognition errors ────────────────────────────────────────────────
    /// The symbol recognizer failed on a page.
    #[error("Barcode recognition failed on page {page}: {detail}")]
    RecognitionFailed { page: usize, detail: String },

    /// A symbol decoded to bytes that are not valid UTF-8.
    #[error("Barcode payload on page {page} is not valid UTF-8: {source}")]
    InvalidPayload {
        page: usize,
        #[source]
        source: std::string::FromUtf8Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (I/O, task panics).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DecodeError {
    /// `true` when the error was raised before any processing happened
    /// because of the declared content type.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, DecodeError::UnsupportedFormat { .. })
    }
}
