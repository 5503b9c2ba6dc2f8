//! Decode entry points: upload in, page-indexed symbols out.
//!
//! The whole request is one pass: classify, rasterise, recognise, collect.
//! The first failure on any page aborts the request and no partial results
//! are returned.

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::output::{DecodeOutcome, DecodeResult, DetectedSymbol};
use crate::pipeline::input::{MediaKind, Upload};
use crate::pipeline::recognize::{RxingRecognizer, SymbolRecognizer};
use crate::pipeline::render::{load_image, PdfiumRasterizer, RasterPage, Rasterizer};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Orchestrates the rasterizer and the recognizer for one upload at a time.
///
/// Cheap to clone; holds no per-request state.
#[derive(Clone)]
pub struct Decoder {
    rasterizer: Arc<dyn Rasterizer>,
    recognizer: Arc<dyn SymbolRecognizer>,
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decoder")
            .field("rasterizer", &"<dyn Rasterizer>")
            .field("recognizer", &"<dyn SymbolRecognizer>")
            .finish()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl Decoder {
    /// pdfium rasterizer + rxing recognizer.
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_collaborators(
            Arc::new(PdfiumRasterizer::new(config)),
            Arc::new(RxingRecognizer::new()),
        )
    }

    pub fn with_collaborators(
        rasterizer: Arc<dyn Rasterizer>,
        recognizer: Arc<dyn SymbolRecognizer>,
    ) -> Self {
        Self {
            rasterizer,
            recognizer,
        }
    }

    /// Decode an upload off the async executor.
    ///
    /// The content type is checked before the blocking task is spawned, so an
    /// unsupported upload never costs a thread.
    pub async fn decode(&self, upload: Upload) -> Result<DecodeOutcome, DecodeError> {
        let kind = upload.media_kind()?;
        let decoder = self.clone();

        tokio::task::spawn_blocking(move || decoder.decode_kind(kind, &upload.bytes))
            .await
            .map_err(|e| DecodeError::Internal(format!("Decode task panicked: {}", e)))?
    }

    /// Synchronous decode of `bytes` declared as `content_type`.
    pub fn decode_blocking(
        &self,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<DecodeOutcome, DecodeError> {
        match MediaKind::from_content_type(content_type) {
            MediaKind::Unsupported => Err(DecodeError::UnsupportedFormat {
                content_type: content_type.to_string(),
            }),
            kind => self.decode_kind(kind, bytes),
        }
    }

    fn decode_kind(&self, kind: MediaKind, bytes: &[u8]) -> Result<DecodeOutcome, DecodeError> {
        let start = Instant::now();

        let pages = match kind {
            MediaKind::Pdf => RasterPage::number(self.rasterizer.rasterize(bytes)?),
            MediaKind::Image => RasterPage::number(vec![load_image(bytes)?]),
            MediaKind::Unsupported => {
                return Err(DecodeError::Internal(
                    "unsupported media reached the decode stage".into(),
                ))
            }
        };

        let mut results = Vec::new();
        for page in &pages {
            let symbols = self
                .recognizer
                .recognize(&page.image)
                .map_err(|e| tag_page(e, page.index))?;
            debug!("Page {}: {} symbol(s)", page.index, symbols.len());

            for symbol in symbols {
                results.push(to_result(symbol, page.index)?);
            }
        }

        info!(
            "Decoded {:?} upload: {} page(s), {} symbol(s) in {}ms",
            kind,
            pages.len(),
            results.len(),
            start.elapsed().as_millis()
        );

        Ok(DecodeOutcome {
            page_count: pages.len(),
            results,
        })
    }
}

fn to_result(symbol: DetectedSymbol, page: usize) -> Result<DecodeResult, DecodeError> {
    let data = String::from_utf8(symbol.payload)
        .map_err(|source| DecodeError::InvalidPayload { page, source })?;
    Ok(DecodeResult {
        symbology: symbol.symbology,
        data,
        page,
        location: symbol.bounding_box,
    })
}

/// Recognizers don't know which page they were given.
fn tag_page(err: DecodeError, page: usize) -> DecodeError {
    match err {
        DecodeError::RecognitionFailed { detail, .. } => {
            DecodeError::RecognitionFailed { page, detail }
        }
        other => other,
    }
}
