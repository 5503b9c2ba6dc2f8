//! Result types: what the recognizer reports and what callers receive.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle locating a symbol, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// True for a scan-line box (a 1D read), which has no real height yet.
    pub fn is_flat(&self) -> bool {
        self.width > 0 && self.height <= 1
    }

    /// Smallest box enclosing every point. `None` for an empty slice.
    pub fn enclosing(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(x, y) in rest {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let left = min_x.floor() as i32;
        let top = min_y.floor() as i32;
        Some(Self {
            left,
            top,
            width: max_x.ceil() as i32 - left,
            height: max_y.ceil() as i32 - top,
        })
    }
}

/// One symbol as reported by a [`crate::pipeline::recognize::SymbolRecognizer`].
///
/// The payload is kept as raw bytes; it becomes text only once the decode
/// core validates it as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSymbol {
    /// Symbology name, e.g. `QRCODE`, `CODE128`, `EAN13`.
    pub symbology: String,
    /// Raw decoded payload.
    pub payload: Vec<u8>,
    /// Location within the page image.
    pub bounding_box: BoundingBox,
}

impl DetectedSymbol {
    pub fn new(
        symbology: impl Into<String>,
        payload: impl Into<Vec<u8>>,
        bounding_box: BoundingBox,
    ) -> Self {
        Self {
            symbology: symbology.into(),
            payload: payload.into(),
            bounding_box,
        }
    }
}

/// A decoded symbol tagged with the 1-based page it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeResult {
    #[serde(rename = "type")]
    pub symbology: String,
    pub data: String,
    pub page: usize,
    pub location: BoundingBox,
}

/// Everything the decode core produces for one upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOutcome {
    /// Rasterised page count for a PDF, 1 for an image.
    pub page_count: usize,
    /// Symbols in page order, then recognizer order.
    pub results: Vec<DecodeResult>,
}

/// JSON body returned by `POST /decode/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub file: Option<String>,
    pub pages: usize,
    pub barcodes_found: usize,
    pub results: Vec<DecodeResult>,
}

impl DecodeResponse {
    pub fn new(file: Option<String>, outcome: DecodeOutcome) -> Self {
        Self {
            file,
            pages: outcome.page_count,
            barcodes_found: outcome.results.len(),
            results: outcome.results,
        }
    }
}
