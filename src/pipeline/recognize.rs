//! Recognition stage: find and decode every symbol in one page image.
//!
//! [`RxingRecognizer`] hands a grayscale copy of the page to rxing's
//! multi-barcode reader. Symbology names are reported in the zbar spelling
//! (`QRCODE`, `CODE128`, `EAN13`, …) so clients written against zbar-based
//! services keep working.
//!
//! rxing locates a 1D symbol by its scan line only. Such boxes are grown
//! vertically over the page pixels until the bar pattern stops, so every
//! reported location has a real height.

use crate::error::DecodeError;
use crate::output::{BoundingBox, DetectedSymbol};
use image::{DynamicImage, GrayImage};
use rxing::{
    BarcodeFormat, Exceptions, RXingResult, RXingResultMetadataType, RXingResultMetadataValue,
};
use tracing::debug;

/// Page image → detected symbols, in the recognizer's native order.
///
/// Finding nothing is `Ok(vec![])`, never an error.
pub trait SymbolRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<DetectedSymbol>, DecodeError>;
}

/// [`SymbolRecognizer`] backed by rxing.
///
/// rxing returns text it has already decoded with a guessed charset. When a
/// symbol carries only byte-mode data and that text is a plain Latin-1
/// reading of it, the original bytes are handed on instead, so a binary
/// payload still fails UTF-8 validation in the decode core.
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingRecognizer;

impl RxingRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolRecognizer for RxingRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<DetectedSymbol>, DecodeError> {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();

        let found = match rxing::helpers::detect_multiple_in_luma(luma.as_raw().clone(), width, height)
        {
            Ok(found) => found,
            Err(Exceptions::NotFoundException(_)) => Vec::new(),
            Err(e) => {
                return Err(DecodeError::RecognitionFailed {
                    page: 0,
                    detail: e.to_string(),
                })
            }
        };

        debug!("rxing found {} symbol(s) in {}x{} image", found.len(), width, height);
        Ok(found.iter().map(|result| to_symbol(result, &luma)).collect())
    }
}

fn to_symbol(result: &RXingResult, luma: &GrayImage) -> DetectedSymbol {
    let points: Vec<(f32, f32)> = result.getPoints().iter().map(|p| (p.x, p.y)).collect();
    let mut bounding_box = BoundingBox::enclosing(&points).unwrap_or_default();
    if bounding_box.is_flat() {
        bounding_box = extend_over_bars(bounding_box, luma);
    }

    DetectedSymbol::new(
        symbology_name(result.getBarcodeFormat()),
        payload_bytes(result),
        bounding_box,
    )
}

fn payload_bytes(result: &RXingResult) -> Vec<u8> {
    let segments: &[Vec<u8>] = match result
        .getRXingResultMetadata()
        .get(&RXingResultMetadataType::BYTE_SEGMENTS)
    {
        Some(RXingResultMetadataValue::ByteSegments(segments)) => segments.as_slice(),
        _ => &[],
    };
    latin1_source(result.getText(), segments).unwrap_or_else(|| result.getText().as_bytes().to_vec())
}

/// The concatenated byte segments, if `text` is exactly their Latin-1 reading.
fn latin1_source(text: &str, segments: &[Vec<u8>]) -> Option<Vec<u8>> {
    let raw = segments.concat();
    if raw.is_empty() || raw.is_ascii() {
        return None;
    }
    let as_latin1: String = raw.iter().map(|&b| char::from(b)).collect();
    (as_latin1 == text).then_some(raw)
}

/// Grow a flat (scan-line) box up and down while rows still show the same
/// bar pattern as the scan row.
fn extend_over_bars(bbox: BoundingBox, luma: &GrayImage) -> BoundingBox {
    let (img_w, img_h) = luma.dimensions();
    if img_w == 0 || img_h == 0 {
        return bbox;
    }
    let x0 = bbox.left.clamp(0, img_w as i32 - 1) as u32;
    let x1 = (bbox.left + bbox.width).clamp(0, img_w as i32 - 1) as u32;
    let scan = bbox.top.clamp(0, img_h as i32 - 1) as u32;

    let row = |y: u32| (x0..=x1).map(move |x| luma.get_pixel(x, y).0[0]);
    let (lo, hi) = row(scan).fold((u8::MAX, u8::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi.saturating_sub(lo) < 32 {
        return BoundingBox { height: bbox.height.max(1), ..bbox };
    }
    let threshold = ((lo as u16 + hi as u16) / 2) as u8;

    let edges = |y: u32| {
        let mut count = 0usize;
        let mut prev = None;
        for v in row(y) {
            let dark = v < threshold;
            if prev.is_some_and(|p| p != dark) {
                count += 1;
            }
            prev = Some(dark);
        }
        count
    };
    let reference = edges(scan);
    let matches = |y: u32| edges(y) * 4 >= reference * 3;

    let mut top = scan;
    while top > 0 && matches(top - 1) {
        top -= 1;
    }
    let mut bottom = scan;
    while bottom + 1 < img_h && matches(bottom + 1) {
        bottom += 1;
    }

    BoundingBox {
        top: top as i32,
        height: (bottom - top + 1) as i32,
        ..bbox
    }
}

/// zbar-style name for an rxing barcode format.
pub fn symbology_name(format: &BarcodeFormat) -> String {
    let name = match format {
        BarcodeFormat::QR_CODE => "QRCODE",
        BarcodeFormat::MICRO_QR_CODE => "MICROQR",
        BarcodeFormat::CODE_128 => "CODE128",
        BarcodeFormat::CODE_39 => "CODE39",
        BarcodeFormat::CODE_93 => "CODE93",
        BarcodeFormat::CODABAR => "CODABAR",
        BarcodeFormat::EAN_8 => "EAN8",
        BarcodeFormat::EAN_13 => "EAN13",
        BarcodeFormat::UPC_A => "UPCA",
        BarcodeFormat::UPC_E => "UPCE",
        BarcodeFormat::ITF => "I25",
        BarcodeFormat::PDF_417 => "PDF417",
        BarcodeFormat::DATA_MATRIX => "DATAMATRIX",
        BarcodeFormat::AZTEC => "AZTEC",
        BarcodeFormat::MAXICODE => "MAXICODE",
        BarcodeFormat::RSS_14 => "DATABAR",
        BarcodeFormat::RSS_EXPANDED => "DATABAR_EXP",
        other => return format!("{:?}", other).replace('_', ""),
    };
    name.to_string()
}
