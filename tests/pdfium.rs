//! Tests against a real pdfium library.
//!
//! Gated behind `PDFIUM_LIB_PATH` so they do not run where no pdfium build
//! is installed.
//!
//! Run with:
//!   PDFIUM_LIB_PATH=/path/to/libpdfium.so cargo test --test pdfium -- --nocapture

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use barcode_decode::{
    router, DecodeError, Decoder, DecoderConfig, PdfiumRasterizer, Rasterizer, ServerConfig,
    Upload,
};
use rxing::Writer;
use serde_json::Value;
use std::path::PathBuf;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless PDFIUM_LIB_PATH names an existing library.
macro_rules! pdfium_skip_unless_ready {
    () => {{
        let Ok(path) = std::env::var("PDFIUM_LIB_PATH") else {
            println!("SKIP: set PDFIUM_LIB_PATH to run pdfium tests");
            return;
        };
        let p = PathBuf::from(path);
        if !p.exists() {
            println!("SKIP: pdfium library not found: {}", p.display());
            return;
        }
        p
    }};
}

fn config(lib: PathBuf) -> DecoderConfig {
    DecoderConfig::builder().pdfium_lib_path(lib).build().unwrap()
}

const PAGE_SIZE: f32 = 200.0;
const MODULE: f32 = 5.0;

/// PDF content stream painting a QR code as filled squares, one per dark module.
fn qr_content(data: &str) -> String {
    let matrix = rxing::MultiFormatWriter::default()
        .encode(data, &rxing::BarcodeFormat::QR_CODE, 0, 0)
        .unwrap();
    let offset = (PAGE_SIZE - matrix.getWidth() as f32 * MODULE) / 2.0;

    let mut ops = String::from("0 g\n");
    for y in 0..matrix.getHeight() {
        for x in 0..matrix.getWidth() {
            if matrix.get(x, y) {
                // PDF user space grows upwards.
                let px = offset + x as f32 * MODULE;
                let py = PAGE_SIZE - offset - (y + 1) as f32 * MODULE;
                ops.push_str(&format!("{px} {py} {MODULE} {MODULE} re\n"));
            }
        }
    }
    ops.push_str("f\n");
    ops
}

/// Minimal PDF with one page per content stream, in order.
fn build_pdf(pages: &[String]) -> Vec<u8> {
    let n = pages.len();
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            (0..n)
                .map(|i| format!("{} 0 R", 3 + 2 * i))
                .collect::<Vec<_>>()
                .join(" "),
            n
        ),
    ];
    for (i, content) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_SIZE} {PAGE_SIZE}] /Contents {} 0 R >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref = pdf.len();
    let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for off in offsets {
        table.push_str(&format!("{off:010} 00000 n \n"));
    }
    table.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    pdf.extend_from_slice(table.as_bytes());
    pdf
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn garbage_bytes_are_corrupt_pdf() {
    let lib = pdfium_skip_unless_ready!();

    let err = PdfiumRasterizer::new(config(lib))
        .rasterize(b"fake pdf content")
        .unwrap_err();

    assert!(matches!(err, DecodeError::CorruptPdf { .. }), "got {err:?}");
    assert!(!err.is_unsupported_format());
}

#[test]
fn renders_every_page_in_order() {
    let lib = pdfium_skip_unless_ready!();
    let pdf = build_pdf(&[qr_content("page-1"), String::new(), qr_content("page-3")]);

    let images = PdfiumRasterizer::new(config(lib)).rasterize(&pdf).unwrap();

    assert_eq!(images.len(), 3);
    // 200 pt at the default 200 DPI.
    let expected = (PAGE_SIZE * 200.0 / 72.0).round() as u32;
    for image in &images {
        assert!(image.width().abs_diff(expected) <= 1, "width {}", image.width());
    }
}

#[tokio::test]
async fn multi_page_pdf_reports_symbols_by_page() {
    let lib = pdfium_skip_unless_ready!();
    let pdf = build_pdf(&[qr_content("page-1"), String::new(), qr_content("page-3")]);

    let outcome = Decoder::new(config(lib))
        .decode(Upload::new(Some("three.pdf".into()), "application/pdf", pdf))
        .await
        .unwrap();

    assert_eq!(outcome.page_count, 3);
    let found: Vec<(usize, &str)> = outcome
        .results
        .iter()
        .map(|r| (r.page, r.data.as_str()))
        .collect();
    assert_eq!(found, vec![(1, "page-1"), (3, "page-3")]);
}

#[tokio::test]
async fn corrupt_pdf_upload_is_internal_error() {
    let lib = pdfium_skip_unless_ready!();
    let server = TestServer::new(router(Decoder::new(config(lib)), &ServerConfig::default())).unwrap();

    let response = server
        .post("/decode/")
        .multipart(MultipartForm::new().add_part(
            "file",
            Part::bytes(b"fake pdf content".to_vec())
                .file_name("test_pdf.pdf")
                .mime_type("application/pdf"),
        ))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = response.json::<Value>()["detail"].as_str().unwrap().to_string();
    assert!(detail.starts_with("Error processing file: PDF is corrupt"), "got: {detail}");
}
