//! Pipeline stages for barcode decoding.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ recognize
//! (MIME)    (pdfium /   (rxing)
//!            image)
//! ```
//!
//! 1. [`input`]    : classify the declared content type into a `MediaKind`
//! 2. [`render`]   : rasterise PDF pages or decode the uploaded image
//! 3. [`recognize`]: locate and decode symbols on each page image

pub mod input;
pub mod recognize;
pub mod render;
