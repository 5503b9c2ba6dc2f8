//! Raster stage: turn an upload into page images.
//!
//! PDFs go through a [`Rasterizer`] (pdfium by default); images are decoded
//! directly with the `image` crate. Both paths end in [`RasterPage`]s.
//!
//! pdfium uses thread-local state internally and both paths are CPU-bound,
//! so callers run this stage inside `tokio::task::spawn_blocking`.

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// One rendered page, 1-indexed.
#[derive(Debug, Clone)]
pub struct RasterPage {
    pub index: usize,
    pub image: DynamicImage,
}

impl RasterPage {
    /// Number pages 1..=n in the order they were produced.
    pub fn number(images: Vec<DynamicImage>) -> Vec<RasterPage> {
        images
            .into_iter()
            .enumerate()
            .map(|(i, image)| RasterPage { index: i + 1, image })
            .collect()
    }
}

/// PDF bytes → ordered page images.
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, DecodeError>;
}

/// [`Rasterizer`] backed by the pdfium library.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    config: DecoderConfig,
}

impl PdfiumRasterizer {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    fn bind(&self) -> Result<Pdfium, DecodeError> {
        let bindings = match &self.config.pdfium_lib_path {
            Some(path) => Pdfium::bind_to_library(path),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| DecodeError::PdfiumBindingFailed(e.to_string()))?;
        Ok(Pdfium::new(bindings))
    }

    /// Per-side pixel cap as pdfium expects it. The config field is public,
    /// so values past `i32::MAX` are saturated here as well as in the builder.
    fn max_pixels(&self) -> i32 {
        i32::try_from(self.config.max_rendered_pixels).unwrap_or(i32::MAX)
    }
}

impl Rasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf: &[u8]) -> Result<Vec<DynamicImage>, DecodeError> {
        let pdfium = self.bind()?;
        let password = self.config.password.as_deref();

        let document = pdfium.load_pdf_from_byte_slice(pdf, password).map_err(|e| {
            let detail = format!("{:?}", e);
            if detail.contains("Password") || detail.contains("password") {
                if password.is_some() {
                    DecodeError::WrongPassword
                } else {
                    DecodeError::PasswordRequired
                }
            } else {
                DecodeError::CorruptPdf { detail }
            }
        })?;

        let pages = document.pages();
        info!("PDF loaded: {} pages", pages.len());

        let max_pixels = self.max_pixels();
        let render_config = PdfRenderConfig::new()
            .scale_page_by_factor(self.config.render_scale())
            .set_maximum_width(max_pixels)
            .set_maximum_height(max_pixels);

        let mut images = Vec::with_capacity(pages.len() as usize);
        for (idx, page) in pages.iter().enumerate() {
            let bitmap = page.render_with_config(&render_config).map_err(|e| {
                DecodeError::RasterisationFailed {
                    page: idx + 1,
                    detail: format!("{:?}", e),
                }
            })?;

            let image = bitmap.as_image();
            debug!(
                "Rendered page {} → {}x{} px",
                idx + 1,
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Ok(images)
    }
}

/// Decode an uploaded image, sniffing the real format from its bytes.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let image = image::load_from_memory(bytes)?;
    debug!("Decoded image → {}x{} px", image.width(), image.height());
    Ok(image)
}
