//! Configuration types for barcode decoding and the HTTP server.
//!
//! Decoder behaviour is controlled through [`DecoderConfig`], built via its
//! [`DecoderConfigBuilder`]. Server settings live in [`ServerConfig`]; they
//! never reach the decode core.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest value accepted for [`DecoderConfig::max_rendered_pixels`].
pub const MAX_RENDER_DIMENSION: u32 = i32::MAX as u32;

/// Configuration for the decode core.
///
/// # Example
/// ```rust
/// use barcode_decode::DecoderConfig;
///
/// let config = DecoderConfig::builder()
///     .dpi(300)
///     .max_rendered_pixels(5000)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 300);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 200.
    ///
    /// Small 1D barcodes lose bars below ~150 DPI; 200 keeps Code128 and EAN
    /// symbols on typical invoices and labels readable.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 4000.
    ///
    /// Caps memory on oversized pages (posters, engineering drawings) while
    /// leaving A4/Letter at 200 DPI untouched.
    pub max_rendered_pixels: u32,

    /// Explicit path to the pdfium shared library.
    /// If None, the platform's system library search path is used.
    pub pdfium_lib_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            pdfium_lib_path: None,
            password: None,
        }
    }
}

impl DecoderConfig {
    /// Create a new builder for `DecoderConfig`.
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor pdfium applies to the page's point size (1 pt = 1/72 in).
    pub fn render_scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`DecoderConfig`].
#[derive(Debug)]
pub struct DecoderConfigBuilder {
    config: DecoderConfig,
}

impl DecoderConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    /// Clamped to `100..=i32::MAX`; pdfium takes the cap as an `i32`.
    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.clamp(100, MAX_RENDER_DIMENSION);
        self
    }

    pub fn pdfium_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DecoderConfig, DecodeError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(DecodeError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if let Some(path) = &c.pdfium_lib_path {
            if path.as_os_str().is_empty() {
                return Err(DecodeError::InvalidConfig(
                    "pdfium library path must not be empty".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

/// Settings for the HTTP front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind, as an IP literal or a resolvable host name. Default: `0.0.0.0`.
    pub host: String,
    /// TCP port. Default: 8000.
    pub port: u16,
    /// Largest accepted request body in bytes. Default: 50 MiB.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DecoderConfig::default();
        assert_eq!(c.dpi, 200);
        assert_eq!(c.max_rendered_pixels, 4000);
        assert!(c.pdfium_lib_path.is_none());
        assert!(c.password.is_none());
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = DecoderConfig::builder()
            .dpi(10_000)
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 600);
        assert_eq!(c.max_rendered_pixels, 100);
    }

    #[test]
    fn builder_rejects_empty_library_path() {
        let err = DecoderConfig::builder().pdfium_lib_path("").build().unwrap_err();
        assert!(matches!(err, DecodeError::InvalidConfig(_)));
    }

    #[test]
    fn render_scale_tracks_dpi() {
        let c = DecoderConfig::builder().dpi(144).build().unwrap();
        assert!((c.render_scale() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn password_is_not_serialised() {
        let c = DecoderConfig::builder().password("hunter2").build().unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn max_rendered_pixels_fits_pdfium_i32() {
        let c = DecoderConfig::builder()
            .max_rendered_pixels(u32::MAX)
            .build()
            .unwrap();
        assert_eq!(c.max_rendered_pixels, i32::MAX as u32);
        assert!(i32::try_from(c.max_rendered_pixels).is_ok());
    }

    #[test]
    fn server_defaults() {
        let s = ServerConfig::default();
        assert_eq!(s.host, "0.0.0.0");
        assert_eq!(s.port, 8000);
        assert_eq!(s.max_upload_bytes, 50 * 1024 * 1024);
    }
}
