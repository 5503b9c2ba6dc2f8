//! Input resolution: classify an upload by its declared content type.
//!
//! The declared MIME type is checked exactly once, here, and turned into a
//! [`MediaKind`]. Downstream stages match on the variant and never look at the
//! raw string again. A PDF must be declared as exactly `application/pdf`; any
//! `image/*` type goes to the image path, where the real format is sniffed
//! from the bytes.

use crate::error::DecodeError;
use std::path::Path;
use tracing::debug;

/// Media type declared for PDF uploads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Content type assumed by [`Upload::from_path`] when the extension is unknown.
pub const FALLBACK_CONTENT_TYPE: &str = "image/unknown";

/// How an upload will be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Rasterise every page, then recognise each page.
    Pdf,
    /// Decode the bytes as a single raster image (page 1).
    Image,
    /// Rejected before any processing.
    Unsupported,
}

impl MediaKind {
    /// Classify a declared content type.
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type == PDF_CONTENT_TYPE {
            MediaKind::Pdf
        } else if content_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Unsupported
        }
    }
}

/// An uploaded file: raw bytes plus what the client claims they are.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Original filename, if the client sent one.
    pub filename: Option<String>,
    /// Declared MIME type, verbatim.
    pub content_type: String,
    /// File content.
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(
        filename: Option<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename,
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Resolve the declared content type, failing on anything unsupported.
    pub fn media_kind(&self) -> Result<MediaKind, DecodeError> {
        match MediaKind::from_content_type(&self.content_type) {
            MediaKind::Unsupported => Err(DecodeError::UnsupportedFormat {
                content_type: self.content_type.clone(),
            }),
            kind => Ok(kind),
        }
    }

    /// Read a local file and guess its content type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DecodeError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => DecodeError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        let content_type = guess_content_type(path);
        debug!(
            "Resolved local file {} as {} ({} bytes)",
            path.display(),
            content_type,
            bytes.len()
        );

        Ok(Self {
            filename: file_name(path),
            content_type,
            bytes,
        })
    }
}

/// Guess a MIME type from the file extension, defaulting to `image/unknown`.
pub fn guess_content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn classify_content_types() {
        assert_eq!(MediaKind::from_content_type("application/pdf"), MediaKind::Pdf);
        assert_eq!(MediaKind::from_content_type("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("image/"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("text/plain"), MediaKind::Unsupported);
        assert_eq!(MediaKind::from_content_type(""), MediaKind::Unsupported);
    }

    #[test]
    fn pdf_match_is_exact() {
        assert_eq!(
            MediaKind::from_content_type("application/pdf; charset=binary"),
            MediaKind::Unsupported
        );
        assert_eq!(MediaKind::from_content_type("APPLICATION/PDF"), MediaKind::Unsupported);
        assert_eq!(MediaKind::from_content_type("Image/png"), MediaKind::Unsupported);
    }

    #[test]
    fn upload_media_kind_rejects_unsupported() {
        let upload = Upload::new(None, "text/plain", b"hello".to_vec());
        let err = upload.media_kind().unwrap_err();
        assert!(err.is_unsupported_format());

        let upload = Upload::new(None, "application/pdf", Vec::new());
        assert_eq!(upload.media_kind().unwrap(), MediaKind::Pdf);
    }

    #[test]
    fn guess_from_extension() {
        assert_eq!(guess_content_type(Path::new("scan.pdf")), "application/pdf");
        assert_eq!(guess_content_type(Path::new("label.PNG")), "image/png");
        assert_eq!(guess_content_type(Path::new("photo.jpg")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("no_extension")), "image/unknown");
    }

    #[tokio::test]
    async fn from_path_reads_file_and_guesses_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.7").unwrap();

        let upload = Upload::from_path(&path).await.unwrap();
        assert_eq!(upload.filename.as_deref(), Some("ticket.pdf"));
        assert_eq!(upload.content_type, "application/pdf");
        assert_eq!(upload.bytes, b"%PDF-1.7");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let err = Upload::from_path("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, DecodeError::FileNotFound { .. }));
    }
}
