//! HTTP front end: `POST /decode/` over the decode core.
//!
//! The handler only deals with multipart plumbing and status mapping; every
//! decision about pages and symbols is made by [`Decoder`].

use crate::config::ServerConfig;
use crate::decode::Decoder;
use crate::error::DecodeError;
use crate::output::DecodeResponse;
use crate::pipeline::input::{MediaKind, Upload};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared, read-only state for every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub decoder: Decoder,
}

/// Errors surfaced by the HTTP layer. Every variant renders as `{"detail": …}`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Declared type is neither `image/*` nor `application/pdf`.
    #[error("Unsupported format. Use: PNG, JPG, PDF")]
    UnsupportedFormat,

    /// The form had no `file` part.
    #[error("Missing required form field 'file'")]
    MissingFile,

    /// The multipart body itself could not be read (malformed, too large).
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    /// Anything that failed while processing the file.
    #[error("Error processing file: {0}")]
    Decode(DecodeError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::MissingFile => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Multipart { status, .. } => *status,
            ApiError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        if err.is_unsupported_format() {
            ApiError::UnsupportedFormat
        } else {
            ApiError::Decode(err)
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::Multipart {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Decode(_) => tracing::error!("Decode failed: {}", self),
            ApiError::Multipart { .. } => tracing::warn!("Rejected upload: {}", self),
            ApiError::UnsupportedFormat | ApiError::MissingFile => {
                tracing::info!("Rejected upload: {}", self)
            }
        }

        let status = self.status_code();
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Build the application router.
pub fn router(decoder: Decoder, config: &ServerConfig) -> Router {
    Router::new()
        .route("/decode/", post(decode_upload))
        .route("/decode", post(decode_upload))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { decoder })
}

/// Bind `config.host`/`config.port` and serve until `shutdown` resolves.
///
/// The host may be an IP literal or a name such as `localhost`.
pub async fn serve<F>(decoder: Decoder, config: &ServerConfig, shutdown: F) -> Result<(), DecodeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|e| {
            DecodeError::Internal(format!(
                "Failed to bind {}:{}: {}",
                config.host, config.port, e
            ))
        })?;
    let addr = listener
        .local_addr()
        .map_err(|e| DecodeError::Internal(format!("Failed to read bound address: {}", e)))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(decoder, config))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| DecodeError::Internal(format!("Server error: {}", e)))
}

/// `POST /decode/`: multipart field `file`.
pub async fn decode_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DecodeResponse>, ApiError> {
    // Not multipart at all: same `{"detail": ...}` shape as every other error.
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().unwrap_or_default().to_string();

        // Reject before reading the body.
        if MediaKind::from_content_type(&content_type) == MediaKind::Unsupported {
            return Err(ApiError::UnsupportedFormat);
        }

        let bytes = field.bytes().await?;
        info!(
            filename = ?filename,
            content_type = %content_type,
            size = bytes.len(),
            "Received upload"
        );
        upload = Some(Upload::new(filename, content_type, bytes.to_vec()));
        break;
    }

    let upload = upload.ok_or(ApiError::MissingFile)?;
    let file = upload.filename.clone();
    let outcome = state.decoder.decode(upload).await?;

    Ok(Json(DecodeResponse::new(file, outcome)))
}

/// `GET /healthz`: liveness check.
pub async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
