//! HTTP surface (feature `server`).
//!
//! | Route | Method | Body |
//! |-------|--------|------|
//! | `/health` | GET | |
//! | `/api/supported-types` | GET | |
//! | `/api/convert` | POST | JSON `{content, sourceType, targetType, filename?}` |
//! | `/api/convert-upload` | POST | multipart `file`, `targetType` |
//! | `/api/upload` | POST | multipart `file` |
//!
//! Conversions answer with the converted bytes and an attachment
//! `Content-Disposition`. Failures answer with JSON: `{"error"}` and 400 for
//! bad requests, `{"error","details"}` and 500 when a delegate fails.
//!
//! Uploaded files are written under the upload directory with a random
//! name and removed when the request finishes, whatever the outcome.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ConversionConfig;
use crate::convert::{convert_named, supported_conversions};
use crate::error::DocConvError;
use crate::format::{DocumentFormat, SUPPORTED_EXTENSIONS, SUPPORTED_MIME_TYPES};
use crate::output::ConversionOutput;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Request body limit for every route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConversionConfig>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(config: ConversionConfig, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: Arc::new(config),
            upload_dir: upload_dir.into(),
        }
    }
}

/// Build the router with all endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/supported-types", get(supported_types))
        .route("/api/convert", post(convert_content))
        .route("/api/convert-upload", post(convert_upload))
        .route("/api/upload", post(upload))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn start_server(addr: &str, state: AppState) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "docconv server listening on {} (uploads in {})",
        listener.local_addr()?,
        state.upload_dir.display()
    );
    axum::serve(listener, build_router(state)).await
}

// ── Errors ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

impl ApiError {
    fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details: None,
        }
    }

    /// 400 for problems with the request, 500 with `context` otherwise.
    fn conversion(context: &str, e: DocConvError) -> Self {
        if e.is_client_error() {
            Self::bad_request(e.to_string())
        } else {
            warn!("{}: {}", context, e);
            Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: context.to_string(),
                details: Some(e.to_string()),
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self {
            status: e.status(),
            error: e.body_text(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "OK", "message": "Server is running" }))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedTypes {
    pub input: Vec<DocumentFormat>,
    pub output: Vec<DocumentFormat>,
    pub extensions: Vec<String>,
    pub mime_types: Vec<String>,
}

async fn supported_types() -> Json<SupportedTypes> {
    let pairs = supported_conversions();
    let formats = |pick: fn(&(DocumentFormat, DocumentFormat)) -> DocumentFormat| -> Vec<DocumentFormat> {
        DocumentFormat::ALL
            .into_iter()
            .filter(|f| pairs.iter().any(|p| pick(p) == *f))
            .collect()
    };
    let mut input = formats(|p| p.0);
    // Word files are accepted on upload even though nothing converts them.
    input.push(DocumentFormat::Word);

    Json(SupportedTypes {
        input,
        output: formats(|p| p.1),
        extensions: SUPPORTED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        mime_types: SUPPORTED_MIME_TYPES.iter().map(|s| s.to_string()).collect(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub content: Option<String>,
    pub source_type: Option<String>,
    pub target_type: Option<String>,
    pub filename: Option<String>,
}

fn attachment(output: ConversionOutput) -> Response {
    (
        [
            (header::CONTENT_TYPE, output.format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, output.content_disposition()),
        ],
        output.bytes,
    )
        .into_response()
}

fn parse_format(name: &str) -> Result<DocumentFormat, ApiError> {
    name.parse()
        .map_err(|e: DocConvError| ApiError::bad_request(e.to_string()))
}

async fn convert_content(
    State(state): State<AppState>,
    Json(req): Json<ConvertRequest>,
) -> Result<Response, ApiError> {
    let (Some(content), Some(source), Some(target)) = (req.content, req.source_type, req.target_type)
    else {
        return Err(ApiError::bad_request(
            "Missing required parameters: content, sourceType, targetType",
        ));
    };
    let from = parse_format(&source)?;
    let to = parse_format(&target)?;

    let output = convert_named(
        content.as_bytes(),
        from,
        to,
        req.filename.as_deref(),
        &state.config,
    )
    .await
    .map_err(|e| ApiError::conversion("Conversion failed", e))?;
    Ok(attachment(output))
}

/// One uploaded file, kept on disk for the lifetime of the value.
struct StoredUpload {
    path: PathBuf,
    original_name: String,
    format: DocumentFormat,
    bytes: Vec<u8>,
}

impl StoredUpload {
    async fn save(
        dir: &Path,
        original_name: String,
        format: DocumentFormat,
        bytes: Vec<u8>,
    ) -> Result<Self, ApiError> {
        let path = dir.join(format!("{}.{}", Uuid::new_v4(), format.extension()));
        let stored = async {
            tokio::fs::create_dir_all(dir).await?;
            tokio::fs::write(&path, &bytes).await
        }
        .await;
        if let Err(e) = stored {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(ApiError::conversion(
                "File upload failed",
                DocConvError::OutputWriteFailed { path, source: e },
            ));
        }
        Ok(Self {
            path,
            original_name,
            format,
            bytes,
        })
    }
}

impl Drop for StoredUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove upload {}: {}", self.path.display(), e);
            }
        }
    }
}

/// The `file` part plus any text fields of a multipart body.
struct UploadForm {
    file: StoredUpload,
    target_type: Option<String>,
}

async fn read_upload(dir: &Path, mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file: Option<StoredUpload> = None;
    let mut target_type = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                if file.is_some() {
                    return Err(ApiError::bad_request("Only one file may be uploaded"));
                }
                let name = field.file_name().unwrap_or_default().to_string();
                let mime = field.content_type().map(str::to_string);
                let format = DocumentFormat::from_path(&name)
                    .or_else(|| mime.as_deref().and_then(DocumentFormat::from_mime))
                    .ok_or_else(|| {
                        ApiError::bad_request(format!(
                            "Invalid file type. Only {} files are allowed.",
                            SUPPORTED_EXTENSIONS.join(", ")
                        ))
                    })?;
                let bytes = field.bytes().await?.to_vec();
                file = Some(StoredUpload::save(dir, name, format, bytes).await?);
            }
            Some("targetType") => target_type = Some(field.text().await?),
            _ => {}
        }
    }

    let file = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    Ok(UploadForm { file, target_type })
}

async fn convert_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = read_upload(&state.upload_dir, multipart).await?;
    let target = form
        .target_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Target type is required"))?;
    let to = parse_format(target)?;

    let file = &form.file;
    let output = convert_named(
        &file.bytes,
        file.format,
        to,
        Some(&file.original_name),
        &state.config,
    )
    .await
    .map_err(|e| ApiError::conversion("File conversion failed", e))?;
    Ok(attachment(output))
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub file_type: DocumentFormat,
    pub content: String,
    pub message: String,
}

async fn upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = read_upload(&state.upload_dir, multipart).await?;
    let file = &form.file;

    let content = match file.format {
        DocumentFormat::Html | DocumentFormat::Markdown => {
            String::from_utf8_lossy(&file.bytes).into_owned()
        }
        DocumentFormat::Pdf => {
            match convert_named(
                &file.bytes,
                DocumentFormat::Pdf,
                DocumentFormat::Html,
                Some(&file.original_name),
                &state.config,
            )
            .await
            {
                Ok(output) => String::from_utf8_lossy(&output.bytes).into_owned(),
                Err(e) => {
                    warn!("PDF preview of {} failed: {}", file.original_name, e);
                    pdf_failure_notice(&file.original_name, &e)
                }
            }
        }
        DocumentFormat::Word => format!("Word document: {}", file.original_name),
    };

    Ok(Json(UploadResponse {
        success: true,
        filename: file.original_name.clone(),
        file_type: file.format,
        content,
        message: "File uploaded and processed successfully".to_string(),
    }))
}

fn pdf_failure_notice(filename: &str, error: &DocConvError) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; padding: 20px; border: 1px solid #ddd; border-radius: 5px; background-color: #f9f9f9;">
    <h3 style="color: #d32f2f; margin-top: 0;">PDF Conversion Failed</h3>
    <p><strong>File:</strong> {}</p>
    <p><strong>Error:</strong> {}</p>
    <hr style="margin: 15px 0;">
    <p style="color: #666; font-size: 14px;"><strong>Possible reasons:</strong></p>
    <ul style="color: #666; font-size: 14px;">
        <li>The PDF file is corrupted or damaged</li>
        <li>The PDF is password-protected</li>
        <li>The PDF contains only images (no text)</li>
        <li>The PDF is in an unsupported format</li>
    </ul>
    <p style="color: #666; font-size: 14px;"><strong>Try:</strong> opening the PDF in a reader to check it, or upload a different file.</p>
</div>"#,
        html_escape::encode_text(filename),
        html_escape::encode_text(&error.to_string()),
    )
}
