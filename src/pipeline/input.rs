//! Input resolution: turn a user-supplied path or URL into bytes plus a
//! detected [`DocumentFormat`].
//!
//! Detection order is file extension, then (for downloads) the response
//! `Content-Type`, then the `%PDF` signature. Anything else is
//! [`DocConvError::UnknownFormat`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::DocConvError;
use crate::format::DocumentFormat;

/// Where the bytes came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOrigin {
    Local(PathBuf),
    Url(String),
}

/// A fully read input.
#[derive(Debug)]
pub struct ResolvedInput {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
    /// File name used for banners and output naming.
    pub name: String,
    pub origin: InputOrigin,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve a local path or an HTTP(S) URL.
///
/// `format` overrides detection when the caller already knows it.
pub async fn resolve_input(
    input: &str,
    format: Option<DocumentFormat>,
    download_timeout_secs: u64,
) -> Result<ResolvedInput, DocConvError> {
    if is_url(input) {
        download_url(input, format, download_timeout_secs).await
    } else {
        resolve_local(Path::new(input), format).await
    }
}

async fn resolve_local(
    path: &Path,
    format: Option<DocumentFormat>,
) -> Result<ResolvedInput, DocConvError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DocConvError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => DocConvError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => DocConvError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let format = match format {
        Some(f) => f,
        None => detect_format(&name, None, &bytes)?,
    };

    debug!("Resolved local {} input: {} ({} bytes)", format, path.display(), bytes.len());
    Ok(ResolvedInput {
        bytes,
        format,
        name,
        origin: InputOrigin::Local(path.to_path_buf()),
    })
}

async fn download_url(
    url: &str,
    format: Option<DocumentFormat>,
    timeout_secs: u64,
) -> Result<ResolvedInput, DocConvError> {
    info!("Downloading {}", url);

    let failed = |reason: String| DocConvError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DocConvError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let name = filename_from_url(url);

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            DocConvError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            failed(e.to_string())
        }
    })?;

    let format = match format {
        Some(f) => f,
        None => detect_format(&name, content_type.as_deref(), &bytes)?,
    };
    info!("Downloaded {} bytes of {}", bytes.len(), format);

    Ok(ResolvedInput {
        bytes: bytes.to_vec(),
        format,
        name,
        origin: InputOrigin::Url(url.to_string()),
    })
}

/// Work out the format of `bytes` named `name`.
pub fn detect_format(
    name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<DocumentFormat, DocConvError> {
    DocumentFormat::from_path(name)
        .or_else(|| content_type.and_then(DocumentFormat::from_mime))
        .or_else(|| bytes.starts_with(b"%PDF").then_some(DocumentFormat::Pdf))
        .ok_or_else(|| DocConvError::UnknownFormat {
            name: name.to_string(),
        })
}

/// Last path segment of a URL, or `downloaded-document`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "downloaded-document".to_string())
}
