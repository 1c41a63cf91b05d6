//! Error types for the docconv library.
//!
//! * [`DocConvError`] — **Fatal**: the conversion produced nothing. Returned
//!   from every `convert*` entry point.
//!
//! * [`AttemptError`] — **Non-fatal**: one launch strategy of a fallback
//!   chain failed and the next one is about to be tried. Reported to logs and
//!   to the progress callback; the caller only ever sees the final
//!   [`DocConvError::LaunchExhausted`] if every strategy fails.

use std::path::PathBuf;
use thiserror::Error;

use crate::format::DocumentFormat;

/// All fatal errors returned by the docconv library.
#[derive(Debug, Error)]
pub enum DocConvError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The format could not be derived from the file name or content.
    #[error("Cannot determine the format of '{name}'\nSupported extensions: .html .htm .md .markdown .pdf .docx .doc")]
    UnknownFormat { name: String },

    /// A format name given by the caller is not one of html/markdown/pdf/word.
    #[error("Unknown format '{name}' (expected one of: html, markdown, pdf, word)")]
    InvalidFormat { name: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// Text-based source content is not valid UTF-8.
    #[error("{format} input is not valid UTF-8: {detail}")]
    InvalidEncoding {
        format: DocumentFormat,
        detail: String,
    },

    /// The bytes handed in as PDF do not start with `%PDF`.
    #[error("Input is not a valid PDF (first bytes: {magic:?})")]
    NotAPdf { magic: Vec<u8> },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// The (source, target) pair has no conversion path.
    #[error("Conversion from {from} to {to} is not supported")]
    UnsupportedConversion {
        from: DocumentFormat,
        to: DocumentFormat,
    },

    /// Every launch strategy for an external tool failed.
    ///
    /// Only the last failure is kept; earlier ones were logged as they
    /// happened.
    #[error("Could not launch {tool} after {attempts} attempt(s).\nLast error: {last_error}\nInstall Chrome/Chromium or set CHROME_BIN=/path/to/chrome.")]
    LaunchExhausted {
        tool: String,
        attempts: usize,
        last_error: String,
    },

    /// An external operation exceeded its time bound.
    #[error("{operation} timed out after {secs}s")]
    Timeout { operation: String, secs: u64 },

    /// A delegate (browser, pandoc, DOCX writer, PDF reader) failed.
    #[error("{delegate} failed: {detail}")]
    DelegateFailed { delegate: String, detail: String },

    /// The PDF could not be opened or its text read by any extractor.
    #[error("Could not extract text from PDF: {detail}")]
    ExtractionFailed { detail: String },

    /// A required external program is not installed.
    #[error("'{program}' was not found.\n{hint}")]
    ToolNotFound { program: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read an input file after it was found.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocConvError {
    /// `true` for errors caused by the request itself rather than by a
    /// delegate or the environment. The server maps these to HTTP 400.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DocConvError::UnsupportedConversion { .. }
                | DocConvError::UnknownFormat { .. }
                | DocConvError::InvalidFormat { .. }
                | DocConvError::InvalidEncoding { .. }
                | DocConvError::NotAPdf { .. }
        )
    }
}

/// A single failed attempt inside a fallback chain.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AttemptError {
    /// The strategy ran and failed.
    #[error("attempt {index} ({strategy}) failed: {reason}")]
    Failed {
        index: usize,
        strategy: String,
        reason: String,
    },

    /// The strategy exceeded the per-attempt bound.
    #[error("attempt {index} ({strategy}) timed out after {secs}s")]
    TimedOut {
        index: usize,
        strategy: String,
        secs: u64,
    },
}

impl AttemptError {
    /// 1-based position of the attempt in its chain.
    pub fn index(&self) -> usize {
        match self {
            AttemptError::Failed { index, .. } | AttemptError::TimedOut { index, .. } => *index,
        }
    }

    /// The message reported to callers when this is the last attempt.
    pub fn reason(&self) -> String {
        match self {
            AttemptError::Failed { reason, .. } => reason.clone(),
            AttemptError::TimedOut { secs, .. } => format!("timed out after {secs}s"),
        }
    }
}
