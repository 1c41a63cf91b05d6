//! The four document formats and their names, extensions and MIME types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::DocConvError;

/// A document format understood by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Html,
    Markdown,
    Pdf,
    Word,
}

/// Extensions accepted on input, in display order.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &[".html", ".htm", ".md", ".markdown", ".pdf", ".docx", ".doc"];

/// MIME types accepted on upload.
pub const SUPPORTED_MIME_TYPES: &[&str] = &[
    "text/html",
    "text/markdown",
    "text/x-markdown",
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 4] = [
        DocumentFormat::Html,
        DocumentFormat::Markdown,
        DocumentFormat::Pdf,
        DocumentFormat::Word,
    ];

    /// Lowercase wire name: `html`, `markdown`, `pdf`, `word`.
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "word",
        }
    }

    /// Extension written for output files, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Html => "html",
            DocumentFormat::Markdown => "md",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Word => "docx",
        }
    }

    /// `Content-Type` for converted output.
    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentFormat::Html => "text/html",
            DocumentFormat::Markdown => "text/markdown",
            DocumentFormat::Pdf => "application/pdf",
            DocumentFormat::Word => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    /// `true` when content of this format is UTF-8 text rather than binary.
    pub fn is_text(self) -> bool {
        matches!(self, DocumentFormat::Html | DocumentFormat::Markdown)
    }

    /// Map a file extension (with or without the dot, any case).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(DocumentFormat::Html),
            "md" | "markdown" => Some(DocumentFormat::Markdown),
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" | "doc" => Some(DocumentFormat::Word),
            _ => None,
        }
    }

    /// Format of a file name, by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Map a MIME type.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim();
        match essence {
            "text/html" => Some(DocumentFormat::Html),
            "text/markdown" | "text/x-markdown" => Some(DocumentFormat::Markdown),
            "application/pdf" => Some(DocumentFormat::Pdf),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            | "application/msword" => Some(DocumentFormat::Word),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DocumentFormat {
    type Err = DocConvError;

    /// Accepts wire names plus common aliases (`md`, `htm`, `docx`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(DocumentFormat::Html),
            "markdown" | "md" => Ok(DocumentFormat::Markdown),
            "pdf" => Ok(DocumentFormat::Pdf),
            "word" | "docx" | "doc" => Ok(DocumentFormat::Word),
            other => Err(DocConvError::InvalidFormat {
                name: other.to_string(),
            }),
        }
    }
}
