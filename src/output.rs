//! Conversion results.

use serde::{Deserialize, Serialize};

use crate::format::DocumentFormat;

/// The result of one conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Converted document. UTF-8 for HTML/Markdown, binary for PDF/Word.
    #[serde(skip)]
    pub bytes: Vec<u8>,

    /// Format of `bytes`.
    pub format: DocumentFormat,

    /// Suggested file name: source stem plus the target extension.
    pub filename: String,

    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// The output as text, for HTML and Markdown targets.
    pub fn as_text(&self) -> Option<&str> {
        if self.format.is_text() {
            std::str::from_utf8(&self.bytes).ok()
        } else {
            None
        }
    }

    /// `Content-Disposition` header value for serving the output.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename.replace('"', "'"))
    }
}

/// How the conversion went.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub source: Option<DocumentFormat>,
    pub input_bytes: usize,
    pub output_bytes: usize,
    /// Conversion steps taken, e.g. `["markdown→html", "html→pdf"]`.
    pub steps: Vec<String>,
    /// Pages read from a PDF source.
    pub page_count: Option<usize>,
    /// Text extraction method label for PDF sources.
    pub extraction_method: Option<String>,
    /// 1-based index of the launch strategy that succeeded, for PDF targets.
    pub launch_attempt: Option<usize>,
    pub duration_ms: u64,
}

/// Per-file outcome of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub input: String,
    /// Written file on success.
    pub output: Option<String>,
    pub error: Option<String>,
}

/// Result of converting a whole directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
    pub duration_ms: u64,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.error.is_none()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_access_only_for_text_formats() {
        let html = ConversionOutput {
            bytes: b"<p>x</p>".to_vec(),
            format: DocumentFormat::Html,
            filename: "a.html".into(),
            stats: ConversionStats::default(),
        };
        assert_eq!(html.as_text(), Some("<p>x</p>"));

        let pdf = ConversionOutput {
            bytes: b"%PDF-1.7".to_vec(),
            format: DocumentFormat::Pdf,
            filename: "a.pdf".into(),
            stats: ConversionStats::default(),
        };
        assert_eq!(pdf.as_text(), None);
        assert_eq!(pdf.content_disposition(), "attachment; filename=\"a.pdf\"");
    }

    #[test]
    fn batch_counts() {
        let report = BatchReport {
            entries: vec![
                BatchEntry {
                    input: "a.md".into(),
                    output: Some("out/a.pdf".into()),
                    error: None,
                },
                BatchEntry {
                    input: "b.doc".into(),
                    output: None,
                    error: Some("unsupported".into()),
                },
            ],
            duration_ms: 10,
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
