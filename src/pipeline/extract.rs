//! Text extraction from PDF bytes.
//!
//! PDFium is tried first: it reads text per page in reading order and
//! reports the page count. If the library cannot be bound, the document
//! will not open, or the text is too short to be useful, the pure-Rust
//! `pdf-extract` crate gets a second try. Short output from both is still
//! returned; the reconstructor turns it into a fallback paragraph.
//!
//! Both extractors are CPU-bound and run inside `spawn_blocking`.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::DocConvError;

/// Which extractor produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Pdfium,
    Fallback,
}

impl ExtractionMethod {
    /// Label shown in the conversion banner.
    pub fn label(self) -> &'static str {
        match self {
            ExtractionMethod::Pdfium => "PDFium text extraction",
            ExtractionMethod::Fallback => "Text extraction (fallback)",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Raw text, one line per visual line, pages separated by a blank line.
    pub text: String,
    pub page_count: Option<usize>,
    pub method: ExtractionMethod,
}

/// Reject anything that does not start with the `%PDF` signature.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), DocConvError> {
    if bytes.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(DocConvError::NotAPdf {
            magic: bytes.iter().take(8).copied().collect(),
        })
    }
}

/// Extract the text of a PDF.
///
/// `min_chars` is the trimmed length below which PDFium output is treated
/// as a failed extraction.
///
/// # Errors
/// [`DocConvError::NotAPdf`] for non-PDF input, and
/// [`DocConvError::ExtractionFailed`] when neither extractor could read it.
pub async fn extract_text(bytes: Arc<[u8]>, min_chars: usize) -> Result<ExtractedText, DocConvError> {
    check_pdf_magic(&bytes)?;

    let primary = {
        let bytes = Arc::clone(&bytes);
        tokio::task::spawn_blocking(move || extract_with_pdfium(&bytes))
            .await
            .map_err(|e| DocConvError::Internal(format!("PDFium task panicked: {e}")))?
    };

    let pdfium_pages = match primary {
        Ok((text, pages)) if text.trim().chars().count() >= min_chars => {
            info!("Extracted {} chars from {} pages with PDFium", text.len(), pages);
            return Ok(ExtractedText {
                text,
                page_count: Some(pages),
                method: ExtractionMethod::Pdfium,
            });
        }
        Ok((text, pages)) => {
            debug!(
                "PDFium returned minimal text ({} chars), trying fallback",
                text.trim().len()
            );
            Some(pages)
        }
        Err(e) => {
            warn!("PDFium extraction failed: {}, trying fallback", e);
            None
        }
    };

    let text = tokio::task::spawn_blocking(move || extract_with_fallback(&bytes))
        .await
        .map_err(|e| DocConvError::Internal(format!("extraction task panicked: {e}")))??;

    debug!("Fallback extractor returned {} chars", text.len());
    Ok(ExtractedText {
        text,
        page_count: pdfium_pages,
        method: ExtractionMethod::Fallback,
    })
}

fn extract_with_pdfium(bytes: &[u8]) -> Result<(String, usize), String> {
    let pdfium = docconv_locate::bind_pdfium_silent().map_err(|e| e.to_string())?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| format!("{e:?}"))?;

    let mut text = String::new();
    let mut pages = 0usize;
    for page in document.pages().iter() {
        pages += 1;
        let page_text = page.text().map_err(|e| format!("page {pages}: {e:?}"))?;
        if !text.is_empty() {
            text.push_str("\n\n");
        }
        text.push_str(&page_text.all());
    }
    Ok((text, pages))
}

fn extract_with_fallback(bytes: &[u8]) -> Result<String, DocConvError> {
    // pdf-extract panics on some malformed documents
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match result {
        Ok(Ok(text)) => Ok(text.replace("\r\n", "\n")),
        Ok(Err(e)) => Err(DocConvError::ExtractionFailed {
            detail: e.to_string(),
        }),
        Err(_) => Err(DocConvError::ExtractionFailed {
            detail: "PDF parser panicked (malformed PDF)".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_check() {
        assert!(check_pdf_magic(b"%PDF-1.7\n...").is_ok());
        match check_pdf_magic(b"<html>hello</html>") {
            Err(DocConvError::NotAPdf { magic }) => assert_eq!(magic, b"<html>he"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(check_pdf_magic(b"").is_err());
    }

    #[test]
    fn method_labels() {
        assert_eq!(ExtractionMethod::Pdfium.label(), "PDFium text extraction");
        assert_eq!(ExtractionMethod::Fallback.to_string(), "Text extraction (fallback)");
    }

    #[tokio::test]
    async fn non_pdf_is_rejected_before_extraction() {
        let bytes: Arc<[u8]> = Arc::from(&b"plain text, not a pdf"[..]);
        let err = extract_text(bytes, 100).await.unwrap_err();
        assert!(matches!(err, DocConvError::NotAPdf { .. }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn truncated_pdf_fails_cleanly() {
        let bytes: Arc<[u8]> = Arc::from(&b"%PDF-1.4\n%garbage without objects"[..]);
        let err = extract_text(bytes, 100).await.unwrap_err();
        assert!(
            matches!(err, DocConvError::ExtractionFailed { .. }),
            "got: {err}"
        );
    }
}
