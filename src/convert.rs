//! Conversion dispatcher and file-level entry points.
//!
//! Every supported (source, target) pair maps to a fixed route of
//! [`Step`]s. Routes pass through HTML where two delegates have to be
//! chained, e.g. Markdown → PDF is `markdown→html` then `html→pdf`.
//!
//! | from \ to | html | markdown | pdf | word |
//! |-----------|------|----------|-----|------|
//! | html      |      | ✓        | ✓   | ✓    |
//! | markdown  | ✓    |          | ✓   | ✓    |
//! | pdf       | ✓    | ✓        |     | ✓    |
//! | word      |      |          |     |      |
//!
//! Delegate errors are returned as they are. A failed step ends the
//! conversion; nothing partial is returned.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::ConversionConfig;
use crate::error::DocConvError;
use crate::format::DocumentFormat;
use crate::output::{BatchEntry, BatchReport, ConversionOutput, ConversionStats};
use crate::pipeline::markdown::{self, MarkdownOptions};
use crate::pipeline::template::{self, Banner};
use crate::pipeline::{extract, input, reconstruct, render, word};

/// Output name stem used when the input has no usable name.
pub const DEFAULT_STEM: &str = "converted-document";

/// One delegate call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    MarkdownToHtml,
    HtmlToMarkdown,
    HtmlToPdf,
    HtmlToWord,
    PdfToHtml,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Step::MarkdownToHtml => "markdown→html",
            Step::HtmlToMarkdown => "html→markdown",
            Step::HtmlToPdf => "html→pdf",
            Step::HtmlToWord => "html→word",
            Step::PdfToHtml => "pdf→html",
        }
    }
}

/// The steps converting `from` into `to`.
///
/// # Errors
/// [`DocConvError::UnsupportedConversion`] for identity pairs, Word sources
/// and anything else without a route.
pub fn route(from: DocumentFormat, to: DocumentFormat) -> Result<&'static [Step], DocConvError> {
    use DocumentFormat::*;
    use Step::*;

    let steps: &'static [Step] = match (from, to) {
        (Html, Pdf) => &[HtmlToPdf],
        (Html, Word) => &[HtmlToWord],
        (Html, Markdown) => &[HtmlToMarkdown],
        (Markdown, Html) => &[MarkdownToHtml],
        (Markdown, Pdf) => &[MarkdownToHtml, HtmlToPdf],
        (Markdown, Word) => &[MarkdownToHtml, HtmlToWord],
        (Pdf, Html) => &[PdfToHtml],
        (Pdf, Word) => &[PdfToHtml, HtmlToWord],
        (Pdf, Markdown) => &[PdfToHtml, HtmlToMarkdown],
        _ => return Err(DocConvError::UnsupportedConversion { from, to }),
    };
    Ok(steps)
}

/// Every supported (source, target) pair.
pub fn supported_conversions() -> Vec<(DocumentFormat, DocumentFormat)> {
    DocumentFormat::ALL
        .iter()
        .flat_map(|&from| DocumentFormat::ALL.iter().map(move |&to| (from, to)))
        .filter(|&(from, to)| route(from, to).is_ok())
        .collect()
}

/// Convert in-memory content.
///
/// The output is named `converted-document.<ext>`; use
/// [`convert_named`] to derive the name from the source file.
pub async fn convert(
    content: &[u8],
    from: DocumentFormat,
    to: DocumentFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocConvError> {
    convert_named(content, from, to, None, config).await
}

/// Convert in-memory content that came from a file called `name`.
pub async fn convert_named(
    content: &[u8],
    from: DocumentFormat,
    to: DocumentFormat,
    name: Option<&str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocConvError> {
    let start = Instant::now();
    let steps = route(from, to)?;
    info!("Converting {} → {} ({} bytes)", from, to, content.len());

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(from, to);
    }

    let mut stats = ConversionStats {
        source: Some(from),
        input_bytes: content.len(),
        ..ConversionStats::default()
    };

    let display_name = name.unwrap_or(DEFAULT_STEM);
    let mut current = content.to_vec();
    let mut format = from;
    for &step in steps {
        debug!("Step {}", step.label());
        if let Some(ref cb) = config.progress_callback {
            cb.on_stage(step.label());
        }
        current = run_step(step, current, format, display_name, config, &mut stats).await?;
        format = step_output(step);
        stats.steps.push(step.label().to_string());
    }

    stats.output_bytes = current.len();
    stats.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Conversion complete: {} bytes in {}ms",
        stats.output_bytes, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(current.len());
    }

    Ok(ConversionOutput {
        bytes: current,
        format: to,
        filename: output_filename(name, to),
        stats,
    })
}

fn step_output(step: Step) -> DocumentFormat {
    match step {
        Step::MarkdownToHtml | Step::PdfToHtml => DocumentFormat::Html,
        Step::HtmlToMarkdown => DocumentFormat::Markdown,
        Step::HtmlToPdf => DocumentFormat::Pdf,
        Step::HtmlToWord => DocumentFormat::Word,
    }
}

fn into_text(bytes: Vec<u8>, format: DocumentFormat) -> Result<String, DocConvError> {
    String::from_utf8(bytes).map_err(|e| DocConvError::InvalidEncoding {
        format,
        detail: e.utf8_error().to_string(),
    })
}

async fn run_step(
    step: Step,
    input: Vec<u8>,
    format: DocumentFormat,
    name: &str,
    config: &ConversionConfig,
    stats: &mut ConversionStats,
) -> Result<Vec<u8>, DocConvError> {
    match step {
        Step::MarkdownToHtml => {
            let md = into_text(input, format)?;
            let opts = MarkdownOptions {
                breaks: config.markdown_breaks,
                gfm: config.markdown_gfm,
            };
            Ok(markdown::markdown_to_html(&md, opts).into_bytes())
        }
        Step::HtmlToMarkdown => {
            let html = into_text(input, format)?;
            Ok(markdown::html_to_markdown(&html).into_bytes())
        }
        Step::HtmlToPdf => {
            let html = into_text(input, format)?;
            let rendered = render::html_to_pdf(&html, config).await?;
            stats.launch_attempt = Some(rendered.attempt);
            Ok(rendered.bytes)
        }
        Step::HtmlToWord => {
            let html = into_text(input, format)?;
            word::html_to_word(&html, config).await
        }
        Step::PdfToHtml => {
            let extracted =
                extract::extract_text(Arc::from(input), config.min_extracted_chars).await?;
            let fragment = reconstruct::reconstruct(&extracted.text);
            stats.page_count = extracted.page_count;
            stats.extraction_method = Some(extracted.method.label().to_string());

            let banner = Banner {
                filename: name,
                method: extracted.method.label(),
                converted_at: Local::now(),
                page_count: extracted.page_count,
            };
            Ok(template::pdf_page(&fragment, &banner).into_bytes())
        }
    }
}

/// Source stem (or `converted-document`) plus the target extension.
pub fn output_filename(name: Option<&str>, to: DocumentFormat) -> String {
    let stem = name
        .and_then(|n| Path::new(n).file_stem())
        .and_then(|s| s.to_str())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_STEM);
    format!("{}.{}", stem, to.extension())
}

/// Convert a local file or URL, detecting its format.
pub async fn convert_file(
    input_str: impl AsRef<str>,
    to: DocumentFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocConvError> {
    convert_input(input_str, None, to, config).await
}

/// Like [`convert_file`], with an optional source format override.
pub async fn convert_input(
    input_str: impl AsRef<str>,
    from: Option<DocumentFormat>,
    to: DocumentFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocConvError> {
    let resolved =
        input::resolve_input(input_str.as_ref(), from, config.download_timeout_secs).await?;
    convert_named(
        &resolved.bytes,
        resolved.format,
        to,
        Some(&resolved.name),
        config,
    )
    .await
}

/// Convert a file or URL and write the output to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    input_str: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    to: DocumentFormat,
    config: &ConversionConfig,
) -> Result<ConversionStats, DocConvError> {
    let output = convert_file(input_str, to, config).await?;
    write_atomic(output_path.as_ref(), &output.bytes).await?;
    Ok(output.stats)
}

/// Write `bytes` to `path` via a sibling temp file, creating parent
/// directories.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocConvError> {
    let failed = |e| DocConvError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(failed)?;
    }

    let ext = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let tmp_path = path.with_extension(ext);
    tokio::fs::write(&tmp_path, bytes).await.map_err(failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(failed(e));
    }
    Ok(())
}

/// Convert every supported file in `dir` to `to`, writing into `out_dir`
/// (or `dir` itself).
///
/// Files are converted concurrently, up to `config.concurrency` at a time.
/// Files already in the target format are skipped. A failed file is
/// recorded in the report and does not stop the batch.
pub async fn convert_dir(
    dir: impl AsRef<Path>,
    to: DocumentFormat,
    out_dir: Option<&Path>,
    config: &ConversionConfig,
) -> Result<BatchReport, DocConvError> {
    let start = Instant::now();
    let dir = dir.as_ref();
    let out_dir = out_dir.unwrap_or(dir);

    let files = list_inputs(dir, to).await?;
    let total = files.len();
    info!("Batch: {} file(s) in {} → {}", total, dir.display(), to);

    let mut entries: Vec<BatchEntry> = stream::iter(files.into_iter().enumerate().map(
        |(i, path)| async move {
            let index = i + 1;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(ref cb) = config.progress_callback {
                cb.on_file_start(index, total, &name);
            }

            let result = convert_one(&path, &name, to, out_dir, config).await;
            if let Some(ref cb) = config.progress_callback {
                let err = result.as_ref().err().map(|e| e.to_string());
                cb.on_file_complete(index, total, &name, err.as_deref());
            }

            match result {
                Ok(written) => BatchEntry {
                    input: path.display().to_string(),
                    output: Some(written.display().to_string()),
                    error: None,
                },
                Err(e) => {
                    warn!("{}: {}", path.display(), e);
                    BatchEntry {
                        input: path.display().to_string(),
                        output: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        },
    ))
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    entries.sort_by(|a, b| a.input.cmp(&b.input));
    let report = BatchReport {
        entries,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "Batch complete: {} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(report)
}

async fn convert_one(
    path: &Path,
    name: &str,
    to: DocumentFormat,
    out_dir: &Path,
    config: &ConversionConfig,
) -> Result<PathBuf, DocConvError> {
    let output = convert_file(path.to_string_lossy(), to, config).await?;
    let target = out_dir.join(output_filename(Some(name), to));
    write_atomic(&target, &output.bytes).await?;
    Ok(target)
}

async fn list_inputs(dir: &Path, to: DocumentFormat) -> Result<Vec<PathBuf>, DocConvError> {
    let read_failed = |e| DocConvError::ReadFailed {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_failed)?;
    while let Some(entry) = entries.next_entry().await.map_err(read_failed)? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        match DocumentFormat::from_path(&path) {
            Some(f) if f == to => debug!("Skipping {} (already {})", path.display(), to),
            Some(_) => files.push(path),
            None => {}
        }
    }
    files.sort();
    Ok(files)
}

/// Synchronous wrapper around [`convert_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    to: DocumentFormat,
    config: &ConversionConfig,
) -> Result<ConversionOutput, DocConvError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocConvError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_file(input_str, to, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::ConversionProgressCallback;
    use std::sync::Mutex;
    use DocumentFormat::*;

    #[test]
    fn nine_supported_pairs() {
        let pairs = supported_conversions();
        assert_eq!(pairs.len(), 9);
        assert!(pairs.contains(&(Markdown, Pdf)));
        assert!(pairs.contains(&(Pdf, Markdown)));
        assert!(pairs.iter().all(|(from, to)| from != to && *from != Word));
    }

    #[test]
    fn unsupported_pairs_name_both_formats() {
        for (from, to) in [(Word, Pdf), (Html, Html), (Word, Markdown)] {
            let err = route(from, to).unwrap_err();
            assert!(matches!(err, DocConvError::UnsupportedConversion { .. }));
            let msg = err.to_string();
            assert!(msg.contains(from.name()) && msg.contains(to.name()), "{msg}");
        }
    }

    #[test]
    fn routes_chain_through_html() {
        assert_eq!(
            route(Markdown, Word).unwrap(),
            &[Step::MarkdownToHtml, Step::HtmlToWord]
        );
        assert_eq!(route(Pdf, Markdown).unwrap(), &[Step::PdfToHtml, Step::HtmlToMarkdown]);
    }

    #[test]
    fn output_names() {
        assert_eq!(output_filename(Some("dir/report.md"), Pdf), "report.pdf");
        assert_eq!(output_filename(Some("notes.html"), Word), "notes.docx");
        assert_eq!(output_filename(None, Markdown), "converted-document.md");
    }

    #[tokio::test]
    async fn markdown_to_html() {
        let out = convert(b"# Hello\n\nWorld", Markdown, Html, &ConversionConfig::default())
            .await
            .unwrap();
        let html = out.as_text().unwrap();
        assert!(html.contains("<h1>Hello</h1>"), "{html}");
        assert_eq!(out.filename, "converted-document.html");
        assert_eq!(out.stats.steps, vec!["markdown→html"]);
        assert_eq!(out.stats.input_bytes, 14);
    }

    #[tokio::test]
    async fn html_to_markdown() {
        let out = convert_named(
            b"<h2>Part</h2><p>text</p>",
            Html,
            Markdown,
            Some("page.htm"),
            &ConversionConfig::default(),
        )
        .await
        .unwrap();
        assert!(out.as_text().unwrap().contains("Part"));
        assert_eq!(out.filename, "page.md");
    }

    #[tokio::test]
    async fn markdown_to_word_native() {
        let out = convert(
            b"# Title\n\n- one\n- two\n\n**bold** text",
            Markdown,
            Word,
            &ConversionConfig::default(),
        )
        .await
        .unwrap();
        assert!(out.bytes.starts_with(b"PK"));
        assert_eq!(out.stats.steps, vec!["markdown→html", "html→word"]);
    }

    #[tokio::test]
    async fn invalid_utf8_is_rejected() {
        let err = convert(&[0xff, 0xfe, 0x00], Markdown, Html, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DocConvError::InvalidEncoding { format: Markdown, .. }));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn non_pdf_bytes_as_pdf() {
        let err = convert(b"<html></html>", Pdf, Html, &ConversionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DocConvError::NotAPdf { .. }), "{err}");
    }

    #[derive(Default)]
    struct Stages(Mutex<Vec<String>>);

    impl ConversionProgressCallback for Stages {
        fn on_stage(&self, stage: &str) {
            self.0.lock().unwrap().push(stage.to_string());
        }
        fn on_conversion_complete(&self, output_len: usize) {
            self.0.lock().unwrap().push(format!("done {}", output_len > 0));
        }
    }

    #[tokio::test]
    async fn progress_reports_stages() {
        let stages = Arc::new(Stages::default());
        let config = ConversionConfig::builder()
            .progress_callback(stages.clone())
            .build()
            .unwrap();
        convert(b"<p>x</p>", Html, Word, &config).await.unwrap();
        assert_eq!(*stages.0.lock().unwrap(), vec!["html→word", "done true"]);
    }

    #[tokio::test]
    async fn convert_to_file_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.md");
        std::fs::write(&src, "hello *world*").unwrap();
        let dest = dir.path().join("nested/out/result.html");

        let stats = convert_to_file(src.to_str().unwrap(), &dest, Html, &ConversionConfig::default())
            .await
            .unwrap();
        assert_eq!(stats.source, Some(Markdown));
        let written = std::fs::read_to_string(&dest).unwrap();
        assert!(written.contains("<em>world</em>"));
        assert!(!dest.with_extension("html.tmp").exists());
    }

    #[tokio::test]
    async fn batch_collects_per_file_results() {
        let dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A").unwrap();
        std::fs::write(dir.path().join("b.markdown"), "# B").unwrap();
        std::fs::write(dir.path().join("c.html"), "<p>already html</p>").unwrap();
        std::fs::write(dir.path().join("d.docx"), "not really").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let report = convert_dir(dir.path(), Html, Some(out.path()), &ConversionConfig::default())
            .await
            .unwrap();

        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        assert!(report.entries[2].error.as_deref().unwrap().contains("not supported"));
        assert!(out.path().join("a.html").exists());
        assert!(out.path().join("b.html").exists());
    }

    #[test]
    fn sync_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("x.html");
        std::fs::write(&src, "<h1>X</h1>").unwrap();
        let out = convert_sync(src.to_str().unwrap(), Markdown, &ConversionConfig::default()).unwrap();
        assert!(out.as_text().unwrap().starts_with("# X"));
        assert_eq!(out.filename, "x.md");
    }
}
