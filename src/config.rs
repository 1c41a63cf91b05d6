//! Configuration types for document conversion.
//!
//! Every knob lives in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. One config can be shared across a batch run
//! or across server requests.

use crate::error::DocConvError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for a conversion.
///
/// # Example
/// ```rust
/// use docconv::{ConversionConfig, PageFormat};
///
/// let config = ConversionConfig::builder()
///     .page_format(PageFormat::Letter)
///     .landscape(true)
///     .render_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Bound on each browser launch attempt, in seconds. Default: 30.
    ///
    /// An attempt that exceeds it is abandoned and the next launch strategy
    /// is tried.
    pub launch_timeout_secs: u64,

    /// Bound on one HTML→PDF render, in seconds. Default: 30.
    pub render_timeout_secs: u64,

    /// Explicit browser executable. Probed before `CHROME_BIN` and the
    /// platform install paths.
    pub browser_path: Option<PathBuf>,

    /// Paper size for PDF output. Default: A4.
    pub page_format: PageFormat,

    /// Landscape orientation for PDF output. Default: false.
    pub landscape: bool,

    /// CSS length applied to all four PDF page margins. Default: `20px`.
    pub margin: String,

    /// Print CSS backgrounds into the PDF. Default: true.
    pub print_background: bool,

    /// Render single newlines in Markdown as `<br />`. Default: true.
    pub markdown_breaks: bool,

    /// Enable GitHub-flavoured extensions (tables, strikethrough, task
    /// lists). Default: true.
    pub markdown_gfm: bool,

    /// Which delegate produces DOCX output. Default: [`WordEngine::Native`].
    pub word_engine: WordEngine,

    /// Body font family in generated Word documents. Default: Calibri.
    pub word_font: String,

    /// Body font size in points. Default: 11.
    pub word_font_size_pt: u32,

    /// Page margins in twips (1440 = one inch). Default: 1440.
    pub word_margin_twips: u32,

    /// Extracted PDF text shorter than this (after trimming) counts as a
    /// failed extraction and triggers the fallback extractor. Default: 100.
    pub min_extracted_chars: usize,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Files converted at once by [`crate::convert::convert_dir`]. Default: 4.
    ///
    /// Every PDF render starts its own browser, so this is also the number
    /// of browsers that may run at once.
    pub concurrency: usize,

    /// Optional progress callback for stage and launch events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            launch_timeout_secs: 30,
            render_timeout_secs: 30,
            browser_path: None,
            page_format: PageFormat::default(),
            landscape: false,
            margin: "20px".to_string(),
            print_background: true,
            markdown_breaks: true,
            markdown_gfm: true,
            word_engine: WordEngine::default(),
            word_font: "Calibri".to_string(),
            word_font_size_pt: 11,
            word_margin_twips: 1440,
            min_extracted_chars: 100,
            download_timeout_secs: 120,
            concurrency: 4,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("launch_timeout_secs", &self.launch_timeout_secs)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("browser_path", &self.browser_path)
            .field("page_format", &self.page_format)
            .field("landscape", &self.landscape)
            .field("margin", &self.margin)
            .field("markdown_breaks", &self.markdown_breaks)
            .field("markdown_gfm", &self.markdown_gfm)
            .field("word_engine", &self.word_engine)
            .field("word_font", &self.word_font)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn launch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.launch_timeout_secs = secs.clamp(1, 600);
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs.clamp(1, 600);
        self
    }

    pub fn browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.browser_path = Some(path.into());
        self
    }

    pub fn page_format(mut self, format: PageFormat) -> Self {
        self.config.page_format = format;
        self
    }

    pub fn landscape(mut self, v: bool) -> Self {
        self.config.landscape = v;
        self
    }

    pub fn margin(mut self, margin: impl Into<String>) -> Self {
        self.config.margin = margin.into();
        self
    }

    pub fn print_background(mut self, v: bool) -> Self {
        self.config.print_background = v;
        self
    }

    pub fn markdown_breaks(mut self, v: bool) -> Self {
        self.config.markdown_breaks = v;
        self
    }

    pub fn markdown_gfm(mut self, v: bool) -> Self {
        self.config.markdown_gfm = v;
        self
    }

    pub fn word_engine(mut self, engine: WordEngine) -> Self {
        self.config.word_engine = engine;
        self
    }

    pub fn word_font(mut self, family: impl Into<String>) -> Self {
        self.config.word_font = family.into();
        self
    }

    pub fn word_font_size_pt(mut self, pt: u32) -> Self {
        self.config.word_font_size_pt = pt.clamp(6, 72);
        self
    }

    pub fn word_margin_twips(mut self, twips: u32) -> Self {
        self.config.word_margin_twips = twips;
        self
    }

    pub fn min_extracted_chars(mut self, n: usize) -> Self {
        self.config.min_extracted_chars = n;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, DocConvError> {
        let c = &self.config;
        if !is_css_length(&c.margin) {
            return Err(DocConvError::InvalidConfig(format!(
                "margin must be a CSS length such as 20px, 1in or 10mm, got '{}'",
                c.margin
            )));
        }
        if c.word_font.trim().is_empty() {
            return Err(DocConvError::InvalidConfig(
                "word font family must not be empty".into(),
            ));
        }
        if c.word_margin_twips > 7200 {
            return Err(DocConvError::InvalidConfig(format!(
                "word margin must be ≤ 7200 twips (5in), got {}",
                c.word_margin_twips
            )));
        }
        Ok(self.config)
    }
}

/// Accepts `0` or a non-negative number followed by a CSS absolute unit.
fn is_css_length(s: &str) -> bool {
    let s = s.trim();
    if s == "0" {
        return true;
    }
    ["px", "in", "cm", "mm", "pt", "pc"].iter().any(|unit| {
        s.strip_suffix(unit)
            .and_then(|n| n.trim().parse::<f64>().ok())
            .is_some_and(|n| n >= 0.0 && n.is_finite())
    })
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Paper size for PDF output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    A3,
    /// (default)
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
}

impl PageFormat {
    /// Value for the CSS `@page { size: … }` descriptor.
    pub fn css_size(self, landscape: bool) -> String {
        let base = match self {
            PageFormat::A3 => "A3",
            PageFormat::A4 => "A4",
            PageFormat::A5 => "A5",
            PageFormat::Letter => "letter",
            PageFormat::Legal => "legal",
            PageFormat::Tabloid => "11in 17in",
        };
        match (self, landscape) {
            (PageFormat::Tabloid, true) => "17in 11in".to_string(),
            (_, true) => format!("{base} landscape"),
            (_, false) => base.to_string(),
        }
    }
}

/// Delegate used for HTML→DOCX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WordEngine {
    /// Build the document in-process. (default)
    #[default]
    Native,
    /// Run `pandoc -f html -t docx`.
    Pandoc,
}
