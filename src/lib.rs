//! # docconv
//!
//! Convert documents between HTML, Markdown, PDF and Word.
//!
//! Every conversion is delegated to a proven tool: `pulldown-cmark` and
//! `html2md` for Markdown, a headless Chromium-family browser for printing
//! PDF, `docx-rs` (or `pandoc`) for Word, PDFium (or `pdf-extract`) for
//! reading PDF text. The crate's own logic sits between them:
//!
//! * the **Text Classifier** and **HTML Reconstructor**, which rebuild
//!   headings, lists and paragraphs from the flat text extracted from a PDF;
//! * the **Conversion Dispatcher**, which maps a (source, target) pair to a
//!   route of delegate calls;
//! * the **Resilient External-Tool Invoker**, which starts the browser with
//!   an ordered list of launch strategies and gives up only when all fail.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown ─▶ HTML ─┬─▶ PDF     (print stylesheet + headless browser)
//!                   ├─▶ Word    (docx-rs or pandoc)
//!                   └─▶ Markdown (html2md + cleanup)
//!
//! PDF ─▶ text ─▶ classify ─▶ reconstruct ─▶ HTML page ─▶ Word / Markdown
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docconv::{convert, ConversionConfig, DocumentFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert(
//!         b"# Hello\n\nWorld",
//!         DocumentFormat::Markdown,
//!         DocumentFormat::Html,
//!         &config,
//!     )
//!     .await?;
//!     println!("{}", output.as_text().unwrap_or_default());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `docconv` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `server` | on      | Enables [`server`], the HTTP API (axum + tower-http) |
//!
//! Library-only use:
//! ```toml
//! docconv = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod format;
pub mod invoker;
pub mod output;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, PageFormat, WordEngine};
pub use convert::{
    convert, convert_dir, convert_file, convert_input, convert_named, convert_sync,
    convert_to_file, route, supported_conversions, Step,
};
pub use error::{AttemptError, DocConvError};
pub use format::DocumentFormat;
pub use invoker::{launch_with_fallback, FallbackChain, LaunchStrategy, Launched};
pub use output::{BatchEntry, BatchReport, ConversionOutput, ConversionStats};
pub use pipeline::reconstruct::reconstruct;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
