//! Conversion stages.
//!
//! Each submodule implements one transformation or one delegate. The
//! dispatcher in [`crate::convert`] chains them per (source, target) pair.
//!
//! ## Data Flow
//!
//! ```text
//!                 ┌──────────── markdown ────────────┐
//! input ──▶ Markdown ──▶ HTML ──┬──▶ template ──▶ render ──▶ PDF
//!            ▲                  ├──▶ word ──▶ DOCX
//!            └── postprocess ◀──┘
//!
//! PDF ──▶ extract ──▶ classify ──▶ reconstruct ──▶ template ──▶ HTML
//! ```
//!
//! 1. [`input`]: read a local path or download a URL, detect its format
//! 2. [`markdown`]: Markdown → HTML with `pulldown-cmark`, HTML → Markdown
//!    with `html2md` and [`postprocess`]
//! 3. [`extract`]: PDF text via PDFium, with a pure-Rust fallback; runs in
//!    `spawn_blocking` because both extractors are synchronous
//! 4. [`classify`] and [`reconstruct`]: raw text lines → structured HTML
//! 5. [`template`]: full HTML pages for PDF-derived content and for printing
//! 6. [`render`]: HTML → PDF through a headless browser session
//! 7. [`word`]: HTML → DOCX, in-process or through `pandoc`

pub mod classify;
pub mod extract;
pub mod input;
pub mod markdown;
pub mod postprocess;
pub mod reconstruct;
pub mod render;
pub mod template;
pub mod word;
