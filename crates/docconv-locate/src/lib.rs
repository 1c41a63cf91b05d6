//! # docconv-locate
//!
//! Find the external programs and libraries that `docconv` delegates to,
//! without executing any of them.
//!
//! | Delegate          | Lookup order                                                   |
//! |-------------------|----------------------------------------------------------------|
//! | headless browser  | explicit path → `CHROME_BIN` → well-known install paths → `PATH` |
//! | `pandoc`          | `PANDOC_PATH` → `PATH`                                         |
//! | PDFium library    | `PDFIUM_LIB_PATH` → local cache → download from pdfium-binaries |
//!
//! Browser probing is an existence check only. Deciding whether a found
//! binary actually launches is the caller's job.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docconv_locate::{locate_browser, find_pandoc, bind_pdfium_silent};
//!
//! if let Some(found) = locate_browser(None) {
//!     println!("browser: {} ({:?})", found.path.display(), found.source);
//! }
//! println!("pandoc: {:?}", find_pandoc());
//! let pdfium = bind_pdfium_silent().expect("PDFium unavailable");
//! ```
//!
//! ## Environment variable overrides
//!
//! - `CHROME_BIN` — browser executable to use before probing.
//! - `PANDOC_PATH` — pandoc executable to use before searching `PATH`.
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium library; skips download.
//! - `DOCCONV_CACHE_DIR` — override the default PDFium cache directory.

mod browser;
mod pdfium;

pub use browser::{
    find_pandoc, locate_browser, path_browser, platform_browser_paths, probe_paths,
    BrowserLocation, LocationSource, BROWSER_ENV, PANDOC_ENV,
};
pub use pdfium::{
    bind_pdfium, bind_pdfium_from_path, bind_pdfium_silent, cached_pdfium_path,
    ensure_pdfium_library, is_pdfium_cached, pdfium_cache_dir, PDFIUM_VERSION,
};

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by docconv-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// The current OS/architecture combination has no PDFium build.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    /// Could not create or navigate the local cache directory.
    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    /// Network download failed.
    #[error("Download failed: {0}")]
    Download(String),

    /// gzip/tar extraction failed.
    #[error("Archive extraction failed: {0}")]
    Extract(String),

    /// `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },
}
