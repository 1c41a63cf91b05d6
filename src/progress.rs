//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to observe a
//! conversion as it moves through its stages, each browser launch attempt,
//! and each file of a batch.
//!
//! # Example
//!
//! ```rust
//! use docconv::{AttemptError, ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct FailedAttempts(AtomicUsize);
//!
//! impl ConversionProgressCallback for FailedAttempts {
//!     fn on_attempt_failed(&self, error: &AttemptError) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{error}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(FailedAttempts(AtomicUsize::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

use crate::error::AttemptError;
use crate::format::DocumentFormat;

/// Called by the dispatcher and the invoker as work proceeds.
///
/// All methods default to no-ops. In batch mode several files are converted
/// concurrently, so implementations must be `Send + Sync` and guard any
/// shared mutable state.
pub trait ConversionProgressCallback: Send + Sync {
    /// A single conversion is starting.
    fn on_conversion_start(&self, from: DocumentFormat, to: DocumentFormat) {
        let _ = (from, to);
    }

    /// A pipeline stage is starting, e.g. `"extract"`, `"render"`.
    fn on_stage(&self, stage: &str) {
        let _ = stage;
    }

    /// Launch attempt `index` (1-based) of `total` is starting.
    fn on_attempt_start(&self, index: usize, total: usize, strategy: &str) {
        let _ = (index, total, strategy);
    }

    /// A launch attempt failed; the chain continues if attempts remain.
    fn on_attempt_failed(&self, error: &AttemptError) {
        let _ = error;
    }

    /// A single conversion finished with `output_len` bytes.
    fn on_conversion_complete(&self, output_len: usize) {
        let _ = output_len;
    }

    /// Batch mode: file `index` (1-based) of `total` is starting.
    fn on_file_start(&self, index: usize, total: usize, name: &str) {
        let _ = (index, total, name);
    }

    /// Batch mode: a file finished; `error` is set when it failed.
    fn on_file_complete(&self, index: usize, total: usize, name: &str, error: Option<&str>) {
        let _ = (index, total, name, error);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
