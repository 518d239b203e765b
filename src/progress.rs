//! Progress-callback trait for per-page conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionOptionsBuilder::progress_callback`] to receive
//! events as the pipeline renders, encodes and archives each page.
//!
//! Pages are processed strictly one after another, so events arrive in
//! ascending page order and `on_progress` values never decrease. The trait is
//! still `Send + Sync` because the async entry points run the pipeline on a
//! blocking worker thread while the caller may observe from another.
//!
//! # Example
//!
//! ```rust
//! use pdf2jpg::{ConversionOptions, ConversionProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU8, Ordering}};
//!
//! struct Percent(AtomicU8);
//!
//! impl ConversionProgressCallback for Percent {
//!     fn on_progress(&self, percent: u8) {
//!         self.0.store(percent, Ordering::SeqCst);
//!     }
//! }
//!
//! let options = ConversionOptions::builder()
//!     .progress_callback(Arc::new(Percent(AtomicU8::new(0))))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it processes each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once the page selection is known, before any page is rendered.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be exported
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is rendered.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number in the document
    /// * `total_pages` — number of selected pages
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page's JPEG has been added to the archive.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — number of selected pages
    /// * `jpeg_len`    — byte length of the encoded JPEG
    fn on_page_complete(&self, page_num: usize, total_pages: usize, jpeg_len: usize) {
        let _ = (page_num, total_pages, jpeg_len);
    }

    /// Called after each page with `round(100 * done / total)`.
    fn on_progress(&self, percent: u8) {
        let _ = percent;
    }

    /// Called once when the run aborts. No archive is produced.
    fn on_conversion_error(&self, error: &str) {
        let _ = error;
    }

    /// Called once after the archive has been serialised.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages in the archive
    /// * `archive_len` — byte length of the ZIP archive
    fn on_conversion_complete(&self, total_pages: usize, archive_len: usize) {
        let _ = (total_pages, archive_len);
    }
}

/// A no-op implementation for callers that need a callback value but no events.
///
/// Leaving [`crate::ConversionOptions::progress_callback`] as `None` has the
/// same effect.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionOptions`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// `round(100 * done / total)` with halves rounded up; `100` when `total` is 0.
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    ((200 * done + total) / (2 * total)) as u8
}
