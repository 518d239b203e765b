//! Interactive session: one loaded document, its options and run state.
//!
//! A [`Session`] is what a front end (GUI, TUI, CLI) holds between user
//! actions. Loading a new file replaces the document wholesale and resets
//! the run state; preview and conversion only read the document, so they
//! can share it freely.
//!
//! ## Busy flag
//!
//! [`RunState`] is shared through an `Arc` so another thread can poll
//! progress while a run is in flight. Only one run may be active at a time:
//! [`RunState::try_begin`] flips the busy flag atomically and hands out a
//! [`RunGuard`] that clears it on drop, whether the run succeeded, failed
//! or panicked. There is no cancellation; a run ends by completing or
//! failing.

use crate::config::ConversionOptions;
use crate::convert::{render_preview, run_pipeline};
use crate::error::Pdf2JpgError;
use crate::output::{ConversionOutput, DocumentMetadata, Preview};
use crate::pipeline::input::{base_name, read_pdf_file, validate_file_name};
use crate::pipeline::render::{PageSource, PdfBackend};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};

/// Process-visible state of the current (or last) run.
#[derive(Debug, Default)]
pub struct RunState {
    busy: AtomicBool,
    progress: AtomicU8,
    last_error: Mutex<Option<String>>,
}

impl RunState {
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Progress of the current or last run, 0–100.
    pub fn progress(&self) -> u8 {
        self.progress.load(Ordering::SeqCst)
    }

    /// User-facing message of the last failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Mark a run as started. `None` if one is already in flight.
    ///
    /// Progress and the last error are reset for the new run.
    pub fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        self.reset();
        Some(RunGuard { state: self })
    }

    pub(crate) fn set_progress(&self, percent: u8) {
        self.progress.store(percent.min(100), Ordering::SeqCst);
    }

    pub(crate) fn record_error(&self, message: String) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message);
    }

    fn reset(&self) {
        self.progress.store(0, Ordering::SeqCst);
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Holds the busy flag for the lifetime of a run.
#[derive(Debug)]
pub struct RunGuard<'a> {
    state: &'a RunState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::SeqCst);
    }
}

/// A decoded-and-validated input file.
struct LoadedDocument {
    name: String,
    bytes: Vec<u8>,
    page_count: usize,
}

/// One user session over a [`PdfBackend`].
pub struct Session<B: PdfBackend> {
    backend: B,
    document: Option<LoadedDocument>,
    options: ConversionOptions,
    run: Arc<RunState>,
}

impl<B: PdfBackend> Session<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, ConversionOptions::default())
    }

    pub fn with_options(backend: B, options: ConversionOptions) -> Self {
        Self {
            backend,
            document: None,
            options,
            run: Arc::new(RunState::default()),
        }
    }

    /// Shared handle for observing busy/progress/error from elsewhere.
    pub fn run_state(&self) -> Arc<RunState> {
        Arc::clone(&self.run)
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Replace the options. Returns `true` when the preview is now stale.
    pub fn set_options(&mut self, options: ConversionOptions) -> bool {
        let stale = self.document.is_some() && self.options.affects_preview(&options);
        self.options = options;
        stale
    }

    /// Name of the loaded file, e.g. `Report.PDF`.
    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.name.as_str())
    }

    /// Pages in the loaded document; 0 when nothing is loaded.
    pub fn page_count(&self) -> usize {
        self.document.as_ref().map_or(0, |d| d.page_count)
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Forget the document and reset progress and the last error.
    pub fn clear(&mut self) {
        self.document = None;
        self.run.reset();
    }

    /// Validate, read and decode the PDF at `path`. Returns its page count.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, Pdf2JpgError> {
        self.clear();
        let (name, bytes) = read_pdf_file(path).inspect_err(|e| self.fail(e))?;
        self.load_bytes(name, bytes)
    }

    /// Validate `name` and decode `bytes`. Returns the page count.
    ///
    /// The previous document is dropped first, even if this load fails.
    pub fn load_bytes(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<usize, Pdf2JpgError> {
        self.clear();
        match self.decode(name.into(), bytes) {
            Ok(document) => {
                let page_count = document.page_count;
                info!("Loaded '{}': {} pages", document.name, page_count);
                self.document = Some(document);
                Ok(page_count)
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    fn decode(&self, name: String, bytes: Vec<u8>) -> Result<LoadedDocument, Pdf2JpgError> {
        validate_file_name(&name)?;
        let page_count = self
            .open(&bytes)
            .map_err(|detail| Pdf2JpgError::Decode {
                name: name.clone(),
                detail,
            })?
            .page_count();
        Ok(LoadedDocument {
            name,
            bytes,
            page_count,
        })
    }

    /// Title, author and friends of the loaded document.
    pub fn metadata(&self) -> Result<DocumentMetadata, Pdf2JpgError> {
        let document = self.document.as_ref().ok_or(Pdf2JpgError::NoDocument)?;
        let source = self
            .open(&document.bytes)
            .map_err(|detail| Pdf2JpgError::Decode {
                name: document.name.clone(),
                detail,
            })?;
        Ok(source.metadata())
    }

    /// Render page 1 at the current scale, background and quality.
    pub fn preview(&self) -> Result<Preview, Pdf2JpgError> {
        let document = self.document.as_ref().ok_or(Pdf2JpgError::NoDocument)?;
        let result = self.options.validate().and_then(|()| {
            self.open(&document.bytes)
                .map_err(|detail| Pdf2JpgError::Preview { detail })
                .and_then(|source| render_preview(source.as_ref(), &self.options))
        });
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }

    /// Run the conversion pipeline over the loaded document.
    ///
    /// Works on a snapshot of the current options. On failure nothing of the
    /// partial archive is returned.
    pub fn convert(&self) -> Result<ConversionOutput, Pdf2JpgError> {
        let Some(_guard) = self.run.try_begin() else {
            warn!("Conversion requested while another run is in flight");
            return Err(Pdf2JpgError::Busy);
        };

        let options = self.options.clone();
        let result = self.convert_loaded(&options);
        if let Err(e) = &result {
            self.fail(e);
            if let Some(cb) = options.progress_callback.as_deref() {
                cb.on_conversion_error(&e.to_string());
            }
        }
        result
    }

    fn convert_loaded(
        &self,
        options: &ConversionOptions,
    ) -> Result<ConversionOutput, Pdf2JpgError> {
        options.validate()?;
        let document = self.document.as_ref().ok_or(Pdf2JpgError::NoDocument)?;
        let source = self
            .backend
            .open(&document.bytes, options.password.as_deref())
            .map_err(|e| Pdf2JpgError::Conversion {
                page: None,
                detail: e.to_string(),
            })?;
        let base = base_name(Some(&document.name));
        run_pipeline(source.as_ref(), &base, options, &self.run)
    }

    fn open<'a>(&'a self, bytes: &'a [u8]) -> Result<Box<dyn PageSource + 'a>, String> {
        self.backend
            .open(bytes, self.options.password.as_deref())
            .map_err(|e| e.to_string())
    }

    /// Log a failure and keep its user-facing message.
    fn fail(&self, e: &Pdf2JpgError) {
        error!("{e}");
        self.run.record_error(e.user_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_busy_on_drop() {
        let state = RunState::default();
        {
            let _guard = state.try_begin().expect("first run starts");
            assert!(state.is_busy());
            assert!(state.try_begin().is_none(), "second run must be refused");
        }
        assert!(!state.is_busy());
        assert!(state.try_begin().is_some());
    }

    #[test]
    fn begin_resets_progress_and_error() {
        let state = RunState::default();
        state.set_progress(40);
        state.record_error("Preview failed".into());
        let _guard = state.try_begin().unwrap();
        assert_eq!(state.progress(), 0);
        assert_eq!(state.last_error(), None);
    }

    #[test]
    fn progress_is_capped() {
        let state = RunState::default();
        state.set_progress(250);
        assert_eq!(state.progress(), 100);
    }

    #[test]
    fn guard_released_on_panic() {
        let state = RunState::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = state.try_begin().unwrap();
            panic!("render blew up");
        }));
        assert!(result.is_err());
        assert!(!state.is_busy());
    }
}
