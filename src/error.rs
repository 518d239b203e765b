//! Error types for the pdf2jpg library.
//!
//! Two error types reflect the two layers of the crate:
//!
//! * [`Pdf2JpgError`] — an operation (load, preview, convert, write) failed.
//!   Returned from [`crate::Session`] methods and the top-level `convert*`
//!   functions. A failed operation never leaves the session unusable; the
//!   caller can simply try again.
//!
//! * [`RenderError`] — the PDF backend could not decode a document or
//!   rasterise a page. The pipeline wraps it into the matching
//!   [`Pdf2JpgError`] variant depending on which operation was running.
//!
//! Every [`Pdf2JpgError`] belongs to one [`ErrorKind`] and carries a short
//! [`user_message`](Pdf2JpgError::user_message) suitable for a status line,
//! while `Display` keeps the full diagnostic detail for logs.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by pdf2jpg operations.
#[derive(Debug, Error)]
pub enum Pdf2JpgError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The selected file name does not end in `.pdf`. Nothing was read.
    #[error("'{name}' is not a PDF file (expected a .pdf extension)")]
    InvalidFileType { name: String },

    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes could not be decoded into a PDF document.
    #[error("Could not decode '{name}': {detail}")]
    Decode { name: String, detail: String },

    /// An operation that needs a document ran before one was loaded.
    #[error("No PDF document is loaded")]
    NoDocument,

    // ── Rendering errors ──────────────────────────────────────────────────
    /// Rendering the first-page preview failed.
    #[error("Preview failed: {detail}")]
    Preview { detail: String },

    /// The page spec selected no page of the document.
    #[error("Page spec '{spec}' selects no pages (document has {total} pages)")]
    EmptySelection { spec: String, total: usize },

    /// A page failed to render or encode, or the archive failed to assemble.
    ///
    /// `page` is `None` when the failure happened outside the page loop
    /// (archive serialisation).
    #[error(
        "Conversion failed{}: {detail}",
        .page.map(|p| format!(" on page {p}")).unwrap_or_default()
    )]
    Conversion { page: Option<usize>, detail: String },

    /// A conversion run is already in flight for this session.
    #[error("A conversion is already running")]
    Busy,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output archive or preview image.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (or its directory).\n\
  • Place the platform pdfium library next to the executable or in ./lib.\n\
  • Install pdfium system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`Pdf2JpgError`] for callers that react per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The file was rejected by its name before any decoding.
    InvalidFileType,
    /// The file could not be read or decoded.
    Decode,
    /// The first-page preview failed.
    Preview,
    /// The page render / encode / archive loop failed.
    Conversion,
    /// Environment or configuration problem (pdfium missing, bad options, I/O).
    Setup,
}

impl Pdf2JpgError {
    /// Which of the error kinds this failure belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Pdf2JpgError::InvalidFileType { .. } => ErrorKind::InvalidFileType,
            Pdf2JpgError::FileNotFound { .. }
            | Pdf2JpgError::PermissionDenied { .. }
            | Pdf2JpgError::Decode { .. } => ErrorKind::Decode,
            Pdf2JpgError::Preview { .. } => ErrorKind::Preview,
            Pdf2JpgError::NoDocument
            | Pdf2JpgError::EmptySelection { .. }
            | Pdf2JpgError::Conversion { .. }
            | Pdf2JpgError::Busy => ErrorKind::Conversion,
            Pdf2JpgError::OutputWriteFailed { .. }
            | Pdf2JpgError::InvalidConfig(_)
            | Pdf2JpgError::PdfiumBindingFailed(_)
            | Pdf2JpgError::Internal(_) => ErrorKind::Setup,
        }
    }

    /// Short message for the user; the full detail stays in `Display`.
    pub fn user_message(&self) -> String {
        match self {
            Pdf2JpgError::InvalidFileType { .. } => "Please choose a PDF file".to_string(),
            Pdf2JpgError::FileNotFound { .. } | Pdf2JpgError::PermissionDenied { .. } => {
                "Could not read the PDF file".to_string()
            }
            Pdf2JpgError::Decode { .. } => {
                "Could not read the PDF, please check whether the file is damaged".to_string()
            }
            Pdf2JpgError::NoDocument => "Choose a PDF file first".to_string(),
            Pdf2JpgError::Preview { .. } => "Preview failed".to_string(),
            Pdf2JpgError::EmptySelection { .. } => "No pages match the page range".to_string(),
            Pdf2JpgError::Conversion { .. } => "An error occurred during conversion".to_string(),
            Pdf2JpgError::Busy => "A conversion is already running".to_string(),
            other => other.to_string(),
        }
    }
}

/// A failure reported by a [`crate::pipeline::render::PdfBackend`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RenderError {
    /// The document bytes could not be parsed.
    #[error("document could not be decoded: {0}")]
    Decode(String),

    /// The requested page does not exist or could not be loaded.
    #[error("page {page} is unavailable: {detail}")]
    PageUnavailable { page: usize, detail: String },

    /// The page was loaded but rasterisation failed.
    #[error("page {page} failed to render: {detail}")]
    Render { page: usize, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_display_with_page() {
        let e = Pdf2JpgError::Conversion {
            page: Some(3),
            detail: "boom".into(),
        };
        assert_eq!(e.to_string(), "Conversion failed on page 3: boom");
    }

    #[test]
    fn conversion_display_without_page() {
        let e = Pdf2JpgError::Conversion {
            page: None,
            detail: "zip".into(),
        };
        assert_eq!(e.to_string(), "Conversion failed: zip");
    }

    #[test]
    fn kinds_match_error_families() {
        assert_eq!(
            Pdf2JpgError::InvalidFileType {
                name: "a.txt".into()
            }
            .kind(),
            ErrorKind::InvalidFileType
        );
        assert_eq!(
            Pdf2JpgError::Decode {
                name: "a.pdf".into(),
                detail: "x".into()
            }
            .kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            Pdf2JpgError::Preview { detail: "x".into() }.kind(),
            ErrorKind::Preview
        );
        assert_eq!(Pdf2JpgError::Busy.kind(), ErrorKind::Conversion);
        assert_eq!(
            Pdf2JpgError::PdfiumBindingFailed("x".into()).kind(),
            ErrorKind::Setup
        );
    }

    #[test]
    fn user_message_hides_detail() {
        let e = Pdf2JpgError::Conversion {
            page: Some(2),
            detail: "FPDF_RenderPageBitmap returned 0".into(),
        };
        assert!(!e.user_message().contains("FPDF"));
    }

    #[test]
    fn render_error_display() {
        let e = RenderError::Render {
            page: 4,
            detail: "out of memory".into(),
        };
        assert!(e.to_string().contains("page 4"));
    }
}
