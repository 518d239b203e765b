//! # pdf2jpg
//!
//! Convert the pages of a PDF document into JPEG images and pack them into
//! a single ZIP archive.
//!
//! Each selected page is rasterised with pdfium at a chosen scale, composited
//! onto an opaque background colour, JPEG-encoded at a chosen quality and
//! stored in the archive as `{base}_p{NNN}.jpg`. The archive is named
//! `{base}_jpg.zip`, where `base` is the input file name without its
//! trailing extension.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    check the .pdf extension, read bytes, decode
//!  ├─ 2. Select   parse "1-3,5,8" against the page count
//!  ├─ 3. Render   rasterise one page at a time via pdfium (blocking)
//!  ├─ 4. Flatten  composite onto the background colour
//!  ├─ 5. Encode   JPEG at quality round(q × 100)
//!  └─ 6. Archive  in-memory ZIP, entries in ascending page order
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2jpg::{convert, ConversionOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ConversionOptions::builder()
//!         .scale(2.0)
//!         .quality(0.92)
//!         .pages("1-3,5")
//!         .build()?;
//!     let output = convert("Report.pdf", &options).await?;
//!     std::fs::write(&output.archive_name, &output.archive)?;
//!     eprintln!("{} pages → {}", output.stats.exported_pages, output.archive_name);
//!     Ok(())
//! }
//! ```
//!
//! Front ends that keep a document open between actions (preview while the
//! user drags a slider, then convert) use [`Session`] instead.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2jpg` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pdf2jpg = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, ConversionOptionsBuilder, Rgb};
pub use convert::{
    convert, convert_from_bytes, convert_sync, convert_to_file, inspect, preview, preview_to_file,
};
pub use error::{ErrorKind, Pdf2JpgError, RenderError};
pub use output::{ConversionOutput, ConversionStats, DocumentMetadata, EntryInfo, Preview};
pub use pipeline::render::{PageSource, PdfBackend, PdfiumBackend, Viewport};
pub use pipeline::select::{parse_page_spec, PageSelection};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{RunGuard, RunState, Session};
