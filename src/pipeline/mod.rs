//! Pipeline stages for PDF-to-JPEG conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the rendering backend can be swapped without touching the rest.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ select ──▶ render ──▶ encode ──▶ archive
//! (.pdf)    (pages)   (backend)   (JPEG)     (ZIP)
//! ```
//!
//! 1. [`input`]   — validate the file name, read bytes, derive output names
//! 2. [`select`]  — resolve the page spec against the page count
//! 3. [`render`]  — rasterise one page at a time and flatten onto the background
//! 4. [`encode`]  — JPEG-encode each flattened page
//! 5. [`archive`] — collect entries into an in-memory ZIP

pub mod archive;
pub mod encode;
pub mod input;
pub mod render;
pub mod select;
