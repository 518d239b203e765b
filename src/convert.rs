//! The conversion run loop and the one-shot entry points built on it.
//!
//! [`run_pipeline`] is the heart of the crate: resolve the page selection,
//! then for each page in ascending order render, flatten, encode and append
//! to the archive, reporting progress after every page. It is strictly
//! sequential. The first failing page aborts the run and the partial
//! archive is dropped with the builder.
//!
//! The public functions here are conveniences for callers that do not need
//! a long-lived [`Session`]: they bind pdfium, load one file and run once.
//! pdfium calls block, so the async variants move the whole run onto
//! `spawn_blocking`.

use crate::config::ConversionOptions;
use crate::error::Pdf2JpgError;
use crate::output::{ConversionOutput, ConversionStats, DocumentMetadata, EntryInfo, Preview};
use crate::pipeline::archive::ArchiveBuilder;
use crate::pipeline::encode::encode_jpeg;
use crate::pipeline::input::{archive_name, entry_name};
use crate::pipeline::render::{flatten_onto, PageSource, PdfiumBackend};
use crate::pipeline::select::PageSelection;
use crate::progress::progress_percent;
use crate::session::{RunState, Session};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a PDF file into a ZIP of JPEG pages, held in memory.
///
/// # Errors
/// - [`Pdf2JpgError::InvalidFileType`] — the name does not end in `.pdf`
/// - [`Pdf2JpgError::Decode`] — the bytes are not a readable PDF
/// - [`Pdf2JpgError::EmptySelection`] — the page spec matches no page
/// - [`Pdf2JpgError::Conversion`] — a page failed; no archive is returned
pub async fn convert(
    input: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionOutput, Pdf2JpgError> {
    let path = input.as_ref().to_path_buf();
    let options = options.clone();
    tokio::task::spawn_blocking(move || convert_sync(&path, &options))
        .await
        .map_err(|e| Pdf2JpgError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Blocking variant of [`convert`].
pub fn convert_sync(
    input: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionOutput, Pdf2JpgError> {
    let mut session = pdfium_session(options)?;
    session.load_file(input.as_ref())?;
    session.convert()
}

/// Convert PDF bytes in memory. `name` supplies the extension check and the
/// output base name, exactly as a file name would.
pub async fn convert_from_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    options: &ConversionOptions,
) -> Result<ConversionOutput, Pdf2JpgError> {
    let name = name.into();
    let options = options.clone();
    tokio::task::spawn_blocking(move || {
        let mut session = pdfium_session(&options)?;
        session.load_bytes(name, bytes)?;
        session.convert()
    })
    .await
    .map_err(|e| Pdf2JpgError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Convert a PDF and write the archive to `output_path`.
///
/// Uses atomic write (temp file + rename) so a failed run never leaves a
/// partial archive behind.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<ConversionStats, Pdf2JpgError> {
    let output = convert(input, options).await?;
    write_atomic(output_path.as_ref(), &output.archive, "zip.tmp").await?;
    Ok(output.stats)
}

/// Render the first page of a PDF file at the options' scale, background
/// and quality.
pub async fn preview(
    input: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<Preview, Pdf2JpgError> {
    let path = input.as_ref().to_path_buf();
    let options = options.clone();
    tokio::task::spawn_blocking(move || {
        let mut session = pdfium_session(&options)?;
        session.load_file(&path)?;
        session.preview()
    })
    .await
    .map_err(|e| Pdf2JpgError::Internal(format!("Preview task panicked: {}", e)))?
}

/// Render the first-page preview and write it as a JPEG file.
pub async fn preview_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &ConversionOptions,
) -> Result<Preview, Pdf2JpgError> {
    let preview = preview(input, options).await?;
    write_atomic(output_path.as_ref(), &preview.jpeg, "jpg.tmp").await?;
    Ok(preview)
}

/// Read PDF metadata without rendering any page.
pub async fn inspect(input: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2JpgError> {
    let path = input.as_ref().to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut session = pdfium_session(&ConversionOptions::default())?;
        session.load_file(&path)?;
        session.metadata()
    })
    .await
    .map_err(|e| Pdf2JpgError::Internal(format!("Metadata task panicked: {}", e)))?
}

// ── Run loop ─────────────────────────────────────────────────────────────

/// Convert the selected pages of `source` into an in-memory archive.
pub(crate) fn run_pipeline(
    source: &dyn PageSource,
    base: &str,
    options: &ConversionOptions,
    run: &RunState,
) -> Result<ConversionOutput, Pdf2JpgError> {
    let total_start = Instant::now();
    let total_pages = source.page_count();

    // ── Step 1: Resolve the page selection ───────────────────────────────
    let selection = PageSelection::parse(&options.pages, total_pages);
    if selection.is_empty() {
        return Err(Pdf2JpgError::EmptySelection {
            spec: options.pages.clone(),
            total: total_pages,
        });
    }
    let selected = selection.len();
    info!(
        "Converting {} of {} pages (scale {}, quality {}, background {})",
        selected, total_pages, options.scale, options.quality, options.background
    );

    let callback = options.progress_callback.as_deref();
    if let Some(cb) = callback {
        cb.on_conversion_start(selected);
    }

    // ── Step 2: Render, encode and archive each page in order ────────────
    let mut archive = ArchiveBuilder::new();
    let mut entries = Vec::with_capacity(selected);
    let mut render_duration_ms = 0u64;
    let mut encode_duration_ms = 0u64;

    for (done, page_num) in selection.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_page_start(page_num, selected);
        }

        let render_start = Instant::now();
        let page = source
            .render_page(page_num, options.scale, options.background)
            .map_err(|e| Pdf2JpgError::Conversion {
                page: Some(page_num),
                detail: e.to_string(),
            })?;
        let flat = flatten_onto(&page, options.background);
        drop(page);
        render_duration_ms += render_start.elapsed().as_millis() as u64;

        let encode_start = Instant::now();
        let jpeg = encode_jpeg(&flat, options.quality).map_err(|e| Pdf2JpgError::Conversion {
            page: Some(page_num),
            detail: format!("JPEG encoding failed: {}", e),
        })?;
        encode_duration_ms += encode_start.elapsed().as_millis() as u64;

        let name = entry_name(base, page_num);
        archive.add(&name, &jpeg).map_err(|e| Pdf2JpgError::Conversion {
            page: Some(page_num),
            detail: format!("archive entry '{}': {}", name, e),
        })?;
        debug!("Added {} ({} bytes)", name, jpeg.len());

        entries.push(EntryInfo {
            name,
            page_num,
            width: flat.width(),
            height: flat.height(),
            bytes: jpeg.len(),
        });

        let percent = progress_percent(done + 1, selected);
        run.set_progress(percent);
        if let Some(cb) = callback {
            cb.on_page_complete(page_num, selected, jpeg.len());
            cb.on_progress(percent);
        }
    }

    // ── Step 3: Serialise the archive ────────────────────────────────────
    let archive = archive.finish().map_err(|e| Pdf2JpgError::Conversion {
        page: None,
        detail: format!("archive serialisation failed: {}", e),
    })?;

    let stats = ConversionStats {
        total_pages,
        exported_pages: entries.len(),
        archive_bytes: archive.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        render_duration_ms,
        encode_duration_ms,
    };

    info!(
        "Conversion complete: {} pages, {} bytes, {}ms total",
        stats.exported_pages, stats.archive_bytes, stats.total_duration_ms
    );

    if let Some(cb) = callback {
        cb.on_conversion_complete(entries.len(), archive.len());
    }

    Ok(ConversionOutput {
        archive_name: archive_name(base),
        archive,
        entries,
        stats,
    })
}

/// Render page 1 of `source` as a JPEG preview.
pub(crate) fn render_preview(
    source: &dyn PageSource,
    options: &ConversionOptions,
) -> Result<Preview, Pdf2JpgError> {
    if source.page_count() == 0 {
        return Err(Pdf2JpgError::Preview {
            detail: "document has no pages".into(),
        });
    }
    let page = source
        .render_page(1, options.scale, options.background)
        .map_err(|e| Pdf2JpgError::Preview {
            detail: e.to_string(),
        })?;
    let flat = flatten_onto(&page, options.background);
    let jpeg = encode_jpeg(&flat, options.quality).map_err(|e| Pdf2JpgError::Preview {
        detail: format!("JPEG encoding failed: {}", e),
    })?;
    debug!(
        "Preview {}x{} → {} bytes",
        flat.width(),
        flat.height(),
        jpeg.len()
    );
    Ok(Preview {
        width: flat.width(),
        height: flat.height(),
        jpeg,
    })
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn pdfium_session(options: &ConversionOptions) -> Result<Session<PdfiumBackend>, Pdf2JpgError> {
    options.validate()?;
    let backend = PdfiumBackend::bind()?;
    Ok(Session::with_options(backend, options.clone()))
}

/// Write `bytes` to `path` via a sibling temp file and rename.
async fn write_atomic(path: &Path, bytes: &[u8], tmp_ext: &str) -> Result<(), Pdf2JpgError> {
    let write_err = |e| Pdf2JpgError::OutputWriteFailed {
        path: PathBuf::from(path),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension(tmp_ext);
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)?;
    info!("Wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}
