//! End-to-end tests against a real pdfium library.
//!
//! Fixture PDFs are generated with pdfium itself, so no files need to be
//! checked in. The tests are gated behind the `E2E_ENABLED` environment
//! variable because they need a pdfium shared library at runtime.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./lib cargo test --test e2e -- --nocapture

use pdf2jpg::{
    convert, convert_from_bytes, convert_to_file, inspect, preview_to_file, ConversionOptions,
    ErrorKind, Pdf2JpgError, PdfiumBackend, Rgb, Session,
};
use pdfium_render::prelude::*;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Barrier};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Skip this test unless E2E_ENABLED is set and pdfium can be bound.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match PdfiumBackend::bind() {
            Ok(backend) => backend,
            Err(e) => {
                println!("SKIP — {e}");
                return;
            }
        }
    }};
}

/// Write a PDF of blank pages, each `(width, height)` in points.
fn write_fixture(
    backend: &PdfiumBackend,
    dir: &Path,
    name: &str,
    sizes: &[(f32, f32)],
) -> PathBuf {
    let mut document = backend.pdfium().create_new_pdf().unwrap();
    for &(w, h) in sizes {
        let size = PdfPagePaperSize::Custom(PdfPoints::new(w), PdfPoints::new(h));
        document.pages_mut().create_page_at_end(size).unwrap();
    }
    let bytes = document.save_to_bytes().unwrap();
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn zip_names(archive: &[u8]) -> Vec<String> {
    let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
    zip.file_names().map(str::to_string).collect()
}

// ── Inspect ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_inspect_generated_pdf() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&backend, dir.path(), "three.pdf", &[(200.0, 100.0); 3]);

    let meta = inspect(&path).await.unwrap();
    assert_eq!(meta.page_count, 3);
    println!("version: {}", meta.pdf_version);
}

#[tokio::test]
async fn test_inspect_nonexistent() {
    let _backend = e2e_skip_unless_ready!();
    let err = inspect("/definitely/not/here.pdf").await.unwrap_err();
    assert!(matches!(err, Pdf2JpgError::FileNotFound { .. }));
}

// ── Convert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_convert_selected_pages() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &backend,
        dir.path(),
        "Report.PDF",
        &[(200.0, 100.0), (100.0, 100.0), (150.5, 80.0)],
    );

    let options = ConversionOptions::builder()
        .scale(2.0)
        .pages("3,1")
        .build()
        .unwrap();
    let output = convert(&path, &options).await.unwrap();

    assert_eq!(output.archive_name, "Report_jpg.zip");
    assert_eq!(
        zip_names(&output.archive),
        vec!["Report_p001.jpg", "Report_p003.jpg"]
    );
    let dims: Vec<_> = output.entries.iter().map(|e| (e.width, e.height)).collect();
    // 150.5 × 2 = 301 exactly; 80 × 2 = 160
    assert_eq!(dims, vec![(400, 200), (301, 160)]);
    assert_eq!(output.stats.total_pages, 3);
}

#[tokio::test]
async fn test_blank_page_takes_background() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&backend, dir.path(), "blank.pdf", &[(100.0, 100.0)]);

    // A page without content paints nothing, so every pixel is the clear
    // colour. Blue is far from both white and black.
    let options = ConversionOptions::builder()
        .scale(1.0)
        .quality(1.0)
        .background(Rgb::new(0, 128, 255))
        .build()
        .unwrap();
    let output = convert(&path, &options).await.unwrap();

    let mut zip = zip::ZipArchive::new(Cursor::new(output.archive)).unwrap();
    let mut jpeg = Vec::new();
    zip.by_name("blank_p001.jpg")
        .unwrap()
        .read_to_end(&mut jpeg)
        .unwrap();
    let img = image::load_from_memory(&jpeg).unwrap().to_rgb8();
    for (x, y) in [(0, 0), (50, 50), (99, 99)] {
        let [r, g, b] = img.get_pixel(x, y).0;
        assert!(
            r < 24 && (112..=144).contains(&g) && b > 232,
            "pixel ({x},{y}) is {r},{g},{b}, expected ~0,128,255"
        );
    }
}

#[tokio::test]
async fn test_convert_to_file_writes_archive() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&backend, dir.path(), "doc.pdf", &[(100.0, 50.0); 2]);
    let out = dir.path().join("nested/doc_jpg.zip");

    let stats = convert_to_file(&path, &out, &ConversionOptions::default())
        .await
        .unwrap();
    assert_eq!(stats.exported_pages, 2);

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes.len(), stats.archive_bytes);
    assert_eq!(zip_names(&bytes), vec!["doc_p001.jpg", "doc_p002.jpg"]);
}

#[tokio::test]
async fn test_preview_to_file() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(
        &backend,
        dir.path(),
        "doc.pdf",
        &[(100.0, 50.0), (300.0, 300.0)],
    );
    let out = dir.path().join("cover.jpg");

    let options = ConversionOptions::builder().scale(1.0).build().unwrap();
    let preview = preview_to_file(&path, &out, &options).await.unwrap();
    assert_eq!((preview.width, preview.height), (100, 50));
    assert_eq!(std::fs::read(&out).unwrap(), preview.jpeg);
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_non_pdf_name_rejected() {
    let _backend = e2e_skip_unless_ready!();
    let err = convert_from_bytes("scan.png", vec![0u8; 16], &ConversionOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFileType);
}

#[tokio::test]
async fn test_garbage_is_decode_error() {
    let _backend = e2e_skip_unless_ready!();
    let err = convert_from_bytes(
        "broken.pdf",
        b"%PDF-1.7 but not really".to_vec(),
        &ConversionOptions::default(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

// ── Binding ──────────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_bind_shares_one_instance() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }

    let barrier = Arc::new(Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                PdfiumBackend::bind()
                    .map(|b| std::ptr::from_ref(b.pdfium()) as usize)
            })
        })
        .collect();

    let mut addrs = Vec::new();
    for handle in handles {
        match handle.join().unwrap() {
            Ok(addr) => addrs.push(addr),
            Err(e) => {
                println!("SKIP — {e}");
                return;
            }
        }
    }
    addrs.dedup();
    assert_eq!(addrs.len(), 1, "every caller must see the same pdfium");

    // The shared instance is still alive and usable.
    let backend = PdfiumBackend::bind().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&backend, dir.path(), "alive.pdf", &[(50.0, 50.0)]);
    let mut session = Session::new(backend);
    assert_eq!(session.load_file(&path).unwrap(), 1);
}

// ── Session over pdfium ──────────────────────────────────────────────────────

#[test]
fn test_session_preview_then_convert() {
    let backend = e2e_skip_unless_ready!();
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(&backend, dir.path(), "deck.pdf", &[(120.0, 90.0); 4]);

    let mut session = Session::new(backend);
    assert_eq!(session.load_file(&path).unwrap(), 4);
    let preview = session.preview().unwrap();
    assert_eq!((preview.width, preview.height), (240, 180));

    let options = ConversionOptions::builder().pages("2-4").build().unwrap();
    assert!(!session.set_options(options));
    let output = session.convert().unwrap();
    assert_eq!(output.entries.len(), 3);
    assert_eq!(session.run_state().progress(), 100);
    assert!(!session.run_state().is_busy());
}
