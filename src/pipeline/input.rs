//! Input handling: file-name validation, reading, and output naming.
//!
//! A file is accepted by name alone (`.pdf`, any case) before a single byte
//! is read; whether the bytes really are a PDF is the decoder's call. All
//! output names derive from the same base name so that one document always
//! produces `{base}_p001.jpg … {base}_jpg.zip`.

use crate::error::Pdf2JpgError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Base name used when the source file name is unknown.
pub const DEFAULT_BASE_NAME: &str = "document";

/// Whether `name` carries a `.pdf` extension (case-insensitive).
pub fn has_pdf_extension(name: &str) -> bool {
    name.len() >= 4
        && name
            .get(name.len() - 4..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".pdf"))
}

/// Reject names without a `.pdf` extension.
pub fn validate_file_name(name: &str) -> Result<(), Pdf2JpgError> {
    if has_pdf_extension(name) {
        Ok(())
    } else {
        Err(Pdf2JpgError::InvalidFileType {
            name: name.to_string(),
        })
    }
}

/// Strip one trailing `.pdf` (any case); `None` yields [`DEFAULT_BASE_NAME`].
pub fn base_name(file_name: Option<&str>) -> String {
    let name = file_name.unwrap_or("document.pdf");
    if has_pdf_extension(name) {
        name[..name.len() - 4].to_string()
    } else {
        name.to_string()
    }
}

/// Archive entry name for a page: `{base}_p{NNN}.jpg`, page zero-padded to 3.
pub fn entry_name(base: &str, page_num: usize) -> String {
    format!("{base}_p{page_num:03}.jpg")
}

/// Archive file name: `{base}_jpg.zip`.
pub fn archive_name(base: &str) -> String {
    format!("{base}_jpg.zip")
}

/// The archive name a conversion of `path` produces.
pub fn archive_name_for(path: &Path) -> String {
    archive_name(&base_name(file_name_of(path).as_deref()))
}

/// Final path component as UTF-8 text, if any.
pub fn file_name_of(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Validate the name of `path` and read the whole file.
///
/// Returns the file name alongside the bytes.
pub fn read_pdf_file(path: &Path) -> Result<(String, Vec<u8>), Pdf2JpgError> {
    let name = file_name_of(path).ok_or_else(|| Pdf2JpgError::InvalidFileType {
        name: path.display().to_string(),
    })?;
    validate_file_name(&name)?;

    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Pdf2JpgError::PermissionDenied {
            path: PathBuf::from(path),
        },
        _ => Pdf2JpgError::FileNotFound {
            path: PathBuf::from(path),
        },
    })?;

    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    Ok((name, bytes))
}
