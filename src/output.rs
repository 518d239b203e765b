//! Result types produced by a conversion run, a preview and an inspection.

use serde::{Deserialize, Serialize};

/// The finished archive of one successful run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// `{baseName}_jpg.zip`.
    pub archive_name: String,
    /// Serialised ZIP bytes.
    #[serde(skip)]
    pub archive: Vec<u8>,
    /// One record per archive entry, in archive (ascending page) order.
    pub entries: Vec<EntryInfo>,
    pub stats: ConversionStats,
}

/// Summary of one JPEG entry written to the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    /// `{baseName}_p{NNN}.jpg`.
    pub name: String,
    /// 1-indexed page number in the source document.
    pub page_num: usize,
    pub width: u32,
    pub height: u32,
    /// Encoded JPEG size in bytes.
    pub bytes: usize,
}

/// Counters and timings for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source document.
    pub total_pages: usize,
    /// Pages exported to the archive.
    pub exported_pages: usize,
    pub archive_bytes: usize,
    pub total_duration_ms: u64,
    pub render_duration_ms: u64,
    pub encode_duration_ms: u64,
}

/// A JPEG rendering of page 1 at the current visual options.
#[derive(Debug, Clone)]
pub struct Preview {
    pub width: u32,
    pub height: u32,
    pub jpeg: Vec<u8>,
}

/// Document information readable without rendering any page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}
