//! In-memory ZIP assembly.
//!
//! Entries are stored uncompressed (JPEG data does not deflate) with a fixed
//! 1980-01-01 timestamp, so the same pages always serialise to the same bytes.
//! The archive lives in memory until [`ArchiveBuilder::finish`]; dropping the
//! builder discards everything, which is how a failed run leaves no output.

use std::io::{Cursor, Write};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Accumulates named entries and serialises them as one ZIP.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }

    /// Append `bytes` under `name`.
    pub fn add(&mut self, name: &str, bytes: &[u8]) -> Result<(), ZipError> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());
        self.writer.start_file(name, options)?;
        self.writer.write_all(bytes)?;
        self.entries += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Write the central directory and return the archive bytes.
    pub fn finish(self) -> Result<Vec<u8>, ZipError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn entries_round_trip_in_order() {
        let mut builder = ArchiveBuilder::new();
        builder.add("doc_p001.jpg", b"first").unwrap();
        builder.add("doc_p003.jpg", b"third").unwrap();
        assert_eq!(builder.len(), 2);
        let bytes = builder.finish().unwrap();

        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<String> = zip.file_names().map(str::to_string).collect();
        assert_eq!(names.len(), 2);
        assert_eq!(zip.by_index(0).unwrap().name(), "doc_p001.jpg");

        let mut content = String::new();
        zip.by_name("doc_p003.jpg")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "third");
    }

    #[test]
    fn entries_are_stored() {
        let mut builder = ArchiveBuilder::new();
        builder.add("a.jpg", &[0xFF, 0xD8, 0xFF]).unwrap();
        let bytes = builder.finish().unwrap();
        let mut zip = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(
            zip.by_index(0).unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let build = || {
            let mut builder = ArchiveBuilder::new();
            builder.add("x_p001.jpg", b"abc").unwrap();
            builder.finish().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_archive_is_valid() {
        let builder = ArchiveBuilder::new();
        assert!(builder.is_empty());
        let bytes = builder.finish().unwrap();
        assert_eq!(ZipArchive::new(Cursor::new(bytes)).unwrap().len(), 0);
    }
}
