//! In-memory ZIP archive builder for the converted CSV files.
//!
//! Entries are held as text until [`ArchiveBuilder::finalize`], which writes
//! them in insertion order with deflate compression. Every entry carries the
//! same fixed timestamp, so identical input gives byte-identical archives.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::{Result, XlcsvError};
use crate::types::ArchiveEntry;

/// Ordered collection of archive entries keyed by path.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Vec<ArchiveEntry>,
    /// Path -> position in `entries`.
    index: HashMap<String, usize>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text file. A second add with the same path replaces the content
    /// in place; the entry keeps its original position.
    pub fn add_entry(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        if let Some(existing) = self
            .index
            .get(&path)
            .and_then(|&i| self.entries.get_mut(i))
        {
            log::warn!("duplicate archive path {path:?}, keeping the latest content");
            existing.content = content;
            return;
        }
        self.index.insert(path.clone(), self.entries.len());
        self.entries.push(ArchiveEntry { path, content });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry paths in archive order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Serialize all entries into a ZIP file.
    ///
    /// # Errors
    /// Returns [`XlcsvError::Archive`] if the ZIP writer fails.
    pub fn finalize(&self) -> Result<Vec<u8>> {
        let capacity = self.entries.iter().map(|e| e.content.len()).sum::<usize>() / 2;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(capacity)));

        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        for entry in &self.entries {
            writer
                .start_file(entry.path.as_str(), options)
                .map_err(|e| XlcsvError::Archive(format!("{}: {e}", entry.path)))?;
            writer
                .write_all(entry.content.as_bytes())
                .map_err(|e| XlcsvError::Archive(format!("{}: {e}", entry.path)))?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| XlcsvError::Archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
