//! Export Package Parsing Module
//!
//! This module unpacks an exported data package (a zip of XML documents)
//! and reshapes each retained document into the format configured for it.
//! Entries on the skip list, or without a configured format, are dropped.

use crate::FileEntry;
use crate::archive::ArchiveError;
use crate::convert::{self, OutputFormat};
use base64::{Engine, engine::general_purpose::STANDARD};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use tracing::info;
use zip::ZipArchive;

/// Metadata key carrying the comma-separated entry names to skip
pub const FILES_TO_SKIP_KEY: &str = "FilesToSkip";
/// Metadata key carrying the semicolon-separated `entryName,format` pairs
pub const FILES_CONTENT_FORMAT_KEY: &str = "FilesOutputContentFormat";

/// Per-entry handling options for one export package
#[derive(Debug, Default)]
pub struct ExportOptions {
    skip: Vec<String>,
    formats: HashMap<String, OutputFormat>,
}

impl ExportOptions {
    /// Build options from a request metadata map
    ///
    /// `FilesToSkip` is comma-split into entry names. Each semicolon-separated
    /// element of `FilesOutputContentFormat` is an `entryName,format` pair;
    /// a missing or unrecognized format defaults to xml passthrough.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Self {
        let skip = metadata
            .get(FILES_TO_SKIP_KEY)
            .map(|raw| raw.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        let mut formats = HashMap::new();
        if let Some(raw) = metadata.get(FILES_CONTENT_FORMAT_KEY) {
            for pair in raw.split(';') {
                let mut parts = pair.split(',');
                let Some(name) = parts.next().filter(|name| !name.is_empty()) else {
                    continue;
                };
                let format = parts
                    .next()
                    .and_then(OutputFormat::parse)
                    .unwrap_or(OutputFormat::Xml);
                formats.insert(name.to_string(), format);
            }
        }

        Self { skip, formats }
    }

    /// The configured format for an entry, or `None` when it must be skipped
    fn format_for(&self, entry_name: &str) -> Option<OutputFormat> {
        if self.skip.iter().any(|name| name == entry_name) {
            return None;
        }
        self.formats.get(entry_name).copied()
    }
}

/// Parse a base64-encoded export package into reshaped file contents
///
/// Each retained XML document is reshaped per its configured format and the
/// result is base64-encoded into the listing. A UTF-8 byte order mark at the
/// start of a document is stripped before parsing.
pub fn parse_export_package(
    encoded: &str,
    options: &ExportOptions,
) -> Result<Vec<FileEntry>, ArchiveError> {
    let bytes = STANDARD.decode(encoded)?;
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;

    let mut files = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let Some(format) = options.format_for(&name) else {
            info!("Entry {} was skipped", name);
            continue;
        };

        info!("Processing {} entry", name);
        let mut raw = Vec::new();
        entry.read_to_end(&mut raw)?;

        let document = String::from_utf8(raw)?;
        let document = document.strip_prefix('\u{feff}').unwrap_or(&document);

        let content = match format {
            OutputFormat::Json => convert::xml_to_json(document)?.to_string(),
            OutputFormat::Csv => convert::xml_to_csv(document)?,
            OutputFormat::Xml => document.to_string(),
        };

        files.push(FileEntry {
            name,
            content: STANDARD.encode(content.as_bytes()),
        });
    }

    Ok(files)
}
