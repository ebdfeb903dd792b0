//! Format Conversion Module
//!
//! This module converts between tabular and structured data formats:
//! - CSV text into JSON records keyed by the header row
//! - XML documents into generic JSON objects or CSV tables

mod csv_json;
mod xml;

pub use csv_json::csv_to_records;
pub use xml::{xml_to_csv, xml_to_json};

use thiserror::Error;

/// Faults raised while converting between data formats
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("malformed xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document has no root element")]
    NoRoot,
}

/// Target shape for reshaping an XML document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Xml,
    Csv,
}

impl OutputFormat {
    /// Parse a format name; unknown names return `None`
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "json" => Some(OutputFormat::Json),
            "xml" => Some(OutputFormat::Xml),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}
