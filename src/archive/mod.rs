//! Archive Module
//!
//! This module packs named file contents into zip archives and unpacks
//! archives back into file listings, including the export-package variant
//! that reshapes each contained XML document on the way out.

mod export;
mod pack;
mod unpack;

pub use export::{ExportOptions, parse_export_package};
pub use pack::pack_files;
pub use unpack::unpack_archive;

use crate::convert::ConvertError;
use thiserror::Error;

/// Faults raised by archive operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("malformed base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("malformed zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive entry is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
    #[error("no files eligible for archiving")]
    NoFiles,
    #[error(transparent)]
    Convert(#[from] ConvertError),
}
