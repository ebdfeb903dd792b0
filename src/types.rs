use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Single create/update request body destined for one sub-part of a batch
///
/// An operation is an arbitrary flat or nested key/value record. Its identity
/// is its position in the input sequence; it is never mutated after decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation(Map<String, Value>);

impl Operation {
    /// Wrap a decoded key/value record
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up an optional field by name
    ///
    /// Returns `None` when the field is absent from the record. Callers that
    /// render optional query parameters skip absent fields rather than fail.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Serialize the record back to its JSON body text
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

/// One named file carried through archive operations
///
/// `content` is base64-encoded so binary data survives embedding in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub content: String,
}

/// Input description of one file to place into a packed archive
///
/// `content` is plain text here; files with empty content are only packed
/// when `insert_if_empty` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveFileSpec {
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "insertIfEmpty")]
    pub insert_if_empty: bool,
}

/// Result of one batch compilation: the ordered transport-encoded envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPayloads {
    /// Base64-encoded envelope per batch, in batch order
    pub payloads: Vec<String>,
    /// Number of batches produced
    pub batches: usize,
    /// Number of operations consumed
    pub operations: usize,
    pub timestamp: u64,
}

/// Listing of files produced by archive unpacking or export-package parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileListing {
    pub files: Vec<FileEntry>,
}

/// Request rejection reasons
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RequestError {
    /// A required metadata parameter is absent or empty
    MissingParameter { name: String },
    /// The operation payload is not a well-formed array of objects
    DecodeError { reason: String },
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::MissingParameter { name } => {
                write!(f, "{} is missing or empty", name)
            }
            RequestError::DecodeError { reason } => {
                write!(f, "malformed operation payload: {}", reason)
            }
        }
    }
}

impl std::error::Error for RequestError {}
