//! Envelope Rendering Module
//!
//! This module assembles the multipart text envelope for one batch. The
//! downstream consumer parses the envelope byte-for-byte, so the boundary
//! markers, header literals, and CRLF line endings here are load-bearing.

use crate::Operation;
use crate::params::BatchParameters;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;
use uuid::Uuid;

/// In-progress multipart envelope for a single batch
///
/// Minting an envelope mints a fresh changeset token; every operation
/// appended to the envelope references that token, and no two envelopes
/// ever share one. The batch-open framing is written lazily when the first
/// operation arrives, so an envelope that never receives an operation
/// renders nothing.
pub struct Envelope {
    buf: String,
    token: String,
}

impl Envelope {
    /// Mint an empty envelope with a fresh changeset token
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            token: Uuid::new_v4().to_string(),
        }
    }

    /// Whether any operation has been appended yet
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The changeset token scoped to this envelope
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Append one operation sub-part
    ///
    /// Writes the batch-open framing first when this is the envelope's first
    /// operation, then the changeset boundary, the sub-part headers, the
    /// addressing line, the JSON content-type block, and the operation body.
    pub fn append_operation(
        &mut self,
        params: &BatchParameters,
        operation: &Operation,
        content_id: u32,
    ) -> serde_json::Result<()> {
        if self.buf.is_empty() {
            self.buf.push_str(&format!(
                "--batch_{}\r\n\
                 Content-Type: multipart/mixed;boundary=changeset_{}\r\n",
                params.collection, self.token
            ));
        }

        self.buf.push_str(&format!(
            "\r\n\
             --changeset_{token}\r\n\
             Content-Type:application/http\r\n\
             Content-Transfer-Encoding:binary\r\n\
             Content-ID: {content_id}\r\n\
             OData-MaxVersion:4.0\r\n\
             OData-Version:4.0\r\n\
             \r\n\
             PATCH {base_url}/api/data/v9.1/{collection}{address} HTTP/1.1",
            token = self.token,
            content_id = content_id,
            base_url = params.base_url,
            collection = params.collection,
            address = query_clause(operation, params.query_param_names.as_deref()),
        ));
        self.buf.push_str(
            "\r\n\
             Content-Type: application/json\r\n\
             OData-MaxVersion:4.0\r\n\
             OData-Version:4.0\r\n\
             \r\n",
        );
        self.buf.push_str(&operation.to_json()?);

        Ok(())
    }

    /// Close the envelope and transport-encode it
    ///
    /// Appends the changeset-close and batch-close framing, then encodes the
    /// whole envelope as base64 for safe embedding in a JSON response.
    pub fn seal(mut self, collection: &str) -> String {
        self.buf.push_str(&format!(
            "\r\n\
             \r\n\
             --changeset_{}--\r\n\
             --batch_{}--",
            self.token, collection
        ));

        STANDARD.encode(self.buf.as_bytes())
    }
}

/// Render the optional parenthesized query clause for one addressing line
///
/// Each configured name present on the operation renders as `name='value'`;
/// absent names are skipped. When no configured name is present, no
/// parentheses are emitted at all.
fn query_clause(operation: &Operation, names: Option<&[String]>) -> String {
    let Some(names) = names else {
        return String::new();
    };

    let rendered: Vec<String> = names
        .iter()
        .filter_map(|name| {
            operation
                .field(name)
                .map(|value| format!("{}='{}'", name, field_text(value)))
        })
        .collect();

    if rendered.is_empty() {
        String::new()
    } else {
        format!("({})", rendered.join(","))
    }
}

/// Render a field value without surrounding JSON string quotes
fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
