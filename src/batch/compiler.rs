//! Batch Compiler Module
//!
//! This module groups a decoded operation sequence into fixed-size batches
//! and renders each batch as a transport-encoded envelope. Content IDs and
//! changeset tokens are local to one compilation call; nothing about a
//! request survives it.

use crate::Operation;
use crate::batch::Envelope;
use crate::params::BatchParameters;
use tracing::debug;

/// Compiles ordered operations into transport-encoded batch envelopes
///
/// Operations are grouped into batches of at most `batch_size`. Each batch
/// carries its own changeset token and numbers its operations with content
/// IDs starting at 1.
pub struct BatchCompiler {
    params: BatchParameters,
}

impl BatchCompiler {
    /// Creates a new compiler for one request's parameters
    pub fn new(params: BatchParameters) -> Self {
        Self { params }
    }

    /// Compile the operation sequence into envelopes, in batch order
    ///
    /// # Arguments
    /// * `operations` - Decoded operations in their original input order
    ///
    /// # Returns
    /// One base64-encoded envelope per batch: exactly
    /// `ceil(operations.len() / batch_size)` entries, empty input included.
    pub fn compile(&self, operations: &[Operation]) -> anyhow::Result<Vec<String>> {
        let mut payloads = Vec::new();
        let mut envelope = Envelope::new();
        let mut content_id: u32 = 1;

        for (index, operation) in operations.iter().enumerate() {
            // Close the previous batch when the next one begins
            if index % self.params.batch_size == 0 && !envelope.is_empty() {
                debug!("Sealing batch {} with {} operations", payloads.len() + 1, content_id - 1);
                payloads.push(envelope.seal(&self.params.collection));

                // Fresh changeset token and content IDs for the new batch
                envelope = Envelope::new();
                content_id = 1;
            }

            envelope.append_operation(&self.params, operation, content_id)?;
            content_id += 1;
        }

        // Flush the final, possibly partial batch
        if !envelope.is_empty() {
            debug!("Sealing batch {} with {} operations", payloads.len() + 1, content_id - 1);
            payloads.push(envelope.seal(&self.params.collection));
        }

        Ok(payloads)
    }
}
