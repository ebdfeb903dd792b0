//! Batch Compilation Module
//!
//! This module compiles an ordered operation sequence into multipart batch
//! envelopes:
//! - BatchCompiler: groups operations into fixed-size batches
//! - Envelope: renders and transport-encodes one batch

mod compiler;
mod envelope;

#[cfg(test)]
mod tests;

pub use compiler::BatchCompiler;
pub use envelope::Envelope;
