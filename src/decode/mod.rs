//! Operation Decoding Module
//!
//! This module decodes the serialized operation array carried by a request
//! into an ordered in-memory sequence. Batch numbering and content-ID
//! assignment depend on this order being preserved exactly.

mod decoder;
pub use decoder::decode_operations;
