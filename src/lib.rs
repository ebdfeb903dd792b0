//! This crate implements a data-integration helper service for OData-style backends.
//! It exposes a set of independent request-processing operations over a JSON-RPC API:
//! batch request body compilation, CSV conversion, and archive packing/unpacking.

pub mod types; // Defines common data structures and types used throughout the service.
pub mod api; // Handles the external JSON-RPC API surface.
pub mod params; // Extracts typed batch parameters from request metadata.
pub mod decode; // Decodes serialized operation payloads into ordered sequences.
pub mod batch; // Compiles operations into multipart batch envelopes.
pub mod convert; // Converts between tabular and structured data formats.
pub mod archive; // Packs and unpacks zip archives and export packages.
pub mod config; // Defines and loads service configuration.

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use batch::BatchCompiler;
