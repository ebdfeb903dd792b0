//! API Module
//!
//! This module handles the JSON-RPC API for the data-integration operations.
//! It provides the HTTP endpoint that clients use to invoke them.

mod server;
pub use server::Server;
