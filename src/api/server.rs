//! API Server Module
//!
//! This module implements a JSON-RPC server for the data-integration
//! operations. It provides a single HTTP endpoint that dispatches each
//! request to the matching operation: batch request compilation, CSV
//! conversion, and archive packing/unpacking.

use crate::{
    ArchiveFileSpec, BatchCompiler, BatchPayloads, FileListing,
    archive::{self, ArchiveError, ExportOptions},
    config::Config,
    convert,
    decode::decode_operations,
    params::BatchParameters,
};
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// Shared application state that is accessible across all request handlers
///
/// Every operation is a stateless transform, so the only shared state is the
/// loaded configuration.
#[derive(Clone)]
pub struct AppState {
    config: Config,
}

/// The main API server struct
///
/// Encapsulates the server configuration. The server manages the HTTP
/// endpoint for receiving operation requests.
pub struct Server {
    config: Config,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Server configuration (host, port, batch defaults)
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Starts the API server and begins listening for incoming requests
    ///
    /// This method:
    /// 1. Creates an Axum router with a single POST endpoint at "/"
    /// 2. Binds the router to the configured host and port
    /// 3. Starts serving requests asynchronously
    ///
    /// # Returns
    /// `Ok(())` if the server starts successfully, or an error if binding fails
    pub async fn start(self) -> anyhow::Result<()> {
        // Format the listening address from config
        let addr = format!("{}:{}", self.config.api.host, self.config.api.port);

        // Create the router with a single POST endpoint that handles JSON-RPC requests
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(AppState {
                config: self.config,
            });

        info!("API server listening on {}", addr);

        // Bind to the TCP address and start serving
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// JSON-RPC 2.0 request structure
///
/// - `jsonrpc`: Protocol version (should be "2.0")
/// - `method`: The operation to invoke (e.g., "compileBatchRequest")
/// - `params`: Operation parameters (arbitrary JSON value)
/// - `id`: Request identifier for matching responses
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
    id: Value,
}

/// JSON-RPC error object
#[derive(Debug, Serialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

impl JsonRpcResponse {
    /// Successful response carrying an operation result
    fn success(result: Value, id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Rejected-input response (standard JSON-RPC invalid params code)
    fn invalid_params(message: String, id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: -32602,
                message,
            }),
            id,
        }
    }

    /// Unknown-method response
    fn method_not_found(id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: -32601,
                message: "Method not found".to_string(),
            }),
            id,
        }
    }

    /// Unrecoverable internal fault; no partial output is returned
    fn internal_error(id: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: -32603,
                message: "Internal error".to_string(),
            }),
            id,
        }
    }
}

/// Main RPC request handler
///
/// This function is called for every POST request to the "/" endpoint.
/// It routes the request to the appropriate handler based on the method name.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);

    // Route to the appropriate handler based on the method name
    match request.method.as_str() {
        "compileBatchRequest" => handle_compile_batch(state, request).await,
        "csvToJson" => handle_csv_to_json(request).await,
        "packArchive" => handle_pack_archive(request).await,
        "unpackArchive" => handle_unpack_archive(request).await,
        "parseExportPackage" => handle_parse_export_package(request).await,
        // Return "Method not found" error for unsupported methods
        _ => Json(JsonRpcResponse::method_not_found(request.id)),
    }
}

/// Parameters for the "compileBatchRequest" method
#[derive(Debug, Deserialize)]
struct CompileBatchParams {
    /// String metadata: environment URL, entity name, batch size, query params
    #[serde(default)]
    metadata: HashMap<String, String>,
    /// Serialized array of operation records, in submission order
    operations: Value,
}

/// Handles the "compileBatchRequest" method
///
/// This function:
/// 1. Extracts typed batch parameters from the request metadata
/// 2. Decodes the ordered operation array
/// 3. Compiles the operations into transport-encoded batch envelopes
///
/// Rejected input (missing parameters, malformed operations) produces an
/// invalid-params error; a rendering fault produces an internal error with
/// no partial output.
async fn handle_compile_batch(state: AppState, request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    // Step 1: Deserialize the operation parameters
    let params: CompileBatchParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize batch compilation params: {}", e);
            return Json(JsonRpcResponse::invalid_params(
                format!("Invalid params: {}", e),
                request.id,
            ));
        }
    };

    // Step 2: Extract typed batch parameters from the metadata map
    let batch_params = match BatchParameters::from_metadata(
        &params.metadata,
        state.config.batch.default_batch_size,
    ) {
        Ok(batch_params) => batch_params,
        Err(e) => {
            warn!("Batch compilation rejected: {}", e);
            return Json(JsonRpcResponse::invalid_params(e.to_string(), request.id));
        }
    };

    // Step 3: Decode the ordered operation sequence
    let operations = match decode_operations(&params.operations) {
        Ok(operations) => operations,
        Err(e) => {
            warn!("Batch compilation rejected: {}", e);
            return Json(JsonRpcResponse::invalid_params(e.to_string(), request.id));
        }
    };

    // Step 4: Compile the operations into envelopes
    let compiler = BatchCompiler::new(batch_params);
    match compiler.compile(&operations) {
        Ok(payloads) => {
            info!(
                "Compiled {} operations into {} envelopes",
                operations.len(),
                payloads.len()
            );

            let result = BatchPayloads {
                batches: payloads.len(),
                operations: operations.len(),
                payloads,
                timestamp: unix_timestamp(),
            };
            Json(JsonRpcResponse::success(
                serde_json::to_value(result).unwrap(),
                request.id,
            ))
        }
        Err(e) => {
            error!("Batch rendering failed: {:?}", e);
            Json(JsonRpcResponse::internal_error(request.id))
        }
    }
}

/// Parameters for the "csvToJson" method
#[derive(Debug, Deserialize)]
struct CsvToJsonParams {
    /// Raw CSV text; the first record is the header row
    csv: String,
}

/// Handles the "csvToJson" method
async fn handle_csv_to_json(request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let params: CsvToJsonParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize csv conversion params: {}", e);
            return Json(JsonRpcResponse::invalid_params(
                format!("Invalid params: {}", e),
                request.id,
            ));
        }
    };

    match convert::csv_to_records(&params.csv) {
        Ok(records) => {
            info!("Converted {} csv rows", records.len());
            Json(JsonRpcResponse::success(Value::Array(records), request.id))
        }
        Err(e) => {
            warn!("Csv conversion rejected: {}", e);
            Json(JsonRpcResponse::invalid_params(e.to_string(), request.id))
        }
    }
}

/// Parameters for the "packArchive" method
#[derive(Debug, Deserialize)]
struct PackArchiveParams {
    files: Vec<ArchiveFileSpec>,
}

/// Handles the "packArchive" method
async fn handle_pack_archive(request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let params: PackArchiveParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize archive packing params: {}", e);
            return Json(JsonRpcResponse::invalid_params(
                format!("Invalid params: {}", e),
                request.id,
            ));
        }
    };

    match archive::pack_files(&params.files) {
        Ok(encoded) => {
            info!("Packed {} file specs into an archive", params.files.len());
            Json(JsonRpcResponse::success(
                serde_json::json!({ "archive": encoded, "timestamp": unix_timestamp() }),
                request.id,
            ))
        }
        Err(e) => archive_failure(e, "Archive packing", request.id),
    }
}

/// Parameters for the "unpackArchive" method
#[derive(Debug, Deserialize)]
struct UnpackArchiveParams {
    /// Base64-encoded zip archive
    archive: String,
}

/// Handles the "unpackArchive" method
async fn handle_unpack_archive(request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let params: UnpackArchiveParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize archive unpacking params: {}", e);
            return Json(JsonRpcResponse::invalid_params(
                format!("Invalid params: {}", e),
                request.id,
            ));
        }
    };

    match archive::unpack_archive(&params.archive) {
        Ok(files) => {
            info!("Unpacked {} archive entries", files.len());
            let result = FileListing { files };
            Json(JsonRpcResponse::success(
                serde_json::to_value(result).unwrap(),
                request.id,
            ))
        }
        Err(e) => archive_failure(e, "Archive unpacking", request.id),
    }
}

/// Parameters for the "parseExportPackage" method
#[derive(Debug, Deserialize)]
struct ParseExportPackageParams {
    /// String metadata: skip list and per-entry output formats
    #[serde(default)]
    metadata: HashMap<String, String>,
    /// Base64-encoded export package (a zip of XML documents)
    archive: String,
}

/// Handles the "parseExportPackage" method
async fn handle_parse_export_package(request: JsonRpcRequest) -> Json<JsonRpcResponse> {
    let params: ParseExportPackageParams = match serde_json::from_value(request.params.clone()) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to deserialize export package params: {}", e);
            return Json(JsonRpcResponse::invalid_params(
                format!("Invalid params: {}", e),
                request.id,
            ));
        }
    };

    let options = ExportOptions::from_metadata(&params.metadata);
    match archive::parse_export_package(&params.archive, &options) {
        Ok(files) => {
            info!("Parsed export package into {} entries", files.len());
            let result = FileListing { files };
            Json(JsonRpcResponse::success(
                serde_json::to_value(result).unwrap(),
                request.id,
            ))
        }
        Err(e) => archive_failure(e, "Export package parsing", request.id),
    }
}

/// Map an archive fault to its JSON-RPC response
///
/// I/O faults while assembling an archive are internal errors; everything
/// else describes unusable input and is surfaced to the caller.
fn archive_failure(e: ArchiveError, context: &str, id: Value) -> Json<JsonRpcResponse> {
    match e {
        ArchiveError::Io(err) => {
            error!("{} failed: {}", context, err);
            Json(JsonRpcResponse::internal_error(id))
        }
        other => {
            warn!("{} rejected: {}", context, other);
            Json(JsonRpcResponse::invalid_params(other.to_string(), id))
        }
    }
}

/// Current unix timestamp for response receipts
fn unix_timestamp() -> u64 {
    chrono::Utc::now().timestamp() as u64
}
