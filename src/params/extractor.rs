use crate::RequestError;
use std::collections::HashMap;
use tracing::debug;

/// Metadata key naming the target environment base URL
pub const ENVIRONMENT_URL_KEY: &str = "EnvironmentURL";
/// Metadata key naming the target entity collection
pub const ENTITY_NAME_KEY: &str = "EntityName";
/// Metadata key carrying the requested operations-per-batch count
pub const BATCH_SIZE_KEY: &str = "BatchSize";
/// Metadata key carrying the comma-separated query parameter field names
pub const BATCH_QUERY_PARAMS_KEY: &str = "BatchQueryParams";

/// Typed parameters for one batch compilation
///
/// Constructed once per request and read-only afterwards.
#[derive(Debug, Clone)]
pub struct BatchParameters {
    /// Target environment base URL, trailing slash stripped
    pub base_url: String,
    /// Target entity collection name
    pub collection: String,
    /// Operations per batch, always positive
    pub batch_size: usize,
    /// Field names rendered as addressing-line query parameters, in order
    pub query_param_names: Option<Vec<String>>,
}

impl BatchParameters {
    /// Build batch parameters from a request metadata map
    ///
    /// # Arguments
    /// * `metadata` - String key/value metadata carried by the request
    /// * `default_batch_size` - Fallback operations-per-batch count
    ///
    /// # Errors
    /// `RequestError::MissingParameter` when the environment URL or the
    /// entity name is absent or empty.
    ///
    /// A `BatchSize` value that is absent, non-numeric, or not positive
    /// silently falls back to `default_batch_size` rather than failing.
    pub fn from_metadata(
        metadata: &HashMap<String, String>,
        default_batch_size: usize,
    ) -> Result<Self, RequestError> {
        let mut base_url = required_value(metadata, ENVIRONMENT_URL_KEY)?.to_string();
        if base_url.ends_with('/') {
            base_url.pop();
        }

        let collection = required_value(metadata, ENTITY_NAME_KEY)?.to_string();

        let batch_size = match optional_value(metadata, BATCH_SIZE_KEY)
            .and_then(|raw| raw.trim().parse::<usize>().ok())
        {
            Some(size) if size > 0 => size,
            _ => {
                debug!("No usable batch size supplied, using default {}", default_batch_size);
                default_batch_size
            }
        };

        // Comma-split the query parameter names, preserving their order
        let query_param_names = optional_value(metadata, BATCH_QUERY_PARAMS_KEY)
            .map(|raw| raw.split(',').map(str::to_string).collect());

        Ok(Self {
            base_url,
            collection,
            batch_size,
            query_param_names,
        })
    }
}

/// Look up an optional metadata value, treating empty strings as absent
fn optional_value<'a>(metadata: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    metadata
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

/// Look up a required metadata value
fn required_value<'a>(
    metadata: &'a HashMap<String, String>,
    key: &str,
) -> Result<&'a str, RequestError> {
    optional_value(metadata, key).ok_or_else(|| RequestError::MissingParameter {
        name: key.to_string(),
    })
}
