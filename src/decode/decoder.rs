use crate::{Operation, RequestError};
use serde_json::Value;

/// Decode a serialized operation array into an ordered sequence
///
/// The payload must be a JSON array whose elements are all objects.
/// Output order exactly matches input order.
///
/// # Errors
/// `RequestError::DecodeError` when the payload is not an array or any
/// element is not an object.
pub fn decode_operations(payload: &Value) -> Result<Vec<Operation>, RequestError> {
    let items = payload.as_array().ok_or_else(|| RequestError::DecodeError {
        reason: "expected an array of operation objects".to_string(),
    })?;

    items
        .iter()
        .map(|item| match item {
            Value::Object(fields) => Ok(Operation::new(fields.clone())),
            other => Err(RequestError::DecodeError {
                reason: format!("expected an operation object, found {}", kind_of(other)),
            }),
        })
        .collect()
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
