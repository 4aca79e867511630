use crate::error::{DocumentRole, ParseError};
use serde_json::Value;

/// Parse a YAML string into a generic value tree.
///
/// Performs YAML deserialization only; no flattening or rule handling.
/// `role` tags any failure with the document it came from, since a
/// validation run parses two documents and the caller needs to know
/// which one was malformed.
///
/// Empty (or whitespace-only) input parses as a null document, which
/// flattens to a single null scalar under the empty path.
pub fn parse(input: &str, role: DocumentRole) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_saphyr::from_str(input).map_err(|e| ParseError {
        role,
        message: e.to_string(),
    })
}
