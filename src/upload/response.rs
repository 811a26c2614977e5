//! Upstream API response model and error-message extraction.
//!
//! The platform API answers `{ success, message, content, code }` on
//! success and `{ success: false, message, errors?, code }` on logical
//! failure, where `errors` has no fixed shape: sometimes a field-keyed
//! map of messages, sometimes a flat array, sometimes a bare string.
//! The dynamic shape is modeled as a tagged union so the message
//! extraction stays exhaustive instead of an ad-hoc type-checking chain.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Fallback message when the server gave nothing usable.
const GENERIC_FAILURE: &str = "Upload failed";

/// Error messages for one field: the API emits either a list or a
/// single string per field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldErrors {
    Many(Vec<String>),
    One(String),
}

impl FieldErrors {
    fn join(&self) -> String {
        match self {
            FieldErrors::Many(items) => items.join(", "),
            FieldErrors::One(item) => item.clone(),
        }
    }
}

/// The `errors` member of a failure body, in its three observed shapes.
///
/// BTreeMap keeps field-map extraction output deterministic across runs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ApiErrors {
    List(Vec<String>),
    FieldMap(BTreeMap<String, FieldErrors>),
    Text(String),
}

/// Response body of an upload endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiResponse {
    /// Absent on some error bodies; `Some(false)` marks logical failure
    /// even under HTTP 200.
    pub success: Option<bool>,
    pub message: Option<String>,
    pub content: Option<Value>,
    pub code: Option<i64>,
    pub errors: Option<ApiErrors>,
}

impl ApiResponse {
    /// Parse a response body, tolerating non-JSON text.
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|_| ApiResponse {
            message: (!body.trim().is_empty()).then(|| body.trim().to_string()),
            ..ApiResponse::default()
        })
    }

    /// Whether the body itself reports logical failure.
    pub fn is_logical_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// Best available failure message.
    ///
    /// Priority: field-keyed `errors` map joined as "field: message" >
    /// flat `errors` array joined > bare `errors` string > top-level
    /// `message` > a generic fallback.
    pub fn error_message(&self) -> String {
        match &self.errors {
            Some(ApiErrors::FieldMap(map)) if !map.is_empty() => {
                let details: Vec<String> = map
                    .iter()
                    .map(|(field, errs)| format!("{}: {}", field, errs.join()))
                    .collect();
                match &self.message {
                    Some(msg) if !msg.is_empty() => format!("{} - {}", msg, details.join("; ")),
                    _ => details.join("; "),
                }
            }
            Some(ApiErrors::List(items)) if !items.is_empty() => {
                let joined = items.join(", ");
                match &self.message {
                    Some(msg) if !msg.is_empty() => format!("{} - {}", msg, joined),
                    _ => joined,
                }
            }
            Some(ApiErrors::Text(text)) if !text.is_empty() => text.clone(),
            _ => self
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        }
    }

    /// The body as a JSON value, for callers that keep the raw response.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_map_extraction() {
        let response =
            ApiResponse::from_body(r#"{"success":false,"errors":{"lesson":["not found"]}}"#);
        assert!(response.is_logical_failure());
        assert!(response.error_message().contains("lesson: not found"));
    }

    #[test]
    fn test_field_map_with_message_prefix() {
        let body = r#"{"success":false,"message":"Validation failed","errors":{"week":["must be a number"],"term":"unknown"}}"#;
        let response = ApiResponse::from_body(body);
        let msg = response.error_message();
        assert!(msg.starts_with("Validation failed - "));
        assert!(msg.contains("term: unknown"));
        assert!(msg.contains("week: must be a number"));
    }

    #[test]
    fn test_flat_array_extraction() {
        let response = ApiResponse::from_body(
            r#"{"success":false,"errors":["row 2 malformed","row 5 malformed"]}"#,
        );
        assert_eq!(
            response.error_message(),
            "row 2 malformed, row 5 malformed"
        );
    }

    #[test]
    fn test_message_only() {
        let response = ApiResponse::from_body(r#"{"success":false,"message":"Bad file"}"#);
        assert_eq!(response.error_message(), "Bad file");
    }

    #[test]
    fn test_generic_fallback() {
        let response = ApiResponse::from_body(r#"{"success":false}"#);
        assert_eq!(response.error_message(), "Upload failed");
    }

    #[test]
    fn test_non_json_body_becomes_message() {
        let response = ApiResponse::from_body("502 Bad Gateway");
        assert_eq!(response.error_message(), "502 Bad Gateway");
    }

    #[test]
    fn test_success_body() {
        let response = ApiResponse::from_body(
            r#"{"success":true,"message":"12 lessons created","content":{"created":12},"code":200}"#,
        );
        assert!(!response.is_logical_failure());
        assert_eq!(response.success, Some(true));
        assert_eq!(response.content.as_ref().unwrap()["created"], 12);
    }
}
