//! REST types for the intake server.
//!
//! The intake server sits in front of the platform upload API: browser
//! clients post files here, get validation feedback and preview data,
//! and the server proxies accepted files upstream with the fallback
//! logic applied.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{ParsedPreview, UploadOutcome, ValidationReport};

/// Response to a validate-only request: structural feedback plus a
/// bounded sample, before any upload is attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "valid" or "invalid"
    pub status: String,

    pub validation: ValidationReport,

    pub preview: ParsedPreview,
}

impl ValidateResponse {
    pub fn new(validation: ValidationReport, preview: ParsedPreview) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: if validation.is_valid { "valid" } else { "invalid" }.to_string(),
            validation,
            preview,
        }
    }
}

/// Response to a proxied upload request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "uploaded", "rejected" (failed validation) or "failed"
    pub status: String,

    pub outcome: UploadOutcome,
}

impl From<UploadOutcome> for IntakeResponse {
    fn from(outcome: UploadOutcome) -> Self {
        let status = if outcome.success {
            "uploaded"
        } else if outcome.tried_formats.is_empty() {
            "rejected"
        } else {
            "failed"
        };

        IntakeResponse {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            outcome,
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DelimiterFormat;

    fn report(valid: bool, tried: Vec<DelimiterFormat>) -> UploadOutcome {
        UploadOutcome {
            success: valid,
            validation: None,
            final_response: None,
            error: (!valid).then(|| "boom".to_string()),
            tried_formats: tried,
        }
    }

    #[test]
    fn test_status_mapping() {
        let uploaded: IntakeResponse = report(true, vec![DelimiterFormat::Comma]).into();
        assert_eq!(uploaded.status, "uploaded");

        let rejected: IntakeResponse = report(false, vec![]).into();
        assert_eq!(rejected.status, "rejected");

        let failed: IntakeResponse =
            report(false, vec![DelimiterFormat::Comma, DelimiterFormat::Pipe]).into();
        assert_eq!(failed.status, "failed");
    }

    #[test]
    fn test_error_response_shape() {
        let body = error_response("No file provided");
        assert_eq!(body["status"], "error");
        assert_eq!(body["error"], "No file provided");
    }
}
