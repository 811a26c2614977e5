//! Upload orchestration: validate, attempt, fall back once.
//!
//! The orchestrator is a small state machine:
//!
//! ```text
//! Idle -> Validating -> ValidationFailed          (terminal, no network)
//!                    -> AttemptingPrimary  -> Success       (terminal)
//!                                          -> AttemptingFallback -> Success (terminal)
//!                                                                -> Failed  (terminal)
//! ```
//!
//! The primary attempt sends the file in its detected delimiter format;
//! if that attempt fails for any reason (transport or logical), the
//! content is normalized once to the alternate format and retried
//! against the same endpoint. There is no further retry: comma and pipe
//! are the only two legitimate encodings in this domain, so exhausting
//! both covers the realistic failure space without unbounded retries
//! against a possibly-broken endpoint.
//!
//! Attempts are strictly sequential; parallel dual-format submission
//! would risk duplicate server-side ingestion. The orchestrator holds
//! no mutable state between invocations: everything it learns is
//! returned in the [`UploadOutcome`].

pub mod response;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::config::IntakeConfig;
use crate::error::{UploadError, UploadResult};
use crate::models::{DelimiterFormat, RawFile, UploadAttempt, UploadKind, UploadOutcome};
use crate::normalize;
use crate::parser;
use crate::validation;

pub use response::{ApiErrors, ApiResponse, FieldErrors};

// =============================================================================
// Transport
// =============================================================================

/// Raw result of one HTTP attempt: status plus unparsed body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_http_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Outbound transport for one multipart file upload.
///
/// The production implementation is [`HttpTransport`]; tests substitute
/// recording doubles to observe the orchestrator's sequencing.
pub trait UploadTransport {
    fn send(
        &self,
        endpoint: &str,
        field_name: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = UploadResult<TransportResponse>> + Send;
}

/// reqwest-backed transport: one multipart form with a single file
/// field, `Accept: application/json`.
///
/// No timeout is enforced here; timeout policy belongs to the caller.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UploadTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        field_name: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> UploadResult<TransportResponse> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| UploadError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part(field_name.to_string(), part);

        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

// =============================================================================
// Uploader
// =============================================================================

/// Validated multi-format uploader for one platform API.
///
/// Each [`Uploader::upload`] invocation is independent and shares no
/// mutable state with concurrent invocations.
#[derive(Debug, Clone)]
pub struct Uploader<T> {
    config: IntakeConfig,
    transport: T,
}

impl Uploader<HttpTransport> {
    /// Uploader against the API base URL from the environment.
    pub fn from_env() -> crate::error::ConfigResult<Self> {
        Ok(Self::new(IntakeConfig::from_env()?, HttpTransport::new()))
    }

    /// HTTP uploader against an explicit base URL.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self::new(IntakeConfig::new(api_url), HttpTransport::new())
    }
}

impl<T: UploadTransport> Uploader<T> {
    pub fn new(config: IntakeConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &IntakeConfig {
        &self.config
    }

    /// Validate and upload one file for the given content kind.
    ///
    /// Never issues a network request for a file that fails column
    /// validation. On any primary-attempt failure, makes exactly one
    /// fallback attempt in the alternate delimiter format. Returns a
    /// terminal [`UploadOutcome`] with every attempted format recorded
    /// in order.
    pub async fn upload(&self, kind: UploadKind, file: &RawFile) -> UploadOutcome {
        log_info(format!("Validating {} file: {}", kind, file.name));

        // Validating
        let (content, encoding) = match parser::decode_bytes(&file.bytes) {
            Ok(decoded) => decoded,
            Err(e) => {
                return UploadOutcome {
                    success: false,
                    validation: None,
                    final_response: None,
                    error: Some(format!("Error reading file: {}", e)),
                    tried_formats: Vec::new(),
                };
            }
        };
        log_info(format!("Detected encoding: {}", encoding));

        let validation = validation::validate_content(&content, kind);
        if !validation.is_valid {
            log_warning(format!(
                "Validation failed: {}",
                validation.errors.join(", ")
            ));
            return UploadOutcome::rejected(validation);
        }
        log_success(format!(
            "Headers valid ({} data rows, {} format)",
            validation.row_count, validation.format
        ));

        let endpoint = self.config.endpoint(kind.endpoint_path());
        let mut tried_formats = Vec::new();

        // AttemptingPrimary: the file in its detected format, as authored.
        let primary = self
            .attempt(&endpoint, kind, &file.name, file.bytes.clone(), validation.format)
            .await;
        tried_formats.push(validation.format);

        if primary.success {
            log_success(format!("Upload succeeded ({} format)", validation.format));
            return UploadOutcome {
                success: true,
                validation: Some(validation),
                final_response: primary.response,
                error: None,
                tried_formats,
            };
        }

        // AttemptingFallback: same endpoint, alternate delimiter, once.
        // Transport and logical failures are treated alike here; both
        // mean "this attempt did not succeed".
        let alternate = validation.format.alternate();
        log_warning(format!(
            "Upload failed with {} format ({}), retrying as {}",
            validation.format,
            primary.error.as_deref().unwrap_or("no detail"),
            alternate
        ));

        let normalized = normalize::normalize(&content, alternate);
        let fallback_name = normalize::normalized_file_name(&file.name, alternate);
        let fallback = self
            .attempt(
                &endpoint,
                kind,
                &fallback_name,
                normalized.into_bytes(),
                alternate,
            )
            .await;
        tried_formats.push(alternate);

        if fallback.success {
            log_success(format!("Upload succeeded after {} fallback", alternate));
        } else {
            log_warning("Upload failed in both formats");
        }

        UploadOutcome {
            success: fallback.success,
            validation: Some(validation),
            final_response: fallback.response,
            error: if fallback.success { None } else { fallback.error },
            tried_formats,
        }
    }

    /// One network attempt. Failure is data, not an `Err`: the caller
    /// decides whether a fallback follows.
    async fn attempt(
        &self,
        endpoint: &str,
        kind: UploadKind,
        file_name: &str,
        bytes: Vec<u8>,
        format: DelimiterFormat,
    ) -> UploadAttempt {
        match self
            .transport
            .send(endpoint, kind.field_name(), file_name, bytes)
            .await
        {
            Ok(response) => {
                let api = ApiResponse::from_body(&response.body);
                // Some upstreams answer 200 with success=false for
                // logical failures; both paths count as failed here.
                let success = response.is_http_success() && !api.is_logical_failure();
                UploadAttempt {
                    format,
                    success,
                    error: (!success).then(|| api.error_message()),
                    response: Some(api.to_value()),
                }
            }
            Err(e) => UploadAttempt {
                format,
                success: false,
                response: None,
                error: Some(e.to_string()),
            },
        }
    }
}
