//! Error types for the courseload intake pipeline.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`CsvError`] - decoding and parsing failures
//! - [`ConfigError`] - missing or malformed configuration
//! - [`UploadError`] - transport-level upload failures
//! - [`ServerError`] - intake server errors
//! - [`IntakeError`] - top-level wrapper
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Note that a file failing column validation is NOT represented here:
//! missing columns are reported as data inside
//! [`crate::models::ValidationReport`], since they are a normal user
//! mistake, not a fault in the pipeline.

use thiserror::Error;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while decoding or parsing a delimited file.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// File has no content at all.
    #[error("File is empty")]
    EmptyFile,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors when loading intake configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable not set.
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    /// Value present but unusable.
    #[error("Invalid configuration value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

// =============================================================================
// Upload Errors
// =============================================================================

/// Errors during an upload attempt.
///
/// Only failures to reach the server or to build the request live
/// here. A server that responds with a rejection is NOT an `Err`: the
/// orchestrator records rejections as attempt data, since both kinds of
/// failure trigger the same alternate-format retry.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Network-level failure: timeout, DNS, connection reset.
    #[error("Network error: {0}")]
    Transport(String),

    /// Request could not be built or response could not be read.
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Intake Server Errors
// =============================================================================

/// HTTP intake server errors.
///
/// Converted into HTTP responses by the `IntoResponse` impl in
/// [`crate::api::server`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// CSV error while handling an uploaded file.
    #[error("Error reading file: {0}")]
    Csv(#[from] CsvError),

    /// Invalid request.
    #[error("{0}")]
    BadRequest(String),
}

// =============================================================================
// Top-level Errors
// =============================================================================

/// Top-level intake errors.
///
/// Main error type returned by the CLI entry points; wraps all
/// lower-level errors.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// CSV decoding/parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Upload error.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Intake server error.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error outside of CSV decoding.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Result type for top-level operations.
pub type IntakeResult<T> = Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // CsvError -> IntakeError
        let csv_err = CsvError::EmptyFile;
        let intake_err: IntakeError = csv_err.into();
        assert!(intake_err.to_string().contains("empty"));

        // UploadError -> IntakeError
        let upload_err = UploadError::Transport("connection reset".into());
        let intake_err: IntakeError = upload_err.into();
        assert!(intake_err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_transport_message() {
        let transport = UploadError::Transport("timeout".into());
        assert!(transport.to_string().starts_with("Network error"));
    }

    #[test]
    fn test_server_error_wraps_csv() {
        let err: ServerError = CsvError::EmptyFile.into();
        assert_eq!(err.to_string(), "Error reading file: File is empty");
    }
}
