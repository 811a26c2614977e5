//! # courseload - CSV intake validation and multi-format upload
//!
//! courseload takes user-supplied delimited lesson-content files,
//! determines their delimiter convention, validates them against the
//! platform's required-column contracts, and uploads them with an
//! automatic one-shot fallback to the alternate delimiter format.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│  Uploader   │
//! │ (comma/pipe)│     │ (auto-detect)│    │ (contracts) │     │ (+fallback) │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courseload::{RawFile, UploadKind, Uploader};
//!
//! #[tokio::main]
//! async fn main() {
//!     let uploader = Uploader::from_env().unwrap();
//!     let file = RawFile::new("lessons.csv", std::fs::read("lessons.csv").unwrap());
//!     let outcome = uploader.upload(UploadKind::Lessons, &file).await;
//!     println!("success: {} (tried {:?})", outcome.success, outcome.tried_formats);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (UploadKind, DelimiterFormat, UploadOutcome)
//! - [`parser`] - Delimiter/encoding detection and quote-aware splitting
//! - [`validation`] - Required-column contract validation
//! - [`normalize`] - Delimiter convention rewriting
//! - [`preview`] - Bounded sample extraction for display
//! - [`upload`] - Upload orchestration with single-fallback retry
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP intake server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Normalization
pub mod normalize;

// Preview
pub mod preview;

// Upload
pub mod upload;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, IntakeError, IntakeResult, ServerError, UploadError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    DelimiterFormat, ParsedPreview, RawFile, UploadAttempt, UploadKind, UploadOutcome,
    ValidationReport,
};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{decode_bytes, detect_encoding, detect_format, parse_headers, split_line};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{missing_columns, validate_content, validate_headers};

// =============================================================================
// Re-exports - Normalization
// =============================================================================

pub use normalize::{normalize, normalized_file_name, to_numbered_format};

// =============================================================================
// Re-exports - Preview
// =============================================================================

pub use preview::{build_preview, preview_file, DEFAULT_SAMPLE_ROWS};

// =============================================================================
// Re-exports - Upload
// =============================================================================

pub use upload::{
    ApiErrors, ApiResponse, FieldErrors, HttpTransport, TransportResponse, UploadTransport,
    Uploader,
};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::IntakeConfig;

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
