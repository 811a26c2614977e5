//! Domain models for the courseload intake pipeline.
//!
//! This module contains the core data structures used throughout the pipeline:
//!
//! - [`DelimiterFormat`] - The two delimiter conventions accepted by the platform
//! - [`UploadKind`] - The seven content categories and their column contracts
//! - [`RawFile`] - A user-supplied file as immutable bytes plus metadata
//! - [`ValidationReport`] - Result of checking headers against a contract
//! - [`ParsedPreview`] - Bounded sample of a file for display
//! - [`UploadOutcome`] - Terminal result of one upload invocation

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Delimiter Format
// =============================================================================

/// Delimiter convention of a line-oriented text table.
///
/// The platform accepts exactly two conventions: spreadsheet-exported
/// comma CSV and internally-authored pipe-delimited text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterFormat {
    Comma,
    Pipe,
}

impl DelimiterFormat {
    /// The delimiter character for this format.
    pub fn delimiter(&self) -> char {
        match self {
            DelimiterFormat::Comma => ',',
            DelimiterFormat::Pipe => '|',
        }
    }

    /// The other supported format.
    ///
    /// Used by the upload fallback: comma and pipe are the only two
    /// legitimate encodings in this domain, so "the alternate" is
    /// always well-defined.
    pub fn alternate(&self) -> DelimiterFormat {
        match self {
            DelimiterFormat::Comma => DelimiterFormat::Pipe,
            DelimiterFormat::Pipe => DelimiterFormat::Comma,
        }
    }
}

impl std::fmt::Display for DelimiterFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelimiterFormat::Comma => write!(f, "comma"),
            DelimiterFormat::Pipe => write!(f, "pipe"),
        }
    }
}

// =============================================================================
// Upload Kind
// =============================================================================

/// One of the seven content categories the platform ingests.
///
/// Each kind has its own upload endpoint, multipart form-field name and
/// required-column contract. The contracts are static configuration and
/// never mutated at runtime.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    Lessons,
    Concepts,
    Examples,
    Exercises,
    GeneralExercises,
    CheckMarkers,
    SchemeOfWork,
}

impl UploadKind {
    /// All kinds, in upload dependency order.
    pub const ALL: [UploadKind; 7] = [
        UploadKind::Lessons,
        UploadKind::Concepts,
        UploadKind::Examples,
        UploadKind::Exercises,
        UploadKind::GeneralExercises,
        UploadKind::CheckMarkers,
        UploadKind::SchemeOfWork,
    ];

    /// Required header names for this kind, in error-listing order.
    ///
    /// Missing columns are always reported in this order, not in file
    /// order, so repeated validation runs produce a stable error list.
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Lessons => &[
                "class",
                "subject",
                "term",
                "week",
                "topic",
                "overview",
                "objectives",
                "key_concepts",
                "summary",
                "application",
            ],
            UploadKind::Concepts => &["lesson", "title", "description", "order_index"],
            UploadKind::Examples => &[
                "concept",
                "title",
                "problem",
                "solution_steps",
                "answer",
                "order_index",
            ],
            UploadKind::Exercises => &[
                "concept",
                "title",
                "problem",
                "solution_steps",
                "answers",
                "correct_answer",
                "order_index",
            ],
            UploadKind::GeneralExercises => &[
                "lesson",
                "problem",
                "solution_steps",
                "answers",
                "correct_answer",
                "order_index",
            ],
            UploadKind::CheckMarkers => &[
                "lesson",
                "overview",
                "lesson_video",
                "concept_one",
                "concept_two",
                "concept_three",
                "concept_four",
                "concept_five",
                "concept_six",
                "concept_seven",
                "general_exercises",
            ],
            UploadKind::SchemeOfWork => &["subject", "class", "term", "week", "topic", "breakdown"],
        }
    }

    /// Multipart form-field name the endpoint expects the file under.
    pub fn field_name(&self) -> &'static str {
        match self {
            UploadKind::Lessons => "lessons_file",
            UploadKind::Concepts => "concepts_file",
            UploadKind::Examples => "examples_file",
            UploadKind::Exercises => "exercises_file",
            UploadKind::GeneralExercises => "general_exercises_file",
            UploadKind::CheckMarkers => "check_markers_file",
            UploadKind::SchemeOfWork => "scheme_of_work_file",
        }
    }

    /// Upload endpoint path, relative to the platform API base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            UploadKind::Lessons => "/api/uploads/lessons",
            UploadKind::Concepts => "/api/uploads/concepts",
            UploadKind::Examples => "/api/uploads/examples",
            UploadKind::Exercises => "/api/uploads/exercises",
            UploadKind::GeneralExercises => "/api/uploads/general-exercises",
            UploadKind::CheckMarkers => "/api/uploads/check-markers",
            UploadKind::SchemeOfWork => "/api/uploads/scheme-of-work",
        }
    }

    /// Stable snake_case name (matches CLI arguments and route segments).
    pub fn name(&self) -> &'static str {
        match self {
            UploadKind::Lessons => "lessons",
            UploadKind::Concepts => "concepts",
            UploadKind::Examples => "examples",
            UploadKind::Exercises => "exercises",
            UploadKind::GeneralExercises => "general_exercises",
            UploadKind::CheckMarkers => "check_markers",
            UploadKind::SchemeOfWork => "scheme_of_work",
        }
    }
}

impl std::fmt::Display for UploadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for UploadKind {
    type Err = String;

    /// Accepts both snake_case and dashed names (`general_exercises`,
    /// `general-exercises`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "lessons" => Ok(UploadKind::Lessons),
            "concepts" => Ok(UploadKind::Concepts),
            "examples" => Ok(UploadKind::Examples),
            "exercises" => Ok(UploadKind::Exercises),
            "general_exercises" => Ok(UploadKind::GeneralExercises),
            "check_markers" => Ok(UploadKind::CheckMarkers),
            "scheme_of_work" => Ok(UploadKind::SchemeOfWork),
            other => Err(format!(
                "Unknown upload kind '{}'. Expected one of: {}",
                other,
                UploadKind::ALL
                    .iter()
                    .map(|k| k.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

// =============================================================================
// Raw File
// =============================================================================

/// A user-supplied file: immutable bytes plus filename and declared media type.
///
/// Created once from a file selection or CLI path, read-only afterwards,
/// discarded when the upload invocation completes.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: "text/csv".to_string(),
            bytes,
        }
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = media_type.into();
        self
    }

    /// Read a file from disk, keeping its on-disk name.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        Ok(Self::new(name, bytes))
    }
}

// =============================================================================
// Validation Report
// =============================================================================

/// Result of checking a file's headers against a required-column contract.
///
/// Missing columns are reported as data, not as a Rust error: a file
/// with missing columns is a normal, recoverable user mistake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationReport {
    /// True iff every required column is present (case-insensitive).
    pub is_valid: bool,
    /// Human-readable errors, stable across repeated runs.
    pub errors: Vec<String>,
    /// Missing column names, in contract order.
    pub missing_columns: Vec<String>,
    /// Detected delimiter convention.
    pub format: DelimiterFormat,
    /// Headers as parsed from the first line.
    pub headers: Vec<String>,
    /// Number of data rows (excluding the header line).
    pub row_count: usize,
}

// =============================================================================
// Parsed Preview
// =============================================================================

/// Header row plus a bounded sample of data rows, for display.
///
/// Purely advisory: built before the user commits to uploading, never
/// used to gate the upload itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedPreview {
    pub headers: Vec<String>,
    /// At most the requested sample cap; each row padded or truncated
    /// to the header width for rendering.
    pub sample_rows: Vec<Vec<String>>,
    /// True data-row count, independent of the sample cap.
    pub total_row_count: usize,
    pub format: DelimiterFormat,
}

// =============================================================================
// Upload Attempt & Outcome
// =============================================================================

/// One network attempt during an upload invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAttempt {
    /// Format the content was sent in.
    pub format: DelimiterFormat,
    pub success: bool,
    /// Parsed response body, when the server answered at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal result of one upload invocation.
///
/// Aggregates the validation step and every attempt made, so a failed
/// upload can be explained to the user: which formats were tried, in
/// what order, and what the server finally said.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationReport>,
    /// Body of the last response received, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_response: Option<Value>,
    /// Terminal error message, when the upload did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every format actually attempted, in attempt order.
    pub tried_formats: Vec<DelimiterFormat>,
}

impl UploadOutcome {
    /// Outcome for a file that failed column validation. No network
    /// attempt was made and none may be.
    pub fn rejected(validation: ValidationReport) -> Self {
        let error = if validation.errors.is_empty() {
            "File validation failed".to_string()
        } else {
            format!("File validation failed: {}", validation.errors.join(", "))
        };
        Self {
            success: false,
            validation: Some(validation),
            final_response: None,
            error: Some(error),
            tried_formats: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_alternate_format() {
        assert_eq!(DelimiterFormat::Comma.alternate(), DelimiterFormat::Pipe);
        assert_eq!(DelimiterFormat::Pipe.alternate(), DelimiterFormat::Comma);
        assert_eq!(DelimiterFormat::Comma.delimiter(), ',');
        assert_eq!(DelimiterFormat::Pipe.delimiter(), '|');
    }

    #[test]
    fn test_lessons_contract() {
        let cols = UploadKind::Lessons.required_columns();
        assert_eq!(cols.len(), 10);
        assert_eq!(cols[0], "class");
        assert_eq!(cols[9], "application");
    }

    #[test]
    fn test_check_markers_contract() {
        let cols = UploadKind::CheckMarkers.required_columns();
        assert_eq!(cols.len(), 11);
        assert!(cols.contains(&"concept_seven"));
    }

    #[test]
    fn test_field_names() {
        assert_eq!(UploadKind::Lessons.field_name(), "lessons_file");
        assert_eq!(
            UploadKind::GeneralExercises.field_name(),
            "general_exercises_file"
        );
    }

    #[test]
    fn test_endpoint_paths_dashed() {
        assert_eq!(
            UploadKind::SchemeOfWork.endpoint_path(),
            "/api/uploads/scheme-of-work"
        );
        assert_eq!(
            UploadKind::CheckMarkers.endpoint_path(),
            "/api/uploads/check-markers"
        );
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!(
            UploadKind::from_str("check-markers").unwrap(),
            UploadKind::CheckMarkers
        );
        assert_eq!(
            UploadKind::from_str("GENERAL_EXERCISES").unwrap(),
            UploadKind::GeneralExercises
        );
        assert!(UploadKind::from_str("homework").is_err());
    }

    #[test]
    fn test_rejected_outcome_has_no_attempts() {
        let report = ValidationReport {
            is_valid: false,
            errors: vec!["Missing required column: class".to_string()],
            missing_columns: vec!["class".to_string()],
            format: DelimiterFormat::Comma,
            headers: vec!["subject".to_string()],
            row_count: 3,
        };
        let outcome = UploadOutcome::rejected(report);
        assert!(!outcome.success);
        assert!(outcome.tried_formats.is_empty());
        assert!(outcome.error.unwrap().contains("Missing required column"));
    }

    #[test]
    fn test_format_serde_lowercase() {
        let json = serde_json::to_string(&DelimiterFormat::Pipe).unwrap();
        assert_eq!(json, "\"pipe\"");
    }

    #[test]
    fn test_raw_file_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("week1.csv");
        std::fs::write(&path, "class,subject\nJS1,Math\n").unwrap();

        let file = RawFile::from_path(&path).unwrap();
        assert_eq!(file.name, "week1.csv");
        assert_eq!(file.media_type, "text/csv");
        assert!(file.bytes.starts_with(b"class"));
    }
}
