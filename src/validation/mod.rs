//! Column validation against required-column contracts.
//!
//! A file is valid for a given [`UploadKind`] iff every column in the
//! kind's contract appears in its header row. Comparison is
//! case-insensitive and whitespace-trimmed, and a leading byte-order
//! mark on the first header is ignored (a real-world failure mode:
//! spreadsheet exports prepend a BOM that otherwise glues itself to the
//! first header token).
//!
//! Missing columns are a reported-error path, not a fatal one: the
//! result is always a [`ValidationReport`], never an `Err`.

use crate::models::{DelimiterFormat, UploadKind, ValidationReport};
use crate::parser;

/// Compare headers against a required-column list.
///
/// Returns the missing column names in the order the contract declares
/// them (not in file order), so the user sees the same deterministic
/// error list on every run.
pub fn missing_columns(headers: &[String], required: &[&str]) -> Vec<String> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| parser::strip_bom(h).trim().to_lowercase())
        .collect();

    required
        .iter()
        .filter(|r| !normalized.contains(&r.trim().to_lowercase()))
        .map(|r| r.to_string())
        .collect()
}

/// Validate parsed headers against a kind's contract.
pub fn validate_headers(
    headers: Vec<String>,
    format: DelimiterFormat,
    kind: UploadKind,
    row_count: usize,
) -> ValidationReport {
    // A header-less file gets one explicit error, not one per contract column.
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return ValidationReport {
            is_valid: false,
            errors: vec!["File is empty or has no header row".to_string()],
            missing_columns: Vec::new(),
            format,
            headers,
            row_count,
        };
    }

    let missing = missing_columns(&headers, kind.required_columns());
    let errors: Vec<String> = missing
        .iter()
        .map(|c| format!("Missing required column: {}", c))
        .collect();

    ValidationReport {
        is_valid: missing.is_empty(),
        errors,
        missing_columns: missing,
        format,
        headers,
        row_count,
    }
}

/// Validate raw text content for an upload kind.
///
/// Detects the delimiter convention, parses the header row and checks
/// it against the kind's contract. Read-only and side-effect-free.
pub fn validate_content(content: &str, kind: UploadKind) -> ValidationReport {
    let (headers, format) = parser::parse_headers(content);
    let row_count = parser::count_data_rows(content);
    validate_headers(headers, format, kind, row_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_valid_pipe_lessons_file() {
        let content = "class|subject|term|week|topic|overview|objectives|key_concepts|summary|application\nJS1|Math|1|1|Sets|o|obj|kc|s|a";
        let report = validate_content(content, UploadKind::Lessons);
        assert_eq!(report.format, DelimiterFormat::Pipe);
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert_eq!(report.row_count, 1);
    }

    #[test]
    fn test_missing_columns_in_contract_order() {
        // Only 3 of the 10 lessons columns present: exactly 7 errors,
        // each naming one column, in the contract's declared order.
        let report = validate_content("class,subject,term\na,b,c", UploadKind::Lessons);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 7);
        assert_eq!(
            report.missing_columns,
            vec![
                "week",
                "topic",
                "overview",
                "objectives",
                "key_concepts",
                "summary",
                "application"
            ]
        );
        assert_eq!(report.errors[0], "Missing required column: week");
    }

    #[test]
    fn test_case_and_whitespace_tolerance() {
        let missing = missing_columns(
            &headers(&[" Class ", "SUBJECT", "Term"]),
            &["class", "subject", "term"],
        );
        assert!(missing.is_empty());
    }

    #[test]
    fn test_bom_on_first_header() {
        let report = validate_content(
            "\u{FEFF}class,subject,term,week,topic,breakdown\nJS1,Math,1,1,Sets,intro",
            UploadKind::SchemeOfWork,
        );
        assert!(report.is_valid, "BOM must not poison the first header");
    }

    #[test]
    fn test_empty_file_single_error() {
        let report = validate_content("", UploadKind::Lessons);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("empty"));
        assert!(report.missing_columns.is_empty());
    }

    #[test]
    fn test_validator_is_deterministic() {
        let content = "class,term\na,b";
        let first = validate_content(content, UploadKind::Lessons);
        for _ in 0..3 {
            assert_eq!(validate_content(content, UploadKind::Lessons), first);
        }
    }

    #[test]
    fn test_extra_columns_are_fine() {
        let report = validate_content(
            "lesson,title,description,order_index,notes,extra\nx,y,z,1,n,e",
            UploadKind::Concepts,
        );
        assert!(report.is_valid);
    }

    #[test]
    fn test_ragged_rows_do_not_gate_validity() {
        // Row shape is a preview concern; header presence is the only gate.
        let report = validate_content(
            "lesson,title,description,order_index\nonly,two\nway,too,many,fields,here,now",
            UploadKind::Concepts,
        );
        assert!(report.is_valid);
        assert_eq!(report.row_count, 2);
    }
}
