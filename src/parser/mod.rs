//! Delimited-text parsing primitives with encoding and delimiter auto-detection.
//!
//! Everything here is a pure function of its input: the delimiter
//! detector, the quote-aware line splitter and the header parser have no
//! side effects and return the same result on repeated calls.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CsvError, CsvResult};
use crate::models::DelimiterFormat;

/// Byte-order mark as it appears at the start of a decoded string.
const BOM: char = '\u{FEFF}';

/// Upstream exports sometimes prefix every line with its row number
/// ("1|class,subject,...").
static ROW_NUMBER_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\|").expect("valid row-prefix pattern"));

// =============================================================================
// Encoding
// =============================================================================

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode raw bytes to text, auto-detecting the encoding.
///
/// Returns the decoded content and the encoding name used.
pub fn decode_bytes(bytes: &[u8]) -> CsvResult<(String, String)> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = match encoding.as_str() {
        "utf-8" => String::from_utf8(bytes.to_vec())
            .unwrap_or_else(|_| String::from_utf8_lossy(bytes).to_string()),
        "iso-8859-1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        // Fallback: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).to_string(),
    };

    Ok((content, encoding))
}

// =============================================================================
// Line Cleanup
// =============================================================================

/// Strip a leading byte-order mark, if present.
pub fn strip_bom(line: &str) -> &str {
    line.strip_prefix(BOM).unwrap_or(line)
}

/// Strip the upstream "N|" row-number prefix, if present.
pub fn strip_row_number_prefix(line: &str) -> &str {
    match ROW_NUMBER_PREFIX.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}

/// BOM and row-number prefix removal combined.
pub fn clean_line(line: &str) -> &str {
    strip_row_number_prefix(strip_bom(line))
}

// =============================================================================
// Delimiter Detection
// =============================================================================

/// Count occurrences of `target` outside quoted spans.
fn count_unquoted(line: &str, target: char) -> usize {
    let mut count = 0;
    let mut in_quotes = false;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
        } else if ch == target && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Classify content as comma- or pipe-delimited.
///
/// Inspects the first non-empty line and counts both delimiter
/// characters outside quoted spans. Pipe wins only on a strictly
/// greater count. A line with neither delimiter defaults to comma:
/// downstream column validation will still catch a genuinely malformed
/// file via missing-column errors, so the detector never fails.
pub fn detect_format(content: &str) -> DelimiterFormat {
    let first_line = content
        .lines()
        .map(clean_line)
        .find(|l| !l.trim().is_empty())
        .unwrap_or("");

    let pipes = count_unquoted(first_line, '|');
    let commas = count_unquoted(first_line, ',');

    if pipes > commas {
        DelimiterFormat::Pipe
    } else {
        DelimiterFormat::Comma
    }
}

// =============================================================================
// Line Splitting
// =============================================================================

/// Split one line into fields, respecting quotes.
///
/// Delimiters inside a quote pair are part of the field, and `""` is an
/// escaped quote. Fields are trimmed and surrounding quotes removed.
pub fn split_line(line: &str, format: DelimiterFormat) -> Vec<String> {
    let delimiter = format.delimiter();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                // Escaped quote
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if ch == delimiter && !in_quotes {
            fields.push(std::mem::take(&mut current).trim().to_string());
        } else {
            current.push(ch);
        }
    }
    fields.push(current.trim().to_string());

    fields
}

// =============================================================================
// Headers & Rows
// =============================================================================

/// Parse the header row of delimited content.
///
/// Detects the format, cleans the first non-empty line of BOM and
/// row-number prefixes, and splits it quote-aware. Content with no
/// non-empty line yields an empty header list; callers treat that as a
/// validation failure, not a parse panic.
pub fn parse_headers(content: &str) -> (Vec<String>, DelimiterFormat) {
    let format = detect_format(content);

    let header_line = content
        .lines()
        .map(clean_line)
        .find(|l| !l.trim().is_empty());

    let headers = match header_line {
        Some(line) => split_line(line, format),
        None => Vec::new(),
    };

    (headers, format)
}

/// Non-empty data lines after the header, cleaned of BOM/row prefixes.
pub fn data_lines(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(clean_line)
        .filter(|l| !l.trim().is_empty())
        .skip(1)
}

/// Count data rows (non-empty lines after the header).
pub fn count_data_rows(content: &str) -> usize {
    data_lines(content).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_comma() {
        assert_eq!(
            detect_format("class,subject,term\n1,2,3"),
            DelimiterFormat::Comma
        );
    }

    #[test]
    fn test_detect_pipe() {
        assert_eq!(
            detect_format("class|subject|term\n1|2|3"),
            DelimiterFormat::Pipe
        );
    }

    #[test]
    fn test_detect_is_idempotent() {
        let content = "a|b|c\nx|y|z";
        let first = detect_format(content);
        assert_eq!(detect_format(content), first);
        assert_eq!(detect_format(content), first);
    }

    #[test]
    fn test_detect_ignores_quoted_delimiters() {
        // Two pipes are quoted; the real convention is comma.
        let content = "\"a|b\",\"c|d\",e,f\n1,2,3,4";
        assert_eq!(detect_format(content), DelimiterFormat::Comma);
    }

    #[test]
    fn test_detect_ambiguous_defaults_to_comma() {
        assert_eq!(detect_format("singlecolumn"), DelimiterFormat::Comma);
        assert_eq!(detect_format(""), DelimiterFormat::Comma);
    }

    #[test]
    fn test_split_comma_with_quotes() {
        let fields = split_line("\"hello, world\",plain,\"with \"\"quote\"\"\"", DelimiterFormat::Comma);
        assert_eq!(fields, vec!["hello, world", "plain", "with \"quote\""]);
    }

    #[test]
    fn test_split_pipe() {
        let fields = split_line("a | b |c", DelimiterFormat::Pipe);
        assert_eq!(fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_trailing_empty_field() {
        let fields = split_line("a,b,", DelimiterFormat::Comma);
        assert_eq!(fields, vec!["a", "b", ""]);
    }

    #[test]
    fn test_strip_bom() {
        assert_eq!(strip_bom("\u{FEFF}class"), "class");
        assert_eq!(strip_bom("class"), "class");
    }

    #[test]
    fn test_strip_row_number_prefix() {
        assert_eq!(strip_row_number_prefix("1|class,subject"), "class,subject");
        assert_eq!(strip_row_number_prefix("23|a,b"), "a,b");
        assert_eq!(strip_row_number_prefix("class,subject"), "class,subject");
    }

    #[test]
    fn test_parse_headers_bom_and_prefix() {
        let (headers, format) = parse_headers("\u{FEFF}1|class,subject,term\n2|a,b,c");
        assert_eq!(format, DelimiterFormat::Comma);
        assert_eq!(headers, vec!["class", "subject", "term"]);
    }

    #[test]
    fn test_parse_headers_empty_content() {
        let (headers, _) = parse_headers("\n\n  \n");
        assert!(headers.is_empty());
    }

    #[test]
    fn test_count_data_rows() {
        assert_eq!(count_data_rows("h1,h2\na,b\n\nc,d\n"), 2);
        assert_eq!(count_data_rows("h1,h2"), 0);
    }

    #[test]
    fn test_decode_utf8() {
        let (content, encoding) = decode_bytes("class,subject\n".as_bytes()).unwrap();
        assert_eq!(encoding, "utf-8");
        assert!(content.starts_with("class"));
    }

    #[test]
    fn test_decode_latin1() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let (decoded, _) = decode_bytes(bytes).unwrap();
        assert!(decoded.contains("Soci"));
    }

    #[test]
    fn test_decode_empty_is_error() {
        assert!(matches!(decode_bytes(&[]), Err(CsvError::EmptyFile)));
    }
}
