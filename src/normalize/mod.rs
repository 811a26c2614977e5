//! Content normalization between delimiter conventions.
//!
//! The upstream API historically accepted only one delimiter convention
//! per endpoint, yet users author files in either convention
//! (spreadsheet-exported commas vs. internally-authored pipes).
//! Normalization reconciles the two without forcing the user to
//! re-author their file: every un-quoted delimiter of the other
//! convention is rewritten to the target delimiter, and quoted
//! substrings survive untouched.

use crate::models::DelimiterFormat;
use crate::parser::{self, clean_line};

/// Quote a field for the target convention if it needs it.
///
/// Fields containing the target delimiter, quotes or newlines are
/// wrapped in quotes with `""` escaping, matching what spreadsheet
/// tools emit. A field holding the other convention's delimiter needs
/// no quoting: it is plain data in the target format.
fn quote_field(field: &str, target: DelimiterFormat) -> String {
    if field.contains(target.delimiter()) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Rewrite content into the target delimiter convention.
///
/// Each line is split with quote-state tracking (never a naive global
/// replace: a quoted field holding both delimiter characters must
/// survive unchanged) and re-joined with the target delimiter. BOM and
/// row-number prefixes are removed along the way. Content already in
/// the target format is still cleaned line-wise but otherwise kept.
pub fn normalize(content: &str, target: DelimiterFormat) -> String {
    let source = parser::detect_format(content);

    let mut out = Vec::new();
    for line in content.lines() {
        let line = clean_line(line);
        if line.trim().is_empty() {
            continue;
        }

        if source == target {
            out.push(line.to_string());
            continue;
        }

        let fields = parser::split_line(line, source);
        let rendered = fields
            .iter()
            .map(|f| quote_field(f, target))
            .collect::<Vec<_>>()
            .join(&target.delimiter().to_string());
        out.push(rendered);
    }

    out.join("\n")
}

/// Filename for a normalized copy of a file: `report.csv` with a pipe
/// target becomes `report_pipe.csv`.
pub fn normalized_file_name(original: &str, target: DelimiterFormat) -> String {
    match original.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, target, ext),
        None => format!("{}_{}", original, target),
    }
}

/// Convert content to the upstream API's numbered-row representation.
///
/// The API's own exports number every line ("1|h1,h2", "2|v1,v2") with
/// a BOM on the header line. Content already numbered is returned
/// unchanged; empty lines are dropped.
pub fn to_numbered_format(content: &str) -> String {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty()).peekable();

    // Already numbered?
    if let Some(first) = lines.peek() {
        if parser::strip_row_number_prefix(parser::strip_bom(first)).len()
            != parser::strip_bom(first).len()
        {
            return content.to_string();
        }
    }

    let mut out = Vec::new();
    for (idx, line) in lines.enumerate() {
        let row_number = idx + 1;
        if idx == 0 && !line.starts_with('\u{FEFF}') {
            out.push(format!("{}|\u{FEFF}{}", row_number, line));
        } else {
            out.push(format!("{}|{}", row_number, line));
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::split_line;

    #[test]
    fn test_comma_to_pipe() {
        let out = normalize("a,b,c\n1,2,3", DelimiterFormat::Pipe);
        assert_eq!(out, "a|b|c\n1|2|3");
    }

    #[test]
    fn test_pipe_to_comma() {
        let out = normalize("a|b|c\n1|2|3", DelimiterFormat::Comma);
        assert_eq!(out, "a,b,c\n1,2,3");
    }

    #[test]
    fn test_quoted_comma_survives_conversion() {
        // The embedded comma is data, not a delimiter.
        let out = normalize("title,note\n\"Sets, part one\",fine", DelimiterFormat::Pipe);
        assert_eq!(out, "title|note\nSets, part one|fine");
    }

    #[test]
    fn test_quoted_pipe_requoted_in_pipe_output() {
        // A field holding both delimiter characters stays one cell
        // after conversion: the pipe output must re-quote it.
        let out = normalize("title,note\n\"a|b,c\",x", DelimiterFormat::Pipe);
        assert_eq!(out, "title|note\n\"a|b,c\"|x");
        assert_eq!(
            split_line("\"a|b,c\"|x", DelimiterFormat::Pipe),
            vec!["a|b,c", "x"]
        );
    }

    #[test]
    fn test_round_trip_preserves_cells() {
        let original = "title,note\n\"Sets, part one\",\"say \"\"hi\"\"\"";
        let piped = normalize(original, DelimiterFormat::Pipe);
        let back = normalize(&piped, DelimiterFormat::Comma);

        // Logical equivalence: same cell values after the round trip.
        for (a, b) in original.lines().zip(back.lines()) {
            assert_eq!(
                split_line(a, DelimiterFormat::Comma),
                split_line(b, DelimiterFormat::Comma)
            );
        }
    }

    #[test]
    fn test_comma_output_requotes() {
        let out = normalize("a|b\nhello, world|x", DelimiterFormat::Comma);
        assert_eq!(out, "a,b\n\"hello, world\",x");
    }

    #[test]
    fn test_same_format_cleans_prefixes() {
        let out = normalize("\u{FEFF}1|a,b\n2|c,d", DelimiterFormat::Comma);
        assert_eq!(out, "a,b\nc,d");
    }

    #[test]
    fn test_normalized_file_name() {
        assert_eq!(
            normalized_file_name("report.csv", DelimiterFormat::Pipe),
            "report_pipe.csv"
        );
        assert_eq!(
            normalized_file_name("data", DelimiterFormat::Comma),
            "data_comma"
        );
    }

    #[test]
    fn test_to_numbered_format() {
        let out = to_numbered_format("a,b\n1,2");
        assert_eq!(out, "1|\u{FEFF}a,b\n2|1,2");
    }

    #[test]
    fn test_to_numbered_format_idempotent() {
        let numbered = "1|a,b\n2|1,2";
        assert_eq!(to_numbered_format(numbered), numbered);
    }
}
