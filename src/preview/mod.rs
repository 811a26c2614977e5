//! Preview builder: header row plus a bounded sample of data rows.
//!
//! Purely advisory, used to render a sample table before the user
//! commits to uploading. Ragged rows are tolerated, never rejected:
//! sample rows are padded or truncated to the header width so a display
//! layer can render them as a rectangular table, while
//! `total_row_count` still reports the true number of data rows.

use crate::error::CsvResult;
use crate::models::{ParsedPreview, RawFile};
use crate::parser;

/// Default number of sample rows in a preview.
pub const DEFAULT_SAMPLE_ROWS: usize = 10;

/// Build a preview from decoded text content.
pub fn build_preview(content: &str, max_sample_rows: usize) -> ParsedPreview {
    let (headers, format) = parser::parse_headers(content);
    let width = headers.len();

    let mut total_row_count = 0;
    let mut sample_rows = Vec::new();

    for line in parser::data_lines(content) {
        total_row_count += 1;
        if sample_rows.len() >= max_sample_rows {
            continue;
        }

        let mut cells = parser::split_line(line, format);
        // Reshape for display only; the underlying content is untouched.
        cells.truncate(width.max(1));
        while cells.len() < width {
            cells.push(String::new());
        }
        sample_rows.push(cells);
    }

    ParsedPreview {
        headers,
        sample_rows,
        total_row_count,
        format,
    }
}

/// Build a preview straight from a user-supplied file.
pub fn preview_file(file: &RawFile, max_sample_rows: usize) -> CsvResult<ParsedPreview> {
    let (content, _encoding) = parser::decode_bytes(&file.bytes)?;
    Ok(build_preview(&content, max_sample_rows))
}
