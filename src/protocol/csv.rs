//! Quote-aware CSV record splitting for the protocol source.
//!
//! Protocol answers are free text written by clinical staff, so quoted
//! fields routinely contain commas, doubled quotes, and line breaks.

use super::ProtocolError;

/// Split CSV text into records of fields.
///
/// Handles quoted fields (commas, `""` escapes, and newlines inside quotes),
/// CRLF line endings, and a leading UTF-8 BOM. Blank lines are skipped.
/// Each returned record carries the 1-based line number it started on.
pub fn parse_records(text: &str) -> Result<Vec<(usize, Vec<String>)>, ProtocolError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut record_start = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, record_start, std::mem::take(&mut fields));
                line += 1;
                record_start = line;
            }
            '\n' => {
                current.push('\n');
                line += 1;
            }
            _ => current.push(ch),
        }
    }

    if in_quotes {
        return Err(ProtocolError::MalformedRow {
            row: record_start,
            reason: "unterminated quoted field".into(),
        });
    }

    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut records, record_start, fields);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push((line, fields));
    }
}
