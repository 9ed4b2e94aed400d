//! Delimited records

use super::ImportError;

/// Minimum number of non-empty lines: a header and at least one data row.
pub const MIN_LINES: usize = 2;

/// Split decoded text into rows of trimmed fields.
///
/// Blank lines are skipped. A double quote toggles quoting and is dropped; commas inside
/// quotes are kept as content. There is no escaped-quote handling, so `""` simply toggles
/// twice.
///
/// # Errors
///
/// Returns [`ImportError::Format`] if fewer than two non-empty lines remain.
pub fn parse_records(text: &str) -> Result<Vec<Vec<String>>, ImportError> {
    let rows: Vec<Vec<String>> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect();

    if rows.len() < MIN_LINES {
        return Err(ImportError::Format { lines: rows.len() });
    }

    Ok(rows)
}

/// Split one line into trimmed fields.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }

    fields.push(current.trim().to_string());

    fields
}
