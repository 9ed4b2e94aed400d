//! CSV Import
//!
//! Turns a loosely structured spreadsheet export into products:
//!
//! 1. [`decode::decode_text`] resolves the encoding (UTF-8, else GBK).
//! 2. [`records::parse_records`] splits lines and fields.
//! 3. [`fields::FieldMapping`] finds which column holds which attribute.
//! 4. [`normalize::normalize_rows`] builds typed products with defaults.
//!
//! Only a missing header or data row fails an import. Unknown columns, unreadable prices
//! and odd encodings all degrade to defaults.

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info};

use crate::products::Product;

pub mod decode;
pub mod fields;
pub mod normalize;
pub mod records;

use self::{
    decode::decode_text,
    fields::{FieldMapping, HeaderKeywords},
    normalize::normalize_rows,
    records::parse_records,
};

/// Errors that abort an import.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// The input needs a header row and at least one data row.
    #[error("expected a header and at least one data row, found {lines} non-empty line(s)")]
    Format {
        /// Number of non-empty lines found
        lines: usize,
    },
}

/// Import products from CSV bytes using the default header keywords.
///
/// # Errors
///
/// Returns [`ImportError::Format`] if the input has fewer than two non-empty lines.
pub fn import_csv(bytes: &[u8]) -> Result<Vec<Product>, ImportError> {
    let stamp = Utc::now().timestamp_millis().to_string();

    import_csv_with(bytes, &HeaderKeywords::default(), &stamp)
}

/// Import products from CSV bytes with a custom keyword table and id stamp.
///
/// # Errors
///
/// Returns [`ImportError::Format`] if the input has fewer than two non-empty lines.
pub fn import_csv_with(
    bytes: &[u8],
    keywords: &HeaderKeywords,
    batch_stamp: &str,
) -> Result<Vec<Product>, ImportError> {
    let text = decode_text(bytes);
    let rows = parse_records(&text)?;

    let Some((header, data)) = rows.split_first() else {
        return Err(ImportError::Format { lines: 0 });
    };

    let mapping = FieldMapping::from_header(header, keywords);

    for field in mapping.missing() {
        debug!(%field, "no matching column, using defaults");
    }

    let products = normalize_rows(data, &mapping, batch_stamp);

    info!(count = products.len(), "imported products");

    Ok(products)
}
