//! Record normalization

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::products::{Product, ProductId};

use super::fields::{FieldMapping, ProductField};

/// Name given to rows without a name column.
pub const UNNAMED: &str = "未命名";

/// Digits a `Decimal` always holds exactly.
const MAX_DIGITS: usize = 28;

/// Turn data rows into products.
///
/// `batch_stamp` is combined with each row's index to build ids that are unique within the
/// batch. Missing columns fall back to defaults and unreadable prices become zero; no row is
/// ever rejected.
pub fn normalize_rows<S: AsRef<str>>(
    rows: &[Vec<S>],
    mapping: &FieldMapping,
    batch_stamp: &str,
) -> Vec<Product> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| normalize_row(idx, row, mapping, batch_stamp))
        .collect()
}

fn normalize_row<S: AsRef<str>>(
    idx: usize,
    row: &[S],
    mapping: &FieldMapping,
    batch_stamp: &str,
) -> Product {
    let text = |field: ProductField| -> Option<String> {
        mapping
            .column(field)
            .map(|col| row.get(col).map_or("", |cell| cell.as_ref()).trim().to_string())
    };

    let amount = |field: ProductField| -> Decimal {
        mapping
            .column(field)
            .map_or(Decimal::ZERO, |col| {
                let raw = row.get(col).map_or("", |cell| cell.as_ref());
                let value = parse_amount(raw);

                if value.is_none() {
                    debug!(row = idx, %field, raw, "unreadable amount, using 0");
                }

                value.unwrap_or(Decimal::ZERO)
            })
    };

    Product {
        id: ProductId::new(format!("{batch_stamp}-{idx}")),
        sku: text(ProductField::Sku).unwrap_or_else(|| format!("SKU-{idx}")),
        name: text(ProductField::Name).unwrap_or_else(|| UNNAMED.to_string()),
        spec: text(ProductField::Spec).unwrap_or_default(),
        unit: text(ProductField::Unit).unwrap_or_else(|| Product::DEFAULT_UNIT.to_string()),
        platform_price: amount(ProductField::PlatformPrice),
        channel_price: amount(ProductField::ChannelPrice),
        retail_price: amount(ProductField::RetailPrice),
        image: text(ProductField::Image).unwrap_or_default(),
        manufacturer: text(ProductField::Manufacturer).unwrap_or_default(),
        category: text(ProductField::Category)
            .unwrap_or_else(|| Product::DEFAULT_CATEGORY.to_string()),
    }
}

/// Read an amount from free-form text such as "¥1,299.00" or "约 45 元".
///
/// Every character other than ASCII digits and `.` is discarded, then the longest leading
/// number is parsed, so "12.5.3" reads as 12.5. Returns `None` when no number remains.
///
/// Fraction digits beyond what a `Decimal` holds are truncated, and whole numbers too large
/// for a `Decimal` saturate to [`Decimal::MAX`].
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut seen_point = false;
    let end = cleaned
        .char_indices()
        .find(|&(_, c)| {
            if c == '.' {
                if seen_point {
                    return true;
                }
                seen_point = true;
            }
            false
        })
        .map_or(cleaned.len(), |(idx, _)| idx);

    let number = cleaned.get(..end)?;

    if !number.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let number = number.strip_suffix('.').unwrap_or(number);
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    let whole = whole.trim_start_matches('0');

    if whole.len() > MAX_DIGITS {
        return Decimal::from_str(whole).ok().or_else(|| {
            warn!(raw, "amount exceeds the supported range, using the maximum");

            Some(Decimal::MAX)
        });
    }

    let fraction = fraction.get(..MAX_DIGITS - whole.len()).unwrap_or(fraction);
    let whole = if whole.is_empty() { "0" } else { whole };

    if fraction.is_empty() {
        Decimal::from_str(whole).ok()
    } else {
        Decimal::from_str(&format!("{whole}.{fraction}")).ok()
    }
}
