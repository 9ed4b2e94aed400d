//! Report
//!
//! Renders a gift set as a CSV document for spreadsheet tools.
//!
//! Each tier contributes one row per resolved product. Only the first row of a tier carries
//! the tier columns (name, budget, discount, quantity and the four totals); later rows of the
//! same tier leave them blank. Operators read the report in that grouped form, so the layout
//! must not be flattened into repeated totals.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;
use tracing::debug;

use crate::{
    costing::{Breakdown, CostingError, breakdown_for, discounted_unit_price, resolve_products},
    gift_sets::GiftSet,
    products::{Product, ProductId},
    tiers::Tier,
};

pub mod summary;

/// Byte-order mark written at the start of every report.
pub const BOM: char = '\u{feff}';

/// Column titles of the exported report.
pub const HEADER: [&str; 16] = [
    "方案名称",
    "档位预算",
    "选品折扣",
    "数量",
    "产品名称",
    "SKU",
    "规格",
    "单位",
    "零售价",
    "折后价",
    "我方成本",
    "素材CDN",
    "杂费合计",
    "单包税额",
    "含税单价",
    "全案总额",
];

/// Product name shown for a tier with no resolved products.
pub const NO_SELECTION: &str = "无选品";

/// Errors that can occur while writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The CSV writer failed.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The CSV writer could not be flushed.
    #[error("failed to flush report: {0}")]
    Flush(String),

    /// The written report was not valid UTF-8.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Writing to the output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A tier's figures could not be computed.
    #[error(transparent)]
    Costing(#[from] CostingError),
}

type Row = [String; 16];

/// Render a gift set as CSV text, starting with a byte-order mark.
///
/// # Errors
///
/// - [`ReportError::Costing`]: a tier's amounts exceed the `Decimal` range.
/// - [`ReportError::Csv`] or [`ReportError::Flush`]: the in-memory CSV writer failed.
pub fn export_report<'a, F>(gift_set: &GiftSet, resolve: F) -> Result<String, ReportError>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;

    for tier in &gift_set.tiers {
        for row in tier_rows(&gift_set.name, tier, &resolve)? {
            writer.write_record(&row)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ReportError::Flush(err.to_string()))?;

    let mut report = String::from(BOM);
    report.push_str(&String::from_utf8(bytes)?);

    debug!(gift_set = %gift_set.id, tiers = gift_set.tiers.len(), "rendered report");

    Ok(report)
}

/// Suggested file name for an exported report, e.g. `方案导出_中秋_2024-09-01.csv`.
pub fn export_file_name(gift_set: &GiftSet, date: NaiveDate) -> String {
    format!("方案导出_{}_{}.csv", gift_set.name, date.format("%Y-%m-%d"))
}

fn tier_rows<'a, F>(set_name: &str, tier: &Tier, resolve: &F) -> Result<Vec<Row>, CostingError>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    let products = resolve_products(tier, resolve);
    let dangling = tier.selected_product_ids.len() - products.len();
    let breakdown = breakdown_for(&tier.settings, &products, dangling)?;

    if products.is_empty() {
        return Ok(vec![empty_tier_row(set_name, tier, &breakdown)]);
    }

    products
        .iter()
        .enumerate()
        .map(|(idx, product)| {
            let mut row = product_row(tier, product)?;

            if idx == 0 {
                fill_tier_columns(&mut row, set_name, tier, &breakdown);
            }

            Ok(row)
        })
        .collect()
}

fn product_row(tier: &Tier, product: &Product) -> Result<Row, CostingError> {
    Ok([
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        product.name.clone(),
        product.sku.clone(),
        product.spec.clone(),
        product.unit.clone(),
        product.retail_price.to_string(),
        money(discounted_unit_price(product, &tier.settings)?),
        product.platform_price.to_string(),
        product.image.clone(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ])
}

fn empty_tier_row(set_name: &str, tier: &Tier, breakdown: &Breakdown) -> Row {
    let mut row = [
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        NO_SELECTION.to_string(),
        "-".to_string(),
        "-".to_string(),
        "-".to_string(),
        "0".to_string(),
        money(Decimal::ZERO),
        "0".to_string(),
        "-".to_string(),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ];

    fill_tier_columns(&mut row, set_name, tier, breakdown);

    row
}

fn fill_tier_columns(row: &mut Row, set_name: &str, tier: &Tier, breakdown: &Breakdown) {
    let [name, budget, discount, quantity, .., other_costs, unit_tax, final_price, total] = row;

    *name = set_name.to_string();
    *budget = tier.settings.target_tier_price.to_string();
    *discount = format!("{}%", tier.settings.discount_rate);
    *quantity = tier.settings.quantity.to_string();
    *other_costs = money(breakdown.other_costs);
    *unit_tax = money(breakdown.unit_tax);
    *final_price = money(breakdown.final_unit_selling_price);
    *total = money(breakdown.total_contract_amount);
}

/// Format a derived amount with exactly two decimal places.
pub fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    format!("{rounded:.2}")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rustc_hash::FxHashMap;
    use testresult::TestResult;

    use crate::{
        gift_sets::GiftSetId,
        tiers::{TierId, TierSettings},
    };

    use super::*;

    fn product(id: &str, name: &str, retail: i64, platform: i64) -> Product {
        Product {
            name: name.to_string(),
            sku: format!("SKU-{id}"),
            spec: "礼盒装".to_string(),
            unit: "套".to_string(),
            retail_price: Decimal::from(retail),
            platform_price: Decimal::from(platform),
            image: format!("https://cdn.example/{id}.png"),
            ..Product::placeholder(ProductId::new(id))
        }
    }

    fn fixture() -> (GiftSet, FxHashMap<ProductId, Product>) {
        let catalog: FxHashMap<_, _> = [
            product("a", "禅意茶具", 600, 200),
            product("b", "桂花月饼", 100, 40),
        ]
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

        let created_at = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).single().unwrap_or_default();
        let mut set = GiftSet::new(GiftSetId::new("g"), "中秋", created_at);

        let mut full = Tier::new(TierId::new("t1"), TierSettings::default());
        full.add_product(ProductId::new("a"));
        full.add_product(ProductId::new("deleted"));
        full.add_product(ProductId::new("b"));

        let empty = Tier::new(TierId::new("t2"), TierSettings::default());

        set.tiers = vec![full, empty];

        (set, catalog)
    }

    #[test]
    fn report_starts_with_bom_and_header() -> TestResult {
        let (set, catalog) = fixture();

        let report = export_report(&set, |id| catalog.get(id))?;
        let first_line = report.lines().next().ok_or("empty report")?;

        assert!(report.starts_with(BOM));
        assert_eq!(first_line.trim_start_matches(BOM), HEADER.join(","));

        Ok(())
    }

    #[test]
    fn first_row_of_tier_carries_totals() -> TestResult {
        let (set, catalog) = fixture();

        let report = export_report(&set, |id| catalog.get(id))?;
        let lines: Vec<&str> = report.lines().skip(1).collect();

        // 700 retail * 80% = 560, + 45 add-ons = 605, tax 36.30, final 641.30
        assert_eq!(
            lines,
            [
                "中秋,500,80%,100,禅意茶具,SKU-a,礼盒装,套,600,480.00,200,https://cdn.example/a.png,45.00,36.30,641.30,64130.00",
                ",,,,桂花月饼,SKU-b,礼盒装,套,100,80.00,40,https://cdn.example/b.png,,,,",
                "中秋,500,80%,100,无选品,-,-,-,0,0.00,0,-,45.00,2.70,47.70,4770.00",
            ]
        );

        Ok(())
    }

    #[test]
    fn fields_with_commas_are_quoted() -> TestResult {
        let (mut set, mut catalog) = fixture();
        set.name = "春节, 企业".to_string();

        if let Some(product) = catalog.get_mut(&ProductId::new("a")) {
            product.name = "茶具 \"青\"".to_string();
        }

        let report = export_report(&set, |id| catalog.get(id))?;
        let row = report.lines().nth(1).ok_or("missing row")?;

        assert!(row.starts_with(r#""春节, 企业",500,80%,100,"茶具 ""青""","#));

        Ok(())
    }

    #[test]
    fn empty_gift_set_has_only_a_header() -> TestResult {
        let set = GiftSet::new(GiftSetId::new("g"), "空", Utc::now());

        let report = export_report(&set, |_| None)?;

        assert_eq!(report.lines().count(), 1);

        Ok(())
    }

    #[test]
    fn overflowing_tier_fails_the_export() {
        let (mut set, mut catalog) = fixture();

        if let Some(product) = catalog.get_mut(&ProductId::new("a")) {
            product.retail_price = Decimal::MAX;
        }

        if let Some(tier) = set.tiers.first_mut() {
            tier.add_product(ProductId::new("a"));
        }

        assert!(matches!(
            export_report(&set, |id| catalog.get(id)),
            Err(ReportError::Costing(CostingError::Overflow(_)))
        ));
    }

    #[test]
    fn money_rounds_half_away_from_zero() {
        assert_eq!(money(Decimal::new(5565, 1)), "556.50");
        assert_eq!(money(Decimal::new(12_345, 3)), "12.35");
        assert_eq!(money(Decimal::from(7)), "7.00");
    }

    #[test]
    fn file_name_includes_set_name_and_date() -> TestResult {
        let (set, _) = fixture();
        let date = NaiveDate::from_ymd_opt(2024, 9, 1).ok_or("bad date")?;

        assert_eq!(export_file_name(&set, date), "方案导出_中秋_2024-09-01.csv");

        Ok(())
    }
}
