//! Terminal tables for gift sets and products.

use std::io;

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};

use crate::{
    costing::compute_breakdown,
    gift_sets::GiftSet,
    products::{Product, ProductId},
};

use super::ReportError;

const DEVIATION_COLUMN: usize = 6;
const BUDGET_COLUMN: usize = 7;

/// Write one table row per tier with its headline figures.
///
/// Tiers whose discounted product total exceeds the budget are highlighted.
///
/// # Errors
///
/// - [`ReportError::Costing`]: a tier's amounts exceed the `Decimal` range.
/// - [`ReportError::Io`]: writing to `out` fails.
pub fn write_summary<'a, F>(
    mut out: impl io::Write,
    gift_set: &GiftSet,
    resolve: F,
    currency: &'static Currency,
) -> Result<(), ReportError>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    let mut builder = Builder::default();

    builder.push_record([
        "Tier",
        "Products",
        "Discounted",
        "Unit Price",
        "Contract Total",
        "Margin",
        "Deviation",
        "Budget",
    ]);

    let mut over_budget_rows = Vec::new();

    for (idx, tier) in gift_set.tiers.iter().enumerate() {
        let breakdown = compute_breakdown(tier, &resolve)?;

        let products = if breakdown.dangling_count > 0 {
            format!("{} (+{} missing)", breakdown.resolved_count, breakdown.dangling_count)
        } else {
            breakdown.resolved_count.to_string()
        };

        builder.push_record([
            tier.label.clone(),
            products,
            Money::from_decimal(breakdown.product_discounted_price, currency).to_string(),
            Money::from_decimal(breakdown.final_unit_selling_price, currency).to_string(),
            Money::from_decimal(breakdown.total_contract_amount, currency).to_string(),
            format!("{}%", points(breakdown.margin_rate)),
            signed(breakdown.budget_deviation, currency),
            if breakdown.is_over_budget { "over" } else { "ok" }.to_string(),
        ]);

        if breakdown.is_over_budget {
            over_budget_rows.push(idx + 1);
        }
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..7), Alignment::right());

    for row in over_budget_rows {
        table.modify((row, BUDGET_COLUMN), Color::FG_RED);
        table.modify((row, DEVIATION_COLUMN), Color::FG_RED);
    }

    writeln!(out, "{} ({})", gift_set.name, gift_set.created_at.format("%Y-%m-%d"))?;
    writeln!(out, "{table}")?;

    Ok(())
}

/// Write a product listing with prices in `currency`.
///
/// # Errors
///
/// Returns [`ReportError::Io`] if writing to `out` fails.
pub fn write_products(
    mut out: impl io::Write,
    products: &[&Product],
    currency: &'static Currency,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record([
        "ID", "SKU", "Name", "Spec", "Unit", "Platform", "Channel", "Retail", "Category",
    ]);

    for product in products {
        builder.push_record([
            product.id.to_string(),
            product.sku.clone(),
            product.name.clone(),
            product.spec.clone(),
            product.unit.clone(),
            Money::from_decimal(product.platform_price, currency).to_string(),
            Money::from_decimal(product.channel_price, currency).to_string(),
            Money::from_decimal(product.retail_price, currency).to_string(),
            product.category.clone(),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(5..8), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "{} product(s)", products.len())?;

    Ok(())
}

fn points(rate: Decimal) -> Decimal {
    rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn signed(amount: Decimal, currency: &'static Currency) -> String {
    let money = Money::from_decimal(amount.abs(), currency);

    if amount > Decimal::ZERO {
        format!("+{money}")
    } else if amount < Decimal::ZERO {
        format!("-{money}")
    } else {
        money.to_string()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        gift_sets::GiftSetId,
        tiers::{Tier, TierId, TierSettings},
    };

    use super::*;

    fn product(retail: i64) -> Product {
        Product {
            retail_price: Decimal::from(retail),
            platform_price: Decimal::from(200),
            ..Product::placeholder(ProductId::new("p"))
        }
    }

    fn gift_set() -> GiftSet {
        let mut set = GiftSet::new(GiftSetId::new("g"), "端午", Utc::now());
        let mut tier = Tier::new(TierId::new("t"), TierSettings::default());
        tier.add_product(ProductId::new("p"));
        tier.add_product(ProductId::new("gone"));
        set.tiers.push(tier);
        set
    }

    #[test]
    fn summary_lists_each_tier() -> TestResult {
        let product = product(600);
        let mut out = Vec::new();

        write_summary(&mut out, &gift_set(), |id| (id == &product.id).then_some(&product), iso::CNY)?;

        let text = String::from_utf8(out)?;
        assert!(text.contains("端午"));
        assert!(text.contains("500元档"));
        assert!(text.contains("1 (+1 missing)"));
        assert!(text.contains("53.33%"));
        assert!(text.contains("ok"));

        Ok(())
    }

    #[test]
    fn product_listing_shows_each_product() -> TestResult {
        let sample = Product::sample();
        let mut out = Vec::new();

        write_products(&mut out, &[&sample], iso::CNY)?;

        let text = String::from_utf8(out)?;
        assert!(text.contains("ZS-CJ-001"));
        assert!(text.contains("1 product(s)"));

        Ok(())
    }

    #[test]
    fn over_budget_tiers_are_flagged() -> TestResult {
        let product = product(700);
        let mut out = Vec::new();

        write_summary(&mut out, &gift_set(), |id| (id == &product.id).then_some(&product), iso::CNY)?;

        assert!(String::from_utf8(out)?.contains("over"));

        Ok(())
    }
}
