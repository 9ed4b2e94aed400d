//! Costing
//!
//! Derives the selling price, tax, margin and budget position of a tier from its settings and
//! the products it currently resolves to. Nothing here is cached: a breakdown is recomputed
//! from the live catalog every time it is asked for.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{
    products::{Product, ProductId},
    tiers::{Tier, TierSettings},
};

/// Errors that can occur while costing a tier.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CostingError {
    /// An intermediate amount does not fit in a `Decimal`.
    #[error("{0} is too large to compute")]
    Overflow(&'static str),
}

/// Derived financial figures for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Sum of retail prices of the resolved products
    pub total_retail: Decimal,

    /// Sum of platform prices of the resolved products
    pub total_our_cost: Decimal,

    /// Retail total after the tier discount
    pub product_discounted_price: Decimal,

    /// Box, labour and logistics per set
    pub other_costs: Decimal,

    /// Our cost per set, products plus add-ons
    pub unit_our_total_cost: Decimal,

    /// Selling price per set before tax
    pub unit_untaxed_price: Decimal,

    /// Tax per set
    pub unit_tax: Decimal,

    /// Selling price per set including tax
    pub final_unit_selling_price: Decimal,

    /// Final unit price times quantity
    pub total_contract_amount: Decimal,

    /// Gross margin on the untaxed price, in percent
    pub margin_rate: Decimal,

    /// Whether the discounted product total exceeds the tier budget
    pub is_over_budget: bool,

    /// Discounted product total minus the budget; positive when over
    pub budget_deviation: Decimal,

    /// Selected ids that resolved to a product
    pub resolved_count: usize,

    /// Selected ids that no longer resolve
    pub dangling_count: usize,
}

/// Resolve a tier's selection in order, dropping ids that no longer exist.
pub fn resolve_products<'a, F>(tier: &Tier, resolve: F) -> Vec<&'a Product>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    tier.selected_product_ids
        .iter()
        .filter_map(|id| {
            let product = resolve(id);

            if product.is_none() {
                debug!(tier = %tier.id, product = %id, "dangling product reference");
            }

            product
        })
        .collect()
}

/// Compute the breakdown for a tier against the live catalog.
///
/// # Errors
///
/// Returns [`CostingError::Overflow`] if any derived amount exceeds the `Decimal` range.
pub fn compute_breakdown<'a, F>(tier: &Tier, resolve: F) -> Result<Breakdown, CostingError>
where
    F: Fn(&ProductId) -> Option<&'a Product>,
{
    let products = resolve_products(tier, resolve);
    let dangling_count = tier.selected_product_ids.len() - products.len();

    breakdown_for(&tier.settings, &products, dangling_count)
}

/// Compute a breakdown from settings and already resolved products.
///
/// # Errors
///
/// Returns [`CostingError::Overflow`] if any derived amount exceeds the `Decimal` range.
pub fn breakdown_for(
    settings: &TierSettings,
    products: &[&Product],
    dangling_count: usize,
) -> Result<Breakdown, CostingError> {
    let total_retail = sum(products.iter().map(|p| p.retail_price), "total retail")?;
    let total_our_cost = sum(products.iter().map(|p| p.platform_price), "total cost")?;

    let product_discounted_price =
        apply_percent(total_retail, settings.discount_rate, "discounted price")?;
    let other_costs = sum(
        [settings.box_cost, settings.labor_cost, settings.logistics_cost],
        "other costs",
    )?;

    let unit_our_total_cost = add(total_our_cost, other_costs, "unit cost")?;
    let unit_untaxed_price = add(product_discounted_price, other_costs, "untaxed price")?;
    let unit_tax = apply_percent(unit_untaxed_price, settings.tax_rate, "unit tax")?;
    let final_unit_selling_price = add(unit_untaxed_price, unit_tax, "final unit price")?;
    let total_contract_amount = final_unit_selling_price
        .checked_mul(Decimal::from(settings.quantity))
        .ok_or(CostingError::Overflow("contract total"))?;

    let margin_rate = if unit_untaxed_price.is_zero() {
        Decimal::ZERO
    } else {
        unit_untaxed_price
            .checked_sub(unit_our_total_cost)
            .and_then(|profit| profit.checked_div(unit_untaxed_price))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(CostingError::Overflow("margin"))?
    };

    let budget_deviation = product_discounted_price
        .checked_sub(settings.target_tier_price)
        .ok_or(CostingError::Overflow("budget deviation"))?;

    Ok(Breakdown {
        total_retail,
        total_our_cost,
        product_discounted_price,
        other_costs,
        unit_our_total_cost,
        unit_untaxed_price,
        unit_tax,
        final_unit_selling_price,
        total_contract_amount,
        margin_rate,
        is_over_budget: product_discounted_price > settings.target_tier_price,
        budget_deviation,
        resolved_count: products.len(),
        dangling_count,
    })
}

/// A single product's retail price after the tier discount.
///
/// # Errors
///
/// Returns [`CostingError::Overflow`] if the discounted price exceeds the `Decimal` range.
pub fn discounted_unit_price(
    product: &Product,
    settings: &TierSettings,
) -> Result<Decimal, CostingError> {
    apply_percent(product.retail_price, settings.discount_rate, "discounted price")
}

/// Take `points` percent (80 means 0.8) of `amount`.
fn apply_percent(
    amount: Decimal,
    points: Decimal,
    what: &'static str,
) -> Result<Decimal, CostingError> {
    points
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| fraction.checked_mul(amount))
        .ok_or(CostingError::Overflow(what))
}

fn add(lhs: Decimal, rhs: Decimal, what: &'static str) -> Result<Decimal, CostingError> {
    lhs.checked_add(rhs).ok_or(CostingError::Overflow(what))
}

fn sum(
    amounts: impl IntoIterator<Item = Decimal>,
    what: &'static str,
) -> Result<Decimal, CostingError> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |total, amount| add(total, amount, what))
}
