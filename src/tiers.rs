//! Tiers
//!
//! A tier is one price-budget bracket within a gift set, with its own discount, cost and tax
//! parameters and an ordered product selection.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::ProductId;

/// Errors raised when tier settings are out of range.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierError {
    /// A tier must contain at least one gift set.
    #[error("quantity must be at least 1")]
    ZeroQuantity,

    /// A monetary or percentage setting was negative (setting name, value).
    #[error("{0} must not be negative, got {1}")]
    Negative(&'static str, Decimal),
}

/// Tier identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierId(String);

impl TierId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The editable financial parameters of a tier.
///
/// Percentages are stored as percentage points: a `discount_rate` of 80 means the products
/// are sold at 80% of their retail total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierSettings {
    /// Budget ceiling per gift set
    pub target_tier_price: Decimal,

    /// Share of the retail total charged for products, in percent
    pub discount_rate: Decimal,

    /// Number of gift sets ordered
    pub quantity: u32,

    /// Gift box cost per set
    pub box_cost: Decimal,

    /// Packing labour per set
    pub labor_cost: Decimal,

    /// Shipping per set
    pub logistics_cost: Decimal,

    /// Tax rate, in percent
    pub tax_rate: Decimal,
}

impl Default for TierSettings {
    fn default() -> Self {
        Self {
            target_tier_price: Decimal::from(500),
            discount_rate: Decimal::from(80),
            quantity: 100,
            box_cost: Decimal::from(25),
            labor_cost: Decimal::from(5),
            logistics_cost: Decimal::from(15),
            tax_rate: Decimal::from(6),
        }
    }
}

impl TierSettings {
    /// Check the settings describe a usable tier.
    ///
    /// # Errors
    ///
    /// - [`TierError::ZeroQuantity`]: `quantity` is zero.
    /// - [`TierError::Negative`]: an amount or percentage is below zero.
    pub fn validate(&self) -> Result<(), TierError> {
        if self.quantity == 0 {
            return Err(TierError::ZeroQuantity);
        }

        [
            ("target tier price", self.target_tier_price),
            ("discount rate", self.discount_rate),
            ("box cost", self.box_cost),
            ("labor cost", self.labor_cost),
            ("logistics cost", self.logistics_cost),
            ("tax rate", self.tax_rate),
        ]
        .into_iter()
        .try_for_each(|(name, value)| {
            if value < Decimal::ZERO {
                Err(TierError::Negative(name, value))
            } else {
                Ok(())
            }
        })
    }

    /// Display label derived from the budget, e.g. "500元档".
    pub fn label(&self) -> String {
        format!("{}元档", self.target_tier_price)
    }
}

/// Tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Tier identifier
    pub id: TierId,

    /// Display label, derived from the target price
    pub label: String,

    /// Financial parameters
    pub settings: TierSettings,

    /// Selected products in selection order; may repeat and may dangle
    pub selected_product_ids: Vec<ProductId>,
}

impl Tier {
    /// Create an empty tier from settings.
    pub fn new(id: TierId, settings: TierSettings) -> Self {
        Self {
            id,
            label: settings.label(),
            settings,
            selected_product_ids: Vec::new(),
        }
    }

    /// Replace the settings, re-deriving the label. The selection is kept.
    pub fn apply_settings(&mut self, settings: TierSettings) {
        self.label = settings.label();
        self.settings = settings;
    }

    /// Append a product to the selection. Duplicates are allowed.
    pub fn add_product(&mut self, id: ProductId) {
        self.selected_product_ids.push(id);
    }

    /// Remove the selection entry at `index`, returning its id.
    pub fn remove_product_at(&mut self, index: usize) -> Option<ProductId> {
        if index < self.selected_product_ids.len() {
            Some(self.selected_product_ids.remove(index))
        } else {
            None
        }
    }
}
