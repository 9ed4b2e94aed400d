//! Products

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque product identifier, assigned once at creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// Stock keeping unit
    pub sku: String,

    /// Product name
    pub name: String,

    /// Specification, e.g. "一壶四杯"
    pub spec: String,

    /// Unit of sale, e.g. "套"
    pub unit: String,

    /// Price paid to the platform; this is "our cost" in costing
    pub platform_price: Decimal,

    /// Channel (distributor) price
    pub channel_price: Decimal,

    /// Suggested retail price
    pub retail_price: Decimal,

    /// Image URL, not validated
    pub image: String,

    /// Manufacturer or brand
    pub manufacturer: String,

    /// Catalog category
    pub category: String,
}

impl Product {
    /// Name given to manually entered products.
    pub const MANUAL_NAME: &'static str = "新录入产品";

    /// SKU given to manually entered products.
    pub const MANUAL_SKU: &'static str = "NEW";

    /// Unit used when none is known.
    pub const DEFAULT_UNIT: &'static str = "件";

    /// Category used when none is known.
    pub const DEFAULT_CATEGORY: &'static str = "默认";

    /// Create a placeholder product for manual entry, with zero prices.
    pub fn placeholder(id: ProductId) -> Self {
        Self {
            id,
            sku: Self::MANUAL_SKU.to_string(),
            name: Self::MANUAL_NAME.to_string(),
            spec: String::new(),
            unit: Self::DEFAULT_UNIT.to_string(),
            platform_price: Decimal::ZERO,
            channel_price: Decimal::ZERO,
            retail_price: Decimal::ZERO,
            image: String::new(),
            manufacturer: String::new(),
            category: Self::DEFAULT_CATEGORY.to_string(),
        }
    }

    /// The sample product a fresh catalog is seeded with.
    pub fn sample() -> Self {
        Self {
            id: ProductId::new("1"),
            sku: "ZS-CJ-001".to_string(),
            name: "青山远黛-禅意茶具".to_string(),
            spec: "一壶四杯".to_string(),
            unit: "套".to_string(),
            platform_price: Decimal::from(200),
            channel_price: Decimal::from(299),
            retail_price: Decimal::from(599),
            image: "https://images.unsplash.com/photo-1576020488411-26298acb51bd?auto=format&fit=crop&q=80&w=400".to_string(),
            manufacturer: "景德镇文创".to_string(),
            category: "茶具".to_string(),
        }
    }
}
