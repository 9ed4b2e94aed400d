//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use hamper::{catalog::SortOrder, products::Product, tiers::TierSettings};

/// Gift set pricing proposals
#[derive(Debug, Parser)]
#[command(name = "hamper", about = "Gift set pricing proposals", long_about = None)]
pub struct Config {
    /// Store file holding the catalog and gift sets
    #[arg(long, env = "HAMPER_STORE", default_value = "hamper.yml", global = true)]
    pub store: PathBuf,

    /// ISO currency code used when displaying amounts
    #[arg(long, env = "HAMPER_CURRENCY", default_value = "CNY", global = true)]
    pub currency: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import products from a UTF-8 or GBK CSV file
    Import {
        /// CSV file to import
        path: PathBuf,
    },

    /// List catalog products
    Products {
        /// Keep products whose name or SKU contains this text
        #[arg(short, long, default_value = "")]
        search: String,

        /// Keep products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Order by channel price
        #[arg(long, value_enum, default_value_t = Sort::Default)]
        sort: Sort,
    },

    /// Add a placeholder product for manual entry
    AddProduct,

    /// Edit a product; omitted fields are left unchanged
    EditProduct {
        /// Product id
        id: String,

        #[command(flatten)]
        fields: ProductArgs,
    },

    /// Delete a product; tiers that selected it ignore it from then on
    RemoveProduct {
        /// Product id
        id: String,
    },

    /// Create a gift set
    NewSet {
        /// Gift set name
        name: String,
    },

    /// Delete a gift set and its tiers
    DeleteSet {
        /// Gift set id or name
        set: String,
    },

    /// Add a tier to a gift set
    AddTier {
        /// Gift set id or name
        set: String,

        #[command(flatten)]
        settings: TierArgs,
    },

    /// Change a tier's settings; omitted values are left unchanged
    UpdateTier {
        /// Gift set id or name
        set: String,

        /// Tier id
        tier: String,

        #[command(flatten)]
        settings: TierArgs,
    },

    /// Delete a tier
    RemoveTier {
        /// Gift set id or name
        set: String,

        /// Tier id
        tier: String,
    },

    /// Add products to a tier
    Select {
        /// Gift set id or name
        set: String,

        /// Tier id
        tier: String,

        /// Product ids, added in order
        #[arg(required = true)]
        products: Vec<String>,
    },

    /// Remove one entry from a tier's selection
    Deselect {
        /// Gift set id or name
        set: String,

        /// Tier id
        tier: String,

        /// Position in the selection, starting at 0
        index: usize,
    },

    /// Show a gift set's tiers
    Show {
        /// Gift set id or name
        set: String,
    },

    /// Export a gift set as a CSV report
    Export {
        /// Gift set id or name
        set: String,

        /// Output file, defaults to a dated name in the current directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

/// Product list order
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sort {
    /// Catalog order
    Default,

    /// Cheapest first
    PriceAsc,

    /// Most expensive first
    PriceDesc,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Default => SortOrder::Default,
            Sort::PriceAsc => SortOrder::PriceAsc,
            Sort::PriceDesc => SortOrder::PriceDesc,
        }
    }
}

/// Product fields to overwrite.
#[derive(Debug, Args)]
pub struct ProductArgs {
    /// Stock keeping unit
    #[arg(long)]
    pub sku: Option<String>,

    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Specification
    #[arg(long)]
    pub spec: Option<String>,

    /// Unit of sale
    #[arg(long)]
    pub unit: Option<String>,

    /// Platform price
    #[arg(long)]
    pub platform: Option<Decimal>,

    /// Channel price
    #[arg(long)]
    pub channel: Option<Decimal>,

    /// Retail price
    #[arg(long)]
    pub retail: Option<Decimal>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,

    /// Manufacturer or brand
    #[arg(long)]
    pub manufacturer: Option<String>,

    /// Category
    #[arg(long)]
    pub category: Option<String>,
}

impl ProductArgs {
    /// Overwrite the fields that were given.
    pub fn apply_to(self, product: &mut Product) {
        let Self {
            sku,
            name,
            spec,
            unit,
            platform,
            channel,
            retail,
            image,
            manufacturer,
            category,
        } = self;

        set(&mut product.sku, sku);
        set(&mut product.name, name);
        set(&mut product.spec, spec);
        set(&mut product.unit, unit);
        set(&mut product.platform_price, platform);
        set(&mut product.channel_price, channel);
        set(&mut product.retail_price, retail);
        set(&mut product.image, image);
        set(&mut product.manufacturer, manufacturer);
        set(&mut product.category, category);
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// Tier settings; omitted values keep their current or default values.
#[derive(Debug, Args)]
pub struct TierArgs {
    /// Budget per set
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Discount applied to retail prices, in percent
    #[arg(long)]
    pub discount: Option<Decimal>,

    /// Number of sets
    #[arg(long)]
    pub quantity: Option<u32>,

    /// Packaging cost per set
    #[arg(long)]
    pub box_cost: Option<Decimal>,

    /// Labour cost per set
    #[arg(long)]
    pub labor_cost: Option<Decimal>,

    /// Logistics cost per set
    #[arg(long)]
    pub logistics_cost: Option<Decimal>,

    /// Tax rate, in percent
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

impl TierArgs {
    /// Overlay the given values on `base`.
    pub fn apply_to(self, base: TierSettings) -> TierSettings {
        TierSettings {
            target_tier_price: self.budget.unwrap_or(base.target_tier_price),
            discount_rate: self.discount.unwrap_or(base.discount_rate),
            quantity: self.quantity.unwrap_or(base.quantity),
            box_cost: self.box_cost.unwrap_or(base.box_cost),
            labor_cost: self.labor_cost.unwrap_or(base.labor_cost),
            logistics_cost: self.logistics_cost.unwrap_or(base.logistics_cost),
            tax_rate: self.tax_rate.unwrap_or(base.tax_rate),
        }
    }
}
