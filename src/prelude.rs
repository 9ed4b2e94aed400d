//! Hamper prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    catalog::{ALL_CATEGORIES, Catalog, CatalogError, ProductQuery, SortOrder},
    costing::{Breakdown, CostingError, compute_breakdown},
    gift_sets::{GiftSet, GiftSetError, GiftSetId},
    import::{ImportError, import_csv},
    products::{Product, ProductId},
    report::{
        ReportError, export_file_name, export_report,
        summary::{write_products, write_summary},
    },
    store::{Persistence, PersistenceError, Snapshot, Store, StoreError, YamlFile},
    tiers::{Tier, TierError, TierId, TierSettings},
};
