//! Catalog

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    import::{ImportError, fields::HeaderKeywords, import_csv_with},
    products::{Product, ProductId},
};

/// Category filter value that matches every product.
pub const ALL_CATEGORIES: &str = "全部";

/// Errors related to catalog edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// No product with this id exists.
    #[error("product {0} not found")]
    NotFound(ProductId),
}

/// Ordering applied to a filtered product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Catalog order, newest first
    #[default]
    Default,

    /// Cheapest channel price first
    PriceAsc,

    /// Most expensive channel price first
    PriceDesc,
}

/// Search, category and sort options for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Substring matched against name or SKU
    pub search: String,

    /// Category to keep; `None` or [`ALL_CATEGORIES`] keeps everything
    pub category: Option<String>,

    /// Result order
    pub sort: SortOrder,
}

/// The product catalog, newest entries first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the given products in order.
    pub fn with_products(products: impl Into<Vec<Product>>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// Iterate over the products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product. Returns `None` for ids that were deleted.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Add a product at the front of the catalog.
    pub fn insert(&mut self, product: Product) {
        self.products.insert(0, product);
    }

    /// Add a batch at the front of the catalog, keeping the batch order.
    pub fn prepend(&mut self, batch: Vec<Product>) {
        self.products.splice(0..0, batch);
    }

    /// Decode and parse CSV bytes, then prepend the imported products.
    ///
    /// Product ids are built from `batch_stamp`, which must differ between imports into the
    /// same catalog. The catalog is left untouched if the import fails.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError`] if the input has no header or data row.
    pub fn import_csv(&mut self, bytes: &[u8], batch_stamp: &str) -> Result<usize, ImportError> {
        let batch = import_csv_with(bytes, &HeaderKeywords::default(), batch_stamp)?;
        let count = batch.len();

        self.prepend(batch);

        info!(count, total = self.len(), "catalog updated from import");

        Ok(count)
    }

    /// Edit a product in place.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id.
    pub fn update(
        &mut self,
        id: &ProductId,
        edit: impl FnOnce(&mut Product),
    ) -> Result<(), CatalogError> {
        let product = self
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        let original_id = product.id.clone();
        edit(product);
        product.id = original_id;

        Ok(())
    }

    /// Delete a product. Tiers that selected it keep a dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no product has this id.
    pub fn remove(&mut self, id: &ProductId) -> Result<Product, CatalogError> {
        let idx = self
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.clone()))?;

        Ok(self.products.remove(idx))
    }

    /// Products whose name or SKU contains `term`.
    pub fn search(&self, term: &str) -> Vec<&Product> {
        self.filter(&ProductQuery {
            search: term.to_string(),
            ..ProductQuery::default()
        })
    }

    /// Products matching a query, in the requested order.
    pub fn filter(&self, query: &ProductQuery) -> Vec<&Product> {
        let category = query
            .category
            .as_deref()
            .filter(|category| *category != ALL_CATEGORIES);

        let mut products: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.name.contains(&query.search) || p.sku.contains(&query.search))
            .filter(|p| category.is_none_or(|category| p.category == category))
            .collect();

        match query.sort {
            SortOrder::Default => {}
            SortOrder::PriceAsc => products.sort_by_key(|p| p.channel_price),
            SortOrder::PriceDesc => {
                products.sort_by_key(|p| std::cmp::Reverse(p.channel_price));
            }
        }

        products
    }

    /// [`ALL_CATEGORIES`] followed by each distinct, non-empty category in catalog order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();

        std::iter::once(ALL_CATEGORIES)
            .chain(
                self.products
                    .iter()
                    .map(|p| p.category.as_str())
                    .filter(|category| !category.is_empty() && seen.insert(*category)),
            )
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use super::*;

    fn product(id: &str, name: &str, category: &str, channel: i64) -> Product {
        Product {
            name: name.to_string(),
            sku: format!("SKU-{id}"),
            category: category.to_string(),
            channel_price: Decimal::from(channel),
            ..Product::placeholder(ProductId::new(id))
        }
    }

    fn catalog() -> Catalog {
        Catalog::with_products([
            product("1", "禅意茶具", "茶具", 299),
            product("2", "青瓷茶杯", "茶具", 99),
            product("3", "桂花月饼", "食品", 159),
            product("4", "无分类", "", 10),
        ])
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[test]
    fn import_prepends_without_touching_existing() -> TestResult {
        let mut catalog = catalog();
        let before: Vec<Product> = catalog.iter().cloned().collect();

        let count = catalog.import_csv("sku,name\nN1,新品一\nN2,新品二\n".as_bytes(), "b1")?;

        assert_eq!(count, 2);
        assert_eq!(catalog.len(), before.len() + 2);

        let skus: Vec<_> = catalog.iter().take(2).map(|p| p.sku.as_str()).collect();
        assert_eq!(skus, ["N1", "N2"]);

        let rest: Vec<Product> = catalog.iter().skip(2).cloned().collect();
        assert_eq!(rest, before);

        Ok(())
    }

    #[test]
    fn failed_import_leaves_catalog_alone() {
        let mut catalog = catalog();
        let before = catalog.clone();

        assert!(catalog.import_csv(b"sku,name\n", "b1").is_err());
        assert_eq!(catalog, before);
    }

    #[test]
    fn update_edits_in_place_and_keeps_id() -> TestResult {
        let mut catalog = catalog();
        let id = ProductId::new("2");

        catalog.update(&id, |p| {
            p.name = "白瓷茶杯".to_string();
            p.id = ProductId::new("hijacked");
        })?;

        let product = catalog.get(&id).ok_or("product missing")?;
        assert_eq!(product.name, "白瓷茶杯");

        Ok(())
    }

    #[test]
    fn remove_and_missing_ids() -> TestResult {
        let mut catalog = catalog();
        let id = ProductId::new("3");

        let removed = catalog.remove(&id)?;

        assert_eq!(removed.name, "桂花月饼");
        assert!(catalog.get(&id).is_none());
        assert_eq!(catalog.remove(&id), Err(CatalogError::NotFound(id)));

        Ok(())
    }

    #[test]
    fn search_matches_name_or_sku() {
        let catalog = catalog();

        assert_eq!(ids(&catalog.search("茶")), ["1", "2"]);
        assert_eq!(ids(&catalog.search("SKU-3")), ["3"]);
        assert_eq!(catalog.search("").len(), 4);
    }

    #[test]
    fn filter_by_category_and_sort_by_price() {
        let catalog = catalog();

        let query = ProductQuery {
            category: Some("茶具".to_string()),
            sort: SortOrder::PriceAsc,
            ..ProductQuery::default()
        };
        assert_eq!(ids(&catalog.filter(&query)), ["2", "1"]);

        let query = ProductQuery {
            category: Some(ALL_CATEGORIES.to_string()),
            sort: SortOrder::PriceDesc,
            ..ProductQuery::default()
        };
        assert_eq!(ids(&catalog.filter(&query)), ["1", "3", "2", "4"]);
    }

    #[test]
    fn categories_are_distinct_and_skip_blanks() {
        assert_eq!(catalog().categories(), ["全部", "茶具", "食品"]);
    }

    #[test]
    fn insert_puts_new_product_first() {
        let mut catalog = catalog();

        catalog.insert(Product::placeholder(ProductId::new("new")));

        assert_eq!(
            catalog.iter().next().map(|p| p.id.as_str()),
            Some("new")
        );
    }
}
