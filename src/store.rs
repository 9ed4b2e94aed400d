//! Store
//!
//! Owns the catalog and the gift sets, hands out identifiers and is the single place where
//! edits are validated before they reach a [`Persistence`] backend.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    catalog::{Catalog, CatalogError},
    costing::{Breakdown, CostingError, compute_breakdown},
    gift_sets::{GiftSet, GiftSetError, GiftSetId},
    import::ImportError,
    products::{Product, ProductId},
    report::{ReportError, export_report},
    tiers::{TierError, TierId, TierSettings},
};

pub mod persistence;

pub use persistence::{Persistence, PersistenceError, YamlFile};

/// Errors raised by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Gift set names must not be blank.
    #[error("gift set name must not be empty")]
    EmptyName,

    /// No gift set with this id or name exists.
    #[error("gift set {0} not found")]
    GiftSetNotFound(String),

    /// No tier with this id exists in the gift set.
    #[error("tier {0} not found")]
    TierNotFound(TierId),

    /// Tier settings were rejected.
    #[error(transparent)]
    Tier(#[from] TierError),

    /// Catalog lookup or edit failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The CSV import was rejected.
    #[error(transparent)]
    Import(#[from] ImportError),

    /// A tier's figures could not be computed.
    #[error(transparent)]
    Costing(#[from] CostingError),

    /// The report could not be rendered.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Loading or saving failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<GiftSetError> for StoreError {
    fn from(err: GiftSetError) -> Self {
        match err {
            GiftSetError::TierNotFound(id) => StoreError::TierNotFound(id),
            GiftSetError::Tier(err) => StoreError::Tier(err),
        }
    }
}

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Product catalog, newest first
    pub catalog: Catalog,

    /// Gift sets, newest first
    pub gift_sets: Vec<GiftSet>,

    /// Last identifier handed out
    pub sequence: u64,
}

/// In-memory state for one user, backed by a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    state: Snapshot,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Create a store whose catalog holds the sample product.
    pub fn new() -> Self {
        Self {
            state: Snapshot {
                catalog: Catalog::with_products([Product::sample()]),
                ..Snapshot::default()
            },
        }
    }

    /// Wrap a previously saved snapshot.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { state: snapshot }
    }

    /// Load from a backend, seeding a fresh store if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the backend exists but cannot be read.
    pub fn load(backend: &impl Persistence) -> Result<Self, PersistenceError> {
        match backend.load()? {
            Some(snapshot) => {
                debug!(
                    products = snapshot.catalog.len(),
                    gift_sets = snapshot.gift_sets.len(),
                    "loaded store"
                );

                Ok(Self::from_snapshot(snapshot))
            }
            None => {
                info!("no saved store, starting with the sample catalog");

                Ok(Self::new())
            }
        }
    }

    /// Write the current state to a backend.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the backend cannot be written.
    pub fn save(&self, backend: &impl Persistence) -> Result<(), PersistenceError> {
        backend.save(&self.state)
    }

    /// The current state.
    pub fn snapshot(&self) -> &Snapshot {
        &self.state
    }

    /// The product catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.state.catalog
    }

    /// The product catalog, for editing.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.state.catalog
    }

    /// Import CSV bytes into the catalog.
    ///
    /// Each import takes a fresh batch stamp from the id sequence, so product ids never
    /// repeat across imports.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Import`] if the input has no header or data row.
    pub fn import_csv(&mut self, bytes: &[u8]) -> Result<usize, StoreError> {
        let stamp = self.next_id("i");

        Ok(self.state.catalog.import_csv(bytes, &stamp)?)
    }

    /// Add a placeholder product at the front of the catalog for manual entry.
    pub fn add_manual_product(&mut self) -> &Product {
        let id = ProductId::new(self.next_id("p"));

        self.state.catalog.insert(Product::placeholder(id));

        let Some(product) = self.state.catalog.iter().next() else {
            unreachable!("a product was just inserted")
        };

        product
    }

    /// Gift sets, newest first.
    pub fn gift_sets(&self) -> &[GiftSet] {
        &self.state.gift_sets
    }

    /// Create a gift set and put it first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] if `name` is blank.
    pub fn create_gift_set(&mut self, name: &str) -> Result<&GiftSet, StoreError> {
        let name = name.trim();

        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let id = GiftSetId::new(self.next_id("g"));

        info!(gift_set = %id, name, "created gift set");

        self.state
            .gift_sets
            .insert(0, GiftSet::new(id, name, Utc::now()));

        let Some(gift_set) = self.state.gift_sets.first() else {
            unreachable!("a gift set was just inserted")
        };

        Ok(gift_set)
    }

    /// Delete a gift set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GiftSetNotFound`] if no gift set has this id.
    pub fn delete_gift_set(&mut self, id: &GiftSetId) -> Result<GiftSet, StoreError> {
        let idx = self
            .state
            .gift_sets
            .iter()
            .position(|set| &set.id == id)
            .ok_or_else(|| StoreError::GiftSetNotFound(id.to_string()))?;

        Ok(self.state.gift_sets.remove(idx))
    }

    /// Look up a gift set.
    pub fn gift_set(&self, id: &GiftSetId) -> Option<&GiftSet> {
        self.state.gift_sets.iter().find(|set| &set.id == id)
    }

    /// Look up a gift set for editing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GiftSetNotFound`] if no gift set has this id.
    pub fn gift_set_mut(&mut self, id: &GiftSetId) -> Result<&mut GiftSet, StoreError> {
        self.state
            .gift_sets
            .iter_mut()
            .find(|set| &set.id == id)
            .ok_or_else(|| StoreError::GiftSetNotFound(id.to_string()))
    }

    /// Find a gift set by id, falling back to the newest set with this exact name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GiftSetNotFound`] if nothing matches.
    pub fn find_gift_set(&self, key: &str) -> Result<&GiftSet, StoreError> {
        self.state
            .gift_sets
            .iter()
            .find(|set| set.id.as_str() == key)
            .or_else(|| self.state.gift_sets.iter().find(|set| set.name == key))
            .ok_or_else(|| StoreError::GiftSetNotFound(key.to_string()))
    }

    /// Append a tier to a gift set.
    ///
    /// # Errors
    ///
    /// - [`StoreError::GiftSetNotFound`]: no gift set has this id.
    /// - [`StoreError::Tier`]: the settings fail validation.
    pub fn add_tier(
        &mut self,
        gift_set: &GiftSetId,
        settings: TierSettings,
    ) -> Result<TierId, StoreError> {
        settings.validate()?;

        let id = TierId::new(self.next_id("t"));

        self.gift_set_mut(gift_set)?.add_tier(id.clone(), settings)?;

        Ok(id)
    }

    /// Replace a tier's settings.
    ///
    /// # Errors
    ///
    /// - [`StoreError::GiftSetNotFound`] or [`StoreError::TierNotFound`]: unknown ids.
    /// - [`StoreError::Tier`]: the settings fail validation.
    pub fn update_tier(
        &mut self,
        gift_set: &GiftSetId,
        tier: &TierId,
        settings: TierSettings,
    ) -> Result<(), StoreError> {
        Ok(self.gift_set_mut(gift_set)?.update_tier(tier, settings)?)
    }

    /// Remove a tier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GiftSetNotFound`] or [`StoreError::TierNotFound`] for unknown ids.
    pub fn remove_tier(&mut self, gift_set: &GiftSetId, tier: &TierId) -> Result<(), StoreError> {
        self.gift_set_mut(gift_set)?.remove_tier(tier)?;

        Ok(())
    }

    /// Add a catalog product to a tier's selection.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Catalog`]: the product is not in the catalog.
    /// - [`StoreError::GiftSetNotFound`] or [`StoreError::TierNotFound`]: unknown ids.
    pub fn select_product(
        &mut self,
        gift_set: &GiftSetId,
        tier: &TierId,
        product: &ProductId,
    ) -> Result<(), StoreError> {
        if self.state.catalog.get(product).is_none() {
            return Err(CatalogError::NotFound(product.clone()).into());
        }

        self.gift_set_mut(gift_set)?
            .tier_mut(tier)?
            .add_product(product.clone());

        Ok(())
    }

    /// Remove the selection entry at `index` from a tier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::GiftSetNotFound`] or [`StoreError::TierNotFound`] for unknown ids.
    pub fn deselect_product(
        &mut self,
        gift_set: &GiftSetId,
        tier: &TierId,
        index: usize,
    ) -> Result<Option<ProductId>, StoreError> {
        Ok(self
            .gift_set_mut(gift_set)?
            .tier_mut(tier)?
            .remove_product_at(index))
    }

    /// Edit a catalog product in place. Its id cannot change.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Catalog`] if no product has this id.
    pub fn update_product(
        &mut self,
        id: &ProductId,
        edit: impl FnOnce(&mut Product),
    ) -> Result<(), StoreError> {
        Ok(self.state.catalog.update(id, edit)?)
    }

    /// Delete a product from the catalog. Tiers keep the dangling id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Catalog`] if no product has this id.
    pub fn remove_product(&mut self, id: &ProductId) -> Result<Product, StoreError> {
        Ok(self.state.catalog.remove(id)?)
    }

    /// Compute a tier's breakdown against the current catalog.
    ///
    /// # Errors
    ///
    /// - [`StoreError::GiftSetNotFound`] or [`StoreError::TierNotFound`]: unknown ids.
    /// - [`StoreError::Costing`]: the tier's amounts exceed the `Decimal` range.
    pub fn breakdown(&self, gift_set: &GiftSetId, tier: &TierId) -> Result<Breakdown, StoreError> {
        let tier = self
            .gift_set(gift_set)
            .ok_or_else(|| StoreError::GiftSetNotFound(gift_set.to_string()))?
            .tier(tier)
            .ok_or_else(|| StoreError::TierNotFound(tier.clone()))?;

        Ok(compute_breakdown(tier, |id| self.state.catalog.get(id))?)
    }

    /// Render a gift set as a CSV report.
    ///
    /// # Errors
    ///
    /// - [`StoreError::GiftSetNotFound`]: no gift set has this id.
    /// - [`StoreError::Report`]: the CSV writer failed.
    pub fn export(&self, gift_set: &GiftSetId) -> Result<String, StoreError> {
        let gift_set = self
            .gift_set(gift_set)
            .ok_or_else(|| StoreError::GiftSetNotFound(gift_set.to_string()))?;

        Ok(export_report(gift_set, |id| self.state.catalog.get(id))?)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.state.sequence += 1;

        format!("{prefix}{}", self.state.sequence)
    }
}
