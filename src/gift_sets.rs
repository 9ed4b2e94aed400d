//! Gift Sets

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tiers::{Tier, TierError, TierId, TierSettings};

/// Errors raised while editing the tiers of a gift set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GiftSetError {
    /// No tier with this id exists in the gift set.
    #[error("tier {0} not found")]
    TierNotFound(TierId),

    /// The supplied tier settings were rejected.
    #[error(transparent)]
    Tier(#[from] TierError),
}

/// Gift set identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GiftSetId(String);

impl GiftSetId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GiftSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named proposal made of one or more tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftSet {
    /// Gift set identifier
    pub id: GiftSetId,

    /// Proposal name, shown in the report
    pub name: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Tiers in display order
    pub tiers: Vec<Tier>,
}

impl GiftSet {
    /// Create a gift set with no tiers.
    pub fn new(id: GiftSetId, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            tiers: Vec::new(),
        }
    }

    /// Append a new, empty tier.
    ///
    /// # Errors
    ///
    /// Returns [`GiftSetError::Tier`] if the settings fail validation.
    pub fn add_tier(&mut self, id: TierId, settings: TierSettings) -> Result<&Tier, GiftSetError> {
        settings.validate()?;

        self.tiers.push(Tier::new(id, settings));

        let Some(tier) = self.tiers.last() else {
            unreachable!("a tier was just pushed")
        };

        Ok(tier)
    }

    /// Replace the settings of an existing tier, keeping its selection.
    ///
    /// # Errors
    ///
    /// - [`GiftSetError::Tier`]: the settings fail validation.
    /// - [`GiftSetError::TierNotFound`]: no tier has this id.
    pub fn update_tier(&mut self, id: &TierId, settings: TierSettings) -> Result<(), GiftSetError> {
        settings.validate()?;

        self.tier_mut(id)?.apply_settings(settings);

        Ok(())
    }

    /// Remove a tier.
    ///
    /// # Errors
    ///
    /// Returns [`GiftSetError::TierNotFound`] if no tier has this id.
    pub fn remove_tier(&mut self, id: &TierId) -> Result<Tier, GiftSetError> {
        let idx = self
            .tiers
            .iter()
            .position(|tier| &tier.id == id)
            .ok_or_else(|| GiftSetError::TierNotFound(id.clone()))?;

        Ok(self.tiers.remove(idx))
    }

    /// Look up a tier.
    pub fn tier(&self, id: &TierId) -> Option<&Tier> {
        self.tiers.iter().find(|tier| &tier.id == id)
    }

    /// Look up a tier for editing.
    ///
    /// # Errors
    ///
    /// Returns [`GiftSetError::TierNotFound`] if no tier has this id.
    pub fn tier_mut(&mut self, id: &TierId) -> Result<&mut Tier, GiftSetError> {
        self.tiers
            .iter_mut()
            .find(|tier| &tier.id == id)
            .ok_or_else(|| GiftSetError::TierNotFound(id.clone()))
    }
}
