//! Persistence

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use super::Snapshot;

/// Errors reading or writing a saved store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The store file could not be read or written.
    #[error("failed to access store file: {0}")]
    Io(#[from] io::Error),

    /// The store file is not valid YAML for a snapshot.
    #[error("failed to parse store file: {0}")]
    Yaml(#[from] serde_norway::Error),
}

/// A place snapshots are loaded from and saved to.
pub trait Persistence {
    /// Load the last saved snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if saved data exists but cannot be read.
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError>;

    /// Replace the saved snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] if the snapshot cannot be written.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError>;
}

/// Snapshot stored as a single YAML file.
#[derive(Debug, Clone)]
pub struct YamlFile {
    path: PathBuf,
}

impl YamlFile {
    /// Use the file at `path`. It does not need to exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");

        self.path.with_file_name(name)
    }
}

impl Persistence for YamlFile {
    fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let snapshot = serde_norway::from_str(&contents)?;

        debug!(path = %self.path.display(), "read store file");

        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        let yaml = serde_norway::to_string(snapshot)?;
        let staging = self.staging_path();

        // Rename over the old file so a failed write never leaves it half written.
        fs::write(&staging, yaml)?;
        fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), "wrote store file");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::{
        catalog::Catalog,
        gift_sets::{GiftSet, GiftSetId},
        products::{Product, ProductId},
        tiers::{TierId, TierSettings},
    };

    use super::*;

    fn snapshot() -> Result<Snapshot, Box<dyn std::error::Error>> {
        let created_at = Utc
            .with_ymd_and_hms(2024, 9, 1, 8, 30, 0)
            .single()
            .ok_or("bad timestamp")?;

        let mut gift_set = GiftSet::new(GiftSetId::new("g1"), "中秋", created_at);
        let settings = TierSettings {
            discount_rate: Decimal::new(755, 1),
            ..TierSettings::default()
        };

        gift_set.add_tier(TierId::new("t1"), settings)?;
        gift_set
            .tier_mut(&TierId::new("t1"))?
            .add_product(ProductId::new("1"));

        Ok(Snapshot {
            catalog: Catalog::with_products([Product {
                retail_price: Decimal::new(59_950, 2),
                ..Product::sample()
            }]),
            gift_sets: vec![gift_set],
            sequence: 7,
        })
    }

    #[test]
    fn missing_file_loads_as_nothing() -> TestResult {
        let dir = TempDir::new()?;
        let file = YamlFile::new(dir.path().join("store.yml"));

        assert!(file.load()?.is_none());

        Ok(())
    }

    #[test]
    fn saved_snapshot_loads_back() -> TestResult {
        let dir = TempDir::new()?;
        let file = YamlFile::new(dir.path().join("store.yml"));
        let snapshot = snapshot()?;

        file.save(&snapshot)?;

        assert_eq!(file.load()?, Some(snapshot));
        assert!(!file.staging_path().exists());

        Ok(())
    }

    #[test]
    fn corrupt_file_is_an_error() -> TestResult {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.yml");
        fs::write(&path, "catalog: [unterminated")?;

        let result = YamlFile::new(path).load();

        assert!(matches!(result, Err(PersistenceError::Yaml(_))));

        Ok(())
    }
}
