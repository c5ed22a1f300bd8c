//! Configuration for procdb
//!
//! Centralized configuration with sensible defaults.

use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::store::MAX_RECORDS;

/// Main configuration for a procdb engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Number of record slots reserved at startup (must be below MAX_RECORDS)
    pub capacity: usize,

    /// Data file used when the caller does not name one
    /// Internal structure:
    ///   {default_path}          (header + records)
    ///   {default_path}.wal      (write-ahead log)
    pub default_path: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Whether mutations are logged to the WAL file before being acknowledged
    pub wal_enabled: bool,

    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            default_path: PathBuf::from("process.db"),
            wal_enabled: true,
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
        }
    }
}

impl Config {
    /// Suffix appended to the data file path to name its WAL
    pub const WAL_SUFFIX: &'static str = ".wal";

    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Derive the WAL path for a data file: `process.db` → `process.db.wal`
    pub fn wal_path_for(data_path: &Path) -> PathBuf {
        let mut name = data_path.as_os_str().to_os_string();
        name.push(Self::WAL_SUFFIX);
        PathBuf::from(name)
    }

    /// Check the config for values the engine cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.capacity >= MAX_RECORDS {
            return Err(StoreError::CapacityInvalid {
                requested: self.capacity,
                max: MAX_RECORDS,
            });
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(StoreError::Config(
                "EveryNEntries sync strategy needs a count above zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the number of record slots
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the default data file path
    pub fn default_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.default_path = path.into();
        self
    }

    /// Enable or disable the WAL
    pub fn wal_enabled(mut self, enabled: bool) -> Self {
        self.config.wal_enabled = enabled;
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
