//! Engine Module
//!
//! The record engine that coordinates all components.
//!
//! ## Responsibilities
//! - Own the Record Store, Name Index, Change Log and data file
//! - Log every mutation before acknowledging it
//! - Persist the store on flush and clear the change log afterwards
//! - Replay the WAL on load so unflushed mutations survive a crash
//!
//! ## Lifecycle
//! ```text
//!   create ──► Unloaded ──load──► Loaded ──destroy──► Closed
//!                  │                 ▲  │
//!                  │                 └──┘ add / delete / update / flush
//!                  └──────────────destroy──────────────► Closed
//! ```

use std::fs;
use std::path::Path;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::index::NameIndex;
use crate::persistence::{DataFile, FileHeader};
use crate::record::{validate_usage, Record, RecordName};
use crate::store::{AliveRecords, RecordStore};
use crate::wal::{ChangeLog, Operation, WalEntry, WalRecovery, WalWriter};

/// Upper bounds (exclusive) for usage sampled by `add`
const SAMPLED_CPU_LIMIT: u32 = 60;
const SAMPLED_RAM_LIMIT: u32 = 80;

/// Where the engine is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed, no data file bound
    Unloaded,

    /// Data file bound and store populated
    Loaded,

    /// All resources released; terminal
    Closed,
}

/// The main record engine
///
/// ## Concurrency Model
/// Single-threaded and synchronous. Every mutation takes `&mut self`, so the
/// borrow checker serializes callers; sharing one data file between engines
/// or processes is not supported.
pub struct Engine {
    config: Config,

    state: EngineState,

    /// In-memory system of record
    store: RecordStore,

    /// Name → slot lookup over alive records
    index: NameIndex,

    /// Mutations since the last persist
    log: ChangeLog,

    /// Bound data file (Loaded only)
    file: Option<DataFile>,

    /// Store differs from the last persisted data file
    dirty: bool,
}

impl Engine {
    /// Create an unloaded engine with `capacity` slots and default config
    pub fn create(capacity: usize) -> Result<Self> {
        Self::with_config(Config::builder().capacity(capacity).build())
    }

    /// Create an unloaded engine from a config
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let store = RecordStore::create(config.capacity)?;
        let index = NameIndex::with_buckets(config.capacity)?;
        let log = ChangeLog::new()?;

        debug!(capacity = config.capacity, "Engine created");

        Ok(Self {
            config,
            state: EngineState::Unloaded,
            store,
            index,
            log,
            file: None,
            dirty: false,
        })
    }

    /// Bind a data file and populate the store from it
    ///
    /// On startup:
    /// 1. Open/create the data file and validate its header
    /// 2. Load `record_count` records into a fresh store
    /// 3. Replay the WAL (if any) and persist what it recovered
    /// 4. Rebuild the name index and attach the WAL writer
    ///
    /// Everything is staged on the side; on error the engine stays Unloaded
    /// with its store, index and log untouched, and the file is released.
    ///
    /// ## Errors
    /// - `Io`, `CorruptFile`, `TruncatedFile` for an unreadable or malformed file
    /// - `StoreFull` when the header counts more records than this engine's
    ///   capacity (the file is left as is; reload with a larger capacity)
    /// - `WalCorruption` when a recovered WAL entry cannot be replayed
    /// - `AlreadyLoaded` / `Closed` from the wrong state
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        match self.state {
            EngineState::Unloaded => {}
            EngineState::Loaded => return Err(StoreError::AlreadyLoaded),
            EngineState::Closed => return Err(StoreError::Closed),
        }

        let path = path.as_ref();
        let mut file = DataFile::open(path)?;

        let record_count = file.header().record_count;
        if record_count > self.config.capacity as u64 {
            return Err(StoreError::StoreFull {
                capacity: self.config.capacity,
            });
        }

        let mut store = RecordStore::create(self.config.capacity)?;
        for (slot, record) in file.load(record_count)?.into_iter().enumerate() {
            let slot = slot as u64;
            if record.id != slot {
                return Err(StoreError::CorruptFile(format!(
                    "record in slot {} has id {}",
                    slot, record.id
                )));
            }
            store.put(slot, record)?;
        }

        // A WAL left by an earlier session is replayed even when this engine
        // runs without one, then removed so no later load can replay it over
        // newer saves.
        let wal_path = Config::wal_path_for(path);
        if wal_path.exists() {
            let (entries, result) = WalRecovery::recover(&wal_path)?;
            if !entries.is_empty() {
                info!(
                    recovered = result.entries_recovered,
                    corrupted = result.entries_corrupted,
                    last_lsn = result.last_lsn,
                    "Replaying WAL"
                );
                Self::replay(&mut store, &entries)?;

                // Make the recovered state durable before the WAL is reused
                file.save(store.records())?;
            }

            if !self.config.wal_enabled {
                fs::remove_file(&wal_path)?;
                info!(path = %wal_path.display(), "Removed WAL while running without one");
            }
        }

        let mut index = NameIndex::with_buckets(self.config.capacity)?;
        index.rebuild(&store)?;

        if self.config.wal_enabled {
            let mut wal = WalWriter::open(&wal_path, self.config.wal_sync_strategy)?;
            wal.truncate()?;
            self.log.attach(wal);
        }

        info!(
            path = %path.display(),
            records = store.count(),
            alive = index.len(),
            "Loaded data file"
        );

        self.store = store;
        self.index = index;
        self.file = Some(file);
        self.state = EngineState::Loaded;
        self.dirty = false;
        Ok(())
    }

    /// Load the config's default data file
    pub fn load_default(&mut self) -> Result<()> {
        let path = self.config.default_path.clone();
        self.load(path)
    }

    /// Add a record with sampled cpu/ram usage
    pub fn add(&mut self, name: &str) -> Result<&Record> {
        let mut rng = rand::thread_rng();
        let cpu = rng.gen_range(0..SAMPLED_CPU_LIMIT);
        let ram = rng.gen_range(0..SAMPLED_RAM_LIMIT);
        self.add_with_usage(name, cpu, ram)
    }

    /// Add a record with explicit cpu/ram usage
    ///
    /// Steps:
    /// 1. Validate (capacity, name, uniqueness, usage)
    /// 2. Write the Add entry to the change log (WAL first)
    /// 3. Commit to store and index
    pub fn add_with_usage(&mut self, name: &str, cpu: u32, ram: u32) -> Result<&Record> {
        self.ensure_loaded()?;

        if self.store.is_full() {
            return Err(StoreError::StoreFull {
                capacity: self.store.capacity(),
            });
        }
        let name = RecordName::new(name)?;
        if self.index.contains(name.as_str()) {
            return Err(StoreError::DuplicateName(name.to_string()));
        }

        let record = self.store.next_record(name.clone(), cpu, ram)?;
        let slot = record.id;

        self.log.record(Operation::Add {
            slot,
            record: record.clone(),
        })?;
        self.store.put(slot, record)?;
        self.index.insert(name, slot)?;
        self.dirty = true;

        debug!(slot, cpu, ram, "Added record");
        self.store.get(slot)
    }

    /// Delete a record by name (tombstone; the slot is kept)
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.ensure_loaded()?;

        let slot = self.index.find(name)?;
        self.log.record(Operation::Delete { slot })?;
        self.store.delete(slot)?;
        self.index.remove(name)?;
        self.dirty = true;

        debug!(slot, name, "Deleted record");
        Ok(())
    }

    /// Overwrite the usage of an alive record
    pub fn update(&mut self, name: &str, cpu: u32, ram: u32) -> Result<&Record> {
        self.ensure_loaded()?;

        let slot = self.index.find(name)?;
        let mut record = self.store.get(slot)?.clone();
        record.cpu = validate_usage(cpu)?;
        record.ram = validate_usage(ram)?;

        self.log.record(Operation::Update { slot, record })?;
        self.store.update_usage(slot, cpu, ram)?;
        self.dirty = true;

        debug!(slot, cpu, ram, "Updated record");
        self.store.get(slot)
    }

    /// Find an alive record by name
    pub fn find(&self, name: &str) -> Result<&Record> {
        self.ensure_open()?;
        let slot = self.index.find(name)?;
        self.store.get(slot)
    }

    /// Alive records in slot order
    pub fn list(&self) -> Result<AliveRecords<'_>> {
        self.ensure_open()?;
        Ok(self.store.iter_alive())
    }

    /// Persist if there are unsaved changes
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_loaded()?;
        if !self.dirty {
            return Ok(());
        }
        self.save()
    }

    /// Persist unconditionally
    ///
    /// Steps:
    /// 1. Rewrite the data file (records, sync, header)
    /// 2. Clear the change log and truncate the WAL
    ///
    /// On failure the dirty flag stays set so the caller can retry.
    pub fn save(&mut self) -> Result<()> {
        self.ensure_loaded()?;

        let file = self.file.as_mut().ok_or(StoreError::NotLoaded)?;
        file.save(self.store.records())?;
        self.log.clear()?;
        self.dirty = false;

        info!(records = self.store.count(), "Saved engine state");
        Ok(())
    }

    /// Release every resource; idempotent
    ///
    /// Commits the header and closes the data file, closes the WAL, and frees
    /// the store, index and log. Resources are released even when closing
    /// one of them fails; the first error is returned.
    pub fn destroy(&mut self) -> Result<()> {
        if self.state == EngineState::Closed {
            return Ok(());
        }

        if self.dirty {
            warn!(pending = self.log.len(), "Destroying engine with unsaved changes");
        }

        let file_result = match self.file.take() {
            Some(file) => file.close(),
            None => Ok(()),
        };
        let log_result = self.log.release();

        self.store = RecordStore::default();
        self.index = NameIndex::default();
        self.state = EngineState::Closed;
        self.dirty = false;

        debug!("Engine destroyed");
        file_result.and(log_result)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Occupied slots (alive + tombstoned)
    pub fn record_count(&self) -> usize {
        self.store.count()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Header of the bound data file
    pub fn header(&self) -> Option<&FileHeader> {
        self.file.as_ref().map(DataFile::header)
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Redo WAL entries against a store loaded from the last persisted state
    ///
    /// Entries carry full record images, so replaying an entry that already
    /// reached the data file is harmless.
    fn replay(store: &mut RecordStore, entries: &[WalEntry]) -> Result<()> {
        for entry in entries {
            let applied = match &entry.operation {
                Operation::Add { slot, record } | Operation::Update { slot, record } => {
                    if record.id != *slot {
                        return Err(StoreError::WalCorruption(format!(
                            "entry {}: record id {} does not match slot {}",
                            entry.lsn, record.id, slot
                        )));
                    }
                    store.put(*slot, record.clone())
                }
                Operation::Delete { slot } => store.delete(*slot),
            };

            applied.map_err(|e| {
                StoreError::WalCorruption(format!("entry {} cannot be replayed: {}", entry.lsn, e))
            })?;
        }
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        match self.state {
            EngineState::Loaded => Ok(()),
            EngineState::Unloaded => Err(StoreError::NotLoaded),
            EngineState::Closed => Err(StoreError::Closed),
        }
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            EngineState::Closed => Err(StoreError::Closed),
            _ => Ok(()),
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            warn!(error = %e, "Failed to release engine resources on drop");
        }
    }
}
