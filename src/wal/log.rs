//! Change Log
//!
//! In-memory `{kind, slot}` log of every mutation since the last persist,
//! optionally backed by a durable WAL file.

use tracing::debug;

use crate::error::Result;

use super::{ChangeKind, Operation, WalWriter};

/// Starting capacity of the in-memory log
const INITIAL_CAPACITY: usize = 8;

/// One in-memory change log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEntry {
    pub kind: ChangeKind,
    pub slot: u64,
}

/// Append-only change log
///
/// ## Ordering
/// Entries are appended synchronously in mutation order. When a WAL writer
/// is attached, `record` writes the durable entry before the in-memory one,
/// and the caller applies the mutation only after `record` returns.
pub struct ChangeLog {
    entries: Vec<ChangeEntry>,

    /// Durable sink; `None` means the log is memory-only
    wal: Option<WalWriter>,
}

impl ChangeLog {
    /// Create an empty, memory-only log
    pub fn new() -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(INITIAL_CAPACITY)?;
        Ok(Self { entries, wal: None })
    }

    /// Attach a WAL writer; subsequent `record` calls are durable
    pub fn attach(&mut self, wal: WalWriter) {
        debug!(path = %wal.path().display(), "Attached WAL to change log");
        self.wal = Some(wal);
    }

    /// Log a mutation: WAL first (if attached), then memory
    ///
    /// Returns the WAL LSN, or `None` for a memory-only log.
    pub fn record(&mut self, operation: Operation) -> Result<Option<u64>> {
        let kind = operation.kind();
        let slot = operation.slot();

        let lsn = match self.wal.as_mut() {
            Some(wal) => Some(wal.append(operation)?),
            None => None,
        };
        self.append(kind, slot)?;

        Ok(lsn)
    }

    /// Append an in-memory entry, doubling the backing storage when full
    pub fn append(&mut self, kind: ChangeKind, slot: u64) -> Result<()> {
        if self.entries.len() == self.entries.capacity() {
            let grow_by = self.entries.capacity().max(INITIAL_CAPACITY);
            self.entries.try_reserve_exact(grow_by)?;
        }
        self.entries.push(ChangeEntry { kind, slot });
        Ok(())
    }

    /// Forget every entry once the data file is durable
    ///
    /// Truncates the WAL, then resets the in-memory length while keeping its
    /// capacity.
    pub fn clear(&mut self) -> Result<()> {
        if let Some(wal) = self.wal.as_mut() {
            wal.truncate()?;
        }
        self.entries.clear();
        Ok(())
    }

    /// Sync and close the WAL, and free the in-memory entries
    ///
    /// Memory is released even if closing the WAL fails.
    pub fn release(&mut self) -> Result<()> {
        self.entries = Vec::new();
        match self.wal.take() {
            Some(wal) => wal.close(),
            None => Ok(()),
        }
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Whether mutations reach a WAL file
    pub fn is_durable(&self) -> bool {
        self.wal.is_some()
    }

    pub fn wal(&self) -> Option<&WalWriter> {
        self.wal.as_ref()
    }
}
