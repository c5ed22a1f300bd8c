//! WAL Writer
//!
//! Handles appending entries to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::WalSyncStrategy;
use crate::error::{Result, StoreError};

use super::{Operation, WalEntry, WalRecovery};

/// Writes entries to the WAL file
pub struct WalWriter {
    path: PathBuf,

    writer: BufWriter<File>,

    /// LSN the next appended entry will get
    current_lsn: u64,

    sync_strategy: WalSyncStrategy,

    /// Entries written since the last fsync
    uncommitted: usize,
}

impl WalWriter {
    /// Open or create a WAL file
    ///
    /// An existing file is scanned so numbering resumes after its last valid
    /// entry; any torn tail is cut off first so new entries stay reachable.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let last_lsn = if path.exists() {
            let (_, result) = WalRecovery::recover(path)?;
            result.last_lsn
        } else {
            0
        };

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(path)?;
        file.seek(SeekFrom::End(0))?;

        debug!(path = %path.display(), next_lsn = last_lsn + 1, "Opened WAL writer");

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            current_lsn: last_lsn + 1,
            sync_strategy,
            uncommitted: 0,
        })
    }

    /// Append an entry to the WAL, returning its LSN
    ///
    /// With `EveryWrite` the entry is on stable storage when this returns.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        let lsn = self.current_lsn;
        let bytes = WalEntry::new(lsn, operation).serialize()?;

        self.writer.write_all(&bytes)?;
        self.current_lsn += 1;
        self.uncommitted += 1;

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.uncommitted >= count,
        };
        if should_sync {
            self.sync()?;
        }

        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_ref().sync_data()?;
        self.uncommitted = 0;
        Ok(())
    }

    /// Discard every entry and restart numbering at 1
    ///
    /// Only valid once the logged mutations are durable elsewhere.
    pub fn truncate(&mut self) -> Result<()> {
        self.writer.flush()?;

        let file = self.writer.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.sync_all()?;

        self.current_lsn = 1;
        self.uncommitted = 0;
        debug!(path = %self.path.display(), "Truncated WAL");
        Ok(())
    }

    /// Get the LSN the next entry will receive
    pub fn current_lsn(&self) -> u64 {
        self.current_lsn
    }

    /// Entries written but not yet fsynced
    pub fn uncommitted_count(&self) -> usize {
        self.uncommitted
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and fsync, then release the file
    pub fn close(mut self) -> Result<()> {
        self.sync()?;
        self.writer
            .into_inner()
            .map_err(|e| StoreError::Io(e.into_error()))?;
        Ok(())
    }
}
