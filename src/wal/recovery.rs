//! WAL Recovery
//!
//! Handles crash recovery by reading back the WAL.

use std::fs::OpenOptions;
use std::path::Path;

use tracing::warn;

use crate::error::Result;

use super::reader::{Frame, WalReader};
use super::WalEntry;

/// Handles WAL recovery after crash
pub struct WalRecovery;

/// Result of a recovery operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of entries successfully recovered
    pub entries_recovered: u64,

    /// Number of corrupted entries found (reading stops at the first one)
    pub entries_corrupted: u64,

    /// Last valid LSN (0 if none)
    pub last_lsn: u64,

    /// Whether bytes past the last valid entry were (or would be) cut off
    pub was_truncated: bool,

    /// Length of the valid prefix of the file
    pub valid_len: u64,
}

impl WalRecovery {
    /// Recover entries from a WAL file
    ///
    /// This will:
    /// 1. Read all valid entries in order
    /// 2. Stop at the first corrupted or partial entry
    /// 3. Truncate the file to the last valid entry
    /// 4. Return the valid entries in order
    ///
    /// Reading stops at the first bad entry because later entries may depend
    /// on it; replaying past a gap would break mutation order.
    pub fn recover(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let (entries, result) = Self::scan(path)?;

        if result.was_truncated {
            warn!(
                path = %path.display(),
                valid_len = result.valid_len,
                corrupted = result.entries_corrupted,
                "Truncating WAL after last valid entry"
            );
            let file = OpenOptions::new().write(true).open(path)?;
            file.set_len(result.valid_len)?;
            file.sync_all()?;
        }

        Ok((entries, result))
    }

    /// Verify integrity of a WAL file without modifying it
    pub fn verify(path: &Path) -> Result<RecoveryResult> {
        let (_, result) = Self::scan(path)?;
        Ok(result)
    }

    fn scan(path: &Path) -> Result<(Vec<WalEntry>, RecoveryResult)> {
        let mut reader = WalReader::open(path)?;
        let mut entries = Vec::new();
        let mut result = RecoveryResult::default();

        loop {
            match reader.next_frame()? {
                Frame::Entry(entry) => {
                    result.entries_recovered += 1;
                    result.last_lsn = entry.lsn;
                    entries.push(entry);
                }
                Frame::End => break,
                Frame::Torn { offset } => {
                    warn!(path = %path.display(), offset, "Partial WAL entry at tail");
                    result.was_truncated = true;
                    break;
                }
                Frame::Corrupt { offset, reason } => {
                    warn!(path = %path.display(), offset, %reason, "Corrupted WAL entry");
                    result.entries_corrupted += 1;
                    result.was_truncated = true;
                    break;
                }
            }
        }

        result.valid_len = reader.position();
        Ok((entries, result))
    }
}
