//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries and their framing.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::record::Record;

/// Entry header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest payload a reader will accept; record images are well under this
pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024;

/// Kind of mutation, as kept in the in-memory change log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Add,
    Delete,
    Update,
}

/// Operations that can be logged
///
/// Add and Update carry the full record image so replay is a plain redo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// A new record was written at `slot`
    Add { slot: u64, record: Record },

    /// The record at `slot` was tombstoned
    Delete { slot: u64 },

    /// The record at `slot` was rewritten
    Update { slot: u64, record: Record },
}

impl Operation {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Operation::Add { .. } => ChangeKind::Add,
            Operation::Delete { .. } => ChangeKind::Delete,
            Operation::Update { .. } => ChangeKind::Update,
        }
    }

    pub fn slot(&self) -> u64 {
        match self {
            Operation::Add { slot, .. }
            | Operation::Delete { slot }
            | Operation::Update { slot, .. } => *slot,
        }
    }
}

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to replay
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Parsed fixed-size entry header
#[derive(Debug, Clone, Copy)]
pub(crate) struct EntryHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: u32,
}

impl EntryHeader {
    pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(StoreError::WalCorruption(format!(
                "entry header needs {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let lsn = u64::from_le_bytes(read_array(&bytes[0..8]));
        let crc = u32::from_le_bytes(read_array(&bytes[8..12]));
        let len = u32::from_le_bytes(read_array(&bytes[12..16]));

        if len > MAX_PAYLOAD_SIZE {
            return Err(StoreError::WalCorruption(format!(
                "entry {} claims {} payload bytes (max {})",
                lsn, len, MAX_PAYLOAD_SIZE
            )));
        }

        Ok(Self { lsn, crc, len })
    }
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        Self {
            lsn,
            operation,
            timestamp: now_millis(),
        }
    }

    /// Serialize to `[LSN][CRC][Len][Data]`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(&(self.timestamp, &self.operation))?;
        let len = u32::try_from(payload.len())
            .ok()
            .filter(|&len| len <= MAX_PAYLOAD_SIZE)
            .ok_or_else(|| {
                StoreError::Serialization(format!("WAL payload too large: {} bytes", payload.len()))
            })?;

        let crc = Self::compute_crc(self.lsn, len, &payload);

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&self.lsn.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&len.to_le_bytes());
        bytes.extend_from_slice(&payload);

        Ok(bytes)
    }

    /// Deserialize one entry from the start of `bytes`
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let header = EntryHeader::parse(bytes)?;
        let end = HEADER_SIZE + header.len as usize;
        if bytes.len() < end {
            return Err(StoreError::WalCorruption(format!(
                "entry {} truncated: need {} bytes, got {}",
                header.lsn,
                end,
                bytes.len()
            )));
        }

        Self::from_parts(header, &bytes[HEADER_SIZE..end])
    }

    /// Size of this entry once serialized
    pub fn serialized_size(&self) -> Result<usize> {
        let payload = bincode::serialized_size(&(self.timestamp, &self.operation))?;
        Ok(HEADER_SIZE + payload as usize)
    }

    /// CRC32 over LSN, length and payload
    pub fn compute_crc(lsn: u64, len: u32, payload: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&lsn.to_le_bytes());
        hasher.update(&len.to_le_bytes());
        hasher.update(payload);
        hasher.finalize()
    }

    /// Verify the checksum and decode the payload
    pub(crate) fn from_parts(header: EntryHeader, payload: &[u8]) -> Result<Self> {
        let crc = Self::compute_crc(header.lsn, header.len, payload);
        if crc != header.crc {
            return Err(StoreError::WalCorruption(format!(
                "CRC mismatch on entry {}: stored {:#010x}, computed {:#010x}",
                header.lsn, header.crc, crc
            )));
        }

        let (timestamp, operation): (u64, Operation) = bincode::deserialize(payload)
            .map_err(|e| StoreError::WalCorruption(format!("entry {}: {}", header.lsn, e)))?;

        Ok(Self {
            lsn: header.lsn,
            operation,
            timestamp,
        })
    }
}

fn read_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
