//! Record Module
//!
//! The fixed-schema process record and its on-disk encoding.
//!
//! ## Record Layout (88 bytes, little-endian)
//! ```text
//! ┌──────────────────────────┬──────────┬─────────┬─────────┬───────────┬─────────┐
//! │ Name (64, NUL-padded)    │ Id (8)   │ Cpu (4) │ Ram (4) │ Alive (4) │ Pad (4) │
//! └──────────────────────────┴──────────┴─────────┴─────────┴───────────┴─────────┘
//! ```
//! The trailing pad keeps the record 8-byte aligned, so files match the
//! `repr(C)` layout of the same struct on 64-bit hosts.

mod name;

pub use name::RecordName;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Size of the NUL-padded name field
pub const NAME_FIELD_SIZE: usize = 64;

/// Size of one serialized record
pub const RECORD_SIZE: usize = 88;

/// Trailing alignment padding after the alive flag
const PADDING_SIZE: usize = RECORD_SIZE - (NAME_FIELD_SIZE + 8 + 4 + 4 + 4);

/// Upper bound for cpu/ram usage values
pub const MAX_USAGE: u32 = 100;

/// A single process record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique (among alive records) process name
    pub name: RecordName,

    /// Slot number assigned at creation; never changes
    pub id: u64,

    /// CPU usage percentage (0-100)
    pub cpu: u32,

    /// RAM usage percentage (0-100)
    pub ram: u32,

    /// False once the record has been deleted (tombstone)
    pub alive: bool,
}

impl Record {
    /// Create a new alive record
    pub fn new(name: RecordName, id: u64, cpu: u32, ram: u32) -> Self {
        Self {
            name,
            id,
            cpu,
            ram,
            alive: true,
        }
    }

    /// Encode into the fixed on-disk layout
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        let mut name = [0u8; NAME_FIELD_SIZE];
        let bytes = self.name.as_bytes();
        name[..bytes.len()].copy_from_slice(bytes);

        buf.put_slice(&name);
        buf.put_u64_le(self.id);
        buf.put_u32_le(self.cpu);
        buf.put_u32_le(self.ram);
        buf.put_i32_le(i32::from(self.alive));
        buf.put_bytes(0, PADDING_SIZE);
    }

    /// Decode one record from the fixed on-disk layout
    pub fn decode<B: Buf>(buf: &mut B) -> Result<Self> {
        if buf.remaining() < RECORD_SIZE {
            return Err(StoreError::CorruptFile(format!(
                "record needs {} bytes, only {} available",
                RECORD_SIZE,
                buf.remaining()
            )));
        }

        let mut name = [0u8; NAME_FIELD_SIZE];
        buf.copy_to_slice(&mut name);
        let id = buf.get_u64_le();
        let cpu = buf.get_u32_le();
        let ram = buf.get_u32_le();
        let alive = buf.get_i32_le() != 0;
        buf.advance(PADDING_SIZE);

        let name_len = name.iter().position(|&b| b == 0).unwrap_or(NAME_FIELD_SIZE);
        let name = std::str::from_utf8(&name[..name_len])
            .map_err(|e| StoreError::CorruptFile(format!("record {}: name is not UTF-8: {}", id, e)))
            .and_then(|s| {
                RecordName::new(s)
                    .map_err(|e| StoreError::CorruptFile(format!("record {}: {}", id, e)))
            })?;

        if cpu > MAX_USAGE || ram > MAX_USAGE {
            return Err(StoreError::CorruptFile(format!(
                "record {}: usage out of range (cpu {}, ram {})",
                id, cpu, ram
            )));
        }

        Ok(Self {
            name,
            id,
            cpu,
            ram,
            alive,
        })
    }
}

/// Check that a usage value is a percentage
pub fn validate_usage(value: u32) -> Result<u32> {
    if value > MAX_USAGE {
        return Err(StoreError::InvalidUsage(value));
    }
    Ok(value)
}
