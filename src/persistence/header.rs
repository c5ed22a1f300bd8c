//! Data file header

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Buf, BufMut};

use crate::error::{Result, StoreError};

/// Magic number identifying a data file (bytes "IGNE" on disk)
pub const MAGIC: u32 = 1_162_757_961;

/// Current data file format version
pub const VERSION: u32 = 1;

/// Header size: Magic (4) + Version (4) + RecordCount (8) + CreatedAt (8)
pub const HEADER_SIZE: usize = 24;

/// Fixed-layout metadata block at offset 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u32,

    /// Number of record slots stored after the header
    pub record_count: u64,

    /// File creation time, seconds since the epoch
    pub created_at: u64,
}

impl FileHeader {
    /// Header for a brand-new, empty file
    pub fn new() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            record_count: 0,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        let mut buf = &mut bytes[..];
        buf.put_u32_le(self.magic);
        buf.put_u32_le(self.version);
        buf.put_u64_le(self.record_count);
        buf.put_u64_le(self.created_at);
        bytes
    }

    /// Decode a header without validating it
    pub fn decode(mut bytes: &[u8]) -> Result<Self> {
        if bytes.remaining() < HEADER_SIZE {
            return Err(StoreError::TruncatedFile {
                expected: HEADER_SIZE as u64,
                found: bytes.remaining() as u64,
            });
        }

        Ok(Self {
            magic: bytes.get_u32_le(),
            version: bytes.get_u32_le(),
            record_count: bytes.get_u64_le(),
            created_at: bytes.get_u64_le(),
        })
    }

    /// Reject files written by something else or by another format version
    pub fn validate(&self) -> Result<()> {
        Self::check_magic(self.magic)?;
        if self.version != VERSION {
            return Err(StoreError::CorruptFile(format!(
                "unsupported version {} (expected {})",
                self.version, VERSION
            )));
        }
        Ok(())
    }

    /// Reject a file whose leading four bytes are not the magic number
    pub fn check_magic(magic: u32) -> Result<()> {
        if magic != MAGIC {
            return Err(StoreError::CorruptFile(format!(
                "bad magic: expected {:#010x}, got {:#010x}",
                MAGIC, magic
            )));
        }
        Ok(())
    }
}

impl Default for FileHeader {
    fn default() -> Self {
        Self::new()
    }
}
