//! File Persistence Module
//!
//! The flat binary data file: a fixed header followed by every record slot.
//!
//! ## Responsibilities
//! - Create a fresh file with an initialized header, or validate an existing one
//! - Load exactly `record_count` records after the header
//! - Rewrite the whole record region on save, then commit the header
//! - Commit the header and release the handle on every exit path
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ Header (24 bytes, little-endian)                                 │
//! │   Magic: u32 (4) | Version: u32 (4) | RecordCount: u64 (8)       │
//! │   CreatedAt: u64 seconds since epoch (8)                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │ Records (RecordCount × 88 bytes, slot order)                     │
//! │   Name[64] | Id: u64 | Cpu: u32 | Ram: u32 | Alive: i32 | Pad(4) │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

mod file;
mod header;

pub use file::DataFile;
pub use header::{FileHeader, HEADER_SIZE, MAGIC, VERSION};
