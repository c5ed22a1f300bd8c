//! Write-Ahead Log (WAL) Module
//!
//! The change log: every mutation since the last persist, in causal order.
//!
//! ## Responsibilities
//! - Keep the in-memory `{kind, slot}` change log (doubling growth)
//! - Append a durable entry to the WAL file before a mutation is acknowledged
//! - CRC32 checksums for corruption detection
//! - Log Sequence Numbers (LSN) for ordering
//! - Crash recovery: read back valid entries, cut off torn tails
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Entry 1                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! ├─────────────────────────────────────────┤
//! │ Entry 2                                 │
//! │ ┌─────────┬─────────┬────────┬────────┐ │
//! │ │ LSN (8) │ CRC (4) │Len (4) │ Data   │ │
//! │ └─────────┴─────────┴────────┴────────┘ │
//! └─────────────────────────────────────────┘
//! ```
//! `Data` is bincode of `(timestamp_ms, Operation)`. The CRC covers the LSN,
//! the length and the data.

mod entry;
mod log;
mod writer;
mod reader;
mod recovery;

pub use entry::{ChangeKind, Operation, WalEntry, HEADER_SIZE, MAX_PAYLOAD_SIZE};
pub use log::{ChangeEntry, ChangeLog};
pub use writer::WalWriter;
pub use reader::{WalIterator, WalReader};
pub use recovery::{RecoveryResult, WalRecovery};
