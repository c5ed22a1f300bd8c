//! Record Store Module
//!
//! Fixed-capacity arena of record slots; the in-memory system of record.
//!
//! ## Responsibilities
//! - Reserve every slot up front (no implicit growth)
//! - Append new records at slot `count`, with `id == slot`
//! - Tombstone on delete; slots are never moved or reused
//! - Iterate alive records in slot order
//!
//! ## Slot Layout
//! ```text
//!  0        1        2                count          capacity
//! ┌────────┬────────┬────────┬─ ─ ─ ─┬──────── ─ ─ ─ ┐
//! │ alive  │  dead  │ alive  │  ...   │   unused       │
//! └────────┴────────┴────────┴─ ─ ─ ─┴──────── ─ ─ ─ ┘
//! ```

mod table;

pub use table::{AliveRecords, RecordStore};

/// Hard upper bound on store capacity; `create` rejects anything at or above it
pub const MAX_RECORDS: usize = 100_000;
