//! Name Index Module
//!
//! Chained hash table from record name to store slot.
//!
//! ## Responsibilities
//! - O(1) average name → slot lookup
//! - Head-insertion chains: a newer mapping for the same name shadows the
//!   older one for both lookup and removal
//! - Canonical rebuild from the Record Store after load
//!
//! ## Layout
//! ```text
//! buckets[hash(name) % bucket_count]
//!   ┌──────────┬──────────┬──────────┐
//!   │ (a, 0)   │ (q, 7)   │ (a, 9)   │ ◄── head (searched first)
//!   └──────────┴──────────┴──────────┘
//! ```
//! Each chain is a `Vec` whose *end* is the chain head, so head insertion is
//! a push and lookups scan from the back.

mod table;

pub use table::{hash_name, IndexEntry, NameIndex};
