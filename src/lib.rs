//! # procdb
//!
//! A single-table process record store with:
//! - Fixed-capacity, slot-addressed record storage in memory
//! - O(1) name lookup through a chained hash index
//! - Write-Ahead Logging (WAL) so unflushed mutations survive a crash
//! - A flat binary data file (header + records) persisted on demand
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Caller (procdb CLI)                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ add / delete / update / find / list / flush
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Engine                               │
//! │            (Unloaded → Loaded → Closed, &mut self)           │
//! └──────┬──────────────────┬──────────────────┬────────────────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────────┐
//! │ Change Log  │   │ Record Store│◄──│   Name Index    │
//! │ (WAL file)  │   │   (slots)   │   │ (hash chains)   │
//! └─────────────┘   └──────┬──────┘   └─────────────────┘
//!                          │ flush / load
//!                          ▼
//!                  ┌───────────────┐
//!                  │   Data File   │
//!                  │(header+records)│
//!                  └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod store;
pub mod index;
pub mod wal;
pub mod persistence;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::Config;
pub use engine::{Engine, EngineState};
pub use record::{Record, RecordName};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of procdb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
