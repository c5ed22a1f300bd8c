//! Error types for procdb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for procdb operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Capacity / Allocation Errors
    // -------------------------------------------------------------------------
    #[error("Invalid capacity {requested}: must be below {max}")]
    CapacityInvalid { requested: usize, max: usize },

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("Record store is full (capacity {capacity})")]
    StoreFull { capacity: usize },

    // -------------------------------------------------------------------------
    // Record Errors
    // -------------------------------------------------------------------------
    #[error("Invalid record name: {0}")]
    InvalidName(String),

    #[error("Record name already in use: {0}")]
    DuplicateName(String),

    #[error("Invalid usage value {0}: must be a percentage 0-100")]
    InvalidUsage(u32),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Slot {slot} out of range (count {count})")]
    SlotOutOfRange { slot: u64, count: usize },

    // -------------------------------------------------------------------------
    // I/O and File Format Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt data file: {0}")]
    CorruptFile(String),

    #[error("Truncated data file: expected {expected} bytes, found {found}")]
    TruncatedFile { expected: u64, found: u64 },

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Engine State Errors
    // -------------------------------------------------------------------------
    #[error("Engine has no data file loaded")]
    NotLoaded,

    #[error("Engine already has a data file loaded")]
    AlreadyLoaded,

    #[error("Engine is closed")]
    Closed,

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::collections::TryReserveError> for StoreError {
    fn from(e: std::collections::TryReserveError) -> Self {
        StoreError::OutOfMemory(e.to_string())
    }
}

impl From<bincode::Error> for StoreError {
    fn from(e: bincode::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
