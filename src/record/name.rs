//! Bounded record name
//!
//! Names live in a 64-byte NUL-padded field on disk, so the in-memory type
//! enforces the same bound up front instead of truncating at write time.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A validated record name: non-empty, at most 63 bytes, no NUL bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordName(String);

impl RecordName {
    /// Longest accepted name in bytes (one byte of the field is the terminator)
    pub const MAX_LEN: usize = 63;

    /// Validate and wrap a name. Overlong input is rejected, never truncated.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(StoreError::InvalidName("name is empty".to_string()));
        }
        if name.len() > Self::MAX_LEN {
            return Err(StoreError::InvalidName(format!(
                "name is {} bytes (max {})",
                name.len(),
                Self::MAX_LEN
            )));
        }
        if name.as_bytes().contains(&0) {
            return Err(StoreError::InvalidName(
                "name contains a NUL byte".to_string(),
            ));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed name
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<String> for RecordName {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RecordName {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RecordName> for String {
    fn from(name: RecordName) -> Self {
        name.0
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RecordName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
