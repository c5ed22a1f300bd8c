//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Result, StoreError};

use super::entry::EntryHeader;
use super::{WalEntry, HEADER_SIZE};

/// Outcome of reading one frame from the WAL
#[derive(Debug)]
pub(crate) enum Frame {
    /// A complete entry with a valid checksum
    Entry(WalEntry),

    /// Clean end of file
    End,

    /// The file ends in the middle of an entry (crash during append)
    Torn { offset: u64 },

    /// A complete frame that fails its checksum or cannot be decoded
    Corrupt { offset: u64, reason: String },
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,

    /// Byte offset just past the last entry read successfully
    position: u64,

    /// File length at open time
    file_len: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();

        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
            file_len,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// Returns `Ok(None)` at a clean end of file; torn or corrupt entries
    /// are reported as `WalCorruption`.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.next_frame()? {
            Frame::Entry(entry) => Ok(Some(entry)),
            Frame::End => Ok(None),
            Frame::Torn { offset } => Err(StoreError::WalCorruption(format!(
                "partial entry at offset {}",
                offset
            ))),
            Frame::Corrupt { offset, reason } => Err(StoreError::WalCorruption(format!(
                "at offset {}: {}",
                offset, reason
            ))),
        }
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Offset just past the last valid entry
    pub fn position(&self) -> u64 {
        self.position
    }

    /// File length at open time
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Read and classify the next frame; only real I/O failures are errors
    pub(crate) fn next_frame(&mut self) -> Result<Frame> {
        let offset = self.position;
        let remaining = self.file_len - offset;

        if remaining == 0 {
            return Ok(Frame::End);
        }
        if remaining < HEADER_SIZE as u64 {
            return Ok(Frame::Torn { offset });
        }

        let mut header_bytes = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header_bytes)?;

        let header = match EntryHeader::parse(&header_bytes) {
            Ok(header) => header,
            Err(e) => {
                return Ok(Frame::Corrupt {
                    offset,
                    reason: e.to_string(),
                })
            }
        };

        let frame_len = HEADER_SIZE as u64 + u64::from(header.len);
        if remaining < frame_len {
            return Ok(Frame::Torn { offset });
        }

        let mut payload = vec![0u8; header.len as usize];
        self.reader.read_exact(&mut payload)?;

        match WalEntry::from_parts(header, &payload) {
            Ok(entry) => {
                self.position += frame_len;
                Ok(Frame::Entry(entry))
            }
            Err(e) => Ok(Frame::Corrupt {
                offset,
                reason: e.to_string(),
            }),
        }
    }
}

/// Iterator over WAL entries; stops after the first error
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
