//! Data file handle
//!
//! Owns the open file for the lifetime of a loaded engine. The header is
//! committed whenever the handle is released, including on drop.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BytesMut};
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::record::{Record, RECORD_SIZE};

use super::{FileHeader, HEADER_SIZE};

/// Leading bytes holding the magic number
const MAGIC_SIZE: usize = 4;

/// An open data file and its in-memory header
#[derive(Debug)]
pub struct DataFile {
    path: PathBuf,

    /// `None` once the handle has been released
    file: Option<File>,

    header: FileHeader,
}

impl DataFile {
    /// Open an existing data file, or create one with a fresh header
    ///
    /// A file with a bad magic or version is rejected before anything is
    /// written to it.
    pub fn open(path: &Path) -> Result<Self> {
        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => Self::open_existing(path, file),
            Err(e) if e.kind() == ErrorKind::NotFound => Self::create(path),
            Err(e) => Err(e.into()),
        }
    }

    fn open_existing(path: &Path, mut file: File) -> Result<Self> {
        let file_len = file.metadata()?.len();
        let available = file_len.min(HEADER_SIZE as u64) as usize;

        let mut bytes = [0u8; HEADER_SIZE];
        file.read_exact(&mut bytes[..available])?;

        // A foreign file is corrupt, not truncated, however short it is
        if available >= MAGIC_SIZE {
            let mut prefix = &bytes[..MAGIC_SIZE];
            FileHeader::check_magic(prefix.get_u32_le())?;
        }
        if available < HEADER_SIZE {
            return Err(StoreError::TruncatedFile {
                expected: HEADER_SIZE as u64,
                found: file_len,
            });
        }

        let header = FileHeader::decode(&bytes)?;
        header.validate()?;

        debug!(
            path = %path.display(),
            record_count = header.record_count,
            created_at = header.created_at,
            "Opened data file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
            header,
        })
    }

    fn create(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        let mut data_file = Self {
            path: path.to_path_buf(),
            file: Some(file),
            header: FileHeader::new(),
        };
        data_file.commit_header()?;

        info!(path = %path.display(), "Created new data file");
        Ok(data_file)
    }

    /// Read exactly `count` records starting right after the header
    pub fn load(&mut self, count: u64) -> Result<Vec<Record>> {
        let region_len = count
            .checked_mul(RECORD_SIZE as u64)
            .ok_or_else(|| StoreError::CorruptFile(format!("record count {} overflows", count)))?;
        let expected = HEADER_SIZE as u64 + region_len;

        let file = self.file_mut()?;
        let found = file.metadata()?.len();
        if found < expected {
            return Err(StoreError::TruncatedFile { expected, found });
        }

        let mut region = Vec::new();
        region.try_reserve_exact(region_len as usize)?;
        region.resize(region_len as usize, 0);

        file.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        file.read_exact(&mut region)?;

        let mut records = Vec::new();
        records.try_reserve_exact(count as usize)?;

        let mut buf = region.as_slice();
        for _ in 0..count {
            records.push(Record::decode(&mut buf)?);
        }

        Ok(records)
    }

    /// Rewrite the full record region, sync it, then commit the header
    ///
    /// Records go to stable storage before the header that counts them, so
    /// a crash in between leaves the previous `record_count` in effect.
    pub fn save(&mut self, records: &[Record]) -> Result<()> {
        let mut buf = BytesMut::with_capacity(records.len() * RECORD_SIZE);
        for record in records {
            record.encode(&mut buf);
        }

        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(HEADER_SIZE as u64))?;
        file.write_all(&buf)?;
        file.set_len((HEADER_SIZE + buf.len()) as u64)?;
        file.sync_data()?;

        self.header.record_count = records.len() as u64;
        self.commit_header()?;

        debug!(
            path = %self.path.display(),
            record_count = self.header.record_count,
            bytes = buf.len(),
            "Saved data file"
        );
        Ok(())
    }

    /// Write the header at offset 0 and sync
    pub fn commit_header(&mut self) -> Result<()> {
        let bytes = self.header.encode();
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&bytes)?;
        file.sync_data()?;
        Ok(())
    }

    /// Commit the header and release the file handle
    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                ErrorKind::Other,
                "data file handle already released",
            ))
        })
    }

    /// Commit the header, then drop the handle whether or not that worked
    fn release(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Ok(());
        }
        let result = self.commit_header();
        self.file = None;
        result
    }
}

impl Drop for DataFile {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(path = %self.path.display(), error = %e, "Failed to commit header on drop");
        }
    }
}
