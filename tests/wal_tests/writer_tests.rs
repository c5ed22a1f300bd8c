//! Tests for WAL Writer and Reader
//!
//! These tests verify:
//! - Writing entries to WAL
//! - LSN generation and sequencing (including resume after reopen)
//! - Sync strategies (EveryWrite, EveryNEntries)
//! - Truncation
//! - Reading entries back

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use procdb::config::WalSyncStrategy;
use procdb::record::{Record, RecordName};
use procdb::wal::{Operation, WalReader, WalWriter};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_wal() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn add(slot: u64) -> Operation {
    Operation::Add {
        slot,
        record: Record::new(RecordName::new(format!("proc{}", slot)).unwrap(), slot, 1, 2),
    }
}

// =============================================================================
// Basic Writing Tests
// =============================================================================

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();

    let writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    assert!(wal_path.exists());
    assert_eq!(writer.current_lsn(), 1);
}

#[test]
fn test_write_single_entry() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    let lsn = writer.append(add(0)).unwrap();

    assert_eq!(lsn, 1);
    assert_eq!(writer.current_lsn(), 2);
}

#[test]
fn test_lsn_sequential() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    for i in 0..100u64 {
        let lsn = writer.append(add(i)).unwrap();
        assert_eq!(lsn, i + 1);
    }
}

#[test]
fn test_reopen_resumes_lsn() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
        writer.append(Operation::Delete { slot: 0 }).unwrap();
    }

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
    assert_eq!(writer.current_lsn(), 3);
    assert_eq!(writer.append(add(1)).unwrap(), 3);
}

#[test]
fn test_reopen_cuts_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[0xAB; 7]).unwrap();
    }

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        assert_eq!(writer.append(add(1)).unwrap(), 2);
    }

    // The new entry must be readable, not hidden behind the garbage
    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().collect::<Result<Vec<_>, _>>().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1].lsn, 2);
}

// =============================================================================
// Sync Strategy Tests
// =============================================================================

#[test]
fn test_sync_every_write() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(add(0)).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(add(1)).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

#[test]
fn test_sync_every_n_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 5 }).unwrap();

    for i in 0..4 {
        writer.append(add(i)).unwrap();
    }
    assert_eq!(writer.uncommitted_count(), 4);

    // 5th entry triggers sync
    writer.append(add(4)).unwrap();
    assert_eq!(writer.uncommitted_count(), 0);

    writer.append(add(5)).unwrap();
    assert_eq!(writer.uncommitted_count(), 1);
}

#[test]
fn test_manual_sync() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();

    for i in 0..10 {
        writer.append(add(i)).unwrap();
    }
    assert_eq!(writer.uncommitted_count(), 10);

    writer.sync().unwrap();
    assert_eq!(writer.uncommitted_count(), 0);
}

// =============================================================================
// Write + Read Integration Tests
// =============================================================================

#[test]
fn test_write_then_read() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
        writer.append(add(1)).unwrap();
        writer.append(Operation::Delete { slot: 0 }).unwrap();
    }

    let mut reader = WalReader::open(&wal_path).unwrap();

    let entry1 = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry1.lsn, 1);
    assert_eq!(entry1.operation, add(0));

    let entry2 = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry2.lsn, 2);

    let entry3 = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry3.lsn, 3);
    assert_eq!(entry3.operation, Operation::Delete { slot: 0 });

    // EOF
    assert!(reader.next_entry().unwrap().is_none());
    assert_eq!(reader.position(), reader.file_len());
}

#[test]
fn test_write_read_many_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let entry_count = 1000;

    {
        let mut writer =
            WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();
        for i in 0..entry_count {
            writer.append(add(i)).unwrap();
        }
        writer.sync().unwrap();
    }

    let reader = WalReader::open(&wal_path).unwrap();
    let entries: Vec<_> = reader.entries().collect::<Result<Vec<_>, _>>().unwrap();

    assert_eq!(entries.len(), entry_count as usize);
    for (i, entry) in entries.iter().enumerate() {
        assert_eq!(entry.lsn, (i + 1) as u64);
    }
}

#[test]
fn test_reader_reports_torn_tail() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&wal_path).unwrap();
        file.write_all(&[0u8; 5]).unwrap();
    }

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
    assert!(reader.next_entry().is_err());
}

// =============================================================================
// Truncate Tests
// =============================================================================

#[test]
fn test_truncate_resets_lsn() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();

    writer.append(add(0)).unwrap();
    writer.append(add(1)).unwrap();
    assert_eq!(writer.current_lsn(), 3);

    writer.truncate().unwrap();
    assert_eq!(writer.current_lsn(), 1);
    assert_eq!(writer.uncommitted_count(), 0);

    assert_eq!(writer.append(add(2)).unwrap(), 1);
}

#[test]
fn test_truncate_clears_file() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
        writer.append(add(1)).unwrap();
        writer.truncate().unwrap();
    }

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_truncate_then_write() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let mut writer = WalWriter::open(&wal_path, WalSyncStrategy::EveryWrite).unwrap();
        writer.append(add(0)).unwrap();
        writer.truncate().unwrap();
        writer.append(Operation::Delete { slot: 7 }).unwrap();
    }

    let mut reader = WalReader::open(&wal_path).unwrap();
    let entry = reader.next_entry().unwrap().unwrap();
    assert_eq!(entry.lsn, 1);
    assert_eq!(entry.operation, Operation::Delete { slot: 7 });
    assert!(reader.next_entry().unwrap().is_none());
}

#[test]
fn test_close_flushes_buffered_entries() {
    let (_temp, wal_path) = setup_temp_wal();

    let mut writer =
        WalWriter::open(&wal_path, WalSyncStrategy::EveryNEntries { count: 100 }).unwrap();
    writer.append(add(0)).unwrap();
    writer.close().unwrap();

    let mut reader = WalReader::open(&wal_path).unwrap();
    assert!(reader.next_entry().unwrap().is_some());
}
