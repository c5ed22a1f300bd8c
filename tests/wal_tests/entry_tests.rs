//! Tests for WAL Entry serialization and deserialization
//!
//! These tests verify:
//! - Serialization for all operation types
//! - CRC32 corruption detection
//! - Edge cases (truncation, malformed headers, oversized lengths)

use procdb::record::{Record, RecordName};
use procdb::wal::{ChangeKind, Operation, WalEntry, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use procdb::StoreError;

fn record(name: &str, slot: u64) -> Record {
    Record::new(RecordName::new(name).unwrap(), slot, 12, 34)
}

// =============================================================================
// Serialization Tests
// =============================================================================

#[test]
fn test_serialize_deserialize_add() {
    let entry = WalEntry::new(
        1,
        Operation::Add {
            slot: 0,
            record: record("nginx", 0),
        },
    );

    let bytes = entry.serialize().unwrap();
    let recovered = WalEntry::deserialize(&bytes).unwrap();

    assert_eq!(entry, recovered);
}

#[test]
fn test_serialize_deserialize_delete() {
    let entry = WalEntry::new(42, Operation::Delete { slot: 9 });

    let bytes = entry.serialize().unwrap();
    let recovered = WalEntry::deserialize(&bytes).unwrap();

    assert_eq!(entry, recovered);
}

#[test]
fn test_serialize_deserialize_update_tombstone_image() {
    let mut image = record("cron", 3);
    image.alive = false;
    let entry = WalEntry::new(7, Operation::Update { slot: 3, record: image });

    let bytes = entry.serialize().unwrap();
    let recovered = WalEntry::deserialize(&bytes).unwrap();

    assert_eq!(entry, recovered);
}

#[test]
fn test_header_layout() {
    let entry = WalEntry::new(0x0102_0304_0506_0708, Operation::Delete { slot: 1 });
    let bytes = entry.serialize().unwrap();

    assert_eq!(&bytes[0..8], &0x0102_0304_0506_0708u64.to_le_bytes());
    let len = u32::from_le_bytes(bytes[12..16].try_into().unwrap()) as usize;
    assert_eq!(bytes.len(), HEADER_SIZE + len);
}

#[test]
fn test_serialized_size_matches() {
    let entry = WalEntry::new(
        1,
        Operation::Add {
            slot: 0,
            record: record("test_key", 0),
        },
    );

    let bytes = entry.serialize().unwrap();
    assert_eq!(bytes.len(), entry.serialized_size().unwrap());
}

#[test]
fn test_operation_kind_and_slot() {
    let add = Operation::Add { slot: 2, record: record("a", 2) };
    let delete = Operation::Delete { slot: 5 };
    let update = Operation::Update { slot: 1, record: record("b", 1) };

    assert_eq!((add.kind(), add.slot()), (ChangeKind::Add, 2));
    assert_eq!((delete.kind(), delete.slot()), (ChangeKind::Delete, 5));
    assert_eq!((update.kind(), update.slot()), (ChangeKind::Update, 1));
}

// =============================================================================
// CRC Corruption Detection Tests
// =============================================================================

#[test]
fn test_crc_corruption_detected() {
    let entry = WalEntry::new(1, Operation::Delete { slot: 3 });
    let mut bytes = entry.serialize().unwrap();

    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let result = WalEntry::deserialize(&bytes);
    assert!(matches!(result, Err(StoreError::WalCorruption(_))));
}

#[test]
fn test_lsn_corruption_detected() {
    let entry = WalEntry::new(1, Operation::Delete { slot: 3 });
    let mut bytes = entry.serialize().unwrap();

    // LSN is covered by the CRC
    bytes[0] ^= 0x01;

    assert!(WalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_crc_field_corruption_detected() {
    let entry = WalEntry::new(1, Operation::Delete { slot: 3 });
    let mut bytes = entry.serialize().unwrap();

    bytes[8] ^= 0xFF;

    assert!(WalEntry::deserialize(&bytes).is_err());
}

// =============================================================================
// Edge Case Tests
// =============================================================================

#[test]
fn test_truncated_entry() {
    let entry = WalEntry::new(1, Operation::Delete { slot: 0 });
    let bytes = entry.serialize().unwrap();

    let truncated = &bytes[..HEADER_SIZE + 2];
    assert!(WalEntry::deserialize(truncated).is_err());
}

#[test]
fn test_header_too_small() {
    let bytes = [0u8; 10];
    assert!(WalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_empty_buffer() {
    let bytes: [u8; 0] = [];
    assert!(WalEntry::deserialize(&bytes).is_err());
}

#[test]
fn test_oversized_length_rejected() {
    let mut bytes = vec![0u8; HEADER_SIZE];
    bytes[12..16].copy_from_slice(&(MAX_PAYLOAD_SIZE + 1).to_le_bytes());

    let result = WalEntry::deserialize(&bytes);
    assert!(matches!(result, Err(StoreError::WalCorruption(_))));
}

// =============================================================================
// LSN Tests
// =============================================================================

#[test]
fn test_lsn_preserved() {
    for lsn in [0, 1, u64::MAX, 12345678901234] {
        let entry = WalEntry::new(lsn, Operation::Delete { slot: 0 });
        let bytes = entry.serialize().unwrap();
        let recovered = WalEntry::deserialize(&bytes).unwrap();

        assert_eq!(recovered.lsn, lsn);
    }
}
