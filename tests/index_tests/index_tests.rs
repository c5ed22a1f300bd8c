//! Name Index Tests
//!
//! Tests verify:
//! - Insert / find / remove
//! - Head-insertion shadowing for repeated names
//! - Collisions within a single bucket
//! - Canonical rebuild from a Record Store

use procdb::index::NameIndex;
use procdb::record::RecordName;
use procdb::store::RecordStore;
use procdb::StoreError;

fn name(s: &str) -> RecordName {
    RecordName::new(s).unwrap()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_index_is_empty() {
    let index = NameIndex::with_buckets(16).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.bucket_count(), 16);
}

#[test]
fn test_zero_buckets_rounds_up() {
    let index = NameIndex::with_buckets(0).unwrap();
    assert_eq!(index.bucket_count(), 1);
}

#[test]
fn test_insert_and_find() {
    let mut index = NameIndex::with_buckets(16).unwrap();
    index.insert(name("sshd"), 4).unwrap();

    assert_eq!(index.find("sshd").unwrap(), 4);
    assert_eq!(index.len(), 1);
    assert!(index.contains("sshd"));
}

#[test]
fn test_find_missing() {
    let index = NameIndex::with_buckets(16).unwrap();
    assert!(matches!(index.find("nope"), Err(StoreError::NotFound(_))));
}

#[test]
fn test_remove_returns_slot() {
    let mut index = NameIndex::with_buckets(16).unwrap();
    index.insert(name("a"), 0).unwrap();

    assert_eq!(index.remove("a").unwrap(), 0);
    assert!(index.find("a").is_err());
    assert!(index.is_empty());
}

#[test]
fn test_remove_missing() {
    let mut index = NameIndex::with_buckets(16).unwrap();
    assert!(matches!(index.remove("a"), Err(StoreError::NotFound(_))));
}

// =============================================================================
// Shadowing Tests
// =============================================================================

#[test]
fn test_newest_mapping_shadows_older() {
    let mut index = NameIndex::with_buckets(16).unwrap();
    index.insert(name("dup"), 1).unwrap();
    index.insert(name("dup"), 5).unwrap();

    assert_eq!(index.find("dup").unwrap(), 5);
}

#[test]
fn test_remove_takes_newest_then_exposes_older() {
    let mut index = NameIndex::with_buckets(16).unwrap();
    index.insert(name("dup"), 1).unwrap();
    index.insert(name("dup"), 5).unwrap();

    assert_eq!(index.remove("dup").unwrap(), 5);
    assert_eq!(index.find("dup").unwrap(), 1);
    assert_eq!(index.remove("dup").unwrap(), 1);
    assert!(index.find("dup").is_err());
}

// =============================================================================
// Collision Tests
// =============================================================================

#[test]
fn test_single_bucket_chains_all_names() {
    let mut index = NameIndex::with_buckets(1).unwrap();
    for (slot, n) in ["a", "b", "c", "d"].iter().enumerate() {
        index.insert(name(n), slot as u64).unwrap();
    }

    assert_eq!(index.find("a").unwrap(), 0);
    assert_eq!(index.find("d").unwrap(), 3);

    index.remove("b").unwrap();
    assert_eq!(index.find("c").unwrap(), 2);
    assert!(index.find("b").is_err());
    assert_eq!(index.len(), 3);
}

#[test]
fn test_clear_keeps_buckets() {
    let mut index = NameIndex::with_buckets(8).unwrap();
    index.insert(name("a"), 0).unwrap();
    index.clear();

    assert!(index.is_empty());
    assert_eq!(index.bucket_count(), 8);
    assert!(index.find("a").is_err());
}

// =============================================================================
// Rebuild Tests
// =============================================================================

#[test]
fn test_rebuild_indexes_only_alive_records() {
    let mut store = RecordStore::create(8).unwrap();
    store.add("a", 0, 0).unwrap();
    store.add("b", 0, 0).unwrap();
    store.add("c", 0, 0).unwrap();
    store.delete(1).unwrap();

    let mut index = NameIndex::with_buckets(8).unwrap();
    index.insert(name("stale"), 99).unwrap();
    index.rebuild(&store).unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(index.find("a").unwrap(), 0);
    assert_eq!(index.find("c").unwrap(), 2);
    assert!(index.find("b").is_err());
    assert!(index.find("stale").is_err());
}

#[test]
fn test_rebuild_duplicate_names_highest_slot_wins() {
    let mut store = RecordStore::create(8).unwrap();
    store.add("dup", 0, 0).unwrap();
    store.add("other", 0, 0).unwrap();
    store.add("dup", 0, 0).unwrap();

    let mut index = NameIndex::with_buckets(8).unwrap();
    index.rebuild(&store).unwrap();

    assert_eq!(index.find("dup").unwrap(), 2);
}
