//! Name index implementation

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::record::RecordName;
use crate::store::RecordStore;

/// One chain entry: a name and the slot it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub name: RecordName,
    pub slot: u64,
}

/// Polynomial string hash (`h = h * 31 + byte`) reduced to a bucket
///
/// Only used in memory; the index is rebuilt on every load, so nothing
/// persisted depends on these values.
pub fn hash_name(name: &str, bucket_count: usize) -> usize {
    let h = name
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    (h as usize) % bucket_count.max(1)
}

/// Hash index from record name to store slot
#[derive(Debug, Default)]
pub struct NameIndex {
    /// Bucket chains; the last element of each chain is its head
    buckets: Vec<Vec<IndexEntry>>,

    /// Total entries across all chains
    len: usize,
}

impl NameIndex {
    /// Create an index with `bucket_count` buckets (at least one)
    pub fn with_buckets(bucket_count: usize) -> Result<Self> {
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(bucket_count)?;
        buckets.resize_with(bucket_count, Vec::new);

        Ok(Self { buckets, len: 0 })
    }

    /// Insert a mapping at the head of its chain
    pub fn insert(&mut self, name: RecordName, slot: u64) -> Result<()> {
        if self.buckets.is_empty() {
            self.buckets.push(Vec::new());
        }
        let bucket = self.bucket_of(name.as_str());
        let chain = &mut self.buckets[bucket];
        chain.try_reserve(1)?;
        chain.push(IndexEntry { name, slot });
        self.len += 1;
        Ok(())
    }

    /// Look up the slot for `name` (newest mapping wins)
    pub fn find(&self, name: &str) -> Result<u64> {
        self.buckets
            .get(self.bucket_of(name))
            .into_iter()
            .flat_map(|chain| chain.iter().rev())
            .find(|entry| entry.name.as_str() == name)
            .map(|entry| entry.slot)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Remove the first mapping found from the chain head, returning its slot
    pub fn remove(&mut self, name: &str) -> Result<u64> {
        let bucket = self.bucket_of(name);
        let chain = self
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let pos = chain
            .iter()
            .rposition(|entry| entry.name.as_str() == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let entry = chain.remove(pos);
        self.len -= 1;
        Ok(entry.slot)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Drop every entry, keeping the bucket array
    pub fn clear(&mut self) {
        for chain in &mut self.buckets {
            chain.clear();
        }
        self.len = 0;
    }

    /// Clear and repopulate from every alive record, in ascending slot order
    pub fn rebuild(&mut self, store: &RecordStore) -> Result<()> {
        self.clear();
        for record in store.iter_alive() {
            self.insert(record.name.clone(), record.id)?;
        }
        debug!(entries = self.len, buckets = self.buckets.len(), "Rebuilt name index");
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn bucket_of(&self, name: &str) -> usize {
        hash_name(name, self.buckets.len())
    }
}
