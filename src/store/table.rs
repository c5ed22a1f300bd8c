//! Record store implementation
//!
//! Vec-backed arena with its capacity reserved at construction.

use crate::error::{Result, StoreError};
use crate::record::{validate_usage, Record, RecordName};

use super::MAX_RECORDS;

/// Fixed-capacity ordered collection of records
///
/// Slots `[0, count)` are occupied (alive or tombstoned); `count` never
/// exceeds `capacity` and never decreases.
#[derive(Debug, Default)]
pub struct RecordStore {
    /// Occupied slots, in slot order (`slots.len() == count`)
    slots: Vec<Record>,

    /// Slot limit fixed at construction
    capacity: usize,
}

impl RecordStore {
    /// Create a store with `capacity` reserved slots
    pub fn create(capacity: usize) -> Result<Self> {
        if capacity >= MAX_RECORDS {
            return Err(StoreError::CapacityInvalid {
                requested: capacity,
                max: MAX_RECORDS,
            });
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;

        Ok(Self { slots, capacity })
    }

    /// Add a new alive record at slot `count`, returning the slot
    pub fn add(&mut self, name: &str, cpu: u32, ram: u32) -> Result<u64> {
        self.ensure_not_full()?;
        let record = self.next_record(RecordName::new(name)?, cpu, ram)?;
        let slot = record.id;
        self.slots.push(record);
        Ok(slot)
    }

    /// Build the record the next `add` would write, without mutating the store
    ///
    /// Lets the caller log the record before committing it with `put`.
    pub fn next_record(&self, name: RecordName, cpu: u32, ram: u32) -> Result<Record> {
        self.ensure_not_full()?;
        let cpu = validate_usage(cpu)?;
        let ram = validate_usage(ram)?;
        Ok(Record::new(name, self.slots.len() as u64, cpu, ram))
    }

    /// Write a full record image at `slot`
    ///
    /// Overwrites an occupied slot or appends at `count`; anything beyond
    /// `count` would leave a hole and is rejected.
    pub fn put(&mut self, slot: u64, record: Record) -> Result<()> {
        let count = self.slots.len();
        match slot_index(slot) {
            Some(i) if i < count => {
                self.slots[i] = record;
                Ok(())
            }
            Some(i) if i == count => {
                self.ensure_not_full()?;
                self.slots.push(record);
                Ok(())
            }
            _ => Err(StoreError::SlotOutOfRange { slot, count }),
        }
    }

    /// Tombstone the record in `slot`
    pub fn delete(&mut self, slot: u64) -> Result<()> {
        let record = self.slot_mut(slot)?;
        record.alive = false;
        Ok(())
    }

    /// Overwrite the usage fields of an alive record
    pub fn update_usage(&mut self, slot: u64, cpu: u32, ram: u32) -> Result<()> {
        let cpu = validate_usage(cpu)?;
        let ram = validate_usage(ram)?;

        let record = self.slot_mut(slot)?;
        if !record.alive {
            return Err(StoreError::NotFound(format!("slot {} is deleted", slot)));
        }
        record.cpu = cpu;
        record.ram = ram;
        Ok(())
    }

    /// Get the record in an occupied slot (alive or not)
    pub fn get(&self, slot: u64) -> Result<&Record> {
        slot_index(slot)
            .and_then(|i| self.slots.get(i))
            .ok_or(StoreError::SlotOutOfRange {
                slot,
                count: self.slots.len(),
            })
    }

    /// Lazy iterator over alive records in ascending slot order
    ///
    /// Each call starts a fresh pass.
    pub fn iter_alive(&self) -> AliveRecords<'_> {
        AliveRecords {
            inner: self.slots.iter(),
        }
    }

    /// All occupied slots, alive and tombstoned, in slot order
    pub fn records(&self) -> &[Record] {
        &self.slots
    }

    /// Number of occupied slots (alive + tombstoned)
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Number of alive records
    pub fn alive_count(&self) -> usize {
        self.iter_alive().count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() == self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reclaim tombstoned slots (not supported in V1)
    ///
    /// Record ids are slot numbers, so compaction would also need an id
    /// remapping scheme before it can be offered.
    pub fn compact(&mut self) -> Result<usize> {
        Err(StoreError::Unsupported("record store compaction"))
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn ensure_not_full(&self) -> Result<()> {
        if self.is_full() {
            return Err(StoreError::StoreFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn slot_mut(&mut self, slot: u64) -> Result<&mut Record> {
        let count = self.slots.len();
        slot_index(slot)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(StoreError::SlotOutOfRange { slot, count })
    }
}

fn slot_index(slot: u64) -> Option<usize> {
    usize::try_from(slot).ok()
}

/// Iterator over alive records in slot order
pub struct AliveRecords<'a> {
    inner: std::slice::Iter<'a, Record>,
}

impl<'a> Iterator for AliveRecords<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find(|record| record.alive)
    }
}
