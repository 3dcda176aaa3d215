//! Insertion-ordered, key-addressable cache of processed records.
//!
//! Single writer (the reconciler); consumers only ever see a read-only
//! slice. Records are mutated in place so a consumer holding the list
//! observes the same identity change, never a replacement.

use std::collections::HashMap;

use crate::record::{ProcessedEvent, RecordKey};

#[derive(Debug, Default)]
pub struct ViewModel {
    records: Vec<ProcessedEvent>,
    index: HashMap<RecordKey, usize>,
}

impl ViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert a new record. Returns false (and leaves the cache
    /// untouched) if the key is already present — the replay guard.
    pub fn insert(&mut self, record: ProcessedEvent) -> bool {
        if self.contains(&record.key) {
            return false;
        }
        self.index.insert(record.key.clone(), self.records.len());
        self.records.push(record);
        true
    }

    pub fn get(&self, key: &RecordKey) -> Option<&ProcessedEvent> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, key: &RecordKey) -> Option<&mut ProcessedEvent> {
        match self.index.get(key) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    /// The canonical render list, in insertion order of each record's
    /// creating event.
    pub fn records(&self) -> &[ProcessedEvent] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}
