//! In-memory sink, used where a real store is unnecessary (tests, dry runs).

use super::{PatientSink, StoreError, StoreResult, WriteFailure};
use crate::PatientRecord;

/// Keeps records in insertion order and records how it was called.
#[derive(Clone, Debug, Default)]
pub struct MemoryCollection {
    records: Vec<PatientRecord>,
    clear_calls: usize,
    insert_calls: usize,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn clear_calls(&self) -> usize {
        self.clear_calls
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls
    }
}

impl PatientSink for MemoryCollection {
    fn clear(&mut self) -> StoreResult<u64> {
        self.clear_calls += 1;
        let removed = self.records.len() as u64;
        self.records.clear();
        Ok(removed)
    }

    fn insert_many(&mut self, records: &[PatientRecord]) -> StoreResult<usize> {
        self.insert_calls += 1;

        let mut inserted = 0;
        let mut failures = Vec::new();
        for (index, record) in records.iter().enumerate() {
            if self.records.iter().any(|r| r.id == record.id) {
                failures.push(WriteFailure {
                    index,
                    id: record.id.clone(),
                    message: format!("duplicate key: _id '{}'", record.id),
                });
                continue;
            }
            self.records.push(record.clone());
            inserted += 1;
        }

        if failures.is_empty() {
            Ok(inserted)
        } else {
            Err(StoreError::BulkWrite { inserted, failures })
        }
    }
}
