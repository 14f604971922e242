//! In-memory log, for tests and ephemeral runs.

use std::sync::{Mutex, PoisonError};

use crate::store::{ObservationLog, ObservationRecord, StoreError};

#[derive(Debug, Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<ObservationRecord>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObservationLog for MemoryLogStore {
    fn append(&self, record: ObservationRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<ObservationRecord>, StoreError> {
        Ok(self.records.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
