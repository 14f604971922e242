//! In-flight request table.
//!
//! # Responsibilities
//! - Map a task identifier to its start time
//! - Stay consistent under concurrent record/lookup from callback threads
//!
//! # Design Decisions
//! - Sharded map: a lookup racing a record sees the old or the new value, never a mix
//! - `record` overwrites, so a reused identifier always refers to its newest task
//! - Lookups never remove; eviction is an explicit, separate call

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::client::TaskId;
use crate::correlation::clock::{Clock, SystemClock};

/// Task identifier → start time, scoped to one client instance.
#[derive(Debug)]
pub struct Correlator {
    started: DashMap<TaskId, Instant>,
    clock: Arc<dyn Clock>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            started: DashMap::new(),
            clock,
        }
    }

    /// Mark `task_id` as started now, replacing any previous entry.
    pub fn record(&self, task_id: TaskId) {
        let now = self.clock.now();
        if self.started.insert(task_id, now).is_some() {
            tracing::debug!(task_id, "Task identifier reused, restarting its clock");
        }
    }

    /// Start time of `task_id`, if it was recorded.
    pub fn lookup(&self, task_id: TaskId) -> Option<Instant> {
        self.started.get(&task_id).map(|entry| *entry.value())
    }

    /// Forget `task_id`. Returns the start time it had.
    pub fn evict(&self, task_id: TaskId) -> Option<Instant> {
        self.started.remove(&task_id).map(|(_, started)| started)
    }

    pub fn contains(&self, task_id: TaskId) -> bool {
        self.started.contains_key(&task_id)
    }

    pub fn len(&self) -> usize {
        self.started.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started.is_empty()
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}
