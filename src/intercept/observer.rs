//! Observer installed between a client and its caller's observer.
//!
//! # Responsibilities
//! - Record task creation in the client's correlator
//! - Classify data and completion events and append the resulting records
//! - Forward every event, unmodified and exactly once, to the caller's observer
//!
//! # Design Decisions
//! - Challenges are forwarded only, never observed
//! - Data: record first, then forward. Completion: forward first, then record
//! - Store failures are logged and dropped; they never reach the client or caller

use bytes::Bytes;
use std::sync::Arc;

use crate::client::{AuthChallenge, ChallengeDisposition, DataObserver, DataTask, TaskError, TaskObserver};
use crate::correlation::{Classifier, Correlator};
use crate::observability::metrics;
use crate::store::{ObservationLog, ObservationRecord};

pub struct InstrumentedObserver {
    original: Option<Arc<dyn TaskObserver>>,
    correlator: Arc<Correlator>,
    classifier: Classifier,
    store: Arc<dyn ObservationLog>,
    evict_on_completion: bool,
}

impl InstrumentedObserver {
    pub(crate) fn new(
        original: Option<Arc<dyn TaskObserver>>,
        correlator: Arc<Correlator>,
        classifier: Classifier,
        store: Arc<dyn ObservationLog>,
        evict_on_completion: bool,
    ) -> Self {
        Self {
            original,
            correlator,
            classifier,
            store,
            evict_on_completion,
        }
    }

    /// The caller's observer that events are forwarded to.
    pub fn original(&self) -> Option<&Arc<dyn TaskObserver>> {
        self.original.as_ref()
    }

    pub fn correlator(&self) -> &Arc<Correlator> {
        &self.correlator
    }

    /// Called by the instrumented client right after the real task exists.
    pub fn did_create_task(&self, task: &DataTask) {
        self.correlator.record(task.task_identifier());
    }

    fn emit(&self, record: ObservationRecord) {
        let status = record.status();
        match self.store.append(record) {
            Ok(()) => metrics::record_observation(status),
            Err(e) => {
                tracing::warn!(status = %status, error = %e, "Dropping observation, log append failed");
                metrics::record_store_failure("append");
            }
        }
    }
}

impl TaskObserver for InstrumentedObserver {
    fn did_receive_challenge(&self, challenge: &AuthChallenge) -> ChallengeDisposition {
        match &self.original {
            Some(original) => original.did_receive_challenge(challenge),
            None => ChallengeDisposition::PerformDefaultHandling,
        }
    }

    fn task_did_receive_challenge(&self, task: &DataTask, challenge: &AuthChallenge) -> ChallengeDisposition {
        match &self.original {
            Some(original) => original.task_did_receive_challenge(task, challenge),
            None => ChallengeDisposition::PerformDefaultHandling,
        }
    }

    fn did_complete(&self, task: &DataTask, error: Option<&TaskError>) {
        if let Some(original) = &self.original {
            original.did_complete(task, error);
        }

        let task_id = task.task_identifier();
        let current_url = task.current_url();
        let record = self.classifier.on_completed(
            task_id,
            Some(task.original_url().as_str()),
            current_url.as_deref().map(|url| url.as_str()),
            error,
        );
        if let Some(record) = record {
            self.emit(record);
        }

        if self.evict_on_completion {
            self.correlator.evict(task_id);
        }
    }

    fn as_data_observer(&self) -> Option<&dyn DataObserver> {
        Some(self)
    }
}

impl DataObserver for InstrumentedObserver {
    fn did_receive_data(&self, task: &DataTask, data: &Bytes) {
        let current_url = task.current_url();
        let record = self.classifier.on_data_received(
            task.task_identifier(),
            Some(task.original_url().as_str()),
            current_url.as_deref().map(|url| url.as_str()),
        );
        if let Some(record) = record {
            self.emit(record);
        }

        if let Some(data_observer) = self.original.as_deref().and_then(|o| o.as_data_observer()) {
            data_observer.did_receive_data(task, data);
        }
    }
}
