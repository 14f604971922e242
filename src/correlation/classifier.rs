//! Outcome classification.
//!
//! # Responsibilities
//! - Turn a data-received event into a SUCCESS record
//! - Turn an errored completion into a FAILURE record
//! - Emit nothing when the start time or either URL is unknown
//!
//! # Design Decisions
//! - Success is "any response data arrived", so one task may yield several SUCCESS records
//! - Clean completion yields nothing; success was already reported by its data
//! - Missing information is not an error, it only suppresses the record

use std::sync::Arc;

use crate::client::{TaskError, TaskId};
use crate::correlation::clock::Clock;
use crate::correlation::correlator::Correlator;
use crate::observability::metrics;
use crate::store::{ObservationRecord, Status};

#[derive(Debug, Clone)]
pub struct Classifier {
    correlator: Arc<Correlator>,
    clock: Arc<dyn Clock>,
}

impl Classifier {
    pub fn new(correlator: Arc<Correlator>, clock: Arc<dyn Clock>) -> Self {
        Self { correlator, clock }
    }

    pub fn on_data_received(
        &self,
        task_id: TaskId,
        original_url: Option<&str>,
        current_url: Option<&str>,
    ) -> Option<ObservationRecord> {
        self.classify(task_id, original_url, current_url, Status::Success)
    }

    pub fn on_completed(
        &self,
        task_id: TaskId,
        original_url: Option<&str>,
        current_url: Option<&str>,
        error: Option<&TaskError>,
    ) -> Option<ObservationRecord> {
        let error = error?;
        tracing::debug!(task_id, error = %error, "Task completed with error");
        self.classify(task_id, original_url, current_url, Status::Failure)
    }

    fn classify(
        &self,
        task_id: TaskId,
        original_url: Option<&str>,
        current_url: Option<&str>,
        status: Status,
    ) -> Option<ObservationRecord> {
        let (Some(initial_url), Some(final_url)) = (original_url, current_url) else {
            tracing::trace!(task_id, "URL unavailable, not recording");
            return None;
        };

        let Some(started_at) = self.correlator.lookup(task_id) else {
            tracing::trace!(task_id, status = %status, "No start time for task, not recording");
            metrics::record_correlation_miss(status);
            return None;
        };

        let elapsed = self.clock.now().saturating_duration_since(started_at);
        Some(ObservationRecord::new(initial_url, final_url, elapsed, status))
    }
}
