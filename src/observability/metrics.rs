//! Metrics collection.
//!
//! # Metrics
//! - `net_watch_records_total` (counter): records persisted, by status
//! - `net_watch_store_failures_total` (counter): store read/decode/append failures, by operation
//! - `net_watch_correlation_misses_total` (counter): events with no known start time, by event (`data` / `completion`)
//!
//! # Design Decisions
//! - Recording is a no-op until the embedding application installs a recorder
//! - Label values are static strings; no per-URL cardinality

use crate::store::Status;

pub fn record_observation(status: Status) {
    ::metrics::counter!("net_watch_records_total", "status" => status.as_str()).increment(1);
}

pub fn record_store_failure(operation: &'static str) {
    ::metrics::counter!("net_watch_store_failures_total", "operation" => operation).increment(1);
}

/// Event a classification of `status` is made from.
fn event_label(status: Status) -> &'static str {
    match status {
        Status::Success => "data",
        Status::Failure => "completion",
    }
}

pub fn record_correlation_miss(status: Status) {
    ::metrics::counter!("net_watch_correlation_misses_total", "event" => event_label(status)).increment(1);
}
