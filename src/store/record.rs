//! Observation record types.
//!
//! The serialized field names (`initialURL`, `duration`, `finalURL`, `status`)
//! are the on-disk contract and must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome classification of an observed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Response data was received.
    Success,
    /// The task completed with a transport error.
    Failure,
}

impl Status {
    /// Wire representation, also used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "SUCCESS",
            Status::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single persisted observation. Write-once: there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRecord {
    #[serde(rename = "initialURL")]
    initial_url: String,

    #[serde(rename = "duration")]
    duration_millis: u64,

    #[serde(rename = "finalURL")]
    final_url: String,

    status: Status,
}

impl ObservationRecord {
    /// Create a record. Durations are truncated to whole milliseconds.
    pub fn new(
        initial_url: impl Into<String>,
        final_url: impl Into<String>,
        elapsed: Duration,
        status: Status,
    ) -> Self {
        Self {
            initial_url: initial_url.into(),
            duration_millis: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            final_url: final_url.into(),
            status,
        }
    }

    pub fn success(initial_url: impl Into<String>, final_url: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(initial_url, final_url, elapsed, Status::Success)
    }

    pub fn failure(initial_url: impl Into<String>, final_url: impl Into<String>, elapsed: Duration) -> Self {
        Self::new(initial_url, final_url, elapsed, Status::Failure)
    }

    /// URL of the request as originally issued.
    pub fn initial_url(&self) -> &str {
        &self.initial_url
    }

    /// URL in effect when the event was observed (after redirects).
    pub fn final_url(&self) -> &str {
        &self.final_url
    }

    pub fn duration_millis(&self) -> u64 {
        self.duration_millis
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_millis)
    }

    pub fn status(&self) -> Status {
        self.status
    }
}
