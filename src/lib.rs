//! Transparent observation of outbound HTTP requests.
//!
//! Wraps an HTTP client so that every request's original URL, final URL, outcome and
//! duration are appended to a durable log, without changing what the client's own
//! observer sees.
//!
//! ```text
//!   caller ──data_task──▶ InstrumentedClient ──▶ real client ──▶ network
//!                              │ record(id)
//!                              ▼
//!                         Correlator ◀── lookup ── Classifier ◀── InstrumentedObserver ◀── callbacks
//!                                                      │                   │
//!                                                      ▼                   ▼
//!                                               ObservationLog       caller's observer
//! ```

pub mod activation;
pub mod client;
pub mod config;
pub mod correlation;
pub mod intercept;
pub mod observability;
pub mod store;

pub use activation::NetWatch;
pub use config::NetWatchConfig;
pub use intercept::Interceptor;
pub use store::{ObservationLog, ObservationRecord, Status};
