//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (task_id, path, status, error fields)
//!     → metrics.rs counters (records, store failures, correlation misses)
//!
//! Consumers:
//!     → logging.rs subscriber (stderr), installed by the binary
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - Observation never logs request payloads
//! - Instrumentation failures surface here and nowhere else

pub mod logging;
pub mod metrics;
