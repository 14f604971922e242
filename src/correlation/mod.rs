//! Request correlation and outcome classification.
//!
//! # Data Flow
//! ```text
//! Task created on a wrapped client
//!     → correlator.rs (record task id → start time)
//!
//! Data received / task completed
//!     → classifier.rs
//!         → correlator.rs lookup (miss → no record)
//!         → clock.rs now − start = duration
//!         → ObservationRecord (SUCCESS / FAILURE) or nothing
//! ```
//!
//! # Design Decisions
//! - One correlator per client instance; task identifiers are only unique per client
//! - Time is injected through `Clock` so durations are testable

pub mod classifier;
pub mod clock;
pub mod correlator;

pub use classifier::Classifier;
pub use clock::{Clock, ManualClock, SystemClock};
pub use correlator::Correlator;
