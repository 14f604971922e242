//! Observation log storage subsystem.
//!
//! # Data Flow
//! ```text
//! Interceptor produces ObservationRecord
//!     → ObservationLog::append
//!         → file.rs: lock → read + decode (codec.rs) → push → encode → tmp write → rename
//!         → memory.rs: lock → push
//!
//! Diagnostics / CLI
//!     → ObservationLog::get_all → full sequence in append order
//! ```
//!
//! # Design Decisions
//! - Append-only: records are never mutated or removed individually
//! - A missing or undecodable file reads as an empty log, never an error
//! - Every append rewrites the whole file through a temporary sibling + rename
//! - One mutex per store serializes read-modify-write cycles

pub mod codec;
pub mod file;
pub mod memory;
pub mod record;

use std::path::PathBuf;
use thiserror::Error;

pub use codec::{JsonCodec, RecordCodec};
pub use file::FileLogStore;
pub use memory::MemoryLogStore;
pub use record::{ObservationRecord, Status};

/// Errors surfaced by a log store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The log file could not be read (other than not existing).
    #[error("failed to read log file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be written or replaced.
    #[error("failed to write log file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode records: {0}")]
    Encode(String),

    #[error("failed to decode records: {0}")]
    Decode(String),

    /// No platform user-data directory could be resolved.
    #[error("could not determine the user data directory")]
    NoDataDirectory,
}

/// Durable, append-only sequence of observation records.
pub trait ObservationLog: Send + Sync {
    /// Append one record at the end of the log.
    fn append(&self, record: ObservationRecord) -> Result<(), StoreError>;

    /// Every record currently in the log, in append order.
    fn get_all(&self) -> Result<Vec<ObservationRecord>, StoreError>;
}
