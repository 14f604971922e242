//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject log file names that would escape the storage directory
//! - Check the log level is one tracing understands
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NetWatchConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::NetWatchConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("storage.file_name must not be empty")]
    EmptyFileName,

    #[error("storage.file_name must be a bare file name, got {0:?}")]
    FileNameHasSeparator(String),

    #[error("observability.log_level {0:?} is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

pub fn validate_config(config: &NetWatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let file_name = config.storage.file_name.trim();
    if file_name.is_empty() {
        errors.push(ValidationError::EmptyFileName);
    } else if file_name.contains(['/', '\\']) || file_name == "." || file_name == ".." {
        errors.push(ValidationError::FileNameHasSeparator(file_name.to_string()));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
