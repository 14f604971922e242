//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and every
//! field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::file::DEFAULT_FILE_NAME;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NetWatchConfig {
    /// Where and how observations are persisted.
    pub storage: StorageConfig,

    /// In-flight request tracking.
    pub correlation: CorrelationConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Observation log location and encoding.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the log file (default: the platform user-data directory).
    pub directory: Option<PathBuf>,

    /// Log file name inside `directory`.
    pub file_name: String,

    /// Write indented JSON.
    pub pretty: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_name: DEFAULT_FILE_NAME.to_string(),
            pretty: false,
        }
    }
}

/// Correlator behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Drop a task's start time once it completes.
    pub evict_on_completion: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            evict_on_completion: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
