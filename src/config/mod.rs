//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → NetWatchConfig (validated, immutable)
//!     → Interceptor::from_config / init_logging
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{CorrelationConfig, NetWatchConfig, ObservabilityConfig, StorageConfig};
pub use validation::ValidationError;
