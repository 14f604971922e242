//! Process-wide activation.
//!
//! # Responsibilities
//! - Hold the single installed `Interceptor` for the process
//! - Wrap client factories with it, or pass them through when nothing is installed
//!
//! # Design Decisions
//! - Init-once: the first installed interceptor wins, later installs are ignored
//! - Activation failure is logged and the process carries on uninstrumented

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::client::ClientFactory;
use crate::config::NetWatchConfig;
use crate::intercept::{InstrumentedFactory, Interceptor};

static INSTALLED: OnceCell<Arc<Interceptor>> = OnceCell::new();

/// Entry point for installing instrumentation once per process.
pub struct NetWatch;

impl NetWatch {
    /// Install `interceptor` unless one already is. Returns the installed one.
    pub fn install(interceptor: Interceptor) -> &'static Arc<Interceptor> {
        let mut installed_now = false;
        let active = INSTALLED.get_or_init(|| {
            installed_now = true;
            Arc::new(interceptor)
        });

        if installed_now {
            tracing::info!("Network observation installed");
        } else {
            tracing::debug!("Network observation already installed, keeping existing interceptor");
        }
        active
    }

    /// Install a file-backed interceptor built from `config`.
    ///
    /// Returns `None`, after logging, when the log store cannot be set up.
    pub fn configure(config: &NetWatchConfig) -> Option<&'static Arc<Interceptor>> {
        if let Some(active) = INSTALLED.get() {
            tracing::debug!("Network observation already installed");
            return Some(active);
        }

        match Interceptor::from_config(config) {
            Ok(interceptor) => Some(Self::install(interceptor)),
            Err(e) => {
                tracing::error!(error = %e, "Cannot activate network observation, continuing without it");
                None
            }
        }
    }

    pub fn installed() -> Option<&'static Arc<Interceptor>> {
        INSTALLED.get()
    }

    /// Wrap `factory` with the installed interceptor, if any.
    pub fn instrument<F: ClientFactory>(factory: F) -> InstrumentedFactory<F> {
        match INSTALLED.get() {
            Some(interceptor) => interceptor.wrap(factory),
            None => InstrumentedFactory::passthrough(factory),
        }
    }
}
