//! Interception subsystem.
//!
//! # Data Flow
//! ```text
//! Interceptor::wrap(factory)
//!     → InstrumentedFactory::build(caller observer)
//!         → new Correlator for this client
//!         → InstrumentedObserver { caller observer, correlator, classifier, store }
//!         → inner factory builds the real client around the InstrumentedObserver
//!
//! InstrumentedClient::data_task
//!     → real task → correlator.record(id)
//!
//! Real client callbacks → InstrumentedObserver
//!     → classifier → store.append
//!     → caller observer (unchanged event)
//! ```
//!
//! # Design Decisions
//! - Composition over the client traits; nothing is patched at runtime
//! - Correlators are per client because task identifiers are only unique per client
//! - One store is shared by every client the interceptor wraps

pub mod client;
pub mod observer;

use std::sync::Arc;

use crate::client::{ClientFactory, TaskObserver};
use crate::config::NetWatchConfig;
use crate::correlation::{Classifier, Clock, Correlator, SystemClock};
use crate::store::{FileLogStore, ObservationLog, StoreError};

pub use client::{InstrumentedClient, InstrumentedFactory};
pub use observer::InstrumentedObserver;

/// Instrumentation context: where records go and how tasks are timed.
pub struct Interceptor {
    store: Arc<dyn ObservationLog>,
    clock: Arc<dyn Clock>,
    evict_on_completion: bool,
}

impl Interceptor {
    pub fn new(store: Arc<dyn ObservationLog>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            evict_on_completion: true,
        }
    }

    /// File-backed interceptor built from configuration.
    ///
    /// Fails if the log directory cannot be resolved or created.
    pub fn from_config(config: &NetWatchConfig) -> Result<Self, StoreError> {
        let store = FileLogStore::from_config(&config.storage)?;
        store.ensure_directory()?;
        tracing::info!(path = ?store.path(), "Observation log ready");
        Ok(Self::new(Arc::new(store)).with_eviction(config.correlation.evict_on_completion))
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Whether correlator entries are dropped once their task completes.
    pub fn with_eviction(mut self, evict_on_completion: bool) -> Self {
        self.evict_on_completion = evict_on_completion;
        self
    }

    pub fn store(&self) -> &Arc<dyn ObservationLog> {
        &self.store
    }

    /// Instrument every client `factory` builds from now on.
    pub fn wrap<F: ClientFactory>(self: &Arc<Self>, factory: F) -> InstrumentedFactory<F> {
        InstrumentedFactory::new(factory, self.clone())
    }

    /// Fresh instrumentation for one client, forwarding to `original`.
    pub(crate) fn observer(&self, original: Option<Arc<dyn TaskObserver>>) -> InstrumentedObserver {
        let correlator = Arc::new(Correlator::with_clock(self.clock.clone()));
        let classifier = Classifier::new(correlator.clone(), self.clock.clone());
        InstrumentedObserver::new(
            original,
            correlator,
            classifier,
            self.store.clone(),
            self.evict_on_completion,
        )
    }
}

impl std::fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interceptor")
            .field("clock", &self.clock)
            .field("evict_on_completion", &self.evict_on_completion)
            .finish_non_exhaustive()
    }
}
