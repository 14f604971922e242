//! HTTP client abstraction that instrumentation wraps.
//!
//! # Data Flow
//! ```text
//! ClientFactory::build(observer)
//!     → HttpClient
//!         → data_task(request)   (suspended DataTask with a fresh TaskId)
//!         → resume(task)         (transport runs the exchange)
//!             → observer.task_did_receive_challenge / did_receive_challenge
//!             → observer.as_data_observer()?.did_receive_data   (per chunk)
//!             → observer.did_complete(task, error?)             (once)
//! ```
//!
//! # Design Decisions
//! - Clients never report task creation; the instrumentation sees it by wrapping `data_task`
//! - Observers are fixed at build time, like a session delegate
//! - Callbacks are synchronous and may arrive from any runtime worker

pub mod observer;
pub mod task;
pub mod transport;

use std::sync::Arc;

pub use observer::{AuthChallenge, ChallengeDisposition, Credential, DataObserver, TaskObserver};
pub use task::{DataTask, TaskError, TaskId, TaskRequest, TaskState};
pub use transport::{ReqwestClient, ReqwestClientFactory};

/// A client that issues data tasks and reports their events to one observer.
pub trait HttpClient: Send + Sync {
    /// Create a suspended task for `request`.
    fn data_task(&self, request: TaskRequest) -> Arc<DataTask>;

    /// Start a suspended task. Resuming a running or finished task does nothing.
    fn resume(&self, task: &Arc<DataTask>);

    /// The observer events are delivered to.
    fn observer(&self) -> Option<Arc<dyn TaskObserver>>;
}

/// Constructs clients bound to an observer.
pub trait ClientFactory: Send + Sync {
    type Client: HttpClient;

    fn build(&self, observer: Option<Arc<dyn TaskObserver>>) -> Self::Client;

    /// Whether clients from this factory are already instrumented.
    fn is_instrumented(&self) -> bool {
        false
    }
}
