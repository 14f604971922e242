//! Data tasks and their outcomes.

use arc_swap::ArcSwapOption;
use reqwest::header::HeaderMap;
use reqwest::Method;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Identifier of a task, unique within one client instance.
pub type TaskId = u64;

/// Lifecycle state of a task.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Suspended = 0,
    Running = 1,
    Completed = 2,
}

impl From<u8> for TaskState {
    fn from(val: u8) -> Self {
        match val {
            1 => TaskState::Running,
            2 => TaskState::Completed,
            _ => TaskState::Suspended,
        }
    }
}

/// The request a task was created with.
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl TaskRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }
}

/// Transport-level failure reported on task completion.
///
/// HTTP error statuses are responses, not failures, and never appear here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Could not connect (DNS, refused, TLS handshake).
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    TimedOut,

    /// Redirect loop or redirect limit exceeded.
    #[error("redirect error: {0}")]
    Redirect(String),

    /// The response body stream failed midway.
    #[error("response body error: {0}")]
    Body(String),

    /// The task was cancelled, e.g. by refusing an authentication challenge.
    #[error("task cancelled")]
    Cancelled,

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for TaskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TaskError::TimedOut
        } else if err.is_connect() {
            TaskError::Connect(err.to_string())
        } else if err.is_redirect() {
            TaskError::Redirect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TaskError::Body(err.to_string())
        } else {
            TaskError::Transport(err.to_string())
        }
    }
}

/// One request/response exchange issued through an `HttpClient`.
#[derive(Debug)]
pub struct DataTask {
    id: TaskId,
    original_request: TaskRequest,
    /// URL currently in effect; follows redirects.
    current_url: ArcSwapOption<Url>,
    state: AtomicU8,
}

impl DataTask {
    /// New suspended task whose current URL is the requested one.
    pub fn new(id: TaskId, request: TaskRequest) -> Self {
        let current = Arc::new(request.url.clone());
        Self {
            id,
            original_request: request,
            current_url: ArcSwapOption::from(Some(current)),
            state: AtomicU8::new(TaskState::Suspended as u8),
        }
    }

    pub fn task_identifier(&self) -> TaskId {
        self.id
    }

    pub fn original_request(&self) -> &TaskRequest {
        &self.original_request
    }

    pub fn original_url(&self) -> &Url {
        &self.original_request.url
    }

    pub fn current_url(&self) -> Option<Arc<Url>> {
        self.current_url.load_full()
    }

    /// Record the URL the transport ended up at.
    pub fn set_current_url(&self, url: Url) {
        self.current_url.store(Some(Arc::new(url)));
    }

    pub fn state(&self) -> TaskState {
        TaskState::from(self.state.load(Ordering::Acquire))
    }

    /// Move from `from` to `to`. Returns false if the task was not in `from`.
    pub fn transition(&self, from: TaskState, to: TaskState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn mark_completed(&self) {
        self.state.store(TaskState::Completed as u8, Ordering::Release);
    }
}
