//! `HttpClient` backed by reqwest.
//!
//! # Responsibilities
//! - Assign task identifiers
//! - Run each resumed task on a tokio runtime
//! - Track the post-redirect URL on the task
//! - Stream the body to the data capability chunk by chunk
//! - Answer 401 challenges through the observer

use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::client::observer::{AuthChallenge, ChallengeDisposition, Credential, TaskObserver};
use crate::client::task::{DataTask, TaskError, TaskRequest, TaskState};
use crate::client::{ClientFactory, HttpClient};

/// Credentials offered per task before the 401 is delivered as is.
const MAX_AUTH_ATTEMPTS: u32 = 3;

/// Builds `ReqwestClient`s sharing one connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestClientFactory {
    client: reqwest::Client,
    runtime: Handle,
}

impl ReqwestClientFactory {
    pub fn new(client: reqwest::Client, runtime: Handle) -> Self {
        Self { client, runtime }
    }

    /// Factory on the current tokio runtime.
    ///
    /// # Panics
    /// Outside of a tokio runtime.
    pub fn current(client: reqwest::Client) -> Self {
        Self::new(client, Handle::current())
    }
}

impl ClientFactory for ReqwestClientFactory {
    type Client = ReqwestClient;

    fn build(&self, observer: Option<Arc<dyn TaskObserver>>) -> ReqwestClient {
        ReqwestClient {
            client: self.client.clone(),
            runtime: self.runtime.clone(),
            observer,
            next_id: AtomicU64::new(1),
        }
    }
}

pub struct ReqwestClient {
    client: reqwest::Client,
    runtime: Handle,
    observer: Option<Arc<dyn TaskObserver>>,
    next_id: AtomicU64,
}

impl HttpClient for ReqwestClient {
    fn data_task(&self, request: TaskRequest) -> Arc<DataTask> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        Arc::new(DataTask::new(id, request))
    }

    fn resume(&self, task: &Arc<DataTask>) {
        if !task.transition(TaskState::Suspended, TaskState::Running) {
            tracing::debug!(task_id = task.task_identifier(), state = ?task.state(), "Task already resumed");
            return;
        }

        let client = self.client.clone();
        let observer = self.observer.clone();
        let task = task.clone();
        self.runtime.spawn(async move {
            let outcome = execute(&client, observer.as_deref(), &task).await;
            task.mark_completed();

            if let Err(e) = &outcome {
                tracing::debug!(task_id = task.task_identifier(), error = %e, "Task failed");
            }
            if let Some(observer) = observer.as_deref() {
                observer.did_complete(&task, outcome.err().as_ref());
            }
        });
    }

    fn observer(&self) -> Option<Arc<dyn TaskObserver>> {
        self.observer.clone()
    }
}

async fn execute(
    client: &reqwest::Client,
    observer: Option<&dyn TaskObserver>,
    task: &DataTask,
) -> Result<(), TaskError> {
    let mut credential: Option<Credential> = None;
    let mut attempts = 0u32;

    let mut response = loop {
        let response = send(client, task.original_request(), credential.as_ref()).await?;
        task.set_current_url(response.url().clone());

        if response.status() != StatusCode::UNAUTHORIZED || attempts >= MAX_AUTH_ATTEMPTS {
            break response;
        }
        let Some(challenge) = AuthChallenge::from_response(&response, attempts) else {
            break response;
        };

        let disposition = match observer {
            Some(o) if challenge.is_connection_scoped() => o.did_receive_challenge(&challenge),
            Some(o) => o.task_did_receive_challenge(task, &challenge),
            None => ChallengeDisposition::PerformDefaultHandling,
        };

        match disposition {
            ChallengeDisposition::UseCredential(offered) => {
                credential = Some(offered);
                attempts += 1;
            }
            ChallengeDisposition::CancelAuthenticationChallenge => return Err(TaskError::Cancelled),
            ChallengeDisposition::PerformDefaultHandling | ChallengeDisposition::RejectProtectionSpace => {
                break response;
            }
        }
    };

    let data_observer = observer.and_then(|o| o.as_data_observer());
    while let Some(chunk) = response.chunk().await? {
        if let Some(data_observer) = data_observer {
            data_observer.did_receive_data(task, &chunk);
        }
    }
    Ok(())
}

async fn send(
    client: &reqwest::Client,
    request: &TaskRequest,
    credential: Option<&Credential>,
) -> Result<reqwest::Response, TaskError> {
    let mut builder = client
        .request(request.method.clone(), request.url.clone())
        .headers(request.headers.clone());
    if let Some(credential) = credential {
        builder = builder.basic_auth(&credential.user, Some(&credential.password));
    }
    Ok(builder.send().await?)
}
