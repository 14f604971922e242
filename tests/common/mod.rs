//! Shared utilities for integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use net_watch::client::{
    AuthChallenge, ChallengeDisposition, ClientFactory, DataObserver, DataTask, HttpClient, TaskError, TaskId,
    TaskObserver, TaskRequest, TaskState,
};

// --- Scripted client ---

/// Factory for clients whose events are fired by the test itself.
pub struct ScriptedFactory;

impl ClientFactory for ScriptedFactory {
    type Client = ScriptedClient;

    fn build(&self, observer: Option<Arc<dyn TaskObserver>>) -> ScriptedClient {
        ScriptedClient {
            observer,
            next_id: AtomicU64::new(1),
        }
    }
}

pub struct ScriptedClient {
    observer: Option<Arc<dyn TaskObserver>>,
    next_id: AtomicU64,
}

impl ScriptedClient {
    /// Make the next created task reuse `id`.
    pub fn reuse_id(&self, id: TaskId) {
        self.next_id.store(id, Ordering::SeqCst);
    }

    pub fn redirect(&self, task: &DataTask, url: &str) {
        task.set_current_url(Url::parse(url).unwrap());
    }

    pub fn deliver_data(&self, task: &DataTask, data: &'static [u8]) {
        let data = Bytes::from_static(data);
        if let Some(observer) = self.observer.as_deref().and_then(|o| o.as_data_observer()) {
            observer.did_receive_data(task, &data);
        }
    }

    pub fn complete(&self, task: &DataTask, error: Option<TaskError>) {
        task.mark_completed();
        if let Some(observer) = &self.observer {
            observer.did_complete(task, error.as_ref());
        }
    }

    pub fn task_challenge(&self, task: &DataTask, challenge: &AuthChallenge) -> ChallengeDisposition {
        match &self.observer {
            Some(observer) => observer.task_did_receive_challenge(task, challenge),
            None => ChallengeDisposition::PerformDefaultHandling,
        }
    }

    pub fn session_challenge(&self, challenge: &AuthChallenge) -> ChallengeDisposition {
        match &self.observer {
            Some(observer) => observer.did_receive_challenge(challenge),
            None => ChallengeDisposition::PerformDefaultHandling,
        }
    }
}

impl HttpClient for ScriptedClient {
    fn data_task(&self, request: TaskRequest) -> Arc<DataTask> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Arc::new(DataTask::new(id, request))
    }

    fn resume(&self, task: &Arc<DataTask>) {
        task.transition(TaskState::Suspended, TaskState::Running);
    }

    fn observer(&self) -> Option<Arc<dyn TaskObserver>> {
        self.observer.clone()
    }
}

pub fn get(url: &str) -> TaskRequest {
    TaskRequest::get(Url::parse(url).unwrap())
}

// --- Recording observer ---

/// Caller observer that remembers every event it is given.
pub struct RecordingObserver {
    pub data: Mutex<Vec<(TaskId, Bytes)>>,
    pub completions: Mutex<Vec<(TaskId, Option<TaskError>)>>,
    pub challenges: Mutex<Vec<AuthChallenge>>,
    pub task_challenges: Mutex<Vec<(TaskId, AuthChallenge)>>,
    wants_data: bool,
    reply: ChallengeDisposition,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::build(true, ChallengeDisposition::PerformDefaultHandling)
    }

    /// An observer without the data capability.
    pub fn completion_only() -> Self {
        Self::build(false, ChallengeDisposition::PerformDefaultHandling)
    }

    pub fn answering(reply: ChallengeDisposition) -> Self {
        Self::build(true, reply)
    }

    fn build(wants_data: bool, reply: ChallengeDisposition) -> Self {
        Self {
            data: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
            challenges: Mutex::new(Vec::new()),
            task_challenges: Mutex::new(Vec::new()),
            wants_data,
            reply,
        }
    }

    pub fn data_count(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn completion_count(&self) -> usize {
        self.completions.lock().unwrap().len()
    }
}

impl TaskObserver for RecordingObserver {
    fn did_receive_challenge(&self, challenge: &AuthChallenge) -> ChallengeDisposition {
        self.challenges.lock().unwrap().push(challenge.clone());
        self.reply.clone()
    }

    fn task_did_receive_challenge(&self, task: &DataTask, challenge: &AuthChallenge) -> ChallengeDisposition {
        self.task_challenges
            .lock()
            .unwrap()
            .push((task.task_identifier(), challenge.clone()));
        self.reply.clone()
    }

    fn did_complete(&self, task: &DataTask, error: Option<&TaskError>) {
        self.completions
            .lock()
            .unwrap()
            .push((task.task_identifier(), error.cloned()));
    }

    fn as_data_observer(&self) -> Option<&dyn DataObserver> {
        if self.wants_data {
            Some(self)
        } else {
            None
        }
    }
}

impl DataObserver for RecordingObserver {
    fn did_receive_data(&self, task: &DataTask, data: &Bytes) {
        self.data.lock().unwrap().push((task.task_identifier(), data.clone()));
    }
}

// --- Mock HTTP backend ---

/// What the mock backend saw of a request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    pub fn redirect(location: &str) -> Self {
        Self {
            status: 302,
            headers: vec![("Location", location.to_string())],
            body: String::new(),
        }
    }

    pub fn unauthorized(challenge: &str) -> Self {
        Self {
            status: 401,
            headers: vec![("WWW-Authenticate", challenge.to_string())],
            body: "unauthorized".to_string(),
        }
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&MockRequest) -> MockResponse + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let response = f(&request);
                        let status_text = match response.status {
                            200 => "200 OK",
                            302 => "302 Found",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };

                        let mut head = format!("HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n", status_text, response.body.len());
                        for (name, value) in &response.headers {
                            head.push_str(&format!("{}: {}\r\n", name, value));
                        }
                        head.push_str("\r\n");

                        let _ = socket.write_all(head.as_bytes()).await;
                        let _ = socket.write_all(response.body.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<MockRequest> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 || buf.len() > 16 * 1024 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let mut lines = head.lines();
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();
    let authorization = lines.find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("authorization")
            .then(|| value.trim().to_string())
    });

    Some(MockRequest { path, authorization })
}

/// An address nothing is listening on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
