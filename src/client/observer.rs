//! Observer capabilities a client reports task events to.
//!
//! # Capabilities
//! - `TaskObserver`: authentication challenges and terminal completion
//! - `DataObserver`: response data, an optional extension of `TaskObserver`
//!
//! A client asks `TaskObserver::as_data_observer` before delivering data, so an
//! observer that only cares about completion never sees data callbacks.

use bytes::Bytes;
use reqwest::header::WWW_AUTHENTICATE;
use reqwest::Response;

use crate::client::task::{DataTask, TaskError};

/// A server demand for credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthChallenge {
    pub host: String,
    /// Authentication scheme, e.g. `Basic`.
    pub scheme: String,
    pub realm: Option<String>,
    /// How many credentials were already refused for this task.
    pub previous_failure_count: u32,
}

impl AuthChallenge {
    /// Parse a `WWW-Authenticate` value such as `Basic realm="api"`.
    pub fn parse(host: &str, header: &str, previous_failure_count: u32) -> Option<Self> {
        let header = header.trim();
        let (scheme, params) = match header.split_once(char::is_whitespace) {
            Some((scheme, params)) => (scheme, params),
            None => (header, ""),
        };
        if scheme.is_empty() {
            return None;
        }

        let realm = params.split(',').find_map(|param| {
            let (key, value) = param.split_once('=')?;
            key.trim()
                .eq_ignore_ascii_case("realm")
                .then(|| value.trim().trim_matches('"').to_string())
        });

        Some(Self {
            host: host.to_string(),
            scheme: scheme.to_string(),
            realm,
            previous_failure_count,
        })
    }

    /// Challenge carried by a 401 response, if any.
    pub fn from_response(response: &Response, previous_failure_count: u32) -> Option<Self> {
        let header = response.headers().get(WWW_AUTHENTICATE).and_then(|v| v.to_str().ok())?;
        let host = response.url().host_str().unwrap_or_default();
        Self::parse(host, header, previous_failure_count)
    }

    /// Connection-oriented schemes are answered by the session-wide callback.
    pub fn is_connection_scoped(&self) -> bool {
        self.scheme.eq_ignore_ascii_case("negotiate") || self.scheme.eq_ignore_ascii_case("ntlm")
    }
}

/// Credentials offered in answer to a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub user: String,
    pub password: String,
}

impl Credential {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

/// How a challenge should be handled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChallengeDisposition {
    /// Retry the request with these credentials.
    UseCredential(Credential),
    /// Let the client decide; for HTTP auth this delivers the 401 response as is.
    #[default]
    PerformDefaultHandling,
    /// Abort the task; it completes with `TaskError::Cancelled`.
    CancelAuthenticationChallenge,
    /// Skip this protection space.
    RejectProtectionSpace,
}

/// Base observer capability: challenges and task completion.
pub trait TaskObserver: Send + Sync {
    /// Connection-wide challenge not tied to one task.
    fn did_receive_challenge(&self, _challenge: &AuthChallenge) -> ChallengeDisposition {
        ChallengeDisposition::PerformDefaultHandling
    }

    /// Challenge raised while running `task`.
    fn task_did_receive_challenge(&self, _task: &DataTask, _challenge: &AuthChallenge) -> ChallengeDisposition {
        ChallengeDisposition::PerformDefaultHandling
    }

    /// Terminal event; `error` is `None` when the exchange finished cleanly.
    fn did_complete(&self, _task: &DataTask, _error: Option<&TaskError>) {}

    /// The data capability, if this observer has one.
    fn as_data_observer(&self) -> Option<&dyn DataObserver> {
        None
    }
}

/// Optional capability: receive response body chunks.
pub trait DataObserver: TaskObserver {
    fn did_receive_data(&self, task: &DataTask, data: &Bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_with_realm() {
        let challenge = AuthChallenge::parse("api.local", r#"Basic realm="private area", charset="UTF-8""#, 0).unwrap();
        assert_eq!(challenge.scheme, "Basic");
        assert_eq!(challenge.realm.as_deref(), Some("private area"));
        assert_eq!(challenge.host, "api.local");
        assert!(!challenge.is_connection_scoped());
    }

    #[test]
    fn test_parse_bare_scheme() {
        let challenge = AuthChallenge::parse("h", "Negotiate", 2).unwrap();
        assert_eq!(challenge.scheme, "Negotiate");
        assert!(challenge.realm.is_none());
        assert_eq!(challenge.previous_failure_count, 2);
        assert!(challenge.is_connection_scoped());
    }

    #[test]
    fn test_parse_empty_header() {
        assert!(AuthChallenge::parse("h", "   ", 0).is_none());
    }

    #[test]
    fn test_default_disposition() {
        struct Silent;
        impl TaskObserver for Silent {}

        let challenge = AuthChallenge::parse("h", "Basic", 0).unwrap();
        assert_eq!(Silent.did_receive_challenge(&challenge), ChallengeDisposition::PerformDefaultHandling);
        assert!(Silent.as_data_observer().is_none());
    }
}
