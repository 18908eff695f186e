//! HTTP seed fetcher.
//!
//! # Responsibility
//! - Issue one `GET` against the seed endpoint.
//! - Decode the `{todos, total, skip, limit}` envelope and map items to tasks.

use crate::model::task::{now_epoch_ms, Task};
use log::{debug, info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};
use url::Url;

/// Public endpoint serving the seed task list.
pub const DEFAULT_SEED_ENDPOINT: &str = "https://dummyjson.com/todos";

const USER_AGENT: &str = concat!("todo_core/", env!("CARGO_PKG_VERSION"));

/// Seed fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Endpoint is not an absolute http(s) URL.
    InvalidEndpoint(String),
    /// Connection, TLS or I/O failure.
    Transport(String),
    /// Server answered with a non-success status.
    Status(u16),
    /// Body is not the expected JSON envelope.
    Decode(String),
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(endpoint) => write!(f, "invalid seed endpoint `{endpoint}`"),
            Self::Transport(message) => write!(f, "network error: {message}"),
            Self::Status(code) => write!(f, "seed endpoint returned HTTP {code}"),
            Self::Decode(message) => write!(f, "failed to decode seed payload: {message}"),
        }
    }
}

impl Error for NetworkError {}

/// Source of seed tasks merged into the local store.
pub trait SeedSource: Send + Sync {
    fn fetch_seed_tasks(&self) -> Result<Vec<Task>, NetworkError>;
}

#[derive(Debug, Deserialize)]
struct TodosEnvelope {
    todos: Vec<TodoWire>,
    total: u64,
    skip: u64,
    limit: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoWire {
    id: i64,
    todo: String,
    completed: bool,
    user_id: i64,
}

impl TodoWire {
    // The remote source has no separate description, so the text fills both.
    fn into_task(self, created_at: i64) -> Task {
        let mut task = Task::with_id(self.id.to_string(), self.todo.clone(), self.todo, created_at);
        task.is_completed = self.completed;
        task.owner_id = Some(self.user_id);
        task
    }
}

/// Decodes a seed payload body into tasks stamped with `created_at`.
pub fn decode_seed_payload(body: &str, created_at: i64) -> Result<Vec<Task>, NetworkError> {
    let envelope: TodosEnvelope =
        serde_json::from_str(body).map_err(|err| NetworkError::Decode(err.to_string()))?;
    debug!(
        "event=seed_decode module=remote status=ok items={} total={} skip={} limit={}",
        envelope.todos.len(),
        envelope.total,
        envelope.skip,
        envelope.limit
    );
    Ok(envelope
        .todos
        .into_iter()
        .map(|item| item.into_task(created_at))
        .collect())
}

/// `ureq`-backed [`SeedSource`].
pub struct HttpSeedFetcher {
    agent: ureq::Agent,
    endpoint: String,
}

impl HttpSeedFetcher {
    pub fn new(endpoint: impl Into<String>, connect_timeout: Duration, read_timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn validated_endpoint(&self) -> Result<Url, NetworkError> {
        let url = Url::parse(self.endpoint.trim())
            .map_err(|_| NetworkError::InvalidEndpoint(self.endpoint.clone()))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(NetworkError::InvalidEndpoint(self.endpoint.clone()));
        }
        Ok(url)
    }

    fn fetch(&self) -> Result<Vec<Task>, NetworkError> {
        let url = self.validated_endpoint()?;
        let response = self.agent.get(url.as_str()).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => NetworkError::Status(code),
            ureq::Error::Transport(transport) => {
                if matches!(transport.kind(), ureq::ErrorKind::InvalidUrl) {
                    NetworkError::InvalidEndpoint(self.endpoint.clone())
                } else {
                    NetworkError::Transport(transport.to_string())
                }
            }
        })?;

        let body = response
            .into_string()
            .map_err(|err| NetworkError::Transport(err.to_string()))?;
        decode_seed_payload(&body, now_epoch_ms())
    }
}

impl SeedSource for HttpSeedFetcher {
    fn fetch_seed_tasks(&self) -> Result<Vec<Task>, NetworkError> {
        let started_at = Instant::now();
        info!("event=seed_fetch module=remote status=start");
        let result = self.fetch();
        match &result {
            Ok(tasks) => info!(
                "event=seed_fetch module=remote status=ok count={} duration_ms={}",
                tasks.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=seed_fetch module=remote status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{decode_seed_payload, HttpSeedFetcher, NetworkError, SeedSource};
    use std::time::Duration;

    #[test]
    fn decode_maps_remote_fields_onto_task() {
        let body = r#"{"todos":[{"id":5,"todo":"Water plants","completed":true,"userId":9}],"total":1,"skip":0,"limit":30}"#;
        let tasks = decode_seed_payload(body, 1_000).expect("payload should decode");
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.id, "5");
        assert_eq!(task.title, "Water plants");
        assert_eq!(task.description, "Water plants");
        assert_eq!(task.created_at, 1_000);
        assert!(task.is_completed);
        assert_eq!(task.owner_id, Some(9));
    }

    #[test]
    fn decode_rejects_missing_envelope_fields() {
        let err = decode_seed_payload(r#"{"items":[]}"#, 0).expect_err("wrong shape must fail");
        assert!(matches!(err, NetworkError::Decode(_)));
    }

    #[test]
    fn non_http_endpoint_is_rejected_before_any_request() {
        let fetcher =
            HttpSeedFetcher::new("ftp://example.com/todos", Duration::from_secs(1), Duration::from_secs(1));
        let err = fetcher.fetch_seed_tasks().expect_err("ftp endpoint must fail");
        assert!(matches!(err, NetworkError::InvalidEndpoint(_)));

        let fetcher = HttpSeedFetcher::new("not a url", Duration::from_secs(1), Duration::from_secs(1));
        let err = fetcher.fetch_seed_tasks().expect_err("garbage endpoint must fail");
        assert!(matches!(err, NetworkError::InvalidEndpoint(_)));
    }
}
