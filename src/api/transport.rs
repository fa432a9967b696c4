//! HTTP transport with exponential backoff on transient failures.
//!
//! [`HttpBackend`] performs one raw exchange; [`RetryingTransport`] layers
//! the retry policy and status classification on top of it.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::{JulesError, Result};

/// Default retry budget, counted in total requests.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Upper bound for jitter; keeps `2^k + jitter` strictly below `2^k + 1`
/// after nanosecond rounding.
const MAX_JITTER: f64 = 0.999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// One logical API call, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Path plus percent-encoded query string.
    #[must_use]
    pub fn path_and_query(&self) -> String {
        let path = self.path.trim_start_matches('/');
        if self.query.is_empty() {
            return path.to_string();
        }
        let query = self
            .query
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{path}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// A single HTTP exchange. Transport-level failures map to
/// [`JulesError::Transport`]; every HTTP status is returned as data.
pub trait HttpBackend: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// How the credential is attached to each request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    ApiKey(String),
    Bearer(String),
}

pub struct ReqwestBackend {
    client: reqwest::blocking::Client,
    base_url: String,
    credential: Credential,
}

impl ReqwestBackend {
    pub fn new(base_url: &str, credential: Credential, timeout_secs: u64) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jules-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| JulesError::Config(format!("jules http client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credential,
        })
    }
}

impl HttpBackend for ReqwestBackend {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = format!("{}/{}", self.base_url, request.path_and_query());
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut builder = self.client.request(method, &url);
        builder = match &self.credential {
            Credential::ApiKey(key) => builder.header(API_KEY_HEADER, key),
            Credential::Bearer(token) => builder.bearer_auth(token),
        };
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().map_err(|err| {
            JulesError::Transport(format!("{} {url}: {err}", request.method.as_str()))
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|err| JulesError::Transport(format!("read body from {url}: {err}")))?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total requests before giving up on a transient status.
    pub max_attempts: u32,
    /// One backoff time unit; retry `k` waits `unit * (2^k + jitter)`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (0-indexed). `jitter` is clamped into `[0, 1)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let jitter = if jitter.is_nan() {
            0.0
        } else {
            jitter.clamp(0.0, MAX_JITTER)
        };
        let exponent = i32::try_from(attempt.min(32)).unwrap_or(32);
        self.backoff_unit.mul_f64(2f64.powi(exponent) + jitter)
    }
}

#[must_use]
pub const fn is_transient(status: u16) -> bool {
    matches!(status, 429 | 503)
}

pub struct RetryingTransport {
    backend: Box<dyn HttpBackend>,
    policy: RetryPolicy,
    clock: Arc<dyn Clock>,
}

impl RetryingTransport {
    pub fn new(backend: Box<dyn HttpBackend>, policy: RetryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            backend,
            policy,
            clock,
        }
    }

    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.clock)
    }

    /// Execute `request`, retrying 429/503 with jittered exponential backoff.
    ///
    /// Returns `Ok(None)` for 204 or an empty body.
    pub fn execute(&self, request: &ApiRequest) -> Result<Option<Value>> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0u32;

        loop {
            let response = self.backend.send(request)?;
            attempt += 1;
            debug!(
                method = request.method.as_str(),
                path = %request.path,
                status = response.status,
                attempt,
                "jules api response"
            );

            if is_transient(response.status) {
                if attempt >= max_attempts {
                    return Err(JulesError::RetriesExhausted {
                        status: response.status,
                        attempts: attempt,
                    });
                }
                let delay = self.policy.delay_for(attempt - 1, rand::random::<f64>());
                warn!(
                    "Transient error {}. Retrying in {:.2}s...",
                    response.status,
                    delay.as_secs_f64()
                );
                self.clock.sleep(delay);
                continue;
            }

            if !(200..300).contains(&response.status) {
                return Err(JulesError::Api {
                    status: response.status,
                    body: response.body,
                });
            }

            if response.status == 204 || response.body.trim().is_empty() {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_str(&response.body)?));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;
    use crate::clock::ManualClock;

    struct ScriptedBackend {
        responses: Mutex<VecDeque<RawResponse>>,
        calls: Arc<Mutex<u32>>,
    }

    impl ScriptedBackend {
        fn new(script: &[(u16, &str)]) -> (Self, Arc<Mutex<u32>>) {
            let calls = Arc::new(Mutex::new(0));
            let backend = Self {
                responses: Mutex::new(
                    script
                        .iter()
                        .map(|(status, body)| RawResponse {
                            status: *status,
                            body: (*body).to_string(),
                        })
                        .collect(),
                ),
                calls: Arc::clone(&calls),
            };
            (backend, calls)
        }
    }

    impl HttpBackend for ScriptedBackend {
        fn send(&self, _request: &ApiRequest) -> Result<RawResponse> {
            *self.calls.lock() += 1;
            self.responses
                .lock()
                .pop_front()
                .ok_or_else(|| JulesError::Transport("script exhausted".to_string()))
        }
    }

    fn transport(script: &[(u16, &str)]) -> (RetryingTransport, Arc<ManualClock>, Arc<Mutex<u32>>) {
        let (backend, calls) = ScriptedBackend::new(script);
        let clock = Arc::new(ManualClock::new());
        let transport = RetryingTransport::new(
            Box::new(backend),
            RetryPolicy::default(),
            Arc::clone(&clock) as Arc<dyn Clock>,
        );
        (transport, clock, calls)
    }

    #[test]
    fn delay_stays_within_jitter_bounds() {
        let policy = RetryPolicy::default();
        for attempt in 0..5 {
            let base = 2f64.powi(attempt as i32);
            for jitter in [0.0, 0.25, 0.999, 1.0, 7.0, -3.0] {
                let secs = policy.delay_for(attempt, jitter).as_secs_f64();
                assert!(secs >= base && secs < base + 1.0, "{attempt} {jitter} {secs}");
            }
        }
    }

    #[test]
    fn retries_transient_then_succeeds() {
        let (transport, clock, calls) =
            transport(&[(429, ""), (503, ""), (200, r#"{"ok": true}"#)]);
        let value = transport.execute(&ApiRequest::get("sources")).unwrap();
        assert_eq!(value, Some(serde_json::json!({"ok": true})));
        assert_eq!(*calls.lock(), 3);

        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 2);
        for (k, sleep) in sleeps.iter().enumerate() {
            let base = 2f64.powi(k as i32);
            let secs = sleep.as_secs_f64();
            assert!(secs >= base && secs < base + 1.0);
        }
    }

    #[test]
    fn gives_up_after_budget() {
        let script = [(503, ""); 8];
        let (transport, clock, calls) = transport(&script);
        let err = transport.execute(&ApiRequest::get("sources")).unwrap_err();
        assert!(matches!(
            err,
            JulesError::RetriesExhausted {
                status: 503,
                attempts: 5
            }
        ));
        assert_eq!(*calls.lock(), 5);
        assert_eq!(clock.sleeps().len(), 4);
    }

    #[test]
    fn fatal_status_is_not_retried() {
        let (transport, clock, calls) = transport(&[(404, "no such session"), (200, "{}")]);
        let err = transport.execute(&ApiRequest::get("sessions/x")).unwrap_err();
        match err {
            JulesError::Api { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such session");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(*calls.lock(), 1);
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn no_content_is_empty_success() {
        let (transport, _, _) = transport(&[(204, "")]);
        let value = transport
            .execute(&ApiRequest::post("sessions/x:sendMessage", serde_json::json!({"prompt": "hi"})))
            .unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn malformed_success_body_is_serialization_error() {
        let (transport, _, _) = transport(&[(200, "<html>")]);
        let err = transport.execute(&ApiRequest::get("sources")).unwrap_err();
        assert_eq!(err.code(), "serialization");
    }

    #[test]
    fn path_and_query_encodes_values() {
        let request = ApiRequest::get("/sessions/s1/activities")
            .param("pageSize", 100)
            .param("pageToken", "a b/c=");
        assert_eq!(
            request.path_and_query(),
            "sessions/s1/activities?pageSize=100&pageToken=a%20b%2Fc%3D"
        );
    }
}
