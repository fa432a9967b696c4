//! HTTP-level tests for the Jules client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use jules_sync::api::{
    ActivitySource, Credential, JulesClient, ReqwestBackend, RetryPolicy, SessionName,
};
use jules_sync::clock::ManualClock;
use jules_sync::sync::{self, ActivityFilter};
use serde_json::json;

fn client_for(server: &MockServer, credential: Credential) -> (JulesClient, Arc<ManualClock>) {
    let base_url = format!("{}/v1alpha", server.base_url());
    let backend = ReqwestBackend::new(&base_url, credential, 5).unwrap();
    let clock = Arc::new(ManualClock::new());
    let client = JulesClient::with_backend(
        Box::new(backend),
        RetryPolicy {
            max_attempts: 5,
            backoff_unit: Duration::from_secs(1),
        },
        clock.clone(),
    );
    (client, clock)
}

fn session() -> SessionName {
    SessionName::parse("s1").unwrap()
}

#[test]
fn fetch_page_sends_api_key_and_parses_page() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1alpha/sessions/s1/activities")
            .query_param("pageSize", "100")
            .header("x-goog-api-key", "secret");
        then.status(200).json_body(json!({
            "activities": [
                {"id": "a1", "originator": "user", "userMessaged": {"userMessage": "hi"}},
                {"id": "a2", "originator": "agent", "agentMessaged": {"agentMessage": "hello"}}
            ],
            "nextPageToken": "tok-2"
        }));
    });

    let (client, _) = client_for(&server, Credential::ApiKey("secret".to_string()));
    let page = client.fetch_page(&session(), None, 100).unwrap();

    mock.assert();
    assert_eq!(page.activities.len(), 2);
    assert_eq!(page.activities[1].kind(), Some("agentMessaged"));
    assert_eq!(page.next_token(), Some("tok-2"));
}

#[test]
fn page_token_is_forwarded() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1alpha/sessions/s1/activities")
            .query_param("pageToken", "abc/def=")
            .query_param("pageSize", "30");
        then.status(200).json_body(json!({ "activities": [] }));
    });

    let (client, _) = client_for(&server, Credential::ApiKey("k".to_string()));
    let page = client.fetch_page(&session(), Some("abc/def="), 30).unwrap();

    mock.assert();
    assert!(page.activities.is_empty());
    assert_eq!(page.next_token(), None);
}

#[test]
fn refetching_a_token_returns_the_same_page() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1alpha/sessions/s1/activities")
            .query_param("pageToken", "p2");
        then.status(200).json_body(json!({
            "activities": [
                {"id": "a3", "originator": "agent", "progressUpdated": {"title": "x"}},
                {"id": "a4", "originator": "robot", "agentMessaged": {}}
            ],
            "nextPageToken": "p3"
        }));
    });

    let (client, _) = client_for(&server, Credential::ApiKey("k".to_string()));
    let first = client.fetch_page(&session(), Some("p2"), 100).unwrap();
    let second = client.fetch_page(&session(), Some("p2"), 100).unwrap();

    mock.assert_calls(2);
    assert_eq!(first, second);
    assert_eq!(first.next_token(), Some("p3"));
    assert_eq!(
        serde_json::to_value(&first.activities[1]).unwrap()["originator"],
        "robot"
    );
}

#[test]
fn bearer_credential_uses_authorization_header() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1alpha/sources")
            .header("authorization", "Bearer oauth-token");
        then.status(200).json_body(json!({ "sources": [] }));
    });

    let (client, _) = client_for(&server, Credential::Bearer("oauth-token".to_string()));
    let sources = client.list_sources().unwrap();

    mock.assert();
    assert_eq!(sources, json!({ "sources": [] }));
}

#[test]
fn send_message_with_no_content_reports_success() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1alpha/sessions/s1:sendMessage")
            .json_body(json!({ "prompt": "continue" }));
        then.status(204);
    });

    let (client, _) = client_for(&server, Credential::ApiKey("k".to_string()));
    let reply = client.send_message(&session(), "continue").unwrap();

    mock.assert();
    assert_eq!(reply, json!({ "status": "success" }));
}

#[test]
fn not_found_is_fatal_without_retry() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1alpha/sessions/s1");
        then.status(404).body("{\"error\": \"not found\"}");
    });

    let (client, clock) = client_for(&server, Credential::ApiKey("k".to_string()));
    let err = client.get_session(&session()).unwrap_err();

    mock.assert_calls(1);
    assert_eq!(err.code(), "api_error");
    assert_eq!(err.status(), Some(404));
    assert!(clock.sleeps().is_empty());
}

#[test]
fn rate_limit_exhausts_retry_budget() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/v1alpha/sessions/s1/activities");
        then.status(429).body("slow down");
    });

    let (client, clock) = client_for(&server, Credential::ApiKey("k".to_string()));
    let err = client.fetch_page(&session(), None, 100).unwrap_err();

    mock.assert_calls(5);
    assert_eq!(err.code(), "retries_exhausted");
    assert_eq!(err.status(), Some(429));

    let sleeps = clock.sleeps();
    assert_eq!(sleeps.len(), 4);
    for (k, delay) in sleeps.iter().enumerate() {
        let base = f64::from(1u32 << k);
        let secs = delay.as_secs_f64();
        assert!(secs >= base && secs < base + 1.0, "retry {k} waited {secs}s");
    }
}

#[test]
fn latest_stops_on_empty_page_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v1alpha/sessions/s1/activities")
            .query_param("pageSize", "100");
        then.status(200).json_body(json!({
            "activities": [
                {"id": "a1", "originator": "user", "userMessaged": {}},
                {"id": "a2", "originator": "agent", "agentMessaged": {}},
                {"id": "a3", "originator": "agent", "progressUpdated": {}},
                {"id": "a4", "originator": "agent", "agentMessaged": {}}
            ],
            "nextPageToken": ""
        }));
    });

    let (client, _) = client_for(&server, Credential::ApiKey("k".to_string()));
    let tail = sync::latest(
        &client,
        &session(),
        &ActivityFilter::new(None, Some("agentMessaged".to_string())),
        5,
    )
    .unwrap();

    mock.assert_calls(1);
    let ids: Vec<_> = tail.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["a2", "a4"]);
}
