//! GitHub publisher against an httpmock server (no real network).

use std::time::Duration;

use httpmock::prelude::*;
use sb_github::GitHubPublisher;
use sb_reconcile::{Build, PublishError, Status, StatusPublisher, StatusRecord};
use serde_json::json;

fn publisher(server: &MockServer) -> GitHubPublisher {
    GitHubPublisher::new(&server.base_url(), "gh-test-token".to_string(), Duration::from_secs(5))
        .expect("publisher builds")
}

fn record(state: Status) -> StatusRecord {
    StatusRecord::for_build(state, &Build::new("deadbeef", false, true, "http://ci/42/"))
}

#[test]
fn posts_state_and_console_url() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/revdotcom/revdotcom/statuses/deadbeef")
            .header("authorization", "Bearer gh-test-token")
            .json_body(json!({
                "state": "success",
                "target_url": "http://ci/42/console"
            }));
        then.status(201).json_body(json!({ "id": 1, "state": "success" }));
    });

    let mut p = publisher(&server);
    p.write("revdotcom", "revdotcom", "deadbeef", &record(Status::Success))
        .unwrap();

    m.assert();
}

#[test]
fn context_is_sent_when_configured() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/o/r/statuses/deadbeef")
            .json_body(json!({
                "state": "pending",
                "target_url": "http://ci/42/console",
                "context": "ci/jenkins"
            }));
        then.status(201);
    });

    let mut p = publisher(&server).with_context(Some("ci/jenkins".to_string()));
    p.write("o", "r", "deadbeef", &record(Status::Pending)).unwrap();

    m.assert();
}

#[test]
fn unknown_sha_is_rejected_with_platform_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/repos/o/r/statuses/deadbeef");
        then.status(422)
            .json_body(json!({ "message": "No commit found for SHA: deadbeef" }));
    });

    let err = publisher(&server)
        .write("o", "r", "deadbeef", &record(Status::Failure))
        .unwrap_err();

    assert_eq!(
        err,
        PublishError::Rejected {
            status: 422,
            message: "No commit found for SHA: deadbeef".to_string(),
        }
    );
}

#[test]
fn bad_token_is_auth_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/repos/o/r/statuses/deadbeef");
        then.status(401).json_body(json!({ "message": "Bad credentials" }));
    });

    let err = publisher(&server)
        .write("o", "r", "deadbeef", &record(Status::Success))
        .unwrap_err();

    assert_eq!(err, PublishError::Auth("Bad credentials".to_string()));
}

#[test]
fn empty_sha_fails_before_any_request() {
    let server = MockServer::start();
    let m = server.mock(|when, then| {
        when.method(POST);
        then.status(201);
    });

    let err = publisher(&server)
        .write("o", "r", "", &record(Status::Success))
        .unwrap_err();

    assert!(matches!(err, PublishError::InvalidRequest(_)));
    m.assert_hits(0);
}

#[test]
fn unreachable_host_is_transport_error() {
    // Port 9 (discard) on localhost: nothing listens in CI.
    let mut p = GitHubPublisher::new(
        "http://127.0.0.1:9",
        "t".to_string(),
        Duration::from_secs(2),
    )
    .unwrap();

    let err = p
        .write("o", "r", "deadbeef", &record(Status::Success))
        .unwrap_err();
    assert!(matches!(err, PublishError::Transport(_)), "{err}");
}
