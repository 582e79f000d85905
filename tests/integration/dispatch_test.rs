//! Dispatcher integration tests: routing, status mapping and deadlines.

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use broker::clients::HttpTransport;
use broker::envelope::{Action, AuthPayload, LogPayload, MailPayload, RequestEnvelope};
use broker::{ActionDispatcher, DispatchError};

use crate::common::{Downstream, Reply};

fn auth() -> Action {
    Action::Auth(AuthPayload {
        email: "admin@example.com".to_string(),
        password: "verysecret".to_string(),
    })
}

fn log() -> Action {
    Action::Log(LogPayload {
        name: "event".to_string(),
        data: "some kind of data".to_string(),
    })
}

fn mail() -> Action {
    Action::Mail(MailPayload {
        from: "me@example.com".to_string(),
        to: "x@example.com".to_string(),
        subject: "Test".to_string(),
        message: "Hello".to_string(),
    })
}

#[tokio::test]
async fn test_each_action_invokes_exactly_one_service() {
    let cases = [(auth(), (1, 0, 0)), (log(), (0, 1, 0)), (mail(), (0, 0, 1))];

    for (action, expected) in cases {
        let downstream = Downstream::accepting().await;
        let tag = action.tag();

        downstream
            .dispatcher()
            .dispatch(action)
            .await
            .unwrap_or_else(|e| panic!("{} dispatch failed: {}", tag, e));

        assert_eq!(downstream.hits(), expected, "hits for action {}", tag);
    }
}

#[tokio::test]
async fn test_unknown_action_makes_no_outbound_call() {
    let downstream = Downstream::accepting().await;

    let err = downstream
        .dispatcher()
        .handle(RequestEnvelope {
            action: "fax".to_string(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::UnknownAction(ref tag) if tag == "fax"));
    assert!(err.envelope().error);
    assert_eq!(downstream.hits(), (0, 0, 0));
}

#[tokio::test]
async fn test_auth_success_forwards_data() {
    let downstream = Downstream::accepting().await;

    let envelope = downstream.dispatcher().dispatch(auth()).await.unwrap();

    assert!(!envelope.error);
    assert_eq!(envelope.message, "Authenticated!");
    assert_eq!(
        envelope.data,
        Some(json!({"id": 1, "email": "admin@example.com"}))
    );

    let requests = downstream.auth.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].body,
        json!({"email": "admin@example.com", "password": "verysecret"})
    );
    assert_eq!(requests[0].content_type, None);
}

#[tokio::test]
async fn test_auth_unauthorized_is_invalid_credentials() {
    let downstream = Downstream::spawn(
        Reply::new(StatusCode::UNAUTHORIZED, r#"{"error":true,"message":"invalid credentials"}"#),
        Reply::accepted(json!(null)),
        Reply::new(StatusCode::ACCEPTED, ""),
    )
    .await;

    let err = downstream.dispatcher().dispatch(auth()).await.unwrap_err();

    assert!(matches!(err, DispatchError::InvalidCredentials));
    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert!(err.envelope().message.contains("invalid credentials"));
}

#[tokio::test]
async fn test_auth_accepted_with_error_flag_fails() {
    let downstream = Downstream::spawn(
        Reply::new(StatusCode::ACCEPTED, r#"{"error":true,"message":"no such user"}"#),
        Reply::accepted(json!(null)),
        Reply::new(StatusCode::ACCEPTED, ""),
    )
    .await;

    let err = downstream.dispatcher().dispatch(auth()).await.unwrap_err();
    assert!(matches!(err, DispatchError::InvalidCredentials));
}

#[tokio::test]
async fn test_log_success_sets_content_type() {
    let downstream = Downstream::accepting().await;

    let envelope = downstream.dispatcher().dispatch(log()).await.unwrap();

    assert!(!envelope.error);
    assert_eq!(envelope.message, "Logged!");
    assert_eq!(envelope.data, Some(json!("log-entry")));

    let requests = downstream.log.requests();
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(
        requests[0].body,
        json!({"name": "event", "data": "some kind of data"})
    );
}

#[tokio::test]
async fn test_log_ignores_downstream_error_flag() {
    let downstream = Downstream::spawn(
        Reply::accepted(json!(null)),
        Reply::new(StatusCode::ACCEPTED, r#"{"error":true,"message":"disk full"}"#),
        Reply::new(StatusCode::ACCEPTED, ""),
    )
    .await;

    let envelope = downstream.dispatcher().dispatch(log()).await.unwrap();
    assert!(!envelope.error);
    assert_eq!(envelope.message, "Logged!");
}

#[tokio::test]
async fn test_mail_success_names_recipient() {
    let downstream = Downstream::accepting().await;

    let envelope = downstream.dispatcher().dispatch(mail()).await.unwrap();

    assert!(!envelope.error);
    assert!(envelope.message.contains("x@example.com"));
    assert!(envelope.data.is_none());

    let requests = downstream.mail.requests();
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(requests[0].body["subject"], "Test");
}

#[tokio::test]
async fn test_unexpected_status_is_upstream_failure() {
    let downstream = Downstream::spawn(
        Reply::new(StatusCode::OK, "{}"),
        Reply::new(StatusCode::INTERNAL_SERVER_ERROR, ""),
        Reply::new(StatusCode::BAD_REQUEST, ""),
    )
    .await;
    let dispatcher = downstream.dispatcher();

    for (action, service) in [(auth(), "auth"), (log(), "log"), (mail(), "mail")] {
        let err = dispatcher.dispatch(action).await.unwrap_err();
        assert!(
            matches!(err, DispatchError::UpstreamFailure { service: s, .. } if s == service),
            "unexpected error for {}: {}",
            service,
            err
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(downstream.hits(), (1, 1, 1));
}

#[tokio::test]
async fn test_deadline_expiry_is_transport_error() {
    let downstream = Downstream::spawn(
        Reply::accepted(json!(null)),
        Reply::accepted(json!(null)),
        Reply::new(StatusCode::ACCEPTED, "").delayed(Duration::from_secs(5)),
    )
    .await;

    let err = downstream
        .dispatcher_with_timeout(200)
        .dispatch(mail())
        .await
        .unwrap_err();

    match err {
        DispatchError::TransportError { service, ref source } => {
            assert_eq!(service, "mail");
            assert!(source.is_timeout());
        }
        other => panic!("expected transport error, got {}", other),
    }
}

#[tokio::test]
async fn test_repeated_dispatch_is_independent() {
    let downstream = Downstream::accepting().await;
    let dispatcher = downstream.dispatcher();

    let first = dispatcher.dispatch(auth()).await.unwrap();
    let second = dispatcher.dispatch(auth()).await.unwrap();

    assert_eq!(first, second);
    assert!(!first.error);
    assert_eq!(downstream.hits(), (2, 0, 0));
}

#[tokio::test]
async fn test_concurrent_dispatch_shares_dispatcher() {
    let downstream = Downstream::accepting().await;
    let dispatcher = std::sync::Arc::new(downstream.dispatcher());

    let tasks: Vec<_> = (0..8)
        .map(|i| {
            let dispatcher = std::sync::Arc::clone(&dispatcher);
            tokio::spawn(async move {
                let action = if i % 2 == 0 { log() } else { mail() };
                dispatcher.dispatch(action).await
            })
        })
        .collect();

    for task in tasks {
        assert!(!task.await.unwrap().unwrap().error);
    }
    assert_eq!(downstream.hits(), (0, 4, 4));
}

#[tokio::test]
async fn test_oversized_reply_is_upstream_failure() {
    let big = "x".repeat(4096);
    let downstream = Downstream::spawn(
        Reply::accepted(json!(null)),
        Reply::accepted(json!(big)),
        Reply::new(StatusCode::ACCEPTED, ""),
    )
    .await;

    let mut services = downstream.services(broker::config::DEFAULT_TIMEOUT_MS);
    services.max_response_bytes = 1024;
    let transport = HttpTransport::new(&services).unwrap();
    let dispatcher = ActionDispatcher::from_config(transport, &services);

    let err = dispatcher.dispatch(log()).await.unwrap_err();
    assert!(
        matches!(err, DispatchError::UpstreamFailure { service: "log", .. }),
        "unexpected error: {}",
        err
    );
    assert!(err.to_string().contains("exceeds 1024 bytes"));
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(downstream.hits(), (0, 1, 0));
}
