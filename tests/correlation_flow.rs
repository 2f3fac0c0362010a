//! End-to-end request/callback flows through the HTTP boundary.

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use callback_gateway::correlation::ConversationId;

mod common;

use common::{client, gateway_config, start_gateway, MockDownstream};

#[tokio::test]
async fn test_callback_delivered_to_caller() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    let submit = tokio::spawn({
        let url = gateway.url("/messages");
        async move {
            client()
                .post(url)
                .json(&json!({"conversation": "conv-1", "content": "hello"}))
                .send()
                .await
                .unwrap()
        }
    });

    gateway.wait_registered("conv-1").await;
    let ack = client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-1", "content": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(ack.status(), 200);

    let res = submit.await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["content"], "hi");
    assert_eq!(body["conversation_id"], "conv-1");
    assert_eq!(gateway.registry.in_flight(), 0);
}

#[tokio::test]
async fn test_duplicate_submit_conflicts() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    let first = tokio::spawn({
        let url = gateway.url("/messages");
        async move {
            client()
                .post(url)
                .json(&json!({"conversation": "conv-2"}))
                .send()
                .await
                .unwrap()
        }
    });
    gateway.wait_registered("conv-2").await;

    let second = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "A request for this conversation is already in progress");
    assert_eq!(downstream.captured().len(), 1, "duplicate must not be forwarded");

    client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-2", "content": "first"}))
        .send()
        .await
        .unwrap();

    let res = first.await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["content"], "first");
}

#[tokio::test]
async fn test_no_callback_times_out() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 1)).await;

    let start = Instant::now();
    let res = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-3"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 504);
    assert!(start.elapsed() >= Duration::from_secs(1));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Request timeout");

    let id = ConversationId::new("conv-3").unwrap();
    assert!(!gateway.registry.contains(&id));

    // A late callback is accepted and dropped.
    let ack = client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-3", "content": "late"}))
        .send()
        .await
        .unwrap();
    assert_eq!(ack.status(), 200);
    assert_eq!(gateway.registry.in_flight(), 0);
}

#[tokio::test]
async fn test_caller_disconnect_releases_waiter() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    let impatient = reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .no_proxy()
        .build()
        .unwrap();
    let err = impatient
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-4"}))
        .send()
        .await
        .unwrap_err();
    assert!(err.is_timeout());

    gateway.wait_released("conv-4").await;

    let ack = client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-4", "content": "too late"}))
        .send()
        .await
        .unwrap();
    assert_eq!(ack.status(), 200);
    assert_eq!(gateway.registry.in_flight(), 0);
}

#[tokio::test]
async fn test_downstream_error_is_bad_gateway() {
    let downstream = MockDownstream::start(StatusCode::INTERNAL_SERVER_ERROR).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    let res = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-5"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Request failed");
    assert!(!gateway.registry.contains(&ConversationId::new("conv-5").unwrap()));
}

#[tokio::test]
async fn test_unreachable_downstream_is_bad_gateway() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let mut config = gateway_config(&downstream, 30);
    // Nothing listens on port 1.
    config.downstream.base_url = "http://127.0.0.1:1/api/v1".to_string();
    let gateway = start_gateway(config).await;

    let res = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-5b"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    assert_eq!(gateway.registry.in_flight(), 0);
}

#[tokio::test]
async fn test_missing_conversation_rejected() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    for body in [json!({"content": "hi"}), json!({"conversation": ""})] {
        let res = client()
            .post(gateway.url("/messages"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 400);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "conversation is required");
    }
    assert!(downstream.captured().is_empty());
}

#[tokio::test]
async fn test_forward_passes_query_and_headers() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    let submit = tokio::spawn({
        let url = gateway.url("/messages?chatbot=abc&lang=en");
        async move {
            client()
                .post(url)
                .header("x-api-key", "k-123")
                .json(&json!({"conversation": "conv-6", "message": {"content": "ping"}}))
                .send()
                .await
                .unwrap()
        }
    });
    gateway.wait_registered("conv-6").await;
    common::wait_until(|| !downstream.captured().is_empty()).await;

    let captured = downstream.captured().remove(0);
    assert_eq!(captured.query.as_deref(), Some("chatbot=abc&lang=en"));
    assert_eq!(captured.headers.get("x-api-key").unwrap(), "k-123");
    assert!(captured.headers.get("x-request-id").is_some());
    assert_eq!(
        captured.headers.get("host").unwrap().to_str().unwrap(),
        downstream.addr.to_string()
    );
    assert_eq!(captured.body["message"]["content"], "ping");

    client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-6", "content": "pong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(submit.await.unwrap().status(), 200);
}

#[tokio::test]
async fn test_unmatched_and_malformed_callbacks_ack() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 30)).await;

    for body in [
        json!({"conversation_id": "never-registered"}),
        json!({"content": "no id"}),
    ] {
        let res = client()
            .post(gateway.url("/webhook"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);
    }
}

#[tokio::test]
async fn test_reloaded_timeout_applies_to_new_requests() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let config = gateway_config(&downstream, 300);
    let gateway = start_gateway(config.clone()).await;

    let mut reloaded = config;
    reloaded.correlation.timeout_secs = 1;
    gateway.config_tx.send(reloaded).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let res = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-7"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 504);
}

#[tokio::test]
async fn test_id_reusable_after_completion() {
    let downstream = MockDownstream::start(StatusCode::OK).await;
    let gateway = start_gateway(gateway_config(&downstream, 1)).await;

    let first = client()
        .post(gateway.url("/messages"))
        .json(&json!({"conversation": "conv-8"}))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 504);

    let second = tokio::spawn({
        let url = gateway.url("/messages");
        async move {
            client()
                .post(url)
                .json(&json!({"conversation": "conv-8"}))
                .send()
                .await
                .unwrap()
        }
    });
    gateway.wait_registered("conv-8").await;
    client()
        .post(gateway.url("/webhook"))
        .json(&json!({"conversation_id": "conv-8", "content": "again"}))
        .send()
        .await
        .unwrap();
    assert_eq!(second.await.unwrap().status(), 200);
}
