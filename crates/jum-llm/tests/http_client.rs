//! HttpModelClient against an in-process axum server standing in for a
//! local chat-completion server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use jum_llm::{CompletionOptions, HttpModelClient, ModelClient, ModelError};
use serde_json::{json, Value};
use tokio::net::TcpListener;

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/v1")
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

#[tokio::test]
async fn returns_first_choice_content() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("")
                .to_string();
            let last = body["messages"]
                .as_array()
                .and_then(|m| m.last())
                .and_then(|m| m["content"].as_str())
                .unwrap_or("")
                .to_string();
            Json(completion(&format!(
                "model={} auth={} prompt={}",
                body["model"].as_str().unwrap_or(""),
                auth,
                last
            )))
        }),
    );
    let base = spawn(app).await;

    let client = HttpModelClient::new(&base, "mistral:7b").with_api_key("secret");
    let reply = client
        .complete("hello", &CompletionOptions::default())
        .await
        .unwrap();
    assert_eq!(reply, "model=mistral:7b auth=Bearer secret prompt=hello");
}

#[tokio::test]
async fn system_message_precedes_prompt() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|Json(body): Json<Value>| async move {
            let roles: Vec<String> = body["messages"]
                .as_array()
                .map(|m| {
                    m.iter()
                        .filter_map(|x| x["role"].as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            Json(completion(&roles.join(",")))
        }),
    );
    let base = spawn(app).await;

    let client = HttpModelClient::new(&base, "m");
    let opts = CompletionOptions::default().with_system("be terse");
    let reply = client.complete("hi", &opts).await.unwrap();
    assert_eq!(reply, "system,user");
}

#[tokio::test]
async fn non_success_status_is_upstream_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": {"message": "model crashed"}})),
            )
        }),
    );
    let base = spawn(app).await;

    let client = HttpModelClient::new(&base, "m");
    let err = client
        .complete("hi", &CompletionOptions::default())
        .await
        .unwrap_err();
    match err {
        ModelError::Upstream(msg) => {
            assert!(msg.contains("500"), "got {msg}");
            assert!(msg.contains("model crashed"), "got {msg}");
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_upstream_error() {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let base = spawn(app).await;

    let client = HttpModelClient::new(&base, "m");
    let err = client
        .complete("hi", &CompletionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Upstream(_)));
}

#[tokio::test]
async fn slow_server_times_out_without_retry() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(completion("too late"))
            }
        }),
    );
    let base = spawn(app).await;

    let client = HttpModelClient::new(&base, "m").with_timeout(Duration::from_millis(200));
    let err = client
        .complete("hi", &CompletionOptions::default())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ModelError::Timeout(d) if d == Duration::from_millis(200)),
        "expected Timeout, got {err:?}"
    );

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_server_is_upstream_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpModelClient::new(&format!("http://{addr}/v1"), "m")
        .with_timeout(Duration::from_secs(5));
    let err = client
        .complete("hi", &CompletionOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelError::Upstream(_)), "got {err:?}");
}

#[tokio::test]
async fn health_check_hits_models_endpoint() {
    let app = Router::new().route(
        "/v1/models",
        get(|| async { Json(json!({"data": [{"id": "m"}]})) }),
    );
    let base = spawn(app).await;

    HttpModelClient::new(&base, "m").health_check().await.unwrap();
}

#[tokio::test]
async fn health_check_fails_on_missing_endpoint() {
    let base = spawn(Router::new()).await;
    let err = HttpModelClient::new(&base, "m").health_check().await.unwrap_err();
    assert!(err.to_string().contains("404"));
}
