//! OpenAI-compatible provider against an in-process gateway

use std::sync::{Arc, Mutex};

use agent_core::{AgentError, GenerationOptions, LlmProvider, Message};
use agent_runtime::{OpenAiConfig, OpenAiProvider};
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct Captured {
    body: Arc<Mutex<Option<Value>>>,
    auth: Arc<Mutex<Option<String>>>,
}

async fn chat_completions(
    State(captured): State<Captured>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    *captured.auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *captured.body.lock().unwrap() = Some(body);

    Json(json!({
        "model": "google/gemma-3-27b-it:free",
        "choices": [{
            "message": {"role": "assistant", "content": "Pizza, risotto and carbonara."},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
    }))
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/v1")
}

fn provider(base_url: String) -> OpenAiProvider {
    OpenAiProvider::from_config(OpenAiConfig {
        base_url,
        api_key: Some("sk-test".into()),
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn test_completion_round_trip() {
    let captured = Captured::default();
    let router = Router::new()
        .route("/api/v1/chat/completions", post(chat_completions))
        .with_state(captured.clone());
    let provider = provider(serve(router).await);

    let options = GenerationOptions::new("google/gemma-3-27b-it:free", 0.5).with_stop("\nObservation");
    let completion = provider
        .complete(&[Message::user("Location: Italy\nResponse:")], &options)
        .await
        .unwrap();

    assert_eq!(completion.content, "Pizza, risotto and carbonara.");
    assert_eq!(completion.usage.as_ref().unwrap().total_tokens, 18);
    assert!(!completion.truncated());

    let body = captured.body.lock().unwrap().clone().unwrap();
    assert_eq!(body["model"], "google/gemma-3-27b-it:free");
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Location: Italy\nResponse:");
    assert_eq!(body["stop"], json!(["\nObservation"]));
    assert!(body.get("top_p").is_none());
    assert_eq!(captured.auth.lock().unwrap().as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn test_rate_limit_maps_to_error() {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(|| async {
            (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"error": {"message": "Rate limit exceeded: free-models-per-min"}})),
            )
        }),
    );
    let provider = provider(serve(router).await);

    let err = provider
        .complete(&[Message::user("hi")], &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::RateLimited(msg) if msg.contains("free-models-per-min")));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let router = Router::new().route(
        "/api/v1/chat/completions",
        post(|| async { Json(json!({"choices": []})) }),
    );
    let provider = provider(serve(router).await);

    let err = provider
        .complete(&[Message::user("hi")], &GenerationOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Provider(_)));
}

#[tokio::test]
async fn test_health_check() {
    let router = Router::new().route("/api/v1/models", get(|| async { Json(json!({"data": []})) }));
    let provider = provider(serve(router).await);
    assert!(provider.health_check().await.unwrap());

    let unreachable = OpenAiProvider::from_config(OpenAiConfig {
        base_url: "http://127.0.0.1:9/v1".into(),
        api_key: None,
        timeout_secs: 2,
    })
    .unwrap();
    assert!(!unreachable.health_check().await.unwrap());
}
