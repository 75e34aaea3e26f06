// tests/ai_fallback.rs
//
// Model-first, pipeline-second: a failing or disabled model must never
// surface as an error, and a working model must be reported via X-AI-Used.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt as _;

use smart_city_assistant::ai_adapter::{
    build_client_from_config, AiClient, AiTask, MockProvider,
};
use smart_city_assistant::analyze::responder::CARBON_FOOTPRINT;
use smart_city_assistant::analyze::summarize::SUMMARY_FALLBACK;
use smart_city_assistant::config::{AiConfig, AssistantConfig};
use smart_city_assistant::{api, AppState, Assistant, ResponseSource};

/// Simulates an outage: counts calls, never answers.
struct FailingClient {
    calls: AtomicUsize,
}

impl AiClient for FailingClient {
    fn generate<'a>(
        &'a self,
        _task: AiTask,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "failing"
    }
}

#[tokio::test]
async fn failing_model_falls_back_once_per_request() {
    let client = Arc::new(FailingClient {
        calls: AtomicUsize::new(0),
    });
    let a = Assistant::new(AssistantConfig::default(), client.clone());

    let reply = a
        .chat("How can I reduce my carbon footprint?", &[])
        .await;
    assert_eq!(reply.source, ResponseSource::Fallback);
    assert_eq!(reply.value, CARBON_FOOTPRINT);

    let summary = a.summarize_policy("Nothing relevant here at all.").await;
    assert_eq!(summary.value, SUMMARY_FALLBACK);

    // no automatic retries
    assert_eq!(client.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn working_model_answer_is_passed_through() {
    let a = Assistant::new(
        AssistantConfig::default(),
        Arc::new(MockProvider::new("Cities should plant more trees.")),
    );
    let out = a.chat("anything", &["anything".to_string()]).await;
    assert!(out.ai_used());
    assert_eq!(out.value, "Cities should plant more trees.");

    let c = a.detect_anomalies(&[], None);
    let insights = a.anomaly_insights(&c).await;
    assert!(insights.ai_used());
}

#[tokio::test]
async fn mock_model_sets_ai_header() {
    let state = AppState::new(
        AssistantConfig::default(),
        Arc::new(MockProvider::new("Model summary.")),
    );
    let app = api::router(state);
    let req = Request::builder()
        .method("POST")
        .uri("/summarize")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "text": "Any policy text." }).to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("X-AI-Used").unwrap(), "1");
    let bytes = body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(v["summary"], "Model summary.");
    assert_eq!(v["source"], "ai");
}

#[serial_test::serial]
#[test]
fn factory_honours_test_mode_and_disabled_config() {
    std::env::remove_var("AI_TEST_MODE");
    let disabled = build_client_from_config(&AiConfig::default());
    assert_eq!(disabled.provider_name(), "disabled");

    std::env::set_var("AI_TEST_MODE", "mock");
    let mock = build_client_from_config(&AiConfig::default());
    assert_eq!(mock.provider_name(), "mock");
    std::env::remove_var("AI_TEST_MODE");
}

#[serial_test::serial]
#[test]
fn enabled_config_with_key_builds_openai_client() {
    std::env::remove_var("AI_TEST_MODE");
    let cfg = AiConfig {
        enabled: true,
        api_key: "sk-test".into(),
        ..AiConfig::default()
    };
    let client = build_client_from_config(&cfg);
    assert_eq!(client.provider_name(), "openai");
}
