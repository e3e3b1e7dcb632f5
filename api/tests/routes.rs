//! Route tests: axum router driven with `oneshot`, LLM backend mocked with wiremock.
//!
//! The mock Ollama server tells the three prompts apart by their template
//! markers, so one server answers classification, summary and ranking.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_llm_service::{LlmModelConfig, LlmProvider, LlmService};
use api::core::app_state::AppState;
use comment_digest::PipelineConfig;

const CLASSIFICATION_MARKER: &str = "【入力コメントリスト】";
const SUMMARY_MARKER: &str = "positive_comments";
const RANKING_MARKER: &str = "【本番】";

fn ollama_reply(inner: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "model": "test-model",
        "response": inner.to_string(),
        "done": true
    }))
}

fn state(server: &MockServer) -> Arc<AppState> {
    let cfg = LlmModelConfig {
        provider: LlmProvider::Ollama,
        model: "test-model".into(),
        endpoint: server.uri(),
        api_key: None,
        max_tokens: None,
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(5),
    };
    let llm = Arc::new(LlmService::new(cfg, Some(2)).unwrap());
    let pipeline_cfg = PipelineConfig {
        call_timeout: Duration::from_secs(5),
        ..PipelineConfig::default()
    };
    Arc::new(AppState::new(llm, pipeline_cfg))
}

async fn post_analyze(state: Arc<AppState>, body: String) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    let resp = api::router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn example_rows() -> String {
    json!({
        "rows": [
            {"comment": "とても分かりやすかった"},
            {"comment": ""},
            {"comment": "資料が分かりにくい"}
        ]
    })
    .to_string()
}

#[tokio::test]
async fn analyze_returns_report_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(CLASSIFICATION_MARKER))
        .respond_with(ollama_reply(json!({
            "classifications": [
                {"comment_index": 0, "sentiment": 0, "topic": 1},
                {"comment_index": 1, "sentiment": 1, "topic": 1}
            ],
            "important_comments": [1],
            "dangerous_comments": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(SUMMARY_MARKER))
        .respond_with(ollama_reply(json!({
            "positive_summary": ["説明が分かりやすい"],
            "negative_summary": ["資料が分かりにくい"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(RANKING_MARKER))
        .respond_with(ollama_reply(json!({
            "ranked_summary": [
                {"priority": 2, "summary": "資料の改善", "indices": [1]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (status, body) = post_analyze(state(&server), example_rows()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let data = &body["data"];
    assert_eq!(data["comment_count"], json!(2));
    assert_eq!(data["important_comments"], json!([1]));
    assert_eq!(data["dangerous_comments"], json!([]));
    assert_eq!(data["classifications"][1]["sentiment"], json!("NEGATIVE"));
    assert_eq!(data["classifications"][1]["topic"], json!("MATERIALS"));
    assert_eq!(data["positive_summary"], json!(["説明が分かりやすい"]));
    assert_eq!(data["ranked_summary"][0]["indices"], json!([1]));
    assert_eq!(data["stages"]["ranking"]["status"], json!("ok"));
}

#[tokio::test]
async fn missing_comment_column_is_400_without_llm_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let body = json!({"rows": [{"text": "a"}]}).to_string();
    let (status, body) = post_analyze(state(&server), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"]["code"], json!("SCHEMA_ERROR"));
    assert_eq!(body["error"]["stage"], json!("extracting"));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let server = MockServer::start().await;
    let (status, body) = post_analyze(state(&server), r#"{"rows": "nope"}"#.into()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!("BAD_REQUEST"));
}

#[tokio::test]
async fn classification_upstream_failure_is_502() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (status, body) = post_analyze(state(&server), example_rows()).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], json!("ORACLE_TRANSPORT"));
    assert_eq!(body["error"]["stage"], json!("classifying"));
}

#[tokio::test]
async fn ranking_failure_still_returns_200_with_stage_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(CLASSIFICATION_MARKER))
        .respond_with(ollama_reply(json!({
            "classifications": [
                {"comment_index": 0, "sentiment": 0, "topic": 0},
                {"comment_index": 1, "sentiment": 1, "topic": 1}
            ],
            "important_comments": [1],
            "dangerous_comments": []
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(SUMMARY_MARKER))
        .respond_with(ollama_reply(json!({
            "positive_summary": [],
            "negative_summary": ["資料"]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains(RANKING_MARKER))
        .respond_with(ollama_reply(json!({"unexpected": true})))
        .mount(&server)
        .await;

    let (status, body) = post_analyze(state(&server), example_rows()).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["ranked_summary"], Value::Null);
    assert_eq!(data["stages"]["ranking"]["status"], json!("failed"));
    assert_eq!(data["stages"]["ranking"]["error"], json!("invalid_reply"));
    assert_eq!(data["negative_summary"], json!(["資料"]));
}

#[tokio::test]
async fn health_reports_provider_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "test-model"}]
        })))
        .mount(&server)
        .await;

    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = api::router(state(&server)).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["ok"], json!(true));
    assert_eq!(body["data"]["provider"], json!("ollama"));
}
