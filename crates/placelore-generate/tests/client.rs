//! Generation client against an in-process stand-in for the upstream API.

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;

use placelore_generate::chat::{ChatRequest, ChatRole, SYSTEM_PROMPT};
use placelore_generate::client::{
    API_TOKEN_VAR, GenerationClient, GenerationConfig, MODEL_VAR, extract_response_text,
};
use placelore_generate::error::GenerateError;
use placelore_generate::generator::Generator;

const MODEL: &str = "@cf/meta/llama-3.1-8b-instruct";

#[derive(Debug, Clone)]
struct SeenRequest {
    account: String,
    model: String,
    authorization: Option<String>,
    body: ChatRequest,
}

#[derive(Clone, Default)]
struct Recorder {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl Recorder {
    fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn record(&self, account: String, model: String, headers: &HeaderMap, body: ChatRequest) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.seen.lock().unwrap().push(SeenRequest {
            account,
            model,
            authorization,
            body,
        });
    }
}

async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn upstream(recorder: Recorder, reply: fn() -> axum::response::Response) -> Router {
    Router::new()
        .route(
            "/accounts/{account}/ai/run/{*model}",
            post(
                move |State(recorder): State<Recorder>,
                      Path((account, model)): Path<(String, String)>,
                      headers: HeaderMap,
                      Json(body): Json<ChatRequest>| async move {
                    recorder.record(account, model, &headers, body);
                    reply()
                },
            ),
        )
        .with_state(recorder)
}

fn config(base_url: &str) -> GenerationConfig {
    GenerationConfig {
        base_url: base_url.to_string(),
        account_id: Some("acct-123".to_string()),
        model: Some(MODEL.to_string()),
        api_token: Some("secret-token".to_string()),
        ..GenerationConfig::default()
    }
}

fn ok_reply() -> axum::response::Response {
    Json(json!({
        "result": { "response": "**History**\n\nFounded long ago." },
        "success": true,
        "errors": [],
        "messages": []
    }))
    .into_response()
}

#[tokio::test]
async fn successful_generation_returns_the_response_text() {
    let recorder = Recorder::default();
    let base = spawn_upstream(upstream(recorder.clone(), ok_reply)).await;
    let client = GenerationClient::new(config(&base)).unwrap();

    let generated = client.generate("Paris").await.unwrap();
    assert_eq!(generated.text, "**History**\n\nFounded long ago.");
    assert_eq!(generated.model, MODEL);

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.account, "acct-123");
    assert_eq!(request.model, MODEL);
    assert_eq!(request.authorization.as_deref(), Some("Bearer secret-token"));
}

#[tokio::test]
async fn request_body_carries_the_fixed_prompt() {
    let recorder = Recorder::default();
    let base = spawn_upstream(upstream(recorder.clone(), ok_reply)).await;
    let client = GenerationClient::new(config(&base)).unwrap();

    client.generate("Kyoto").await.unwrap();

    let body = &recorder.requests()[0].body;
    assert_eq!(body.max_tokens, 2048);
    assert_eq!(body.messages.len(), 2);
    assert_eq!(body.messages[0].role, ChatRole::System);
    assert_eq!(body.messages[0].content, SYSTEM_PROMPT);
    assert_eq!(body.messages[1].role, ChatRole::User);
    assert_eq!(
        body.messages[1].content,
        "Generate the history of Kyoto, include historical places, culture, events, and geography with proper headings."
    );
}

#[tokio::test]
async fn each_call_gets_its_own_generation_id() {
    let recorder = Recorder::default();
    let base = spawn_upstream(upstream(recorder.clone(), ok_reply)).await;
    let client = GenerationClient::new(config(&base)).unwrap();

    let first = client.generate("Paris").await.unwrap();
    let second = client.generate("Paris").await.unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(recorder.requests().len(), 2);
}

#[tokio::test]
async fn non_success_status_is_an_upstream_error() {
    let base = spawn_upstream(upstream(Recorder::default(), || {
        (StatusCode::TOO_MANY_REQUESTS, "slow down").into_response()
    }))
    .await;
    let client = GenerationClient::new(config(&base)).unwrap();

    let err = client.generate("Paris").await.unwrap_err();
    match err {
        GenerateError::Upstream { status, reason } => {
            assert_eq!(status, 429);
            assert_eq!(reason, "Too Many Requests");
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_content_type_is_a_format_error() {
    let base = spawn_upstream(upstream(Recorder::default(), || {
        ([(header::CONTENT_TYPE, "text/html")], "<html>oops</html>").into_response()
    }))
    .await;
    let client = GenerationClient::new(config(&base)).unwrap();

    let err = client.generate("Paris").await.unwrap_err();
    assert!(matches!(err, GenerateError::Format(_)), "got {err:?}");
}

#[tokio::test]
async fn json_without_result_response_is_a_format_error() {
    let base = spawn_upstream(upstream(Recorder::default(), || {
        Json(json!({ "success": false, "errors": [{ "message": "bad" }] })).into_response()
    }))
    .await;
    let client = GenerationClient::new(config(&base)).unwrap();

    let err = client.generate("Paris").await.unwrap_err();
    assert!(matches!(err, GenerateError::Format(_)), "got {err:?}");
}

#[tokio::test]
async fn missing_credentials_fail_without_a_request() {
    let recorder = Recorder::default();
    let base = spawn_upstream(upstream(recorder.clone(), ok_reply)).await;
    let mut config = config(&base);
    config.model = None;
    config.api_token = Some("   ".to_string());
    let client = GenerationClient::new(config).unwrap();

    let err = client.generate("Paris").await.unwrap_err();
    match err {
        GenerateError::Configuration { missing } => {
            assert_eq!(missing, vec![MODEL_VAR, API_TOKEN_VAR]);
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert!(recorder.requests().is_empty());
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    let client = GenerationClient::new(config("http://127.0.0.1:1")).unwrap();

    let err = client.generate("Paris").await.unwrap_err();
    assert!(matches!(err, GenerateError::Transport(_)), "got {err:?}");
}

#[test]
fn extract_reads_nested_response() {
    let body = br#"{"result":{"response":"Hello"},"success":true}"#;
    assert_eq!(extract_response_text(body).unwrap(), "Hello");
}

#[test]
fn extract_rejects_invalid_json() {
    assert!(matches!(
        extract_response_text(b"not json"),
        Err(GenerateError::Format(_))
    ));
}

#[test]
fn debug_output_redacts_the_token() {
    let config = config("http://localhost");
    let debug = format!("{config:?}");
    assert!(!debug.contains("secret-token"));
    assert!(debug.contains("oken"));
}
