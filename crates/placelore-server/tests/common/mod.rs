#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use placelore_core::models::content::ContentRecord;
use placelore_core::place::PlaceKey;
use placelore_generate::error::GenerateError;
use placelore_generate::generator::{BoxFuture, GeneratedText, Generator};
use placelore_server::router;
use placelore_server::service::ContentService;
use placelore_server::state::AppState;
use placelore_storage::error::StorageError;
use placelore_storage::memory::MemoryContentStore;
use placelore_storage::store::{self, ContentStore, CreateOutcome};

pub const PARIS_TEXT: &str = "**History of Paris**\n\nParis grew from a Gallic settlement.";

/// What the fake generator answers with.
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Upstream(u16),
    Format,
    Unconfigured,
}

/// Counts calls and answers with a canned reply, optionally after a delay.
pub struct FakeGenerator {
    calls: AtomicUsize,
    reply: Reply,
    delay: Option<Duration>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Arc<Self> {
        Self::with(Reply::Text(text.to_string()), None)
    }

    pub fn with(reply: Reply, delay: Option<Duration>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply,
            delay,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for FakeGenerator {
    fn generate<'a>(
        &'a self,
        _place: &'a str,
    ) -> BoxFuture<'a, Result<GeneratedText, GenerateError>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Reply::Text(text) => Ok(GeneratedText {
                    id: Uuid::new_v4(),
                    model: "@cf/test/model".to_string(),
                    text: text.clone(),
                }),
                Reply::Upstream(status) => Err(GenerateError::Upstream {
                    status: *status,
                    reason: "Too Many Requests".to_string(),
                }),
                Reply::Format => Err(GenerateError::Format(
                    "expected a JSON response, got content type \"text/html\"".to_string(),
                )),
                Reply::Unconfigured => Err(GenerateError::Configuration {
                    missing: vec!["CONTENT_GENERATION_MODEL"],
                }),
            }
        })
    }
}

/// Store whose reads succeed (delegating to memory) but whose writes fail.
#[derive(Default)]
pub struct ReadOnlyStore {
    pub inner: MemoryContentStore,
}

impl ContentStore for ReadOnlyStore {
    fn backend(&self) -> &str {
        "read-only"
    }

    fn find_by_place<'a>(
        &'a self,
        place: &'a PlaceKey,
    ) -> store::BoxFuture<'a, Result<Option<ContentRecord>, StorageError>> {
        self.inner.find_by_place(place)
    }

    fn create<'a>(
        &'a self,
        _place: &'a PlaceKey,
        _content: &'a str,
    ) -> store::BoxFuture<'a, Result<ContentRecord, StorageError>> {
        Box::pin(async { Err(StorageError::Insert("disk full".to_string())) })
    }

    fn create_if_absent<'a>(
        &'a self,
        _place: &'a PlaceKey,
        _content: &'a str,
    ) -> store::BoxFuture<'a, Result<CreateOutcome, StorageError>> {
        Box::pin(async { Err(StorageError::Insert("disk full".to_string())) })
    }

    fn ping(&self) -> store::BoxFuture<'_, Result<(), StorageError>> {
        self.inner.ping()
    }
}

/// Store that is unreachable for every operation.
pub struct DownStore;

impl ContentStore for DownStore {
    fn backend(&self) -> &str {
        "down"
    }

    fn find_by_place<'a>(
        &'a self,
        _place: &'a PlaceKey,
    ) -> store::BoxFuture<'a, Result<Option<ContentRecord>, StorageError>> {
        Box::pin(async { Err(StorageError::Query("connection refused".to_string())) })
    }

    fn create<'a>(
        &'a self,
        _place: &'a PlaceKey,
        _content: &'a str,
    ) -> store::BoxFuture<'a, Result<ContentRecord, StorageError>> {
        Box::pin(async { Err(StorageError::Insert("connection refused".to_string())) })
    }

    fn create_if_absent<'a>(
        &'a self,
        _place: &'a PlaceKey,
        _content: &'a str,
    ) -> store::BoxFuture<'a, Result<CreateOutcome, StorageError>> {
        Box::pin(async { Err(StorageError::Insert("connection refused".to_string())) })
    }

    fn ping(&self) -> store::BoxFuture<'_, Result<(), StorageError>> {
        Box::pin(async { Err(StorageError::Query("connection refused".to_string())) })
    }
}

pub fn app(store: Arc<dyn ContentStore>, generator: Arc<FakeGenerator>) -> Router {
    router(AppState::new(ContentService::new(store, generator)))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn place(raw: &str) -> PlaceKey {
    PlaceKey::parse(raw).unwrap()
}
