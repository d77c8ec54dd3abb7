//! In-process cities API: replays queued JSON responses and records what
//! the client sent.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::any;
use axum::Router;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }
}

/// Canned reply; the body is always sent as `application/json`.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl MockResponse {
    pub fn json(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("invalid status code"),
            body: serde_json::json!({ "error": message }).to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }
}

#[derive(Default)]
struct Script {
    requests: Vec<RecordedRequest>,
    responses: VecDeque<MockResponse>,
}

type Shared = Arc<Mutex<Script>>;

pub struct MockCitiesApi {
    addr: SocketAddr,
    script: Shared,
    server: JoinHandle<()>,
}

impl MockCitiesApi {
    pub async fn start() -> Self {
        let script = Shared::default();
        let app = Router::new()
            .route("/{*path}", any(respond))
            .with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock cities API");
        let addr = listener.local_addr().expect("no local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, script, server }
    }

    /// Queue the reply for the next request. An empty queue answers `{}`.
    pub async fn push(&self, response: MockResponse) {
        self.script.lock().await.responses.push_back(response);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.script.lock().await.requests.clone()
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockCitiesApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn respond(
    State(script): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let response = {
        let mut script = script.lock().await;
        script.requests.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            headers,
            body,
        });
        script
            .responses
            .pop_front()
            .unwrap_or_else(|| MockResponse::json("{}"))
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }
    (
        response.status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
}
