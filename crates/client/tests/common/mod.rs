//! In-process mock of the processing backend.
//!
//! Serves the same routes as the real backend on an ephemeral port. Tests
//! script the `/process` and `/retry_summary` responses and inspect what the
//! client sent through [`MockState`].

#![allow(dead_code)]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

/// One multipart field received on `/process`.
#[derive(Debug, Clone)]
pub struct RecordedField {
    pub name: String,
    pub file_name: Option<String>,
    pub data: Vec<u8>,
}

impl RecordedField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Debug)]
pub struct MockInner {
    pub process_response: (StatusCode, String),
    pub retry_response: (StatusCode, String),
    /// Fields of the most recent `/process` request.
    pub fields: Vec<RecordedField>,
    pub process_calls: usize,
    pub retry_calls: usize,
    pub cleanup_calls: usize,
    /// Clip or frame names that answer 404 on download.
    pub missing: HashSet<String>,
}

impl Default for MockInner {
    fn default() -> Self {
        Self {
            process_response: (StatusCode::OK, r#"{"success":true}"#.to_string()),
            retry_response: (StatusCode::OK, r#"{"success":true}"#.to_string()),
            fields: Vec::new(),
            process_calls: 0,
            retry_calls: 0,
            cleanup_calls: 0,
            missing: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MockState(Arc<Mutex<MockInner>>);

impl MockState {
    pub fn lock(&self) -> MutexGuard<'_, MockInner> {
        self.0.lock().unwrap()
    }

    pub fn respond_to_process(&self, status: StatusCode, body: impl Into<String>) {
        self.lock().process_response = (status, body.into());
    }

    pub fn respond_to_retry(&self, status: StatusCode, body: impl Into<String>) {
        self.lock().retry_response = (status, body.into());
    }

    pub fn mark_missing(&self, name: &str) {
        self.lock().missing.insert(name.to_string());
    }

    pub fn field(&self, name: &str) -> Option<RecordedField> {
        self.lock().fields.iter().find(|f| f.name == name).cloned()
    }

    pub fn cleanup_calls(&self) -> usize {
        self.lock().cleanup_calls
    }
}

/// A running mock backend.
pub struct MockBackend {
    pub base_url: String,
    pub state: MockState,
}

/// Bind the mock on `127.0.0.1:0` and serve it in the background.
pub async fn spawn_backend() -> MockBackend {
    let state = MockState::default();
    let app = Router::new()
        .route("/process", post(process))
        .route("/retry_summary", post(retry_summary))
        .route("/cleanup", post(cleanup))
        .route("/download/{clip}", get(download_clip))
        .route("/download_frame/{clip}/{frame}", get(download_frame))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Clip body served by the mock, so downloads can be checked byte for byte.
pub fn clip_bytes(clip: &str) -> Vec<u8> {
    format!("clip:{clip}").into_bytes()
}

pub fn frame_bytes(clip: &str, frame: &str) -> Vec<u8> {
    format!("frame:{clip}:{frame}").into_bytes()
}

// ---- handlers ----

async fn process(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(RecordedField {
            name,
            file_name,
            data,
        });
    }

    let mut inner = state.lock();
    inner.fields = fields;
    inner.process_calls += 1;
    inner.process_response.clone().into_response()
}

async fn retry_summary(State(state): State<MockState>) -> Response {
    let mut inner = state.lock();
    inner.retry_calls += 1;
    inner.retry_response.clone().into_response()
}

async fn cleanup(State(state): State<MockState>) -> Response {
    state.lock().cleanup_calls += 1;
    (StatusCode::OK, r#"{"success":true}"#).into_response()
}

async fn download_clip(State(state): State<MockState>, Path(clip): Path<String>) -> Response {
    if state.lock().missing.contains(&clip) {
        return StatusCode::NOT_FOUND.into_response();
    }
    (StatusCode::OK, clip_bytes(&clip)).into_response()
}

async fn download_frame(
    State(state): State<MockState>,
    Path((clip, frame)): Path<(String, String)>,
) -> Response {
    if state.lock().missing.contains(&frame) {
        return StatusCode::NOT_FOUND.into_response();
    }
    (StatusCode::OK, frame_bytes(&clip, &frame)).into_response()
}
