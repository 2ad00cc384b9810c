//! Mock inference worker for integration tests
//!
//! Serves `/synthesize` and `/synthesize/stream` with audio derived from the
//! input text, so the same text always yields the same WAV bytes.
//!
//! Special texts trigger failures:
//! - `busy`: 503 with a plain-text body
//! - `missing`: 404 in the structured error shape
//! - `garbage`: 200 with audio that is not valid base64

use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use base64::Engine as _;
use bytes::Bytes;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

/// Chunks the streaming endpoint splits its audio into
const STREAM_CHUNKS: usize = 3;

/// Mock worker that synthesizes predictable audio
pub struct MockWorker {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockWorkerState>,
}

#[derive(Default)]
struct MockWorkerState {
    /// Every request body received, in order
    requests: Mutex<Vec<serde_json::Value>>,
    /// `Authorization` header of the last request
    authorization: Mutex<Option<String>>,
}

impl MockWorker {
    /// Start the mock worker, returning immediately
    pub async fn start() -> anyhow::Result<Self> {
        let state = Arc::new(MockWorkerState::default());

        let app = Router::new()
            .route("/synthesize", routing::post(handle_synthesize))
            .route("/synthesize/stream", routing::post(handle_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as an engine
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Request bodies received so far
    pub fn requests(&self) -> Vec<serde_json::Value> {
        self.state.requests.lock().unwrap().clone()
    }

    /// `Authorization` header of the most recent request
    pub fn authorization(&self) -> Option<String> {
        self.state.authorization.lock().unwrap().clone()
    }
}

impl Drop for MockWorker {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Audio the mock produces for `text`, at `sample_rate`
pub fn expected_audio(text: &str, sample_rate: u32) -> Bytes {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for byte in text.bytes() {
            writer.write_sample(i16::from(byte) * 100).unwrap();
            writer.write_sample(-i16::from(byte)).unwrap();
        }
        writer.finalize().unwrap();
    }

    Bytes::from(cursor.into_inner())
}

#[derive(Debug, Deserialize)]
struct SynthesizeRequest {
    text: String,
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct StreamRequest {
    text: String,
}

fn record(state: &MockWorkerState, headers: &HeaderMap, body: &serde_json::Value) {
    state.requests.lock().unwrap().push(body.clone());
    *state.authorization.lock().unwrap() = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
}

fn failure(text: &str) -> Option<Response> {
    match text {
        "busy" => Some((StatusCode::SERVICE_UNAVAILABLE, "model busy\n").into_response()),
        "missing" => Some(
            (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "success": false,
                    "code": 404,
                    "message": {"description": "Task is not exist."}
                })),
            )
                .into_response(),
        ),
        _ => None,
    }
}

async fn handle_synthesize(
    State(state): State<Arc<MockWorkerState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    record(&state, &headers, &body);

    let request: SynthesizeRequest = serde_json::from_value(body).unwrap();

    if let Some(response) = failure(&request.text) {
        return response;
    }

    if request.text == "garbage" {
        return Json(serde_json::json!({
            "lang": "zh",
            "sample_rate": 24000,
            "duration": 0.0,
            "audio": "%%% not base64 %%%"
        }))
        .into_response();
    }

    let sample_rate = if request.sample_rate == 0 { 24_000 } else { request.sample_rate };
    let audio = expected_audio(&request.text, sample_rate);

    Json(serde_json::json!({
        "lang": "zh",
        "sample_rate": sample_rate,
        "duration": request.text.len() as f64 / f64::from(sample_rate),
        "audio": base64::engine::general_purpose::STANDARD.encode(&audio),
    }))
    .into_response()
}

async fn handle_stream(
    State(state): State<Arc<MockWorkerState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    record(&state, &headers, &body);

    let request: StreamRequest = serde_json::from_value(body).unwrap();

    if let Some(response) = failure(&request.text) {
        return response;
    }

    let audio = expected_audio(&request.text, 24_000);
    let chunk_size = audio.len().div_ceil(STREAM_CHUNKS);
    let chunks: Vec<Bytes> = audio.chunks(chunk_size).map(Bytes::copy_from_slice).collect();

    let stream = futures::stream::unfold(chunks.into_iter(), |mut chunks| async move {
        let chunk = chunks.next()?;
        tokio::time::sleep(Duration::from_millis(10)).await;
        Some((Ok::<_, std::io::Error>(chunk), chunks))
    });

    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(stream),
    )
        .into_response()
}
