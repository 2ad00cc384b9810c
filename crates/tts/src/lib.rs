#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod audio;
mod connection;
pub mod engine;
mod error;
mod http_client;
pub mod range;
mod request;
pub mod response;
mod server;
mod types;
mod validate;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use speechgate_config::Config;

pub use error::{ErrorCode, Result, TtsError};
pub use server::{Server, TtsServerBuilder};
pub use types::{StreamingRequest, SynthesisRequest, SynthesisResult};
pub use validate::validate;

use request::{ExtractPayload, ExtractQuery, range_header};
use response::{FullResult, SampleRateResponse};

/// Build the TTS server from configuration
pub fn build_server(config: &Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(config)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS server: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for TTS
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/paddlespeech/tts/help", get(help))
        .route("/paddlespeech/tts", get(synthesize_audio).post(synthesize))
        .route("/paddlespeech/tts/streaming", post(synthesize_stream))
        .route("/paddlespeech/tts/streaming/samplerate", get(sample_rate))
}

#[allow(clippy::unused_async)]
async fn help() -> Json<serde_json::Value> {
    Json(response::help())
}

/// Synthesize and return the raw WAV, honoring a single byte range
async fn synthesize_audio(
    State(server): State<Arc<Server>>,
    headers: HeaderMap,
    ExtractQuery(request): ExtractQuery<SynthesisRequest>,
) -> Result<Response> {
    tracing::debug!(spk_id = request.spk_id, "TTS audio handler called");

    let result = server.synthesize(&request).await?;
    let window = range::resolve(range_header(&headers), result.audio.len() as u64)?;

    Ok(response::binary_response(&window, result.audio))
}

/// Synthesize and return the audio base64-encoded in a JSON envelope
async fn synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<SynthesisRequest>,
) -> Result<Response> {
    tracing::debug!(spk_id = request.spk_id, "TTS synthesis handler called");

    let result = server.synthesize(&request).await?;

    Ok(Json(FullResult::new(request, result)).into_response())
}

async fn synthesize_stream(
    State(server): State<Arc<Server>>,
    ExtractPayload(request): ExtractPayload<StreamingRequest>,
) -> Result<Response> {
    tracing::debug!(spk_id = request.spk_id, "TTS streaming handler called");

    let chunks = server.synthesize_stream(request.text, request.spk_id)?;

    Ok(response::chunked_response(chunks))
}

#[allow(clippy::unused_async)]
async fn sample_rate(State(server): State<Arc<Server>>) -> Result<Json<SampleRateResponse>> {
    let sample_rate = server.sample_rate()?;

    Ok(Json(SampleRateResponse { sample_rate }))
}
