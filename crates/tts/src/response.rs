use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::Engine as _;
use bytes::Bytes;
use futures::Stream;
use serde::Serialize;

use crate::{
    error::{ErrorCode, TtsError},
    range::RangeWindow,
    types::{SynthesisRequest, SynthesisResult},
};

static AUDIO_WAV: HeaderValue = HeaderValue::from_static("audio/wav");
static OCTET_STREAM: HeaderValue = HeaderValue::from_static("application/octet-stream");

#[derive(Debug, Serialize)]
pub struct Message {
    pub description: String,
}

/// `{success: false, code, message: {description}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: u16,
    pub message: Message,
}

impl ErrorResponse {
    /// Build an error body, substituting the code's default text for an empty message
    pub fn new(code: u16, description: String) -> Self {
        let description = if description.is_empty() {
            ErrorCode::from_u16(code)
                .unwrap_or(ErrorCode::UnknownError)
                .default_message()
                .to_string()
        } else {
            description
        };

        Self {
            success: false,
            code,
            message: Message { description },
        }
    }
}

/// Successful JSON synthesis response with the audio embedded as base64
#[derive(Debug, Serialize)]
pub struct FullResult {
    pub success: bool,
    pub code: u16,
    pub message: Message,
    pub result: FullResultBody,
}

#[derive(Debug, Serialize)]
pub struct FullResultBody {
    pub lang: String,
    pub spk_id: u32,
    pub speed: f64,
    pub volume: f64,
    pub sample_rate: u32,
    pub duration: f64,
    pub save_path: Option<String>,
    pub audio: String,
}

impl FullResult {
    pub fn new(request: SynthesisRequest, result: SynthesisResult) -> Self {
        Self {
            success: true,
            code: ErrorCode::Ok.as_u16(),
            message: Message {
                description: ErrorCode::Ok.default_message().to_string(),
            },
            result: FullResultBody {
                lang: result.lang,
                spk_id: request.spk_id,
                speed: request.speed,
                volume: request.volume,
                sample_rate: result.sample_rate,
                duration: result.duration,
                save_path: request.save_path,
                audio: base64::engine::general_purpose::STANDARD.encode(&result.audio),
            },
        }
    }
}

/// `{sample_rate}` body of the streaming sample rate endpoint
#[derive(Debug, Serialize)]
pub struct SampleRateResponse {
    pub sample_rate: u32,
}

/// Raw WAV body, sliced and framed according to the resolved range
pub fn binary_response(window: &RangeWindow, audio: Bytes) -> Response {
    let body = window.slice(audio);

    let mut response = (window.status(), Body::from(body)).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, AUDIO_WAV.clone());
    headers.extend(window.headers());

    response
}

/// Chunked binary body fed by an engine stream
///
/// Each item is written as soon as it is produced; an error item aborts the
/// response mid-body since the status line has already been sent.
pub fn chunked_response<S>(chunks: S) -> Response
where
    S: Stream<Item = Result<Bytes, TtsError>> + Send + 'static,
{
    let mut response = (StatusCode::OK, Body::from_stream(chunks)).into_response();
    response.headers_mut().insert(header::CONTENT_TYPE, OCTET_STREAM.clone());
    response
}

/// Static description served by the help endpoint
///
/// `success` is the string `"True"` here, not a boolean.
pub fn help() -> serde_json::Value {
    serde_json::json!({
        "success": "True",
        "code": 200,
        "message": {
            "global": "success"
        },
        "result": {
            "description": "tts server",
            "text": "sentence to be synthesized",
            "audio": "the base64 of audio"
        }
    })
}
