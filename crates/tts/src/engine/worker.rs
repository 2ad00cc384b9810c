use async_trait::async_trait;
use base64::Engine as _;
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use speechgate_config::TtsEngineConfig;

use crate::{
    error::{ErrorCode, Result, TtsError},
    http_client::http_client,
    types::{SynthesisRequest, SynthesisResult},
};

use super::{AudioStream, Engine, EngineType};

/// Engine backed by an inference worker process reached over HTTP
///
/// The worker hosts the acoustic model and vocoder; this side only speaks
/// its two endpoints, `/synthesize` and `/synthesize/stream`.
pub struct WorkerEngine {
    client: Client,
    base_url: String,
    api_key: Option<SecretString>,
    name: String,
    engine_type: EngineType,
    sample_rate: u32,
}

impl WorkerEngine {
    /// Build the engine for one `[tts.engines.<name>]` entry
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::ConfigError`] for an unknown engine type or when
    /// the HTTP client cannot be constructed
    pub fn from_config(name: &str, config: &TtsEngineConfig) -> Result<Self> {
        let engine_type = EngineType::parse(&config.engine_type)?;

        let client = http_client(config.connect_timeout)
            .map_err(|e| TtsError::ConfigError(format!("failed to build HTTP client for engine '{name}': {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            name: name.to_string(),
            engine_type,
            sample_rate: config.sample_rate,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(format!("{}{path}", self.base_url));

        match self.api_key {
            Some(ref key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    /// Send a request, turning transport failures and error statuses into engine errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::error!(engine = %self.name, "tts worker request failed: {e}");
            TtsError::Engine {
                code: ErrorCode::NetworkError.as_u16(),
                message: ErrorCode::NetworkError.default_message().to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::error!(engine = %self.name, "tts worker error ({status}): {body}");

        Err(worker_error(status.as_u16(), &body))
    }
}

#[derive(Serialize)]
struct WorkerSynthesisRequest<'a> {
    engine_type: String,
    text: &'a str,
    spk_id: u32,
    speed: f64,
    volume: f64,
    sample_rate: u32,
}

#[derive(Serialize)]
struct WorkerStreamRequest<'a> {
    engine_type: String,
    text: &'a str,
    spk_id: u32,
}

#[derive(Deserialize)]
struct WorkerSynthesisResponse {
    lang: String,
    sample_rate: u32,
    duration: f64,
    /// Base64 WAV
    audio: String,
}

/// Error body in the same `{code, message: {description}}` shape this service emits
#[derive(Deserialize)]
struct WorkerErrorBody {
    code: u16,
    message: WorkerErrorMessage,
}

#[derive(Deserialize)]
struct WorkerErrorMessage {
    #[serde(default)]
    description: String,
}

fn worker_error(status: u16, body: &str) -> TtsError {
    match serde_json::from_str::<WorkerErrorBody>(body) {
        Ok(error) => TtsError::Engine {
            code: error.code,
            message: error.message.description,
        },
        Err(_) => TtsError::Engine {
            code: status,
            message: body.trim().to_string(),
        },
    }
}

#[async_trait]
impl Engine for WorkerEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn engine_type(&self) -> EngineType {
        self.engine_type
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        tracing::debug!(
            engine = %self.name,
            spk_id = request.spk_id,
            input_len = request.text.len(),
            "worker synthesis request"
        );

        let body = WorkerSynthesisRequest {
            engine_type: self.engine_type.to_string(),
            text: &request.text,
            spk_id: request.spk_id,
            speed: request.speed,
            volume: request.volume,
            sample_rate: request.sample_rate,
        };

        let response = self.send(self.post("/synthesize").json(&body)).await?;

        let payload: WorkerSynthesisResponse = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("failed to decode worker response from engine '{}': {e}", self.name))?;

        let audio = base64::engine::general_purpose::STANDARD
            .decode(payload.audio.as_bytes())
            .map_err(|e| anyhow::anyhow!("worker returned invalid base64 audio: {e}"))?;

        tracing::debug!(engine = %self.name, bytes = audio.len(), "worker synthesis complete");

        Ok(SynthesisResult {
            lang: payload.lang,
            sample_rate: payload.sample_rate,
            duration: payload.duration,
            audio: Bytes::from(audio),
        })
    }

    async fn synthesize_stream(&self, sentence: &str, spk_id: u32) -> Result<AudioStream> {
        tracing::debug!(engine = %self.name, spk_id, input_len = sentence.len(), "worker streaming request");

        let body = WorkerStreamRequest {
            engine_type: self.engine_type.to_string(),
            text: sentence,
            spk_id,
        };

        let response = self.send(self.post("/synthesize/stream").json(&body)).await?;
        let name = self.name.clone();

        let chunks = response
            .bytes_stream()
            .map_err(move |e| {
                tracing::error!(engine = %name, "tts worker stream interrupted: {e}");
                TtsError::Engine {
                    code: ErrorCode::NetworkError.as_u16(),
                    message: ErrorCode::NetworkError.default_message().to_string(),
                }
            })
            .boxed();

        Ok(chunks)
    }
}
