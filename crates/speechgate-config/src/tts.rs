use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use url::Url;

/// Top-level TTS configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsConfig {
    /// Name of the pool entry served by the `/paddlespeech/tts` endpoints
    #[serde(default = "default_engine")]
    pub engine: String,
    /// Engine configurations keyed by name
    #[serde(default)]
    pub engines: IndexMap<String, TtsEngineConfig>,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            engines: IndexMap::new(),
        }
    }
}

/// Configuration for a single synthesis engine
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TtsEngineConfig {
    /// Engine type tag (`python`, `inference`, `online` or `online-onnx`)
    ///
    /// Kept as a raw string here; the engine pool rejects unknown tags at startup.
    pub engine_type: String,
    /// Base URL of the inference worker hosting the model
    pub base_url: Url,
    /// Bearer key sent to the worker
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Sample rate the engine synthesizes at when the request asks for 0
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Connect timeout towards the worker (e.g. "5s")
    #[serde(default = "default_connect_timeout", deserialize_with = "deserialize_duration")]
    pub connect_timeout: Duration,
}

fn default_engine() -> String {
    "tts".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_sample_rate() -> u32 {
    24_000
}

#[allow(clippy::missing_const_for_fn)]
fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    duration_str::parse(&raw).map_err(|e| serde::de::Error::custom(format!("invalid duration '{raw}': {e}")))
}
