use bytes::Bytes;
use serde::Deserialize;

/// Synthesis parameters shared by the GET query string and the JSON bodies
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SynthesisRequest {
    /// Text to synthesize
    pub text: String,
    /// Speaker id for multi-speaker models
    #[serde(default)]
    pub spk_id: u32,
    /// Speed multiplier, `(0, 3]`
    #[serde(default = "default_unit")]
    pub speed: f64,
    /// Volume multiplier, `(0, 3]`
    #[serde(default = "default_unit")]
    pub volume: f64,
    /// Output sample rate; 0 keeps the engine's own rate
    #[serde(default)]
    pub sample_rate: u32,
    /// Where to additionally store the audio, `.wav` or `.pcm`
    #[serde(default)]
    pub save_path: Option<String>,
}

impl SynthesisRequest {
    /// Request for `text` with every other parameter at its default
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spk_id: 0,
            speed: default_unit(),
            volume: default_unit(),
            sample_rate: 0,
            save_path: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_unit() -> f64 {
    1.0
}

/// Body of the streaming endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamingRequest {
    pub text: String,
    #[serde(default)]
    pub spk_id: u32,
}

/// Complete output of one offline synthesis call
#[derive(Debug, Clone)]
pub struct SynthesisResult {
    /// Language tag of the synthesized speech
    pub lang: String,
    /// Sample rate actually produced by the engine
    pub sample_rate: u32,
    /// Audio duration in seconds
    pub duration: f64,
    /// WAV-encoded audio
    pub audio: Bytes,
}
