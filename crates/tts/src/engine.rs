pub mod worker;

use std::{str::FromStr, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use indexmap::IndexMap;
use strum::{Display, EnumString};

use crate::{
    error::{Result, TtsError},
    types::{SynthesisRequest, SynthesisResult},
};

/// Forward-only sequence of encoded audio chunks
pub type AudioStream = BoxStream<'static, Result<Bytes>>;

/// Engine type tags accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum EngineType {
    /// Dynamic-graph offline synthesis
    Python,
    /// Static-graph offline synthesis
    Inference,
    /// Incremental synthesis
    Online,
    /// Incremental synthesis on ONNX runtime
    OnlineOnnx,
}

/// Which connection handler family an engine serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineFamily {
    /// Full-buffer synthesis
    Offline,
    /// Chunked synthesis
    Streaming,
}

impl EngineType {
    pub const fn family(self) -> EngineFamily {
        match self {
            Self::Python | Self::Inference => EngineFamily::Offline,
            Self::Online | Self::OnlineOnnx => EngineFamily::Streaming,
        }
    }

    /// Parse a configured tag
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::ConfigError`] for tags outside the supported set
    pub fn parse(tag: &str) -> Result<Self> {
        Self::from_str(tag).map_err(|_| {
            TtsError::ConfigError(format!(
                "unsupported engine_type '{tag}', expected one of python, inference, online, online-onnx"
            ))
        })
    }
}

/// A process-wide synthesis engine
///
/// Engines are shared by every request; per-request state lives in the
/// connection handlers built around them.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Pool entry name
    fn name(&self) -> &str;

    /// Configured type tag
    fn engine_type(&self) -> EngineType;

    /// Sample rate the engine synthesizes at by default
    fn sample_rate(&self) -> u32;

    /// Synthesize the whole utterance in one call
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult>;

    /// Start incremental synthesis, yielding audio chunks as they are produced
    async fn synthesize_stream(&self, sentence: &str, spk_id: u32) -> Result<AudioStream>;
}

/// Read-only registry of engines, built once at startup
#[derive(Default, Clone)]
pub struct EnginePool {
    engines: IndexMap<String, Arc<dyn Engine>>,
}

impl EnginePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine under its own name, replacing any previous entry
    #[must_use]
    pub fn with_engine(mut self, engine: Arc<dyn Engine>) -> Self {
        self.engines.insert(engine.name().to_string(), engine);
        self
    }

    /// Look up an engine by name
    ///
    /// # Errors
    ///
    /// Returns [`TtsError::EngineNotFound`] if no engine has that name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Engine>> {
        self.engines
            .get(name)
            .cloned()
            .ok_or_else(|| TtsError::EngineNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags() {
        assert_eq!(EngineType::parse("python").unwrap(), EngineType::Python);
        assert_eq!(EngineType::parse("inference").unwrap(), EngineType::Inference);
        assert_eq!(EngineType::parse("online").unwrap(), EngineType::Online);
        assert_eq!(EngineType::parse("online-onnx").unwrap(), EngineType::OnlineOnnx);
    }

    #[test]
    fn rejects_unknown_tags() {
        for tag in ["", "Python", "onnx", "online_onnx", "ascend"] {
            let err = EngineType::parse(tag).unwrap_err();
            assert!(matches!(err, TtsError::ConfigError(_)), "{tag}");
        }
    }

    #[test]
    fn display_matches_config_tag() {
        assert_eq!(EngineType::OnlineOnnx.to_string(), "online-onnx");
        assert_eq!(EngineType::Inference.to_string(), "inference");
    }

    #[test]
    fn families() {
        assert_eq!(EngineType::Python.family(), EngineFamily::Offline);
        assert_eq!(EngineType::Inference.family(), EngineFamily::Offline);
        assert_eq!(EngineType::Online.family(), EngineFamily::Streaming);
        assert_eq!(EngineType::OnlineOnnx.family(), EngineFamily::Streaming);
    }
}
