use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use speechgate_config::Config;

use crate::{
    connection::{offline_handler, streaming_handler},
    engine::{Engine, EnginePool, worker::WorkerEngine},
    error::Result,
    types::{SynthesisRequest, SynthesisResult},
    validate::validate,
};

/// TTS server state shared by every request
///
/// Holds the engine pool and the name of the engine the endpoints are served
/// by. Each call builds a fresh connection handler around that engine.
pub struct Server {
    pool: EnginePool,
    engine: String,
}

impl Server {
    /// Serve requests from `engine` in `pool`
    pub fn new(pool: EnginePool, engine: impl Into<String>) -> Self {
        Self {
            pool,
            engine: engine.into(),
        }
    }

    fn engine(&self) -> Result<Arc<dyn Engine>> {
        self.pool.get(&self.engine)
    }

    /// Validate `request`, then synthesize it in full
    pub async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesisResult> {
        validate(request)?;

        let engine = self.engine()?;
        let handler = offline_handler(&engine)?;

        handler.run(request).await
    }

    /// Start chunked synthesis of `sentence`
    ///
    /// Parameters are passed to the engine as received.
    pub fn synthesize_stream(
        &self,
        sentence: String,
        spk_id: u32,
    ) -> Result<impl Stream<Item = Result<Bytes>> + Send + 'static> {
        let engine = self.engine()?;
        let handler = streaming_handler(&engine)?;

        Ok(handler.run(sentence, spk_id))
    }

    /// Configured sample rate of the served engine, whatever its family
    pub fn sample_rate(&self) -> Result<u32> {
        Ok(self.engine()?.sample_rate())
    }
}

/// Builder for constructing the TTS server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a Config,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let tts = &self.config.tts;
        let mut pool = EnginePool::new();

        for (name, engine_config) in &tts.engines {
            tracing::debug!("Initializing TTS engine: {name}");

            let engine = WorkerEngine::from_config(name, engine_config)?;

            tracing::info!(
                engine = %name,
                engine_type = %engine.engine_type(),
                base_url = %engine_config.base_url,
                "TTS engine ready"
            );

            pool = pool.with_engine(Arc::new(engine));
        }

        // Surface a missing served engine at startup rather than on the first request
        pool.get(&tts.engine)?;

        tracing::debug!("TTS server initialized with {} engine(s)", pool.len());

        Ok(Server::new(pool, tts.engine.clone()))
    }
}
